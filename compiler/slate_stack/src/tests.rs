use super::*;

fn nest(depth: u32) -> u32 {
    ensure_sufficient_stack(|| if depth == 0 { 0 } else { nest(depth - 1) + 1 })
}

#[test]
fn passes_the_closure_result_through() {
    assert_eq!(ensure_sufficient_stack(|| "done"), "done");
    let result: Result<u8, String> = ensure_sufficient_stack(|| Ok(7));
    assert_eq!(result, Ok(7));
}

#[test]
fn survives_recursion_deeper_than_the_main_stack() {
    assert_eq!(nest(200_000), 200_000);
}
