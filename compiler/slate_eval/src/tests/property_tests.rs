//! Property-based tests for indexing, slicing and evaluation order.

#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    reason = "Generated sizes are small"
)]

use proptest::prelude::*;

use super::quiet_session;
use crate::array::{DType, SliceSpec};
use crate::index::{get_item, set_item, Selector, Subscript};
use crate::methods::call_method;
use crate::numeric::DenseArray;
use crate::value::Value;

fn item(index: i64) -> Subscript {
    Subscript::Single(Selector::Item(Value::Int(index)))
}

fn slice(start: usize, stop: usize) -> Subscript {
    Subscript::Single(Selector::Slice(SliceSpec {
        start: Some(start as i64),
        stop: Some(stop as i64),
        step: None,
    }))
}

/// A non-empty list of ints and a distance `k` from its end, `1 <= k <= len`.
fn list_and_offset() -> impl Strategy<Value = (Vec<i64>, usize)> {
    prop::collection::vec(-1000i64..1000, 1..24)
        .prop_flat_map(|items| {
            let len = items.len();
            (Just(items), 1..=len)
        })
}

/// A list, a slice `start..stop` inside it, and a replacement of the same length.
fn slice_case() -> impl Strategy<Value = (Vec<f64>, usize, usize, Vec<f64>)> {
    prop::collection::vec(-1.0e6f64..1.0e6, 1..24)
        .prop_flat_map(|items| {
            let len = items.len();
            (Just(items), 0..len)
        })
        .prop_flat_map(|(items, start)| {
            let len = items.len();
            (Just(items), Just(start), start + 1..=len)
        })
        .prop_flat_map(|(items, start, stop)| {
            let replacement = prop::collection::vec(-1.0e6f64..1.0e6, stop - start);
            (Just(items), Just(start), Just(stop), replacement)
        })
}

fn floats(values: &[f64]) -> Vec<Value> {
    values.iter().map(|&x| Value::Float(x)).collect()
}

proptest! {
    #[test]
    fn negative_index_counts_from_the_end((items, k) in list_and_offset()) {
        let len = items.len();
        let values: Vec<Value> = items.iter().map(|&n| Value::Int(n)).collect();
        let expected = Value::Int(items[len - k]);
        let containers = [
            Value::list(values.clone()),
            Value::tuple(values),
            Value::array(DenseArray::vector(items.iter().map(|&n| n as f64).collect(), DType::Int)),
        ];
        for container in &containers {
            prop_assert_eq!(get_item(container, &item(-(k as i64))).unwrap(), expected.clone());
            prop_assert_eq!(
                get_item(container, &item(-(k as i64))).unwrap(),
                get_item(container, &item((len - k) as i64)).unwrap()
            );
        }
    }

    #[test]
    fn negative_string_index((items, k) in list_and_offset()) {
        let text: String = items.iter().map(|&n| char::from(b'a' + u8::try_from(n.rem_euclid(26)).unwrap())).collect();
        let len = text.len();
        let s = Value::str(&text);
        prop_assert_eq!(
            get_item(&s, &item(-(k as i64))).unwrap(),
            get_item(&s, &item((len - k) as i64)).unwrap()
        );
    }

    #[test]
    fn list_slice_assignment_reads_back((items, start, stop, replacement) in slice_case()) {
        let list = Value::list(floats(&items));
        let assigned = Value::list(floats(&replacement));
        set_item(&list, &slice(start, stop), &assigned).unwrap();
        prop_assert_eq!(get_item(&list, &slice(start, stop)).unwrap(), assigned);
    }

    #[test]
    fn array_slice_assignment_reads_back((items, start, stop, replacement) in slice_case()) {
        let array = Value::array(DenseArray::vector(items, DType::Float));
        let assigned = Value::list(floats(&replacement));
        set_item(&array, &slice(start, stop), &assigned).unwrap();
        let picked = get_item(&array, &slice(start, stop)).unwrap();
        prop_assert_eq!(call_method(&picked, "tolist", &[], &[]).unwrap(), assigned);
    }

    #[test]
    fn default_is_bound_at_definition(first in -1000i64..1000, second in -1000i64..1000) {
        let mut session = quiet_session();
        let source = format!("k = {first}\ndef f(x=k):\n    return x\nk = {second}\nf()");
        prop_assert_eq!(session.interp(&source).unwrap(), Value::Int(first));
    }

    #[test]
    fn for_loop_sum_matches_closed_form(n in 0i64..200) {
        let mut session = quiet_session();
        let source = format!("total = 0\nfor i in range({n}):\n    total += i\ntotal");
        prop_assert_eq!(session.interp(&source).unwrap(), Value::Int(n * (n - 1) / 2));
    }
}
