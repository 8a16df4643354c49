//! Tests for the interpreter session: error recording and display,
//! the symbol table, resource limits and static name analysis.

use super::{global, quiet_session};
use crate::error_stack::InterpError;
use crate::errors::ErrorKind;
use crate::interpreter::{ErrorDisplay, Interpreter};
use crate::print_handler::buffer_handler;
use crate::value::Value;

mod error_recording_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn runtime_failure_abandons_only_its_statement() {
        let mut session = quiet_session();
        let result = session.interp("a = 1\nb = missing\nc = 3");
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NameError);
        assert_eq!(global(&session, "a"), Value::Int(1));
        assert_eq!(global(&session, "c"), Value::Int(3));
        assert!(!session.symtable().contains("b"));
    }

    #[test]
    fn every_failure_is_recorded_in_order() {
        let mut session = quiet_session();
        let err = session.interp("1 / 0\nnope\n'a' + 1").unwrap_err();
        assert!(matches!(err, InterpError::Failed { .. }));
        let kinds: Vec<ErrorKind> = session.error().iter().map(|record| record.kind()).collect();
        assert_eq!(
            kinds,
            [ErrorKind::ZeroDivisionError, ErrorKind::NameError, ErrorKind::TypeError]
        );
        assert_eq!(err.kind(), ErrorKind::ZeroDivisionError);
        assert_eq!(session.last_error().map(|r| r.kind()), Some(ErrorKind::TypeError));
    }

    #[test]
    fn records_carry_the_failing_position() {
        let mut session = quiet_session();
        let _ = session.interp("x = 1\ny = x + nope");
        let record = &session.error()[0];
        assert_eq!(record.get_error(), ("NameError", "name 'nope' is not defined"));
        let location = record.location().unwrap();
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 9);
    }

    #[test]
    fn parse_failure_aborts_the_whole_call() {
        let mut session = quiet_session();
        let err = session.interp("x = 1\ny = (").unwrap_err();
        assert!(matches!(err, InterpError::Aborted { .. }));
        assert_eq!(err.kind(), ErrorKind::SyntaxError);
        assert!(!session.symtable().contains("x"));
        assert_eq!(session.error().len(), 1);
    }

    #[test]
    fn next_call_clears_the_error_stack() {
        let mut session = quiet_session();
        assert!(session.interp("nope").is_err());
        assert_eq!(session.interp("1 + 1").unwrap(), Value::Int(2));
        assert!(session.error().is_empty());
    }

    #[test]
    fn shown_errors_go_to_the_output_sink() {
        let mut session = Interpreter::builder().print_handler(buffer_handler()).build();
        let result = session.interp("print 'before'\nnope\nprint 'after'");
        assert_eq!(result.unwrap(), Value::None);
        let output = session.output();
        assert!(output.starts_with("before\nafter\n"), "{output}");
        assert!(output.contains("NameError: name 'nope' is not defined"), "{output}");
        assert!(output.contains("at line 2, column 1"), "{output}");
    }

    #[test]
    fn display_can_be_overridden_per_call() {
        let mut session = quiet_session();
        assert_eq!(session.interp_with("nope", ErrorDisplay::Show).unwrap(), Value::None);
        assert!(session.output().contains("NameError"));
        session.clear_output();
        assert!(session.interp("nope").is_err());
        assert_eq!(session.output(), "");
    }

    #[test]
    fn unsupported_constructs_are_not_implemented() {
        let mut session = quiet_session();
        let err = session.interp("class Point:\n    pass").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplementedError);
        let err = session.interp("import os").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplementedError);
    }

    #[test]
    fn value_of_the_last_statement_is_returned() {
        let mut session = quiet_session();
        assert_eq!(session.interp("x = 20\nx + 1").unwrap(), Value::Int(21));
        assert_eq!(session.interp("y = 2").unwrap(), Value::None);
    }
}

mod symtable_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn host_values_are_visible_to_scripts() {
        let mut session = quiet_session();
        session.symtable_mut().set("rate", 0.5);
        session.symtable_mut().set("items", vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(session.interp("rate * sum(items)").unwrap(), Value::Float(1.5));
    }

    #[test]
    fn definitions_survive_across_calls() {
        let mut session = quiet_session();
        session.interp("def double(v):\n    return v * 2").unwrap();
        assert_eq!(session.interp("double(21)").unwrap(), Value::Int(42));
    }

    #[test]
    fn removed_names_are_unbound() {
        let mut session = quiet_session();
        session.interp("total = 10").unwrap();
        assert_eq!(session.symtable_mut().remove("total"), Some(Value::Int(10)));
        assert_eq!(session.interp("total").unwrap_err().kind(), ErrorKind::NameError);
    }

    #[test]
    fn builder_symbols_and_builtin_sets() {
        let mut session = Interpreter::builder()
            .print_handler(buffer_handler())
            .error_display(ErrorDisplay::Suppress)
            .without_numeric()
            .symbol("width", 3i64)
            .build();
        assert_eq!(session.interp("width * 2").unwrap(), Value::Int(6));
        assert_eq!(session.interp("zeros(2)").unwrap_err().kind(), ErrorKind::NameError);
        assert!(session.symtable().contains("sqrt"));

        let mut bare = Interpreter::builder()
            .print_handler(buffer_handler())
            .error_display(ErrorDisplay::Suppress)
            .without_builtins()
            .without_numeric()
            .build();
        assert!(bare.symtable().is_empty());
        assert_eq!(bare.interp("len([])").unwrap_err().kind(), ErrorKind::NameError);
    }

    #[test]
    fn sessions_do_not_share_state() {
        let mut first = quiet_session();
        let mut second = quiet_session();
        first.interp("shared = 1").unwrap();
        assert_eq!(second.interp("shared").unwrap_err().kind(), ErrorKind::NameError);
    }
}

mod limit_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn recursion_limit_fails_the_statement() {
        let mut session = Interpreter::builder()
            .print_handler(buffer_handler())
            .error_display(ErrorDisplay::Suppress)
            .max_recursion_depth(20)
            .build();
        let source = "def down(n):\n    return down(n + 1)\nr = down(0)\nafter = 1";
        let err = session.interp(source).unwrap_err();
        assert!(matches!(err, InterpError::Failed { .. }));
        assert_eq!(err.kind(), ErrorKind::RuntimeError);
        assert_eq!(global(&session, "after"), Value::Int(1));
    }

    #[test]
    fn recursion_within_the_limit_works() {
        let mut session = quiet_session();
        let source = "def fact(n):\n    if n <= 1:\n        return 1\n    return n * fact(n - 1)\nfact(10)";
        assert_eq!(session.interp(source).unwrap(), Value::Int(3_628_800));
    }

    #[test]
    fn loop_limit_aborts_the_call() {
        let mut session = Interpreter::builder()
            .print_handler(buffer_handler())
            .error_display(ErrorDisplay::Suppress)
            .max_loop_iterations(100)
            .build();
        let err = session.interp("while True:\n    pass\nafter = 1").unwrap_err();
        assert!(matches!(err, InterpError::Aborted { .. }));
        assert_eq!(err.kind(), ErrorKind::RuntimeError);
        assert!(!session.symtable().contains("after"));

        assert_eq!(session.interp("n = 0\nfor i in range(100):\n    n += 1\nn").unwrap(), Value::Int(100));
    }

    #[test]
    fn step_hook_can_stop_evaluation() {
        let mut session = Interpreter::builder()
            .print_handler(buffer_handler())
            .error_display(ErrorDisplay::Suppress)
            .step_hook(|steps| if steps > 50 { Err("out of budget".into()) } else { Ok(()) })
            .build();
        let err = session.interp("n = 0\nwhile True:\n    n += 1").unwrap_err();
        assert_eq!(
            err,
            InterpError::Aborted {
                kind: ErrorKind::RuntimeError,
                message: "evaluation aborted: out of budget".into(),
            }
        );
        assert_eq!(global(&session, "n"), Value::Int(50));
    }

    #[test]
    fn comprehensions_count_against_the_loop_limit() {
        let mut session = Interpreter::builder()
            .print_handler(buffer_handler())
            .error_display(ErrorDisplay::Suppress)
            .max_loop_iterations(10)
            .build();
        let err = session.interp("[i for i in range(50)]").unwrap_err();
        assert!(matches!(err, InterpError::Aborted { .. }));
    }
}

mod referenced_names_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_in_first_use_order() {
        let session = quiet_session();
        let names = session
            .referenced_names("y = sqrt(x) + offset\nz = x * 2")
            .unwrap();
        assert_eq!(names, ["sqrt", "x", "offset"]);
    }

    #[test]
    fn parse_errors_are_reported() {
        let session = quiet_session();
        let err = session.referenced_names("y = (").unwrap_err();
        assert_eq!(err.line, 1);
    }
}
