mod interpreter_tests {
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    use quill::error::QuillError;
    use quill::interpreter::Interpreter;
    use quill::parser::Parser;
    use quill::scanner::scan;

    /// A `Write` sink the test keeps a handle to after handing the
    /// interpreter its own.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).expect("utf-8 output")
        }
    }

    struct Session {
        interpreter: Interpreter,
        out: SharedBuf,
    }

    impl Session {
        fn new() -> Self {
            let out = SharedBuf::default();
            let interpreter = Interpreter::with_output(Box::new(out.clone()));

            Session { interpreter, out }
        }

        /// Scan, parse, and interpret one source string, returning the
        /// runtime error if any.  Lex and parse must succeed.
        fn run(&mut self, source: &str) -> Option<QuillError> {
            let (tokens, lex_errors) = scan(source);
            assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);

            let statements = Parser::new(&tokens).parse().expect("clean parse");

            self.interpreter.interpret(&statements).err()
        }

        fn output(&self) -> String {
            self.out.contents()
        }
    }

    /// Run a single source string to completion, asserting no runtime error,
    /// and return everything it printed.
    fn eval(source: &str) -> String {
        let mut session = Session::new();
        let error = session.run(source);

        assert!(error.is_none(), "unexpected runtime error: {:?}", error);

        session.output()
    }

    /// Run a single source string, asserting it fails at runtime, and return
    /// the error's display form.
    fn eval_err(source: &str) -> String {
        let mut session = Session::new();

        session
            .run(source)
            .expect("expected runtime error")
            .to_string()
    }

    #[test]
    fn test_print_literal_number() {
        assert_eq!(eval("42;\nprint 42;"), "42\n");
        assert_eq!(eval("print 3.14;"), "3.14\n");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("print 1 + 2 * 3;"), "7\n");
        assert_eq!(eval("print (1 + 2) * 3;"), "9\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval("print \"a\" + \"b\";"), "ab\n");
    }

    #[test]
    fn test_mixed_plus_is_a_type_error() {
        let msg = eval_err("print 1 + \"b\";");

        assert!(msg.contains("must be two numbers or two strings"));
    }

    #[test]
    fn test_division_by_zero() {
        let msg = eval_err("print 1 / 0;");

        assert!(msg.contains("Division by zero."));
    }

    #[test]
    fn test_division() {
        assert_eq!(eval("print 10 / 4;"), "2.5\n");
    }

    #[test]
    fn test_equality_has_no_coercion() {
        assert_eq!(eval("print 1 == \"1\";"), "false\n");
        assert_eq!(eval("print nil == false;"), "false\n");
        assert_eq!(eval("print 1 != \"1\";"), "true\n");
        assert_eq!(eval("print \"a\" == \"a\";"), "true\n");
    }

    #[test]
    fn test_truthiness() {
        // Zero and the empty string are truthy; only nil and false are falsy.
        assert_eq!(eval("print !0;"), "false\n");
        assert_eq!(eval("print !\"\";"), "false\n");
        assert_eq!(eval("print !nil;"), "true\n");
        assert_eq!(eval("print !false;"), "true\n");
    }

    #[test]
    fn test_unary_minus_requires_number() {
        assert_eq!(eval("print -(1 + 2);"), "-3\n");

        let msg = eval_err("print -\"a\";");
        assert!(msg.contains("must be a number"));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("print 1 < 2;"), "true\n");
        assert_eq!(eval("print 2 <= 2;"), "true\n");
        assert_eq!(eval("print 1 > 2;"), "false\n");
        assert_eq!(eval("print 2 >= 3;"), "false\n");

        let msg = eval_err("print 1 < \"2\";");
        assert!(msg.contains("must be numbers"));
    }

    #[test]
    fn test_canonical_print_forms() {
        assert_eq!(eval("print nil;"), "nil\n");
        assert_eq!(eval("print true;"), "true\n");
        assert_eq!(eval("print false;"), "false\n");
        assert_eq!(eval("print 2 * 2;"), "4\n"); // integral result, no ".0"
    }

    #[test]
    fn test_var_without_initializer_is_nil() {
        assert_eq!(eval("var x; print x;"), "nil\n");
    }

    #[test]
    fn test_assignment_yields_value_and_mutates() {
        assert_eq!(eval("var x = 1; print x = 2; print x;"), "2\n2\n");
    }

    #[test]
    fn test_shadowing_round_trip() {
        assert_eq!(
            eval("var x = 1; { var x = 2; print x; } print x;"),
            "2\n1\n"
        );
    }

    #[test]
    fn test_assignment_reaches_enclosing_scope() {
        assert_eq!(eval("var x = 1; { x = 2; } print x;"), "2\n");
    }

    #[test]
    fn test_undefined_variable_reference() {
        let msg = eval_err("print ghost;");

        assert!(msg.contains("Undefined variable 'ghost'."));
    }

    #[test]
    fn test_assignment_to_undeclared_name_fails_without_creating_global() {
        let mut session = Session::new();

        let error = session.run("x = 1;").expect("expected runtime error");
        assert!(error.to_string().contains("Undefined variable 'x'."));

        // The failed assignment must not have installed a binding.
        let error = session.run("print x;").expect("expected runtime error");
        assert!(error.to_string().contains("Undefined variable 'x'."));
    }

    #[test]
    fn test_runtime_error_aborts_remaining_statements() {
        let mut session = Session::new();

        let error = session.run("print 1; print 1 / 0; print 2;");

        assert!(error.is_some());

        // Output before the error sticks; nothing after it runs.
        assert_eq!(session.output(), "1\n");
    }

    #[test]
    fn test_globals_persist_across_interpret_calls() {
        let mut session = Session::new();

        assert!(session.run("var counter = 1;").is_none());
        assert!(session.run("counter = counter + 1;").is_none());
        assert!(session.run("print counter;").is_none());

        assert_eq!(session.output(), "2\n");
    }

    #[test]
    fn test_environment_restored_after_runtime_error_in_block() {
        let mut session = Session::new();

        let error = session.run("var a = 1; { var a = 2; print 1 + \"x\"; }");
        assert!(error.is_some());

        // The block's scope was torn down on the error path: the outer `a`
        // is visible again and the inner one is gone.
        assert!(session.run("print a;").is_none());
        assert_eq!(session.output(), "1\n");
    }

    #[test]
    fn test_runtime_error_carries_offending_line() {
        let msg = eval_err("var a = 1;\nvar b = 0;\nprint a / b;");

        assert!(msg.starts_with("[line 3]"), "got: {}", msg);
    }

    #[test]
    fn test_deeply_nested_scopes() {
        assert_eq!(
            eval("var x = \"outer\"; { { { print x; } } }"),
            "outer\n"
        );
    }
}
