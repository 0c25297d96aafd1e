mod parser_tests {
    use quill::ast::{Expr, LiteralValue, Stmt};
    use quill::ast_printer::AstPrinter;
    use quill::error::QuillError;
    use quill::parser::Parser;
    use quill::scanner::scan;
    use quill::token::Token;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        let (tokens, errors) = scan(source);
        assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);
        tokens
    }

    fn parse_one(source: &str, expected: &str) {
        let tokens = tokens(source);
        let statements = Parser::new(&tokens).parse().expect("clean parse");

        assert_eq!(statements.len(), 1);
        assert_eq!(AstPrinter.print_stmt(&statements[0]), expected);
    }

    fn parse_errors(source: &str) -> Vec<QuillError> {
        let tokens = {
            let (tokens, errors) = scan(source);
            assert!(errors.is_empty());
            tokens
        };

        Parser::new(&tokens)
            .parse()
            .expect_err("expected syntax errors")
    }

    #[test]
    fn test_precedence_factor_binds_tighter_than_term() {
        parse_one("1 + 2 * 3;", "(expr (+ 1.0 (* 2.0 3.0)))");
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        parse_one("(1 + 2) * 3;", "(expr (* (group (+ 1.0 2.0)) 3.0))");
    }

    #[test]
    fn test_binary_operators_fold_left() {
        parse_one("1 - 2 - 3;", "(expr (- (- 1.0 2.0) 3.0))");
        parse_one("8 / 4 / 2;", "(expr (/ (/ 8.0 4.0) 2.0))");
    }

    #[test]
    fn test_comparison_binds_looser_than_term() {
        parse_one("1 + 2 < 3 * 4;", "(expr (< (+ 1.0 2.0) (* 3.0 4.0)))");
    }

    #[test]
    fn test_equality_is_lowest_binary_level() {
        parse_one("1 < 2 == true;", "(expr (== (< 1.0 2.0) true))");
    }

    #[test]
    fn test_unary_is_right_associative() {
        parse_one("!!false;", "(expr (! (! false)))");
        parse_one("--1;", "(expr (- (- 1.0)))");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        parse_one("a = b = 1;", "(expr (= a (= b 1.0)))");
    }

    #[test]
    fn test_print_statement() {
        parse_one("print \"hi\";", "(print hi)");
    }

    #[test]
    fn test_var_declaration_with_and_without_initializer() {
        parse_one("var x = 1 + 2;", "(var x (+ 1.0 2.0))");

        // No initializer: the parser stores no expression, the interpreter
        // defaults the binding to nil.
        let tokens = tokens("var x;");
        let statements = Parser::new(&tokens).parse().expect("clean parse");

        assert!(matches!(
            statements[0],
            Stmt::Var {
                initializer: None,
                ..
            }
        ));
    }

    #[test]
    fn test_block_collects_declarations() {
        parse_one(
            "{ var a = 1; print a; }",
            "(block (var a 1.0) (print a))",
        );
    }

    #[test]
    fn test_nested_blocks() {
        parse_one("{ { 1; } }", "(block (block (expr 1.0)))");
    }

    #[test]
    fn test_literal_expressions() {
        let tokens = tokens("nil;");
        let statements = Parser::new(&tokens).parse().expect("clean parse");

        assert!(matches!(
            statements[0],
            Stmt::Expression(Expr::Literal(LiteralValue::Nil))
        ));
    }

    #[test]
    fn test_missing_semicolon_is_reported_at_offender() {
        let errors = parse_errors("print 1");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Expected ';' after value."));
        assert!(errors[0].to_string().contains("at end"));
    }

    #[test]
    fn test_two_independent_errors_surface_in_one_parse() {
        // Statements one and three each miss their semicolon; recovery at the
        // `print` boundary lets both be reported, and no statement list is
        // produced.
        let errors = parse_errors("print 1\nprint 2\nprint 3");

        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.to_string().contains("Expected ';' after value.")));
    }

    #[test]
    fn test_recovery_resumes_at_statement_boundary() {
        // The middle statement is garbage; the parser still sees the bad
        // trailing statement after synchronizing.
        let errors = parse_errors("var a = ;\nprint );");

        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_invalid_assignment_target_is_recorded() {
        let errors = parse_errors("1 = 2;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("Invalid assignment target."));
    }

    #[test]
    fn test_invalid_assignment_target_does_not_derail_statement() {
        // The error is recorded but the left expression is kept, so the
        // closing semicolon still matches and only one error surfaces.
        let errors = parse_errors("(a) = 3;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("Invalid assignment target."));
    }

    #[test]
    fn test_unterminated_block_at_eof() {
        let errors = parse_errors("{ var a = 1;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Expected '}' after block."));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let source = "var a = 1; { a = a + 1; print a; }";

        let toks = tokens(source);
        let first = Parser::new(&toks).parse().expect("clean parse");
        let second = Parser::new(&toks).parse().expect("clean parse");

        assert_eq!(first, second);
    }
}
