use crate::{
    lexer::prelude::{lex, LexicalErrorType},
    parser::prelude::{
        parse_module, Expression, Parse, ParseError, ParseErrorType, Parsed, Parser, Statement
    },
    utils::prelude::Position
};

fn recover(src: &str) -> Parsed {
    Parser::new(lex(src)).parse_program()
}

fn expression(src: &str) -> Result<Expression, Vec<ParseError>> {
    // wrapped in `print` so a leading `{` is read as a map, not a block
    let parsed = parse_module(&format!("print({src});"))?;

    match parsed.program.statements.into_iter().next() {
        Some(Statement::Print(mut output)) if output.values.len() == 1 => Ok(output.values.remove(0)),
        other => panic!("expected a single printed expression, got {other:?}")
    }
}

/// Renders an expression with every operator application parenthesised.
fn grouped(expr: &Expression) -> String {
    match expr {
        Expression::Infix(infix) => format!(
            "({} {} {})",
            grouped(&infix.left),
            infix.operator.as_literal(),
            grouped(&infix.right)
        ),
        Expression::Prefix(prefix) => format!(
            "({}{})",
            prefix.operator.as_literal(),
            grouped(&prefix.expression)
        ),
        Expression::Ternary(ternary) => format!(
            "({} ? {} : {})",
            grouped(&ternary.condition),
            grouped(&ternary.resolution),
            grouped(&ternary.alternative)
        ),
        Expression::Assignment(assignment) => format!(
            "({} {} {})",
            assignment.target,
            assignment.operator.as_literal(),
            grouped(&assignment.value)
        ),
        Expression::Call(call) => format!(
            "{}({})",
            grouped(&call.callee),
            call.arguments.iter().map(grouped).collect::<Vec<_>>().join(", ")
        ),
        Expression::Member(member) => format!("{}.{}", grouped(&member.object), member.name),
        Expression::Index(index) => format!("{}[{}]", grouped(&index.object), grouped(&index.index)),
        other => other.to_string()
    }
}

#[test]
fn test_precedence() -> Result<(), Vec<ParseError>> {
    let cases = [
        ("2 + 3 * 4", "(2 + (3 * 4))"),
        ("a - b - c", "((a - b) - c)"),
        ("2 ** 3 ** 2", "(2 ** (3 ** 2))"),
        ("-a ** 2", "((-a) ** 2)"),
        ("a || b && c", "(a || (b && c))"),
        ("a & b | c ^ d", "((a & b) | (c ^ d))"),
        ("a == b < c", "(a == (b < c))"),
        ("x << 1 + 2", "(x << (1 + 2))"),
        ("a .. b + c", "((a .. b) + c)"),
        ("a = b = c + 1", "(a = (b = (c + 1)))"),
        ("a += 1 * 2", "(a += (1 * 2))"),
        ("a ? b : c ? d : e", "(a ? b : (c ? d : e))"),
        ("a || b ? 1 : 2", "((a || b) ? 1 : 2)"),
        ("!a.b", "(!a.b)"),
        ("f(1)(2).g[0]", "f(1)(2).g[0]"),
        ("f(a, b + 1)", "f(a, (b + 1))"),
    ];

    for (src, expected) in cases {
        assert_eq!(grouped(&expression(src)?), expected, "while parsing `{src}`");
    }

    Ok(())
}

#[test]
fn test_primaries() -> Result<(), Vec<ParseError>> {
    assert_eq!(expression("[1, 2.5, \"s\",]")?.to_string(), "[1, 2.5, \"s\"]");
    assert_eq!(expression("{k: true, \"q r\": null}")?.to_string(), "{\"k\": true, \"q r\": null}");
    assert_eq!(expression("lambda(n, m) => n * m")?.to_string(), "lambda(n, m) => n * m");
    assert_eq!(expression("input()")?.to_string(), "input()");
    assert_eq!(expression("input(\"> \")")?.to_string(), "input(\"> \")");
    assert_eq!(expression("(1 + 2) * 3")?.to_string(), "(1 + 2) * 3");
    assert_eq!(expression("- -a")?.to_string(), "- -a");
    assert_eq!(expression("undefined")?.to_string(), "undefined");

    Ok(())
}

#[test]
fn test_statements() -> Result<(), Vec<ParseError>> {
    let input = r#"
        var a = 1, b;
        net limit = 10;
        func add(x, y) { return x + y; }
        if [a < 2] print(a); else { print("no"); }
        while [a > 0] a -= 1;
        for [var i = 0; i < 3; i += 1] pass;
        for [;;] break;
        switch [a] { case 1: print(1); default: pass; }
        try { throw "x"; } catch (e) { print(e); } finally { pass; }
        import util;
        class Point extends Base { var x = 0; func init(v) { x = v; } }
        { let inner = a; }
    "#;

    let parsed = parse_module(input)?;
    let statements = &parsed.program.statements;

    assert_eq!(statements.len(), 12);
    assert!(matches!(statements[0], Statement::Declaration(ref decl) if decl.bindings.len() == 2));
    assert!(matches!(statements[1], Statement::Declaration(ref decl) if decl.kind.is_constant()));
    assert!(matches!(statements[2], Statement::Function(ref func) if func.parameters.len() == 2));
    assert!(matches!(statements[3], Statement::If(ref cond) if cond.alternative.is_some()));
    assert!(matches!(statements[4], Statement::While(_)));
    assert!(matches!(statements[5], Statement::For(ref for_) if for_.initializer.is_some()));
    assert!(matches!(
        statements[6],
        Statement::For(ref for_) if for_.initializer.is_none() && for_.condition.is_none() && for_.update.is_none()
    ));
    assert!(matches!(statements[7], Statement::Switch(ref switch) if switch.cases.len() == 2));
    assert!(matches!(statements[8], Statement::Try(ref try_) if try_.catch.is_some() && try_.finally.is_some()));
    assert!(matches!(statements[9], Statement::Import(ref import) if import.target == "util"));
    assert!(matches!(
        statements[10],
        Statement::Class(ref class) if class.parent.is_some() && class.members.len() == 2
    ));
    assert!(matches!(statements[11], Statement::Block(ref block) if block.statements.len() == 1));

    Ok(())
}

#[test]
fn test_printed_program_reparses_identically() -> Result<(), Vec<ParseError>> {
    let input = r#"
        var a = 1, b;
        const c = -5;
        func add(x, y) { return x + y; }
        class Point extends Base { var x = 0; func init(v) { x = v; } }
        if [a < 2] print(a); else { print("no\n"); }
        while [a > 0] a -= 1;
        for [var i = 0; i < 3; i += 1] { if [i == 1] continue; print(i); }
        switch [a] { case 1: print(1); default: pass; }
        try { throw error("x"); } catch (e) { print(e); } finally { pass; }
        import "lib/util";
        var l = [1, 2.5, "s"], m = {k: true, "q r": null};
        var f = lambda(n) => n ** 2 ** 3;
        print(a ? b : c, -(-a), !a, ~a, a .. "x", l[0], m.k, input("> "));
        ++a;
        a = (1 + 2) * 3;
        return;
    "#;

    let printed = parse_module(input)?.program.to_string();
    let reprinted = parse_module(&printed)?.program.to_string();

    assert_eq!(printed, reprinted);
    assert!(printed.contains("for [var i = 0; i < 3; i += 1]"));
    assert!(printed.contains("print(\"no\\n\");"));

    Ok(())
}

#[test]
fn test_recovery_reports_every_statement() {
    let input = "var a = ;\nvar b = 2;\nprint(b)\nvar c = 3;";

    let parsed = recover(input);

    assert_eq!(parsed.errors.len(), 2);

    assert!(matches!(
        parsed.errors[0].error,
        ParseErrorType::ExpectedExpression { .. }
    ));
    assert_eq!(parsed.errors[0].position, Position { line: 1, column: 9 });

    assert_eq!(parsed.errors[1].error, ParseErrorType::MissingSemicolon);
    assert_eq!(parsed.errors[1].position.line, 3);

    // `var b` and `var c` survive
    assert_eq!(parsed.program.statements.len(), 2);
}

#[test]
fn test_recovery_inside_blocks() {
    let parsed = recover("func f() { var = 1; print(1); }\nprint(2);");

    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].error, ParseErrorType::ExpectedIdent);

    assert_eq!(parsed.program.statements.len(), 2);
    assert!(matches!(
        parsed.program.statements[0],
        Statement::Function(ref func) if func.body.statements.len() == 1
    ));
}

#[test]
fn test_lexical_errors_are_collected() {
    let parsed = recover("var a = 1 @ ;\nvar b = \"open");

    let lexical = parsed.errors.iter()
        .filter(|error| matches!(error.error, ParseErrorType::LexError { .. }))
        .collect::<Vec<_>>();

    assert_eq!(lexical.len(), 2);
    assert!(matches!(
        lexical[0].error,
        ParseErrorType::LexError { ref error } if error.error == LexicalErrorType::UnrecognizedToken { tok: '@' }
    ));
    assert_eq!(lexical[1].position.line, 2);
}

#[test]
fn test_invalid_targets() {
    let cases = [
        ("1 = 2;", ParseErrorType::InvalidAssignmentTarget),
        ("a.b = 1;", ParseErrorType::InvalidAssignmentTarget),
        ("f() += 1;", ParseErrorType::InvalidAssignmentTarget),
        ("++1;", ParseErrorType::InvalidIncrementTarget),
        ("--a.b;", ParseErrorType::InvalidIncrementTarget),
    ];

    for (src, expected) in cases {
        let parsed = recover(src);

        assert_eq!(parsed.errors.len(), 1, "while parsing `{src}`");
        assert_eq!(parsed.errors[0].error, expected, "while parsing `{src}`");
    }
}

#[test]
fn test_declaration_errors() {
    let parsed = recover("const a;");
    assert_eq!(
        parsed.errors[0].error,
        ParseErrorType::MissingInitializer { name: "a".to_string() }
    );

    let parsed = recover("func f(a, b, a) { }");
    assert_eq!(
        parsed.errors[0].error,
        ParseErrorType::DuplicateParameter { name: "a".to_string() }
    );

    let parsed = recover("try { pass; }");
    assert_eq!(parsed.errors[0].error, ParseErrorType::MissingCatchOrFinally);

    let parsed = recover("var m = {1: 2};");
    assert_eq!(parsed.errors[0].error, ParseErrorType::InvalidMapKey);

    let parsed = recover("print(a.);");
    assert_eq!(parsed.errors[0].error, ParseErrorType::ExpectedMember);

    let parsed = recover("print(1");
    assert_eq!(parsed.errors[0].error, ParseErrorType::UnexpectedEof);
}

#[test]
fn test_comments_are_kept_aside() -> Result<(), Vec<ParseError>> {
    let parsed = parse_module("// one\nvar a = 1; /* two */ print(a);")?;

    assert_eq!(parsed.comments.len(), 2);
    assert_eq!(parsed.program.statements.len(), 2);

    Ok(())
}

#[test]
fn test_statement_parse_trait() -> Result<(), ParseError> {
    let mut parser = Parser::new(lex("return 1 + 2;"));

    let statement = Statement::parse(&mut parser, None)?;

    assert_eq!(statement.to_string(), "return 1 + 2;");
    assert!(statement.is_jump());
    assert!(parser.is_at_end());

    Ok(())
}
