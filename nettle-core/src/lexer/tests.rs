use super::prelude::{lex, LexicalError, LexicalErrorType, Token};
use crate::utils::prelude::Position;

fn tokens(input: &str) -> Result<Vec<Token>, LexicalError> {
    lex(input)
        .filter(|res| !matches!(res, Ok(spanned) if spanned.token == Token::Comment))
        .map(|res| res.map(|spanned| spanned.token))
        .collect()
}

#[test]
fn test_numbers() -> std::result::Result<(), LexicalError> {
    let input = r#"
        10
        0
        1.5
        10e5
        10.4E5
        2e-2
        0x1A
        0o17
        0b101
        1.foo
    "#;

    let expected = vec![
        Token::Int(10),
        Token::Int(0),
        Token::Float(1.5),
        Token::Float(1000000.0),
        Token::Float(1040000.0),
        Token::Float(0.02),
        Token::Int(26),
        Token::Int(15),
        Token::Int(5),
        Token::Int(1),
        Token::Dot,
        Token::Ident("foo".to_string()),
        Token::Eof,
    ];

    assert_eq!(tokens(input)?, expected);

    Ok(())
}

#[test]
fn test_invalid_numbers() {
    let input = r#"
        1e
        1e+
        0x
        0b102
        99999999999999999999
    "#;

    let fails = vec![
        LexicalErrorType::MissingDigitsAfterExponent,
        LexicalErrorType::MissingDigitsAfterExponent,
        LexicalErrorType::MissingDigitsAfterRadix,
        LexicalErrorType::DigitOutOfRadix,
        LexicalErrorType::NumberOutOfRange,
    ];

    let mut lexer = lex(input);

    for (idx, fail) in fails.iter().enumerate() {
        let err = match lexer.next_token() {
            Err(err) => err,
            Ok(value) => {
                panic!("Stopped at {fail:?} ({idx}). Expected Err but got Ok({value:?})");
            }
        };

        assert_eq!(
            *fail, err.error,
            "Next error does not match expected error ({:?}, {:?}) at {}",
            fail, err.error, idx
        );
    }
}

#[test]
fn test_longest_operator_match() -> std::result::Result<(), LexicalError> {
    let input = ">>>= >>> >> > >= >>= = == === => ! != !== ** **= . .. ..= ++ += + -- -= - && & &= || | |= ^ ^= << <<= <= < ~ ? :";

    let expected = vec![
        Token::UnsignedShiftRightAssign,
        Token::UnsignedShiftRight,
        Token::ShiftRight,
        Token::GreaterThan,
        Token::GreaterThanOrEqual,
        Token::ShiftRightAssign,
        Token::Assign,
        Token::Equal,
        Token::StrictEqual,
        Token::FatArrow,
        Token::Bang,
        Token::NotEqual,
        Token::StrictNotEqual,
        Token::StarStar,
        Token::StarStarAssign,
        Token::Dot,
        Token::DotDot,
        Token::DotDotAssign,
        Token::PlusPlus,
        Token::PlusAssign,
        Token::Plus,
        Token::MinusMinus,
        Token::MinusAssign,
        Token::Minus,
        Token::AndAnd,
        Token::Ampersand,
        Token::AmpersandAssign,
        Token::OrOr,
        Token::Pipe,
        Token::PipeAssign,
        Token::Caret,
        Token::CaretAssign,
        Token::ShiftLeft,
        Token::ShiftLeftAssign,
        Token::LessThanOrEqual,
        Token::LessThan,
        Token::Tilde,
        Token::Question,
        Token::Colon,
        Token::Eof,
    ];

    assert_eq!(tokens(input)?, expected);

    // no whitespace: the scanner must still prefer the longest operator
    assert_eq!(
        tokens("a>>>=b")?,
        vec![
            Token::Ident("a".to_string()),
            Token::UnsignedShiftRightAssign,
            Token::Ident("b".to_string()),
            Token::Eof
        ]
    );

    Ok(())
}

#[test]
fn test_strings() -> std::result::Result<(), LexicalError> {
    let input = r#""line\nbreak" 'it\'s' "tab\there" "quote\"d" `raw \n`"#;

    let expected = vec![
        Token::String("line\nbreak".to_string()),
        Token::String("it's".to_string()),
        Token::String("tab\there".to_string()),
        Token::String("quote\"d".to_string()),
        Token::String("raw \\n".to_string()),
        Token::Eof,
    ];

    assert_eq!(tokens(input)?, expected);

    Ok(())
}

#[test]
fn test_unterminated_string_reports_once() {
    let results = lex("\"abc").collect::<Vec<_>>();

    let errors = results.iter()
        .filter_map(|res| res.as_ref().err())
        .collect::<Vec<_>>();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error, LexicalErrorType::UnterminatedString);
    assert_eq!(errors[0].position.line, 1);
    assert!(errors[0].to_string().contains("line 1"));

    assert!(matches!(results.last(), Some(Ok(spanned)) if spanned.token == Token::Eof));
}

#[test]
fn test_comments_and_positions() {
    let input = "// leading\nvar /* inline\nspans */ x = 1;\n/* never closed";

    let results = lex(input).collect::<Vec<_>>();

    let comments = results.iter()
        .filter(|res| matches!(res, Ok(spanned) if spanned.token == Token::Comment))
        .count();
    assert_eq!(comments, 2);

    let x = results.iter()
        .filter_map(|res| res.as_ref().ok())
        .find(|spanned| spanned.token == Token::Ident("x".to_string()))
        .expect("identifier x");
    assert_eq!(x.position, Position { line: 3, column: 10 });

    let err = results.iter()
        .find_map(|res| res.as_ref().err())
        .expect("unterminated comment");
    assert_eq!(err.error, LexicalErrorType::MissingCommentEnd);
    assert_eq!(err.position.line, 4);
}

#[test]
fn test_keywords_and_identifiers() -> std::result::Result<(), LexicalError> {
    let input = "net $total = input(); func var_1 lambda undefinedness";

    let expected = vec![
        Token::Net,
        Token::Ident("$total".to_string()),
        Token::Assign,
        Token::Input,
        Token::LParen,
        Token::RParen,
        Token::Semicolon,
        Token::Func,
        Token::Ident("var_1".to_string()),
        Token::Lambda,
        Token::Ident("undefinedness".to_string()),
        Token::Eof,
    ];

    assert_eq!(tokens(input)?, expected);

    Ok(())
}

#[test]
fn test_unrecognized_character_recovers() {
    let results = lex("a @ b").map(|res| res.map(|spanned| spanned.token)).collect::<Vec<_>>();

    assert_eq!(results.len(), 4);
    assert_eq!(results[0], Ok(Token::Ident("a".to_string())));
    assert!(matches!(
        results[1],
        Err(LexicalError { error: LexicalErrorType::UnrecognizedToken { tok: '@' }, .. })
    ));
    assert_eq!(results[2], Ok(Token::Ident("b".to_string())));
    assert_eq!(results[3], Ok(Token::Eof));
}
