use placeholder_parser::ast::Expr;
use placeholder_parser::lexer::{tokenize, Number, Token};
use placeholder_parser::parse;
use proptest::prelude::*;

proptest! {
    /// The parser returns `Ok` or `Err` on arbitrary input but never panics.
    #[test]
    fn parser_does_not_panic(s in "\\PC*") {
        let _ = parse(&s.as_str().into());
    }

    /// Exactly one end of input token, always last.
    #[test]
    fn single_trailing_eof(s in "[0-9a-z_+*/%<>=!(), '\"-]*") {
        if let Ok(lexemes) = tokenize(&s.as_str().into()) {
            let eofs = lexemes.iter().filter(|lexeme| lexeme.token == Token::Eof).count();
            prop_assert_eq!(eofs, 1);
            prop_assert_eq!(&lexemes.last().unwrap().token, &Token::Eof);
        }
    }

    #[test]
    fn integer_literal_round_trip(n in 0..i64::MAX) {
        let source = n.to_string();
        prop_assert_eq!(parse(&source.as_str().into()), Ok(Expr::NumberLit(Number::Int(n))));
    }

    #[test]
    fn string_literal_round_trip(s in "[^'\\\\]*") {
        let source = format!("'{}'", s);
        prop_assert_eq!(parse(&source.as_str().into()), Ok(Expr::StringLit(s)));
    }

    /// Every failure points inside the input (or at its very end).
    #[test]
    fn error_position_in_bounds(s in "\\PC{0,40}") {
        if let Err(err) = parse(&s.as_str().into()) {
            prop_assert!(err.span.start <= s.len());
        }
    }
}
