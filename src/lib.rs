//! A compiler from klo, a small indentation-sensitive scripting language, to
//! Go source code.
//!
//! The pipeline is strictly linear: [`lexer`] → [`parser`] → [`codegen`].
//! Each stage consumes the previous one's output and the first lexical or
//! syntactic error stops the compilation.

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The code generator walks the AST, emitting a Go program.
pub mod codegen;

pub mod ast;
pub mod error;
pub mod token;

pub mod util {
    pub mod fmt;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

pub use error::Error;

/// Lexes and parses `src`.
pub fn parse(src: &str) -> Result<ast::Program, Error> {
    let tokens = lexer::tokenize(src)?;
    log::debug!("lexed {} tokens", tokens.len());
    let program = parser::parse_program(&tokens)?;
    log::debug!("parsed {} top-level statements", program.statements.len());
    Ok(program)
}

/// Compiles klo source into the text of a Go program.
pub fn compile(src: &str) -> Result<String, Error> {
    let program = parse(src)?;
    let code = codegen::generate(&program);
    log::debug!("generated {} bytes of Go", code.len());
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile() {
        let code = compile(indoc! {"
            x = 42
            print x
        "})
        .unwrap();
        assert_eq!(
            code,
            indoc! {"
                package main

                import (
                \t\"fmt\"
                )

                func main() {
                \tx := 42
                \tfmt.Println(x)
                }
            "}
        );
    }

    #[test]
    fn test_compile_stops_at_lex_error() {
        let error = compile("print \"abc").unwrap_err();
        assert!(matches!(error, Error::Lex(_)));
        assert_eq!(error.to_string(), "lex error at 1:7: unterminated string");
        assert_eq!(error.position(), token::Position::new(1, 7));
    }

    #[test]
    fn test_compile_stops_at_parse_error() {
        let error = compile("x = 1\ny = ").unwrap_err();
        assert!(matches!(error, Error::Parse(_)));
        assert_eq!(
            error.to_string(),
            "parse error at 2:5: expected expression after '=', but got Eof"
        );
    }

    #[test]
    fn test_compile_fixture() {
        let code = compile(include_str!("../fixtures/big.klo")).unwrap();
        assert_eq!(code.matches("func main()").count(), 1);
        assert!(code.contains("\tfor i := 0; i < 3; i++ {\n"));
        assert!(code.contains("\tif (label0 == \"item 0\") {\n\t\tfmt.Println(label0)\n"));
        assert!(!code.contains(codegen::go_env::FMT_SINK));
    }
}
