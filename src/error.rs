use crate::{lexer, parser, token::Spanned};

/// The first error that stopped a compilation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("lex error at {}: {}", .0.pos, .0.inner)]
    Lex(#[from] Spanned<lexer::Error>),
    #[error("parse error at {}: {}", .0.pos, .0.inner)]
    Parse(#[from] Spanned<parser::Error>),
}

impl Error {
    /// Line and column of the offending source text.
    pub fn position(&self) -> crate::token::Position {
        match self {
            Error::Lex(error) => error.pos,
            Error::Parse(error) => error.pos,
        }
    }
}
