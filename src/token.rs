use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal source text. For strings this is the raw content between the
    /// quotes; for the end marker it is empty.
    pub text: Box<str>,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<Box<str>>, pos: Position) -> Token {
        Token {
            kind,
            text: text.into(),
            pos,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {:?}, {})", self.kind, self.text, self.pos)
    }
}

/// A 1-based source location.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: u32, column: u32) -> Position {
        Position { line, column }
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { pos: self, inner }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({self})")
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Some value tagged with the position it originated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub pos: Position,
    pub inner: T,
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pos, self.inner)
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for Spanned<T> {}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    LineBreak,

    Identifier,
    String,
    Number,

    Print,
    If,
    Else,
    Def,
    For,
    In,
    While,
    Return,

    /// `=`
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(self, Print | If | Else | Def | For | In | While | Return)
    }
}

// `range` is deliberately absent: it lexes as an identifier and the parser
// recognizes the `range(...)` form by name.
pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "print" => TokenKind::Print,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "def" => TokenKind::Def,
    "for" => TokenKind::For,
    "in" => TokenKind::In,
    "while" => TokenKind::While,
    "return" => TokenKind::Return,
};
