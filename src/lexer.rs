use std::{iter::Peekable, str::Chars};

use crate::token::{Position, Spanned, Token, TokenKind, KEYWORDS};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 1_024;

/// Lexes the provided string, producing the tokens into the provided buffer.
///
/// Stops at the first lexical error. On success the buffer always ends with
/// a single [`TokenKind::Eof`] token.
pub fn lex(src: &str, tokens: &mut Vec<Token>) -> Result<(), Spanned<Error>> {
    Lexer::new(src, tokens).lex()
}

/// A convenience function that allocates a new buffer per lexed input and
/// returns it.
pub fn tokenize(src: &str) -> Result<Vec<Token>, Spanned<Error>> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    lex(src, &mut tokens)?;
    Ok(tokens)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
}

/// The klo lexer
struct Lexer<'src, 'tok> {
    src: &'src str,
    iter: Peekable<Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    line: u32,
    column: u32,
    current_pos: Position,
    tokens: &'tok mut Vec<Token>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted.
    fn lex(mut self) -> Result<(), Spanned<Error>> {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            // Trivia (spaces, tabs, comments) produce no token.
            let Some(kind) = self.scan_token_kind()? else {
                continue;
            };
            match kind {
                TokenKind::Eof => {
                    self.produce_with_text(kind, "");
                    break;
                }
                TokenKind::LineBreak => self.produce_with_text(kind, "\n"),
                TokenKind::String => {
                    // Strip the surrounding quotes.
                    let src = self.src;
                    let text = &src[self.current_lo + 1..self.cursor - 1];
                    self.produce_with_text(kind, text);
                }
                _ => self.produce(kind),
            }
        }
        log::trace!("lexed {} tokens", self.tokens.len());
        Ok(())
    }

    /// Tries to scan the current character.
    fn scan_token_kind(&mut self) -> Result<Option<TokenKind>, Spanned<Error>> {
        use TokenKind::*;
        let Some(current) = self.mark_advance() else {
            return Ok(Some(Eof));
        };
        let kind = match current {
            '\n' => LineBreak,
            '\r' => {
                if self.peek() == Some('\n') {
                    self.advance();
                } else {
                    self.new_line();
                }
                LineBreak
            }
            ' ' | '\t' => {
                while matches!(self.peek(), Some(' ' | '\t')) {
                    self.advance();
                }
                return Ok(None);
            }
            '#' => {
                while !matches!(self.peek(), Some('\n' | '\r') | None) {
                    self.advance();
                }
                return Ok(None);
            }
            '"' | '\'' => self.string(current)?,
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,
            '=' => self.advance_if('=', EqEq, Assign),
            '<' => self.advance_if('=', LessEq, Less),
            '>' => self.advance_if('=', GreaterEq, Greater),
            '!' => {
                if self.peek() == Some('=') {
                    self.advance_with(NotEq)
                } else {
                    return Err(self.error(Error::UnexpectedChar('!')));
                }
            }
            '(' => LParen,
            ')' => RParen,
            '[' => LBracket,
            ']' => RBracket,
            ',' => Comma,
            ':' => Colon,
            '.' => Dot,
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            c => return Err(self.error(Error::UnexpectedChar(c))),
        };
        Ok(Some(kind))
    }

    /// Lexes a string delimited by `quote`. A backslash escapes the following
    /// character, so an escaped quote does not close the literal. Escapes are
    /// kept verbatim in the token text.
    fn string(&mut self, quote: char) -> Result<TokenKind, Spanned<Error>> {
        loop {
            match self.advance() {
                None => return Err(self.error(Error::UnterminatedString)),
                Some('\\') => {
                    if self.advance().is_none() {
                        return Err(self.error(Error::UnterminatedString));
                    }
                }
                Some('\r') if self.peek() != Some('\n') => self.new_line(),
                Some(c) if c == quote => return Ok(TokenKind::String),
                Some(_) => (),
            }
        }
    }

    // Dots are accepted anywhere after the first digit; `1.2.3` is passed
    // through as written.
    fn number(&mut self) -> TokenKind {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.advance();
        }
        TokenKind::Number
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let valid_identifier_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';

        while self.peek().is_some_and(valid_identifier_suffix) {
            self.advance();
        }
        KEYWORDS
            .get(self.substr())
            .copied()
            .unwrap_or(TokenKind::Identifier)
    }
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            line: 1,
            column: 1,
            current_pos: Position::START,
            tokens,
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> Option<char> {
        self.current_lo = self.cursor;
        self.current_pos = self.pos();
        self.advance()
    }

    /// Returns the next char and advances the iterator, keeping track of
    /// the line and column.
    fn advance(&mut self) -> Option<char> {
        let c = self.iter.next()?;
        self.cursor += c.len_utf8();
        if c == '\n' {
            self.new_line();
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Advances and returns `then` if the next char is `expected`, otherwise
    /// returns `otherwise` without advancing.
    fn advance_if<T>(&mut self, expected: char, then: T, otherwise: T) -> T {
        if self.peek() == Some(expected) {
            self.advance_with(then)
        } else {
            otherwise
        }
    }

    /// Returns the next char without advancing the iterator.
    fn peek(&mut self) -> Option<char> {
        self.iter.peek().copied()
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        &self.src[self.current_lo..self.cursor]
    }

    /// Wraps an error at the start of the current mark.
    fn error(&self, error: Error) -> Spanned<Error> {
        self.current_pos.wrap(error)
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind) {
        let text = self.substr().to_owned();
        self.produce_with_text(kind, text);
    }

    fn produce_with_text(&mut self, kind: TokenKind, text: impl Into<Box<str>>) {
        self.tokens.push(Token::new(kind, text, self.current_pos));
    }
}
