use crate::{
    ast::{BinaryOperator, Expr, Program, Stmt},
    token::{Position, Spanned, Token, TokenKind},
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Parses a whole program.
///
/// The token stream must be terminated by a [`TokenKind::Eof`] token, as
/// produced by [`crate::lexer::lex`]. Parsing stops at the first error.
pub fn parse_program(tokens: &[Token]) -> Result<Program> {
    let program = Parser::new(tokens).parse_program()?;
    log::trace!("parsed {} top-level statements", program.statements.len());
    Ok(program)
}

/// Parses a single expression, which must span the whole token stream
/// (trailing line breaks aside).
pub fn parse_expr(tokens: &[Token]) -> Result<Expr> {
    let mut p = Parser::new(tokens);
    let expr = p.parse_expr()?;
    p.skip_line_breaks();
    p.consume(TokenKind::Eof)?;
    Ok(expr)
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("expected token {expected:?}, but got {actual:?}")]
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    #[error("unexpected token {token:?} in expression")]
    UnexpectedTokenInExpr { token: TokenKind },
    #[error("expected expression after '{context}', but got {actual:?}")]
    ExpectedExpression {
        context: &'static str,
        actual: TokenKind,
    },
    #[error("expected an indented block")]
    ExpectedIndentedBlock,
}

struct Parser<'tok> {
    tokens: &'tok [Token],
    cursor: usize,
}

impl Parser<'_> {
    fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::with_capacity(16);
        loop {
            self.skip_line_breaks();
            if self.is(TokenKind::Eof) {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        match self.peek().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            _ => {
                let stmt = self.parse_simple_statement()?;
                self.end_statement()?;
                Ok(stmt)
            }
        }
    }

    /// Parses a statement that fits on a single line.
    fn parse_simple_statement(&mut self) -> Result<Stmt> {
        match self.peek().kind {
            TokenKind::Print => self.parse_print(),
            TokenKind::Identifier if self.peek_next().kind == TokenKind::Assign => {
                self.parse_assignment()
            }
            _ => self.parse_expr().map(Stmt::Expr),
        }
    }

    fn parse_print(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::Print)?;
        let mut args = Vec::new();
        if !self.at_line_end() {
            args.push(self.parse_expr()?);
            while self.take(TokenKind::Comma) {
                args.push(self.parse_expr_after(",")?);
            }
        }
        Ok(Stmt::Print { args })
    }

    fn parse_assignment(&mut self) -> Result<Stmt> {
        let name = self.parse_ident()?;
        self.consume(TokenKind::Assign)?;
        let value = self.parse_expr_after("=")?;
        Ok(Stmt::Assignment { name, value })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let head = self.consume(TokenKind::If)?.pos;
        let condition = self.parse_expr_after("if")?;
        self.consume(TokenKind::Colon)?;
        let body = self.parse_block(head)?;

        // An `else` belongs to this `if` only if it is aligned with it.
        self.skip_line_breaks();
        let else_body = if self.is(TokenKind::Else) && self.peek().pos.column == head.column {
            let else_head = self.advance().pos;
            self.consume(TokenKind::Colon)?;
            Some(self.parse_block(else_head)?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            body,
            else_body,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let head = self.consume(TokenKind::For)?.pos;
        let variable = self.parse_ident()?;
        self.consume(TokenKind::In)?;
        let iterable = self.parse_expr_after("in")?;
        self.consume(TokenKind::Colon)?;
        let body = self.parse_block(head)?;
        Ok(Stmt::For {
            variable,
            iterable,
            body,
        })
    }

    /// Parses the body following the `:` of a block head positioned at `head`.
    ///
    /// Either a single simple statement on the same line, or a line break
    /// followed by every statement starting at or right of the column of the
    /// first one. That column must be right of the head.
    fn parse_block(&mut self, head: Position) -> Result<Vec<Stmt>> {
        if self.is(TokenKind::Eof) {
            return Err(self.peek().pos.wrap(Error::ExpectedIndentedBlock));
        }
        if !self.is(TokenKind::LineBreak) {
            let stmt = self.parse_simple_statement()?;
            self.end_statement()?;
            return Ok(vec![stmt]);
        }

        self.skip_line_breaks();
        let anchor = self.peek().pos.column;
        if self.is(TokenKind::Eof) || anchor <= head.column {
            return Err(self.peek().pos.wrap(Error::ExpectedIndentedBlock));
        }

        let mut body = Vec::with_capacity(4);
        loop {
            body.push(self.parse_statement()?);
            self.skip_line_breaks();
            if self.is(TokenKind::Eof) || self.peek().pos.column < anchor {
                break;
            }
        }
        log::trace!(
            "block at {head} holds {} statements (column {anchor})",
            body.len()
        );
        Ok(body)
    }

    fn parse_ident(&mut self) -> Result<Box<str>> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(token.text.clone())
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    /// Parses an expression that is required by the preceding `context`
    /// token, reporting a missing expression in terms of that token.
    fn parse_expr_after(&mut self, context: &'static str) -> Result<Expr> {
        self.parse_expr_bp_after(0, context)
    }

    fn parse_expr_bp_after(&mut self, min_bp: u8, context: &'static str) -> Result<Expr> {
        let c = self.peek();
        if !Self::starts_expr(c.kind) {
            return Err(c.pos.wrap(Error::ExpectedExpression {
                context,
                actual: c.kind,
            }));
        }
        self.parse_expr_bp(min_bp)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_primary()?;

        while let Some(op) = Self::binary_operator(self.peek().kind) {
            let (lbp, rbp) = Self::infix_binding_power(op);
            if lbp < min_bp {
                // Operator binds less tightly than the minimum required
                break;
            }

            self.advance(); // Operator
            let rhs = self.parse_expr_bp_after(rbp, op.as_str())?;
            lhs = Expr::binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    /// Parses the tokens that start an expression: literals, identifiers,
    /// the `range(...)` form and grouping.
    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        let expr = match token.kind {
            TokenKind::Number => Expr::Number(token.text.clone()),
            TokenKind::String => Expr::String(token.text.clone()),

            // Range: range ( expr )
            TokenKind::Identifier if &*token.text == "range" && self.is(TokenKind::LParen) => {
                self.advance();
                let end = self.parse_expr_after("(")?;
                self.consume(TokenKind::RParen)?;
                Expr::Range { end: Box::new(end) }
            }
            TokenKind::Identifier => Expr::Identifier(token.text.clone()),

            // Grouping: ( expr )
            TokenKind::LParen => {
                let expr = self.parse_expr_after("(")?;
                self.consume(TokenKind::RParen)?;
                expr
            }

            other => {
                return Err(token.pos.wrap(Error::UnexpectedTokenInExpr { token: other }));
            }
        };
        Ok(expr)
    }

    fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
        let op = match kind {
            TokenKind::EqEq => BinaryOperator::Eq,
            TokenKind::NotEq => BinaryOperator::Ne,
            TokenKind::Less => BinaryOperator::Lt,
            TokenKind::LessEq => BinaryOperator::Le,
            TokenKind::Greater => BinaryOperator::Gt,
            TokenKind::GreaterEq => BinaryOperator::Ge,
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::Percent => BinaryOperator::Rem,
            _ => return None,
        };
        Some(op)
    }

    // Every level is left-associative.
    fn infix_binding_power(op: BinaryOperator) -> (u8, u8) {
        match op {
            // Level 3: Comparisons
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Le
            | BinaryOperator::Gt
            | BinaryOperator::Ge => (1, 2),

            // Level 2: Addition/Subtraction
            BinaryOperator::Add | BinaryOperator::Sub => (3, 4),

            // Level 1: Multiplication/Division/Remainder
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Rem => (5, 6),
        }
    }

    fn starts_expr(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Number | TokenKind::String | TokenKind::Identifier | TokenKind::LParen
        )
    }
}

impl<'tok> Parser<'tok> {
    fn new(tokens: &'tok [Token]) -> Parser<'tok> {
        assert!(
            tokens.last().is_some_and(Token::is_eof),
            "token stream must end with Eof"
        );
        Parser { tokens, cursor: 0 }
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> &'tok Token {
        &self.tokens[self.cursor]
    }

    /// Returns the token after the current one. Stays on the final
    /// [`TokenKind::Eof`] token.
    fn peek_next(&self) -> &'tok Token {
        let next = (self.cursor + 1).min(self.tokens.len() - 1);
        &self.tokens[next]
    }

    /// Returns the current token and advances. Never moves past the final
    /// [`TokenKind::Eof`] token.
    fn advance(&mut self) -> &'tok Token {
        let c = self.peek();
        if !c.is_eof() {
            self.cursor += 1;
        }
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one, returning it.
    /// If not, returns an error.
    fn consume(&mut self, expect: TokenKind) -> Result<&'tok Token> {
        let c = self.peek();
        if self.is(expect) {
            Ok(self.advance())
        } else {
            Err(c.pos.wrap(Error::Unexpected {
                actual: c.kind,
                expected: expect,
            }))
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::LineBreak | TokenKind::Eof)
    }

    /// Requires the end of a simple statement: a line break (consumed) or the
    /// end of input.
    fn end_statement(&mut self) -> Result<()> {
        if self.is(TokenKind::Eof) {
            return Ok(());
        }
        self.consume(TokenKind::LineBreak).map(drop)
    }

    fn skip_line_breaks(&mut self) {
        while self.take(TokenKind::LineBreak) {}
    }
}


#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use parser;

        fn test_precedence_mul_over_add() {
            let expr = "5 + 3 * 2";
            let tree_ok = "
                binary +
                  number 5
                  binary *
                    number 3
                    number 2
            ";
        }

        fn test_precedence_parens() {
            let expr = "(5 + 3) * 2";
            let tree_ok = "
                binary *
                  binary +
                    number 5
                    number 3
                  number 2
            ";
        }

        fn test_left_associative_additive() {
            let expr = "10 - 4 - 3";
            let tree_ok = "
                binary -
                  binary -
                    number 10
                    number 4
                  number 3
            ";
        }

        fn test_left_associative_multiplicative() {
            let expr = "a / b % c * d";
            let tree_ok = "
                binary *
                  binary %
                    binary /
                      ident a
                      ident b
                    ident c
                  ident d
            ";
        }

        fn test_comparison_loosest() {
            let expr = "x + 1 >= y * 2";
            let tree_ok = "
                binary >=
                  binary +
                    ident x
                    number 1
                  binary *
                    ident y
                    number 2
            ";
        }

        fn test_comparison_chain_left_associative() {
            let expr = "a < b != c";
            let tree_ok = "
                binary !=
                  binary <
                    ident a
                    ident b
                  ident c
            ";
        }

        fn test_literals() {
            let expr = "'hi' + 1.2.3";
            let tree_ok = r#"
                binary +
                  string "hi"
                  number 1.2.3
            "#;
        }

        fn test_range_form() {
            let expr = "range(n + 1)";
            let tree_ok = "
                range
                  binary +
                    ident n
                    number 1
            ";
        }

        fn test_range_without_call_is_identifier() {
            let expr = "range + 1";
            let tree_ok = "
                binary +
                  ident range
                  number 1
            ";
        }

        fn test_print_statements() {
            let program = "
                print
                print 'a'
                print 'a', x, 1 + 2
            ";
            let tree_ok = r#"
                print
                print
                  string "a"
                print
                  string "a"
                  ident x
                  binary +
                    number 1
                    number 2
            "#;
        }

        fn test_assignment_and_expression_statement() {
            let program = "
                result = 5 + 3 * 2
                result
            ";
            let tree_ok = "
                assign result
                  binary +
                    number 5
                    binary *
                      number 3
                      number 2
                expr
                  ident result
            ";
        }

        fn test_if_block_keeps_every_statement() {
            let program = "
                if x > 1:
                    print 'big'
                    y = x * 2
                    print y
                print 'done'
            ";
            let tree_ok = r#"
                if
                  binary >
                    ident x
                    number 1
                  then
                    print
                      string "big"
                    assign y
                      binary *
                        ident x
                        number 2
                    print
                      ident y
                print
                  string "done"
            "#;
        }

        fn test_if_else() {
            let program = "
                if x == 1:
                    print 'one'

                    print 'still one'
                else:
                    print 'other'
            ";
            let tree_ok = r#"
                if
                  binary ==
                    ident x
                    number 1
                  then
                    print
                      string "one"
                    print
                      string "still one"
                  else
                    print
                      string "other"
            "#;
        }

        fn test_inline_bodies() {
            let program = "
                if x: print 1
                else: print 2
                for i in range(2): print i
            ";
            let tree_ok = "
                if
                  ident x
                  then
                    print
                      number 1
                  else
                    print
                      number 2
                for i
                  range
                    number 2
                  do
                    print
                      ident i
            ";
        }

        fn test_for_block() {
            let program = "
                for i in range(5):
                    total = total + i
                    print i, total
                print total
            ";
            let tree_ok = "
                for i
                  range
                    number 5
                  do
                    assign total
                      binary +
                        ident total
                        ident i
                    print
                      ident i
                      ident total
                print
                  ident total
            ";
        }

        fn test_nested_blocks_and_else_alignment() {
            let program = "
                for i in range(3):
                    if i == 0:
                        print 'zero'
                    else:
                        if i == 1:
                            print 'one'
                        print 'not zero'
                    print i
                print 'end'
            ";
            let tree_ok = r#"
                for i
                  range
                    number 3
                  do
                    if
                      binary ==
                        ident i
                        number 0
                      then
                        print
                          string "zero"
                      else
                        if
                          binary ==
                            ident i
                            number 1
                          then
                            print
                              string "one"
                        print
                          string "not zero"
                    print
                      ident i
                print
                  string "end"
            "#;
        }

        fn test_else_pairs_with_aligned_if() {
            let program = "
                if a:
                    if b:
                        print 1
                else:
                    print 2
            ";
            let tree_ok = "
                if
                  ident a
                  then
                    if
                      ident b
                      then
                        print
                          number 1
                  else
                    print
                      number 2
            ";
        }

        fn test_comments_and_blank_lines() {
            let program = "
                # leading comment

                x = 1 # trailing comment
                if x:
                    # comment inside block
                    print x

            ";
            let tree_ok = "
                assign x
                  number 1
                if
                  ident x
                  then
                    print
                      ident x
            ";
        }

        fn test_empty_program() {
            let program = "\n\n   \n";
            let tree_ok = "";
        }

        fn test_error_assignment_without_value() {
            let program = "x = ";
            let expected_errors = &["1:5: expected expression after '=', but got Eof"];
        }

        fn test_error_assignment_without_value_before_line_break() {
            let program = "x =\nprint x";
            let expected_errors = &["1:4: expected expression after '=', but got LineBreak"];
        }

        fn test_error_dangling_operator() {
            let expr = "1 +";
            let expected_errors = &["1:4: expected expression after '+', but got Eof"];
        }

        fn test_error_unexpected_token_in_expr() {
            let program = "print )";
            let expected_errors = &["1:7: unexpected token RParen in expression"];
        }

        fn test_error_missing_colon() {
            let program = "if x\n    print x";
            let expected_errors = &["1:5: expected token Colon, but got LineBreak"];
        }

        fn test_error_missing_rparen() {
            let expr = "(1 + 2";
            let expected_errors = &["1:7: expected token RParen, but got Eof"];
        }

        fn test_error_range_missing_rparen() {
            let program = "for i in range(5:\n    print i";
            let expected_errors = &["1:17: expected token RParen, but got Colon"];
        }

        fn test_error_for_without_variable() {
            let program = "for in range(3):\n    print 1";
            let expected_errors = &["1:5: expected token Identifier, but got In"];
        }

        fn test_error_for_without_in() {
            let program = "for i range(3):\n    print 1";
            let expected_errors = &["1:7: expected token In, but got Identifier"];
        }

        fn test_error_missing_indented_block() {
            let program = "if x:\nprint x";
            let expected_errors = &["2:1: expected an indented block"];
        }

        fn test_error_block_at_end_of_input() {
            let program = "for i in range(3):\n\n";
            let expected_errors = &["3:1: expected an indented block"];
        }

        fn test_error_unaligned_else() {
            let program = "if x:\n    print 1\n  else:\n    print 2";
            let expected_errors = &["3:3: unexpected token Else in expression"];
        }

        fn test_error_two_statements_on_one_line() {
            let program = "print 1 print 2";
            let expected_errors = &["1:9: expected token LineBreak, but got Print"];
        }

        fn test_error_lexer_unterminated_string() {
            let program = "print \"abc";
            let expected_errors = &["1:7: unterminated string"];
        }
    );

    mod direct {
        use crate::{
            ast::{BinaryOperator, Expr, Program, Stmt},
            lexer,
            parser::{self, test_utils::parse_program},
        };
        use pretty_assertions::assert_eq;

        #[test]
        fn test_parsing_is_deterministic() {
            let src = "x = 1\nfor i in range(x + 2):\n    print i, 'a' + i\n";
            assert_eq!(parse_program(src), parse_program(src));
        }

        #[test]
        fn test_precedence_structure() {
            let program = parse_program("result = 5 + 3 * 2");
            let expected = Program {
                statements: vec![Stmt::Assignment {
                    name: "result".into(),
                    value: Expr::binary(
                        BinaryOperator::Add,
                        Expr::Number("5".into()),
                        Expr::binary(
                            BinaryOperator::Mul,
                            Expr::Number("3".into()),
                            Expr::Number("2".into()),
                        ),
                    ),
                }],
            };
            assert_eq!(program, expected);
        }

        #[test]
        fn test_print_argument_counts() {
            let program = parse_program("print\nprint 1\nprint 1, 2, 3");
            let counts: Vec<_> = program
                .statements
                .iter()
                .map(|stmt| match stmt {
                    Stmt::Print { args } => args.len(),
                    other => panic!("unexpected statement {other:?}"),
                })
                .collect();
            assert_eq!(counts, [0, 1, 3]);
        }

        #[test]
        fn test_parse_expr_rejects_trailing_tokens() {
            let tokens = lexer::tokenize("1 2").unwrap();
            let error = parser::parse_expr(&tokens).unwrap_err();
            assert_eq!(error.to_string(), "1:3: expected token Eof, but got Number");
        }
    }
}
