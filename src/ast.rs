// program ::= (stmt LINE_BREAK*)*
// stmt ::= 'print' [expr (',' expr)*]
//        | 'if' expr ':' block ['else' ':' block]
//        | 'for' ID 'in' expr ':' block
//        | ID '=' expr
//        | expr
// block ::= LINE_BREAK (stmt LINE_BREAK)+     -- all at one indentation column
//         | stmt                              -- on the same line as ':'
// expr ::= expr ('==' | '!=' | '<' | '<=' | '>' | '>=') expr
//        | expr ('+' | '-') expr
//        | expr ('*' | '/' | '%') expr
//        | 'range' '(' expr ')'
//        | '(' expr ')'
//        | ID
//        | number
//        | string

// Precedence
//
// * / %
// + -
// == != < <= > >=

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Print {
        /// Possibly empty list of arguments.
        args: Vec<Expr>,
    },
    Assignment {
        name: Box<str>,
        value: Expr,
    },
    If {
        condition: Expr,
        /// Non empty list of statements.
        body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    For {
        variable: Box<str>,
        iterable: Expr,
        /// Non empty list of statements.
        body: Vec<Stmt>,
    },
    Expr(Expr),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Identifier(Box<str>),
    /// Raw text between the quotes, escapes left untouched.
    String(Box<str>),
    /// Unvalidated numeric text.
    Number(Box<str>),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `range(end)`, counting from zero up to (not including) `end`.
    Range { end: Box<Expr> },
}

impl Expr {
    pub fn binary(op: BinaryOperator, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// A short name for the shape of this expression.
    pub fn shape(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "identifier",
            Expr::String(_) => "string",
            Expr::Number(_) => "number",
            Expr::Binary { .. } => "binary expression",
            Expr::Range { .. } => "range",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOperator {
    /// The operator as written in source, which is also how the host language
    /// spells it.
    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
