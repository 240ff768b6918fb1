use std::fmt::{self, Write};

use crate::ast::*;

const INDENT_WIDTH: usize = 2;

fn sp(w: &mut impl Write, i: usize) -> fmt::Result {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

pub fn print_program(w: &mut impl Write, program: &Program) -> fmt::Result {
    print_stmts(w, 0, &program.statements)
}

fn print_stmts(w: &mut impl Write, i: usize, stmts: &[Stmt]) -> fmt::Result {
    for stmt in stmts {
        print_stmt(w, i, stmt)?;
    }
    Ok(())
}

pub fn print_stmt(w: &mut impl Write, i: usize, stmt: &Stmt) -> fmt::Result {
    sp(w, i)?;
    match stmt {
        Stmt::Print { args } => {
            writeln!(w, "print")?;
            for arg in args {
                print_expr(w, i + 1, arg)?;
            }
        }
        Stmt::Assignment { name, value } => {
            writeln!(w, "assign {name}")?;
            print_expr(w, i + 1, value)?;
        }
        Stmt::If {
            condition,
            body,
            else_body,
        } => {
            writeln!(w, "if")?;
            print_expr(w, i + 1, condition)?;
            sp(w, i + 1)?;
            writeln!(w, "then")?;
            print_stmts(w, i + 2, body)?;
            if let Some(else_body) = else_body {
                sp(w, i + 1)?;
                writeln!(w, "else")?;
                print_stmts(w, i + 2, else_body)?;
            }
        }
        Stmt::For {
            variable,
            iterable,
            body,
        } => {
            writeln!(w, "for {variable}")?;
            print_expr(w, i + 1, iterable)?;
            sp(w, i + 1)?;
            writeln!(w, "do")?;
            print_stmts(w, i + 2, body)?;
        }
        Stmt::Expr(expr) => {
            writeln!(w, "expr")?;
            print_expr(w, i + 1, expr)?;
        }
    }
    Ok(())
}

pub fn print_expr(w: &mut impl Write, i: usize, expr: &Expr) -> fmt::Result {
    sp(w, i)?;
    match expr {
        Expr::Identifier(name) => writeln!(w, "ident {name}")?,
        Expr::String(val) => writeln!(w, "string {val:?}")?,
        Expr::Number(val) => writeln!(w, "number {val}")?,
        Expr::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op}")?;
            print_expr(w, i + 1, lhs)?;
            print_expr(w, i + 1, rhs)?;
        }
        Expr::Range { end } => {
            writeln!(w, "range")?;
            print_expr(w, i + 1, end)?;
        }
    }
    Ok(())
}

/// Renders the program as an indented tree, one node per line.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_program(f, self)
    }
}

/// Renders the expression as an indented tree, one node per line.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_expr(f, 0, self)
    }
}
