use std::fmt::{self, Write};

use crate::{
    ast::{BinaryOperator, Expr, Program, Stmt},
    codegen::{
        go_env,
        scope::{Binding, Scopes},
    },
};

const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

/// Walks a [`Program`], emitting the body of the Go entry point.
pub struct Generator {
    code: String,
    depth: usize,
    scopes: Scopes,
    uses_fmt: bool,
}

impl Generator {
    pub fn new() -> Generator {
        Generator {
            code: String::with_capacity(DEFAULT_CODE_CAPACITY),
            depth: 0,
            scopes: Scopes::default(),
            uses_fmt: false,
        }
    }

    pub fn generate(mut self, program: &Program) -> String {
        self.g_block(&program.statements);

        let mut out = String::with_capacity(self.code.len() + 128);
        out.push_str(go_env::PRELUDE);
        if !self.uses_fmt {
            out.push_str(go_env::FMT_SINK);
        }
        out.push_str(go_env::ENTRY_POINT);
        out.push('\n');
        out.push_str(&self.code);
        out.push_str("}\n");
        out
    }
}

impl Default for Generator {
    fn default() -> Self {
        Generator::new()
    }
}

/// Statements.
impl Generator {
    /// Emits a Go block body, one level deeper than the current one, with its
    /// own scope.
    fn g_block(&mut self, stmts: &[Stmt]) {
        self.indented(|this| {
            this.scopes.push();
            for stmt in stmts {
                this.g_stmt(stmt);
            }
            // Go rejects locals that are never read.
            for name in this.scopes.pop() {
                this.out(format_args!("_ = {name}"));
            }
        });
    }

    fn g_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Print { args } => self.g_print(args),
            Stmt::Assignment { name, value } => {
                let value = self.g_expr(value);
                match self.scopes.assign(name) {
                    Binding::Declare => self.out(format_args!("{name} := {value}")),
                    Binding::Reassign => self.out(format_args!("{name} = {value}")),
                }
            }
            Stmt::If {
                condition,
                body,
                else_body,
            } => {
                let condition = self.g_expr(condition);
                self.out(format_args!("if {condition} {{"));
                self.g_block(body);
                if let Some(else_body) = else_body {
                    self.out("} else {");
                    self.g_block(else_body);
                }
                self.out("}");
            }
            Stmt::For {
                variable,
                iterable,
                body,
            } => self.g_for(variable, iterable, body),
            // Go accepts no bare value expressions as statements.
            Stmt::Expr(expr) => {
                let expr = self.g_expr(expr);
                self.out(format_args!("_ = {expr}"));
            }
        }
    }

    fn g_print(&mut self, args: &[Expr]) {
        self.uses_fmt = true;
        let mut call = format!("{}(", go_env::PRINT);
        for (idx, arg) in args.iter().enumerate() {
            if idx > 0 {
                call.push_str(", ");
            }
            let arg = self.g_expr(arg);
            call.push_str(&arg);
        }
        call.push(')');
        self.out(call);
    }

    fn g_for(&mut self, variable: &str, iterable: &Expr, body: &[Stmt]) {
        let Expr::Range { end } = iterable else {
            self.out(format_args!(
                "// unsupported iteration over {}",
                iterable.shape()
            ));
            return;
        };

        let end = self.g_expr(end);
        self.out(format_args!(
            "for {variable} := 0; {variable} < {end}; {variable}++ {{"
        ));
        // The loop variable lives in a scope enclosing the body, and the loop
        // condition already reads it.
        self.scopes.push();
        self.scopes.declare(variable, true);
        self.g_block(body);
        self.scopes.pop();
        self.out("}");
    }
}

/// Expressions.
impl Generator {
    fn g_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Identifier(name) => {
                self.scopes.mark_used(name);
                name.to_string()
            }
            Expr::String(raw) => go_env::string_literal(raw),
            Expr::Number(text) => text.to_string(),
            Expr::Binary { op, lhs, rhs } => {
                let concat = *op == BinaryOperator::Add
                    && (Self::is_string_expr(lhs) || Self::is_string_expr(rhs));
                let lhs = self.g_expr(lhs);
                let rhs = self.g_expr(rhs);
                if concat {
                    // Go's `+` neither converts nor concatenates mixed
                    // operands.
                    self.uses_fmt = true;
                    format!("{}, {lhs}, {rhs})", go_env::CONCAT)
                } else {
                    format!("({lhs} {op} {rhs})")
                }
            }
            // Only meaningful as a `for` iterable; elsewhere it stands for its
            // bound.
            Expr::Range { end } => self.g_expr(end),
        }
    }

    /// Whether `expr` is syntactically a string: a string literal, or a `+`
    /// that is itself rewritten as a concatenation.
    fn is_string_expr(expr: &Expr) -> bool {
        match expr {
            Expr::String(_) => true,
            Expr::Binary {
                op: BinaryOperator::Add,
                lhs,
                rhs,
            } => Self::is_string_expr(lhs) || Self::is_string_expr(rhs),
            _ => false,
        }
    }
}

/// Utility functions.
impl Generator {
    /// Writes a line at the current depth.
    fn out(&mut self, line: impl fmt::Display) {
        for _ in 0..self.depth {
            self.code.push_str(go_env::INDENT);
        }
        writeln!(self.code, "{line}").expect("code emit should be infallible");
    }

    /// Writes in a block one level deeper.
    fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }
}
