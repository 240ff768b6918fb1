//! Go source generation.
//!
//! The whole program becomes the body of a single `main` function in package
//! `main`. Generation cannot fail: shapes the Go backend has no translation
//! for are emitted as comments in the output.

use crate::ast::Program;

pub mod go;
pub mod go_env;
mod scope;


pub use go::Generator;

/// Generates a complete Go program from `program`.
pub fn generate(program: &Program) -> String {
    Generator::new().generate(program)
}
