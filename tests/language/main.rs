//! Integration tests for Layer 1: Language
//!
//! Tests for the lexer, parser, AST compiler, and reversible command VM.

mod compiler;
mod lexer;
mod parser;
mod vm;
