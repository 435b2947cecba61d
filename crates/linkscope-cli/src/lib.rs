//! Command line driver for the linkscope backend.
//!
//! Reads a Links document plus the parser's JSON tree for it and prints
//! diagnostics or the answer to one navigation request.

pub mod args;
pub mod config;
pub mod driver;
pub mod reporter;
