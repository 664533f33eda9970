//! Translation of search parameters into engine requests

mod compiler;

pub use compiler::QueryCompiler;
