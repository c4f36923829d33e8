pub mod lexer;
pub mod token;

pub use lexer::{Scanner, scan_all};

/// Start a lazy scan of `source`. Each call begins from the first byte.
pub fn scan(source: &str) -> Scanner<'_> {
    Scanner::new(source)
}
