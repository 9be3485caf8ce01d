pub mod assemble;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod symbol;
pub mod token;

pub use assemble::assemble;
pub use error::Error;
pub use parser::Parser;
pub use scanner::Scanner;

use arch::obj::ObjectFile;

/// Scan, parse and assemble one source file.
pub fn assemble_source(file: &str, src: &str) -> Result<ObjectFile, Error> {
    let toks = Scanner::new(file, src).scan()?;
    let stmts = Parser::new(toks).parse()?;
    assemble(&stmts)
}
