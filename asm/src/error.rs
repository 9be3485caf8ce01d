use thiserror::Error;

use crate::token::Pos;

/// Everything that can stop an assembly. All variants are terminal: the
/// driver prints one diagnostic line and exits nonzero.
#[derive(Debug, Error)]
pub enum Error {
    // Lexical
    #[error("{pos}: unexpected character `{ch}`")]
    UnexpectedChar { pos: Pos, ch: char },

    #[error("{pos}: unterminated character literal")]
    UnterminatedChar { pos: Pos },

    #[error("{pos}: expected single character")]
    NotSingleChar { pos: Pos },

    #[error("{pos}: unterminated string literal")]
    UnterminatedStr { pos: Pos },

    #[error("{pos}: empty string literal")]
    EmptyStr { pos: Pos },

    #[error("{pos}: number out of range")]
    NumOutOfRange { pos: Pos },

    // Grammar
    #[error("{pos}: expected {want} but got {got}")]
    Expected { pos: Pos, want: String, got: String },

    // Semantic
    #[error("{pos}: symbol `{name}` already defined")]
    Redefined { pos: Pos, name: String },

    #[error("{pos}: redefinition of external symbol `{name}`")]
    RedefinedExtern { pos: Pos, name: String },

    #[error("{pos}: cannot redeclare `{name}` as external")]
    ExternRedecl { pos: Pos, name: String },

    #[error("{pos}: undefined symbol `{name}`")]
    Undefined { pos: Pos, name: String },

    #[error("code exceeds the 16-bit address space")]
    CodeTooLarge,

    #[error("too many symbols")]
    TooManySymbols,

    // IO
    #[error("failed to read {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("failed to write {0}")]
    FileWrite(String, #[source] std::io::Error),
}
