use std::collections::HashMap;
use std::fmt;

use arch::{Cond, Op, Reg};
use once_cell::sync::Lazy;

/// Source position carried by every token and reported in diagnostics
/// as `file:line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    pub file: String,
    pub line: usize,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Eol,

    Num,
    Sym,
    Str,
    Char,

    Colon,
    Comma,
    Dot,

    Dir(Dir),
    /// A non-branch mnemonic.
    Mn(Op),
    /// A branch mnemonic, any alias.
    Br(Cond),
    Reg(Reg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Dir {
    Global,
    Extern,
    Byte,
    Word,
    Ascii,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lex: String,
    /// Filled for number and character tokens.
    pub value: u16,
    pub pos: Pos,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Eof => write!(f, "<end of file>"),
            TokenKind::Eol => write!(f, "<line feed>"),
            TokenKind::Num => write!(f, "number"),
            TokenKind::Sym => write!(f, "symbol"),
            TokenKind::Str => write!(f, "string"),
            TokenKind::Char => write!(f, "character"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Dir(d) => write!(f, "{d}"),
            TokenKind::Mn(op) => write!(f, "{op}"),
            TokenKind::Br(c) => write!(f, "{c}"),
            TokenKind::Reg(_) => write!(f, "register"),
        }
    }
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("global", TokenKind::Dir(Dir::Global));
    m.insert("extern", TokenKind::Dir(Dir::Extern));
    m.insert("byte", TokenKind::Dir(Dir::Byte));
    m.insert("word", TokenKind::Dir(Dir::Word));
    m.insert("ascii", TokenKind::Dir(Dir::Ascii));
    m.insert("skip", TokenKind::Dir(Dir::Skip));

    m.insert("halt", TokenKind::Mn(Op::Halt));
    m.insert("mov", TokenKind::Mn(Op::Mov));
    m.insert("movb", TokenKind::Mn(Op::Movb));
    m.insert("movi", TokenKind::Mn(Op::Movi));
    m.insert("movze", TokenKind::Mn(Op::Movze));
    m.insert("movse", TokenKind::Mn(Op::Movse));
    m.insert("wr", TokenKind::Mn(Op::Wr));
    m.insert("wrb", TokenKind::Mn(Op::Wrb));
    m.insert("rd", TokenKind::Mn(Op::Rd));
    m.insert("rdb", TokenKind::Mn(Op::Rdb));
    m.insert("add", TokenKind::Mn(Op::Add));
    m.insert("addb", TokenKind::Mn(Op::Addb));
    m.insert("sub", TokenKind::Mn(Op::Sub));
    m.insert("subb", TokenKind::Mn(Op::Subb));
    m.insert("cmp", TokenKind::Mn(Op::Cmp));
    m.insert("cmpb", TokenKind::Mn(Op::Cmpb));
    m.insert("push", TokenKind::Mn(Op::Push));
    m.insert("pop", TokenKind::Mn(Op::Pop));
    m.insert("call", TokenKind::Mn(Op::Call));
    m.insert("ret", TokenKind::Mn(Op::Ret));
    m.insert("syscall", TokenKind::Mn(Op::Syscall));

    m.insert("jmp", TokenKind::Br(Cond::Always));
    m.insert("jz", TokenKind::Br(Cond::Z));
    m.insert("je", TokenKind::Br(Cond::Z));
    m.insert("jnz", TokenKind::Br(Cond::Nz));
    m.insert("jne", TokenKind::Br(Cond::Nz));
    m.insert("jc", TokenKind::Br(Cond::C));
    m.insert("jb", TokenKind::Br(Cond::C));
    m.insert("jnc", TokenKind::Br(Cond::Nc));
    m.insert("jae", TokenKind::Br(Cond::Nc));
    m.insert("js", TokenKind::Br(Cond::S));
    m.insert("jns", TokenKind::Br(Cond::Ns));
    m.insert("jo", TokenKind::Br(Cond::O));
    m.insert("jno", TokenKind::Br(Cond::No));
    m.insert("jbe", TokenKind::Br(Cond::Be));
    m.insert("ja", TokenKind::Br(Cond::A));
    m.insert("jl", TokenKind::Br(Cond::L));
    m.insert("jge", TokenKind::Br(Cond::Ge));
    m.insert("jle", TokenKind::Br(Cond::Le));
    m.insert("jg", TokenKind::Br(Cond::G));

    m.insert("r0", TokenKind::Reg(Reg::R0));
    m.insert("r1", TokenKind::Reg(Reg::R1));
    m.insert("r2", TokenKind::Reg(Reg::R2));
    m.insert("r3", TokenKind::Reg(Reg::R3));
    m.insert("r4", TokenKind::Reg(Reg::R4));
    m.insert("r5", TokenKind::Reg(Reg::R5));
    m.insert("r6", TokenKind::Reg(Reg::R6));
    m.insert("r7", TokenKind::Reg(Reg::R7));
    m.insert("r8", TokenKind::Reg(Reg::R8));
    m.insert("r9", TokenKind::Reg(Reg::R9));
    m.insert("r10", TokenKind::Reg(Reg::R10));
    m.insert("r11", TokenKind::Reg(Reg::R11));
    m.insert("r12", TokenKind::Reg(Reg::R12));
    m.insert("r13", TokenKind::Reg(Reg::R13));
    m.insert("rsp", TokenKind::Reg(Reg::Rsp));
    m.insert("rbp", TokenKind::Reg(Reg::Rbp));

    m
});

/// Classifies an identifier lexeme: a keyword kind, or `Sym`.
pub fn lookup_keyword(lex: &str) -> TokenKind {
    KEYWORDS.get(lex).copied().unwrap_or(TokenKind::Sym)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(lookup_keyword("halt"), TokenKind::Mn(Op::Halt));
        assert_eq!(lookup_keyword("je"), TokenKind::Br(Cond::Z));
        assert_eq!(lookup_keyword("jz"), TokenKind::Br(Cond::Z));
        assert_eq!(lookup_keyword("rsp"), TokenKind::Reg(Reg::Rsp));
        assert_eq!(lookup_keyword("ascii"), TokenKind::Dir(Dir::Ascii));
        assert_eq!(lookup_keyword("main"), TokenKind::Sym);
        assert_eq!(lookup_keyword("Halt"), TokenKind::Sym);
    }
}
