use arch::obj::{ObjectFile, Reloc};
use arch::Inst;

use crate::error::Error;
use crate::parser::{Asm, Imm, Stmt};
use crate::symbol::SymTab;
use crate::token::{Dir, Token};

/// Runs both passes over the statement stream and produces the object
/// file: symbol layout first, then emission with relocations.
pub fn assemble(stmts: &[Stmt]) -> Result<ObjectFile, Error> {
    let syms = layout(stmts)?;
    emit(stmts, &syms)
}

/// Pass one: walk the statements with a running address, defining and
/// declaring symbols. Instructions and data directives only contribute
/// their size.
fn layout(stmts: &[Stmt]) -> Result<SymTab, Error> {
    let mut syms = SymTab::new();
    let mut addr: u64 = 0;

    for stmt in stmts {
        match stmt {
            Stmt::Label(tok) => {
                let at = u16::try_from(addr).map_err(|_| Error::CodeTooLarge)?;
                syms.define(&tok.lex, at, &tok.pos)?;
            }
            Stmt::Directive(Dir::Global, arg) => syms.declare_global(&arg.lex, &arg.pos)?,
            Stmt::Directive(Dir::Extern, arg) => syms.declare_extern(&arg.lex, &arg.pos)?,
            _ => addr += u64::from(stmt.size()),
        }
    }

    if addr > u64::from(u16::MAX) {
        return Err(Error::CodeTooLarge);
    }
    syms.check_resolved()?;
    Ok(syms)
}

/// Pass two: emit the code buffer in source order. Symbol references
/// encode a zero placeholder and a relocation pointing at it; the
/// 16-bit field is always the last two bytes of its instruction.
fn emit(stmts: &[Stmt], syms: &SymTab) -> Result<ObjectFile, Error> {
    let mut code: Vec<u8> = Vec::new();
    let mut relocs: Vec<Reloc> = Vec::new();

    for stmt in stmts {
        match stmt {
            Stmt::Label(_) => {}

            Stmt::Directive(dir, arg) => match dir {
                Dir::Global | Dir::Extern => {}
                Dir::Byte => code.push(arg.value as u8),
                Dir::Word => code.extend_from_slice(&arg.value.to_le_bytes()),
                Dir::Ascii => code.extend_from_slice(arg.lex.as_bytes()),
                Dir::Skip => code.extend(std::iter::repeat(0).take(usize::from(arg.value))),
            },

            Stmt::Inst(asm) => {
                let inst = lower(asm, syms, &code, &mut relocs)?;
                inst.encode(&mut code);
            }
        }
    }

    Ok(ObjectFile {
        code,
        symbols: syms.to_symbols(),
        relocs,
    })
}

/// Resolves one parsed instruction into an encodable one. A symbolic
/// immediate or target becomes a zero placeholder plus a relocation.
fn lower(asm: &Asm, syms: &SymTab, code: &[u8], relocs: &mut Vec<Reloc>) -> Result<Inst, Error> {
    // The relocated field sits in the last two bytes of the encoding.
    let mut reloc = |tok: &Token, size: u16| -> Result<u16, Error> {
        let symidx = syms.index_of(&tok.lex).ok_or_else(|| Error::Undefined {
            pos: tok.pos.clone(),
            name: tok.lex.clone(),
        })?;
        let loc = code.len() as u16 + size - 2;
        relocs.push(Reloc { loc, symidx });
        Ok(0)
    };

    Ok(match asm {
        Asm::Halt => Inst::Halt,
        Asm::Ret => Inst::Ret,
        Asm::Syscall => Inst::Syscall,

        Asm::Mov(src, dst) => Inst::Mov(*src, *dst),
        Asm::Movb(src, dst) => Inst::Movb(*src, *dst),
        Asm::Movze(src, dst) => Inst::Movze(*src, *dst),
        Asm::Movse(src, dst) => Inst::Movse(*src, *dst),
        Asm::Wr(src, dst) => Inst::Wr(*src, *dst),
        Asm::Wrb(src, dst) => Inst::Wrb(*src, *dst),
        Asm::Rd(src, dst) => Inst::Rd(*src, *dst),
        Asm::Rdb(src, dst) => Inst::Rdb(*src, *dst),
        Asm::Add(src, dst) => Inst::Add(*src, *dst),
        Asm::Addb(src, dst) => Inst::Addb(*src, *dst),
        Asm::Sub(src, dst) => Inst::Sub(*src, *dst),
        Asm::Subb(src, dst) => Inst::Subb(*src, *dst),
        Asm::Cmp(src, dst) => Inst::Cmp(*src, *dst),
        Asm::Cmpb(src, dst) => Inst::Cmpb(*src, *dst),

        Asm::Movi(imm, dst) => match imm {
            Imm::Literal(v) => Inst::Movi(*v, *dst),
            Imm::Symbol(tok) => Inst::Movi(reloc(tok, asm.size())?, *dst),
        },

        Asm::J(cond, tok) => Inst::J(*cond, reloc(tok, asm.size())?),
        Asm::Call(tok) => Inst::Call(reloc(tok, asm.size())?),

        Asm::Push(r) => Inst::Push(*r),
        Asm::Pop(r) => Inst::Pop(*r),
    })
}
