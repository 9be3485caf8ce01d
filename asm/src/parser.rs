use arch::{Cond, Op, Reg};

use crate::error::Error;
use crate::token::{Dir, Token, TokenKind};

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone)]
pub enum Stmt {
    /// `name:` — binds the symbol to the current address.
    Label(Token),
    /// `.global x`, `.byte 7`, ... with exactly one argument token.
    Directive(Dir, Token),
    Inst(Asm),
}

impl Stmt {
    /// Bytes this statement contributes to the code segment.
    pub fn size(&self) -> u16 {
        match self {
            Stmt::Label(_) => 0,
            Stmt::Directive(dir, arg) => match dir {
                Dir::Global | Dir::Extern => 0,
                Dir::Byte => 1,
                Dir::Word => 2,
                Dir::Ascii => arg.lex.len() as u16,
                Dir::Skip => arg.value,
            },
            Stmt::Inst(asm) => asm.size(),
        }
    }
}

// ----------------------------------------------------------------------------
// Instruction

/// A parsed instruction. Register operands are already typed; immediate
/// and branch-target operands stay symbolic until emission.
#[derive(Debug, Clone)]
pub enum Asm {
    Halt,

    Mov(Reg, Reg),
    Movb(Reg, Reg),
    Movi(Imm, Reg),
    Movze(Reg, Reg),
    Movse(Reg, Reg),

    Wr(Reg, Reg),
    Wrb(Reg, Reg),
    Rd(Reg, Reg),
    Rdb(Reg, Reg),

    Add(Reg, Reg),
    Addb(Reg, Reg),
    Sub(Reg, Reg),
    Subb(Reg, Reg),

    Cmp(Reg, Reg),
    Cmpb(Reg, Reg),

    /// Branch to a symbol under a condition.
    J(Cond, Token),

    Push(Reg),
    Pop(Reg),

    Call(Token),
    Ret,

    Syscall,
}

impl Asm {
    /// Encoded size per the instruction-format table.
    pub fn size(&self) -> u16 {
        match self {
            Asm::Halt | Asm::Ret | Asm::Syscall => 1,
            Asm::Movi(..) | Asm::J(..) => 4,
            Asm::Call(_) => 3,
            _ => 2,
        }
    }
}

/// An immediate operand of `movi`: a literal value or a symbol whose
/// address the linker fills in.
#[derive(Debug, Clone)]
pub enum Imm {
    Literal(u16),
    Symbol(Token),
}

// ----------------------------------------------------------------------------
// Parser

pub struct Parser {
    toks: Vec<Token>,
    cur: usize,
}

impl Parser {
    pub fn new(toks: Vec<Token>) -> Parser {
        Parser { toks, cur: 0 }
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>, Error> {
        let mut stmts = Vec::with_capacity(512);

        while self.peek().kind != TokenKind::Eof {
            match self.peek().kind {
                TokenKind::Eol => {
                    self.advance();
                }
                TokenKind::Dot => stmts.push(self.parse_directive()?),
                TokenKind::Sym => stmts.push(self.parse_label()?),
                TokenKind::Mn(_) | TokenKind::Br(_) => stmts.push(self.parse_instruction()?),
                _ => return Err(self.expected_err("statement")),
            }
        }

        Ok(stmts)
    }

    // ------------------------------------------------------------------------
    // Token plumbing

    fn peek(&self) -> &Token {
        &self.toks[self.cur]
    }

    fn advance(&mut self) -> Token {
        let tok = self.toks[self.cur].clone();
        if tok.kind != TokenKind::Eof {
            self.cur += 1;
        }
        tok
    }

    fn expected_err(&self, want: &str) -> Error {
        let tok = self.peek();
        Error::Expected {
            pos: tok.pos.clone(),
            want: want.to_string(),
            got: tok.kind.to_string(),
        }
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.expected_err(&kind.to_string()))
        }
    }

    fn consume_reg(&mut self) -> Result<Reg, Error> {
        match self.peek().kind {
            TokenKind::Reg(r) => {
                self.advance();
                Ok(r)
            }
            _ => Err(self.expected_err("register")),
        }
    }

    fn consume_imm(&mut self) -> Result<Imm, Error> {
        match self.peek().kind {
            TokenKind::Num | TokenKind::Char => Ok(Imm::Literal(self.advance().value)),
            TokenKind::Sym => Ok(Imm::Symbol(self.advance())),
            _ => Err(self.expected_err("number, character or symbol")),
        }
    }

    // ------------------------------------------------------------------------
    // Grammar

    fn parse_label(&mut self) -> Result<Stmt, Error> {
        let sym = self.consume(TokenKind::Sym)?;
        self.consume(TokenKind::Colon)?;
        self.consume(TokenKind::Eol)?;
        Ok(Stmt::Label(sym))
    }

    fn parse_directive(&mut self) -> Result<Stmt, Error> {
        self.consume(TokenKind::Dot)?;

        let dir = match self.peek().kind {
            TokenKind::Dir(d) => {
                self.advance();
                d
            }
            _ => return Err(self.expected_err("directive")),
        };

        let arg = match dir {
            Dir::Global | Dir::Extern => self.consume(TokenKind::Sym)?,
            Dir::Byte => match self.peek().kind {
                TokenKind::Num | TokenKind::Char => self.advance(),
                _ => return Err(self.expected_err("number or character")),
            },
            Dir::Word | Dir::Skip => self.consume(TokenKind::Num)?,
            Dir::Ascii => self.consume(TokenKind::Str)?,
        };

        self.consume(TokenKind::Eol)?;
        Ok(Stmt::Directive(dir, arg))
    }

    fn parse_instruction(&mut self) -> Result<Stmt, Error> {
        let asm = match self.advance().kind {
            TokenKind::Br(cond) => Asm::J(cond, self.consume(TokenKind::Sym)?),

            TokenKind::Mn(op) => match op {
                Op::Halt => Asm::Halt,
                Op::Ret => Asm::Ret,
                Op::Syscall => Asm::Syscall,

                Op::Movi => {
                    let imm = self.consume_imm()?;
                    self.consume(TokenKind::Comma)?;
                    Asm::Movi(imm, self.consume_reg()?)
                }

                Op::Push => Asm::Push(self.consume_reg()?),
                Op::Pop => Asm::Pop(self.consume_reg()?),

                Op::Call => Asm::Call(self.consume(TokenKind::Sym)?),

                Op::Mov | Op::Movb | Op::Movze | Op::Movse | Op::Wr | Op::Wrb | Op::Rd
                | Op::Rdb | Op::Add | Op::Addb | Op::Sub | Op::Subb | Op::Cmp | Op::Cmpb => {
                    let src = self.consume_reg()?;
                    self.consume(TokenKind::Comma)?;
                    let dst = self.consume_reg()?;
                    match op {
                        Op::Mov => Asm::Mov(src, dst),
                        Op::Movb => Asm::Movb(src, dst),
                        Op::Movze => Asm::Movze(src, dst),
                        Op::Movse => Asm::Movse(src, dst),
                        Op::Wr => Asm::Wr(src, dst),
                        Op::Wrb => Asm::Wrb(src, dst),
                        Op::Rd => Asm::Rd(src, dst),
                        Op::Rdb => Asm::Rdb(src, dst),
                        Op::Add => Asm::Add(src, dst),
                        Op::Addb => Asm::Addb(src, dst),
                        Op::Sub => Asm::Sub(src, dst),
                        Op::Subb => Asm::Subb(src, dst),
                        Op::Cmp => Asm::Cmp(src, dst),
                        Op::Cmpb => Asm::Cmpb(src, dst),
                        _ => unreachable!(),
                    }
                }

                // "jmp" tokenizes as a branch.
                Op::Jmp => unreachable!(),
            },

            _ => unreachable!("caller checked for a mnemonic"),
        };

        self.consume(TokenKind::Eol)?;
        Ok(Stmt::Inst(asm))
    }
}
