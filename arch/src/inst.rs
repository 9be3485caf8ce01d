use color_print::cformat;
use thiserror::Error;

use crate::{Cond, Op, Reg};

/// A decoded instruction. Encoding is one opcode byte followed by the
/// operand bytes of the instruction's form; 16-bit fields are
/// little-endian and always the final two bytes of the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    Halt,

    Mov(Reg, Reg),
    Movb(Reg, Reg),
    /// Load a 16-bit immediate (or a linked symbol address).
    Movi(u16, Reg),
    Movze(Reg, Reg),
    Movse(Reg, Reg),

    /// Store the word/byte in src to memory at the address in dst.
    Wr(Reg, Reg),
    Wrb(Reg, Reg),
    /// Load dst from memory at the address in src.
    Rd(Reg, Reg),
    Rdb(Reg, Reg),

    Add(Reg, Reg),
    Addb(Reg, Reg),
    Sub(Reg, Reg),
    Subb(Reg, Reg),

    Cmp(Reg, Reg),
    Cmpb(Reg, Reg),

    J(Cond, u16),

    Push(Reg),
    Pop(Reg),

    Call(u16),
    Ret,

    Syscall,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown opcode {0}")]
    UnknownOp(u8),

    #[error("unknown branch code {0}")]
    UnknownCond(u8),

    #[error("invalid register index {0}")]
    InvalidReg(u8),

    #[error("truncated instruction")]
    Truncated,
}

impl Inst {
    pub fn op(&self) -> Op {
        match self {
            Inst::Halt => Op::Halt,
            Inst::Mov(..) => Op::Mov,
            Inst::Movb(..) => Op::Movb,
            Inst::Movi(..) => Op::Movi,
            Inst::Movze(..) => Op::Movze,
            Inst::Movse(..) => Op::Movse,
            Inst::Wr(..) => Op::Wr,
            Inst::Wrb(..) => Op::Wrb,
            Inst::Rd(..) => Op::Rd,
            Inst::Rdb(..) => Op::Rdb,
            Inst::Add(..) => Op::Add,
            Inst::Addb(..) => Op::Addb,
            Inst::Sub(..) => Op::Sub,
            Inst::Subb(..) => Op::Subb,
            Inst::Cmp(..) => Op::Cmp,
            Inst::Cmpb(..) => Op::Cmpb,
            Inst::J(..) => Op::Jmp,
            Inst::Push(..) => Op::Push,
            Inst::Pop(..) => Op::Pop,
            Inst::Call(..) => Op::Call,
            Inst::Ret => Op::Ret,
            Inst::Syscall => Op::Syscall,
        }
    }

    /// Encoded size in bytes, opcode included.
    pub fn size(&self) -> u16 {
        match self.op() {
            Op::Halt | Op::Ret | Op::Syscall => 1,
            Op::Movi | Op::Jmp => 4,
            Op::Call => 3,
            _ => 2,
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(u8::from(self.op()));
        match *self {
            Inst::Halt | Inst::Ret | Inst::Syscall => {}

            Inst::Mov(src, dst)
            | Inst::Movb(src, dst)
            | Inst::Movze(src, dst)
            | Inst::Movse(src, dst)
            | Inst::Wr(src, dst)
            | Inst::Wrb(src, dst)
            | Inst::Rd(src, dst)
            | Inst::Rdb(src, dst)
            | Inst::Add(src, dst)
            | Inst::Addb(src, dst)
            | Inst::Sub(src, dst)
            | Inst::Subb(src, dst)
            | Inst::Cmp(src, dst)
            | Inst::Cmpb(src, dst) => buf.push(Reg::pair(src, dst)),

            Inst::Movi(imm, dst) => {
                buf.push(u8::from(dst));
                buf.extend_from_slice(&imm.to_le_bytes());
            }

            Inst::J(cond, target) => {
                buf.push(u8::from(cond));
                buf.extend_from_slice(&target.to_le_bytes());
            }

            Inst::Push(r) | Inst::Pop(r) => buf.push(u8::from(r)),

            Inst::Call(target) => buf.extend_from_slice(&target.to_le_bytes()),
        }
    }

    /// Decodes one instruction from the start of `bytes`. Returns the
    /// instruction and its encoded size.
    pub fn decode(bytes: &[u8]) -> Result<(Inst, u16), DecodeError> {
        let mut cur = Cursor { bytes, pos: 0 };
        let op = Op::try_from(cur.u8()?).map_err(|e| DecodeError::UnknownOp(e.number))?;

        let inst = match op {
            Op::Halt => Inst::Halt,
            Op::Ret => Inst::Ret,
            Op::Syscall => Inst::Syscall,

            Op::Mov => cur.pair(Inst::Mov)?,
            Op::Movb => cur.pair(Inst::Movb)?,
            Op::Movze => cur.pair(Inst::Movze)?,
            Op::Movse => cur.pair(Inst::Movse)?,
            Op::Wr => cur.pair(Inst::Wr)?,
            Op::Wrb => cur.pair(Inst::Wrb)?,
            Op::Rd => cur.pair(Inst::Rd)?,
            Op::Rdb => cur.pair(Inst::Rdb)?,
            Op::Add => cur.pair(Inst::Add)?,
            Op::Addb => cur.pair(Inst::Addb)?,
            Op::Sub => cur.pair(Inst::Sub)?,
            Op::Subb => cur.pair(Inst::Subb)?,
            Op::Cmp => cur.pair(Inst::Cmp)?,
            Op::Cmpb => cur.pair(Inst::Cmpb)?,

            Op::Movi => {
                let dst = cur.reg()?;
                let imm = cur.u16()?;
                Inst::Movi(imm, dst)
            }

            Op::Jmp => {
                let code = cur.u8()?;
                let cond = Cond::try_from(code).map_err(|_| DecodeError::UnknownCond(code))?;
                let target = cur.u16()?;
                Inst::J(cond, target)
            }

            Op::Push => Inst::Push(cur.reg()?),
            Op::Pop => Inst::Pop(cur.reg()?),

            Op::Call => Inst::Call(cur.u16()?),
        };

        Ok((inst, cur.pos as u16))
    }

    /// Renders the instruction as a colored listing line.
    pub fn cformat(&self) -> String {
        macro_rules! rr {
            ($name:expr, $a:expr, $b:expr) => {
                cformat!("<r>{:<8}</><b>{:<4} {:<4}</>", $name, $a, $b)
            };
        }
        macro_rules! ri {
            ($name:expr, $a:expr, $imm:expr) => {
                cformat!("<r>{:<8}</><b>{:<4} <y>0x{:0>4X}</></>", $name, $a, $imm)
            };
        }

        match *self {
            Inst::Halt => rr!("halt", "", ""),
            Inst::Mov(src, dst) => rr!("mov", src, dst),
            Inst::Movb(src, dst) => rr!("movb", src, dst),
            Inst::Movi(imm, dst) => ri!("movi", dst, imm),
            Inst::Movze(src, dst) => rr!("movze", src, dst),
            Inst::Movse(src, dst) => rr!("movse", src, dst),
            Inst::Wr(src, dst) => rr!("wr", src, dst),
            Inst::Wrb(src, dst) => rr!("wrb", src, dst),
            Inst::Rd(src, dst) => rr!("rd", src, dst),
            Inst::Rdb(src, dst) => rr!("rdb", src, dst),
            Inst::Add(src, dst) => rr!("add", src, dst),
            Inst::Addb(src, dst) => rr!("addb", src, dst),
            Inst::Sub(src, dst) => rr!("sub", src, dst),
            Inst::Subb(src, dst) => rr!("subb", src, dst),
            Inst::Cmp(src, dst) => rr!("cmp", src, dst),
            Inst::Cmpb(src, dst) => rr!("cmpb", src, dst),
            Inst::J(cond, target) => ri!(cond.to_string(), "", target),
            Inst::Push(r) => rr!("push", r, ""),
            Inst::Pop(r) => rr!("pop", r, ""),
            Inst::Call(target) => ri!("call", "", target),
            Inst::Ret => rr!("ret", "", ""),
            Inst::Syscall => rr!("syscall", "", ""),
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn u8(&mut self) -> Result<u8, DecodeError> {
        let b = *self.bytes.get(self.pos).ok_or(DecodeError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let lo = self.u8()?;
        let hi = self.u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn reg(&mut self) -> Result<Reg, DecodeError> {
        let b = self.u8()?;
        Reg::try_from(b).map_err(|_| DecodeError::InvalidReg(b))
    }

    fn pair(&mut self, f: impl Fn(Reg, Reg) -> Inst) -> Result<Inst, DecodeError> {
        let (src, dst) = Reg::unpair(self.u8()?);
        Ok(f(src, dst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_inst {
        ($($name:ident: $inst:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let inst: Inst = $inst;
                    let mut buf = Vec::new();
                    inst.encode(&mut buf);
                    assert_eq!(buf.len(), inst.size() as usize);
                    let (back, size) = Inst::decode(&buf).unwrap();
                    assert_eq!(back, inst);
                    assert_eq!(size, inst.size());
                }
            )*
        }
    }

    test_inst! {
        test_halt: Inst::Halt,
        test_mov: Inst::Mov(Reg::R1, Reg::R2),
        test_movb: Inst::Movb(Reg::R13, Reg::R0),
        test_movi: Inst::Movi(0x1234, Reg::R3),
        test_movze: Inst::Movze(Reg::R4, Reg::R5),
        test_movse: Inst::Movse(Reg::R6, Reg::R7),
        test_wr: Inst::Wr(Reg::R0, Reg::R1),
        test_wrb: Inst::Wrb(Reg::R2, Reg::R3),
        test_rd: Inst::Rd(Reg::R8, Reg::R9),
        test_rdb: Inst::Rdb(Reg::R10, Reg::R11),
        test_add: Inst::Add(Reg::R1, Reg::R0),
        test_addb: Inst::Addb(Reg::R1, Reg::R0),
        test_sub: Inst::Sub(Reg::R12, Reg::Rbp),
        test_subb: Inst::Subb(Reg::R5, Reg::R5),
        test_cmp: Inst::Cmp(Reg::R3, Reg::R0),
        test_cmpb: Inst::Cmpb(Reg::R0, Reg::R3),
        test_jmp: Inst::J(Cond::Always, 0x0100),
        test_jne: Inst::J(Cond::Nz, 0xFFFE),
        test_jg: Inst::J(Cond::G, 0),
        test_push: Inst::Push(Reg::Rsp),
        test_pop: Inst::Pop(Reg::Rbp),
        test_call: Inst::Call(0xBEEF),
        test_ret: Inst::Ret,
        test_syscall: Inst::Syscall,
    }

    #[test]
    fn byte_exact_encodings() {
        let mut buf = Vec::new();
        Inst::Halt.encode(&mut buf);
        assert_eq!(buf, [0x00]);

        buf.clear();
        Inst::Movi(0x0105, Reg::R2).encode(&mut buf);
        assert_eq!(buf, [3, 2, 0x05, 0x01]);

        buf.clear();
        Inst::Add(Reg::R1, Reg::R0).encode(&mut buf);
        assert_eq!(buf, [10, 0x10]);

        buf.clear();
        Inst::J(Cond::Nz, 0x0004).encode(&mut buf);
        assert_eq!(buf, [16, 2, 0x04, 0x00]);

        buf.clear();
        Inst::Call(0x00FF).encode(&mut buf);
        assert_eq!(buf, [19, 0xFF, 0x00]);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(Inst::decode(&[22]), Err(DecodeError::UnknownOp(22)));
        assert_eq!(
            Inst::decode(&[16, 15, 0, 0]),
            Err(DecodeError::UnknownCond(15))
        );
        assert_eq!(Inst::decode(&[17, 16]), Err(DecodeError::InvalidReg(16)));
        assert_eq!(Inst::decode(&[3, 0]), Err(DecodeError::Truncated));
        assert_eq!(Inst::decode(&[]), Err(DecodeError::Truncated));
    }
}
