use arch::alu::{arith, AluOp};
use arch::exe::Image;
use arch::flags::{Flags, Width};
use arch::{Inst, Reg, MEM_SIZE};

use crate::bridge::Bridge;
use crate::error::VmError;

/// The machine: sixteen 16-bit registers, 64 KiB of flat memory shared
/// by code and data, the instruction pointer and the flag byte. One
/// `State` lives for one execution.
pub struct State {
    regs: [u16; 16],
    mem: Box<[u8; MEM_SIZE]>,
    ip: u16,
    flags: Flags,
    halted: bool,
}

impl State {
    pub fn new() -> State {
        State {
            regs: [0; 16],
            mem: Box::new([0; MEM_SIZE]),
            ip: 0,
            flags: Flags::default(),
            halted: false,
        }
    }

    /// Loads an image: code at address 0, `ip` at the entry point.
    /// Registers, flags and the rest of memory start zeroed; the first
    /// push will wrap `rsp` down from 0 to 0xFFFE.
    pub fn load(image: &Image) -> Result<State, VmError> {
        if image.code.len() > MEM_SIZE {
            return Err(VmError::ImageTooLarge);
        }
        let mut state = State::new();
        state.mem[..image.code.len()].copy_from_slice(&image.code);
        state.ip = image.entry;
        Ok(state)
    }

    // ------------------------------------------------------------------------
    // Register file

    pub fn get(&self, r: Reg) -> u16 {
        self.regs[usize::from(u8::from(r))]
    }

    pub fn set(&mut self, r: Reg, v: u16) {
        self.regs[usize::from(u8::from(r))] = v;
    }

    /// Low byte of a register; byte-width instructions leave the high
    /// byte alone.
    pub fn getb(&self, r: Reg) -> u8 {
        self.get(r) as u8
    }

    pub fn setb(&mut self, r: Reg, v: u8) {
        let high = self.get(r) & 0xFF00;
        self.set(r, high | u16::from(v));
    }

    // ------------------------------------------------------------------------
    // Memory

    pub fn read_byte(&self, addr: u16) -> u8 {
        self.mem[usize::from(addr)]
    }

    pub fn write_byte(&mut self, addr: u16, v: u8) {
        self.mem[usize::from(addr)] = v;
    }

    /// 16-bit accesses are little-endian and wrap at the end of the
    /// address space.
    pub fn read_word(&self, addr: u16) -> u16 {
        let lo = self.read_byte(addr);
        let hi = self.read_byte(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub fn write_word(&mut self, addr: u16, v: u16) {
        let [lo, hi] = v.to_le_bytes();
        self.write_byte(addr, lo);
        self.write_byte(addr.wrapping_add(1), hi);
    }

    // ------------------------------------------------------------------------
    // Stack

    /// Decrement before write: the stack grows downward from the top of
    /// memory.
    fn push(&mut self, v: u16) {
        let sp = self.get(Reg::Rsp).wrapping_sub(2);
        self.write_word(sp, v);
        self.set(Reg::Rsp, sp);
    }

    fn pop(&mut self) -> u16 {
        let sp = self.get(Reg::Rsp);
        let v = self.read_word(sp);
        self.set(Reg::Rsp, sp.wrapping_add(2));
        v
    }

    // ------------------------------------------------------------------------
    // Execution

    pub fn ip(&self) -> u16 {
        self.ip
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Fetches, decodes and executes one instruction. Returns what ran,
    /// for tracing. `ip` advances past every consumed byte before the
    /// instruction takes effect, so branch targets replace it cleanly.
    pub fn step(&mut self, bridge: &mut Bridge) -> Result<Inst, VmError> {
        // Decode through a window: instructions may wrap around the end
        // of memory like every other access.
        let mut win = [0u8; 4];
        for (i, b) in win.iter_mut().enumerate() {
            *b = self.read_byte(self.ip.wrapping_add(i as u16));
        }
        let (inst, size) = Inst::decode(&win)?;
        self.ip = self.ip.wrapping_add(size);

        self.exec(inst, bridge)?;
        Ok(inst)
    }

    /// Runs until `halt`.
    pub fn run(&mut self, bridge: &mut Bridge) -> Result<(), VmError> {
        while !self.halted {
            self.step(bridge)?;
        }
        Ok(())
    }

    fn exec(&mut self, inst: Inst, bridge: &mut Bridge) -> Result<(), VmError> {
        match inst {
            Inst::Halt => self.halted = true,

            Inst::Mov(src, dst) => self.set(dst, self.get(src)),
            Inst::Movb(src, dst) => self.setb(dst, self.getb(src)),
            Inst::Movi(imm, dst) => self.set(dst, imm),
            Inst::Movze(src, dst) => self.set(dst, u16::from(self.getb(src))),
            Inst::Movse(src, dst) => self.set(dst, self.getb(src) as i8 as i16 as u16),

            Inst::Wr(src, dst) => self.write_word(self.get(dst), self.get(src)),
            Inst::Wrb(src, dst) => self.write_byte(self.get(dst), self.getb(src)),
            Inst::Rd(src, dst) => self.set(dst, self.read_word(self.get(src))),
            Inst::Rdb(src, dst) => {
                let v = self.read_byte(self.get(src));
                self.setb(dst, v);
            }

            Inst::Add(src, dst) => self.arith_word(src, dst, AluOp::Add),
            Inst::Sub(src, dst) => self.arith_word(src, dst, AluOp::Sub),
            Inst::Addb(src, dst) => self.arith_byte(src, dst, AluOp::Add),
            Inst::Subb(src, dst) => self.arith_byte(src, dst, AluOp::Sub),

            Inst::Cmp(src, dst) => {
                let (_, flags) = arith(self.get(dst), self.get(src), AluOp::Sub, Width::Word);
                self.flags = flags;
            }
            Inst::Cmpb(src, dst) => {
                let (_, flags) = arith(
                    u16::from(self.getb(dst)),
                    u16::from(self.getb(src)),
                    AluOp::Sub,
                    Width::Byte,
                );
                self.flags = flags;
            }

            Inst::J(cond, target) => {
                if cond.holds(self.flags) {
                    self.ip = target;
                }
            }

            Inst::Push(r) => self.push(self.get(r)),
            Inst::Pop(r) => {
                let v = self.pop();
                self.set(r, v);
            }

            Inst::Call(target) => {
                self.push(self.ip);
                self.ip = target;
            }
            Inst::Ret => self.ip = self.pop(),

            Inst::Syscall => bridge.dispatch(self)?,
        }
        Ok(())
    }

    fn arith_word(&mut self, src: Reg, dst: Reg, op: AluOp) {
        let (v, flags) = arith(self.get(dst), self.get(src), op, Width::Word);
        self.set(dst, v);
        self.flags = flags;
    }

    fn arith_byte(&mut self, src: Reg, dst: Reg, op: AluOp) {
        let (v, flags) = arith(
            u16::from(self.getb(dst)),
            u16::from(self.getb(src)),
            op,
            Width::Byte,
        );
        self.setb(dst, v as u8);
        self.flags = flags;
    }
}

impl Default for State {
    fn default() -> State {
        State::new()
    }
}
