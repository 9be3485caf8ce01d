use std::io;
use std::io::Write as IoWrite;

use arch::Reg;

use super::Handler;
use crate::error::VmError;
use crate::model::State;

/// Syscall kind 1: write `len` (r3) bytes of memory from `ptr` (r2) to
/// file descriptor `fd` (r1). Only the standard descriptors exist;
/// anything else is fatal.
pub struct Write {
    stdout: Box<dyn IoWrite>,
    stderr: Box<dyn IoWrite>,
}

impl Write {
    pub fn host() -> Write {
        Write::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Sinks are injectable so tests can capture program output.
    pub fn new(stdout: Box<dyn IoWrite>, stderr: Box<dyn IoWrite>) -> Write {
        Write { stdout, stderr }
    }
}

impl Handler for Write {
    fn kind(&self) -> u16 {
        1
    }

    fn invoke(&mut self, state: &mut State) -> Result<(), VmError> {
        let fd = state.get(Reg::R1);
        let ptr = state.get(Reg::R2);
        let len = state.get(Reg::R3);

        // Copy out byte-wise; the window may wrap around memory.
        let mut buf = Vec::with_capacity(usize::from(len));
        for i in 0..len {
            buf.push(state.read_byte(ptr.wrapping_add(i)));
        }

        let sink = match fd {
            1 => &mut self.stdout,
            2 => &mut self.stderr,
            _ => return Err(VmError::BadDescriptor(fd)),
        };
        sink.write_all(&buf).map_err(VmError::SyscallIo)?;
        sink.flush().map_err(VmError::SyscallIo)?;
        Ok(())
    }
}
