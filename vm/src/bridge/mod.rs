//! The host side of `syscall`: a small table of handlers keyed by the
//! kind the program puts in `r0`. New kinds slot in with `register`.

pub mod write;

use arch::Reg;

use crate::error::VmError;
use crate::model::State;

/// One syscall kind.
pub trait Handler {
    fn kind(&self) -> u16;
    fn invoke(&mut self, state: &mut State) -> Result<(), VmError>;
}

pub struct Bridge {
    handlers: Vec<Box<dyn Handler>>,
}

impl Bridge {
    pub fn new() -> Bridge {
        Bridge {
            handlers: Vec::new(),
        }
    }

    /// The standard table: `write` wired to the process stdout/stderr.
    pub fn with_host() -> Bridge {
        let mut bridge = Bridge::new();
        bridge.register(Box::new(write::Write::host()));
        bridge
    }

    pub fn register(&mut self, handler: Box<dyn Handler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&mut self, state: &mut State) -> Result<(), VmError> {
        let kind = state.get(Reg::R0);
        let handler = self
            .handlers
            .iter_mut()
            .find(|h| h.kind() == kind)
            .ok_or(VmError::UnknownSyscall(kind))?;
        handler.invoke(state)
    }
}

impl Default for Bridge {
    fn default() -> Bridge {
        Bridge::new()
    }
}
