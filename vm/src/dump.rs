use std::collections::HashMap;

use arch::Reg;
use serde::{Deserialize, Serialize};

use crate::error::VmError;
use crate::model::State;

/// Machine-state dumps keyed by instruction address, configured from a
/// YAML map:
///
/// ```yaml
/// 0x0007:
///   stack: true
///   mem: [0x2000, 0x2002]
/// ```
pub struct Dump {
    all: bool,
    list: List,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct List(HashMap<u16, Config>);

#[derive(Debug, Serialize, Deserialize)]
struct Config {
    #[serde(default)]
    stack: bool,
    #[serde(default)]
    mem: Vec<u16>,
}

impl Dump {
    pub fn from_args(file: Option<&str>, all: bool) -> Result<Dump, VmError> {
        let list = match file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| VmError::FileRead(path.to_string(), e))?;
                serde_yaml::from_str(&text).map_err(|e| VmError::DumpCfg(path.to_string(), e))?
            }
            None => List::default(),
        };
        Ok(Dump { all, list })
    }

    /// Called after each step with the address the instruction ran at.
    pub fn exec(&self, addr: u16, state: &State) {
        if let Some(cfg) = self.list.0.get(&addr) {
            self.print_regs(state);
            if cfg.stack {
                self.print_stack(state);
            }
            self.print_mem(state, &cfg.mem);
        } else if self.all {
            self.print_regs(state);
        }
    }

    fn print_regs(&self, s: &State) {
        println!(" +-----------+-----------+-----------+-----------+");
        println!(
            " |  r0: {:0>4X} |  r4: {:0>4X} |  r8: {:0>4X} | r12: {:0>4X} |",
            s.get(Reg::R0),
            s.get(Reg::R4),
            s.get(Reg::R8),
            s.get(Reg::R12)
        );
        println!(
            " |  r1: {:0>4X} |  r5: {:0>4X} |  r9: {:0>4X} | r13: {:0>4X} |",
            s.get(Reg::R1),
            s.get(Reg::R5),
            s.get(Reg::R9),
            s.get(Reg::R13)
        );
        println!(
            " |  r2: {:0>4X} |  r6: {:0>4X} | r10: {:0>4X} | rsp: {:0>4X} |",
            s.get(Reg::R2),
            s.get(Reg::R6),
            s.get(Reg::R10),
            s.get(Reg::Rsp)
        );
        println!(
            " |  r3: {:0>4X} |  r7: {:0>4X} | r11: {:0>4X} | rbp: {:0>4X} |",
            s.get(Reg::R3),
            s.get(Reg::R7),
            s.get(Reg::R11),
            s.get(Reg::Rbp)
        );
        println!(
            " |  ip: {:0>4X} | {}                               |",
            s.ip(),
            s.flags()
        );
        println!(" +-----------+-----------+-----------+-----------+");
    }

    /// The live stack: from `rsp` up to the top of memory.
    fn print_stack(&self, s: &State) {
        let mut sp = s.get(Reg::Rsp);
        while sp != 0 {
            println!(" | {:0>4X} : {:0>4X}                                 |", sp, s.read_word(sp));
            sp = sp.wrapping_add(2);
        }
        println!(" +-----------------------------------------------+");
    }

    fn print_mem(&self, s: &State, addrs: &[u16]) {
        for &addr in addrs {
            println!(" | {:0>4X} : {:0>4X}                                 |", addr, s.read_word(addr));
        }
        println!(" +-----------------------------------------------+");
    }
}
