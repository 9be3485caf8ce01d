use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString};

use crate::flags::Flags;

/// Branch condition codes. The byte after the branch opcode selects one;
/// the numbering is part of the image format. Mnemonic aliases (`je` for
/// `jz`, `jb` for `jc`, ...) share a code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, EnumString, Display,
)]
#[repr(u8)]
pub enum Cond {
    #[strum(serialize = "jmp")]
    Always = 0,
    #[strum(serialize = "je", to_string = "jz")]
    Z = 1,
    #[strum(serialize = "jne", to_string = "jnz")]
    Nz = 2,
    #[strum(serialize = "jb", to_string = "jc")]
    C = 3,
    #[strum(serialize = "jae", to_string = "jnc")]
    Nc = 4,
    #[strum(serialize = "js")]
    S = 5,
    #[strum(serialize = "jns")]
    Ns = 6,
    #[strum(serialize = "jo")]
    O = 7,
    #[strum(serialize = "jno")]
    No = 8,
    #[strum(serialize = "jbe")]
    Be = 9,
    #[strum(serialize = "ja")]
    A = 10,
    #[strum(serialize = "jl")]
    L = 11,
    #[strum(serialize = "jge")]
    Ge = 12,
    #[strum(serialize = "jle")]
    Le = 13,
    #[strum(serialize = "jg")]
    G = 14,
}

impl Cond {
    /// Evaluates the condition against a flag byte.
    pub fn holds(self, f: Flags) -> bool {
        match self {
            Cond::Always => true,
            Cond::Z => f.z(),
            Cond::Nz => !f.z(),
            Cond::C => f.c(),
            Cond::Nc => !f.c(),
            Cond::S => f.s(),
            Cond::Ns => !f.s(),
            Cond::O => f.o(),
            Cond::No => !f.o(),
            Cond::Be => f.c() || f.z(),
            Cond::A => !(f.c() || f.z()),
            Cond::L => f.s() != f.o(),
            Cond::Ge => f.s() == f.o(),
            Cond::Le => (f.s() != f.o()) || f.z(),
            Cond::G => !((f.s() != f.o()) || f.z()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pinned_codes() {
        assert_eq!(u8::from(Cond::Always), 0);
        assert_eq!(u8::from(Cond::Be), 9);
        assert_eq!(u8::from(Cond::G), 14);
        assert!(Cond::try_from(15u8).is_err());
    }

    #[test]
    fn mnemonic_aliases() {
        assert_eq!(Cond::from_str("jz"), Ok(Cond::Z));
        assert_eq!(Cond::from_str("je"), Ok(Cond::Z));
        assert_eq!(Cond::from_str("jnc"), Ok(Cond::Nc));
        assert_eq!(Cond::from_str("jae"), Ok(Cond::Nc));
        assert_eq!(Cond::Z.to_string(), "jz");
        assert_eq!(Cond::Always.to_string(), "jmp");
    }

    #[test]
    fn predicates() {
        let zc = Flags::new(Flags::Z | Flags::C);
        let so = Flags::new(Flags::S | Flags::O);
        let s = Flags::new(Flags::S);
        let none = Flags::default();

        assert!(Cond::Always.holds(none));
        assert!(Cond::Z.holds(zc) && !Cond::Z.holds(none));
        assert!(Cond::Be.holds(zc) && !Cond::A.holds(zc));
        assert!(Cond::A.holds(none));
        // signed: S ^ O means less-than
        assert!(Cond::L.holds(s) && !Cond::L.holds(so));
        assert!(Cond::Ge.holds(so) && Cond::Ge.holds(none));
        assert!(Cond::Le.holds(s) && Cond::Le.holds(zc));
        assert!(Cond::G.holds(none) && !Cond::G.holds(zc) && !Cond::G.holds(s));
    }
}
