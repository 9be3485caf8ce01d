use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString};

/// The register file: fourteen general-purpose registers plus the stack
/// pointer and base pointer. Only `rsp` has an architectural role (the
/// push/pop/call/ret stack discipline); `rbp` is general purpose.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Reg {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    Rsp,
    Rbp,
}

impl Reg {
    /// Packs a source/destination pair into the operand byte of a
    /// two-register instruction.
    pub fn pair(src: Reg, dst: Reg) -> u8 {
        u8::from(src) << 4 | u8::from(dst)
    }

    /// Splits an operand byte back into (src, dst). Both nibbles are
    /// always valid register indices.
    pub fn unpair(b: u8) -> (Reg, Reg) {
        let src = Reg::try_from(b >> 4).expect("register nibble");
        let dst = Reg::try_from(b & 0x0F).expect("register nibble");
        (src, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn surface_names() {
        assert_eq!(Reg::from_str("r0"), Ok(Reg::R0));
        assert_eq!(Reg::from_str("r13"), Ok(Reg::R13));
        assert_eq!(Reg::from_str("rsp"), Ok(Reg::Rsp));
        assert_eq!(Reg::from_str("rbp"), Ok(Reg::Rbp));
        assert!(Reg::from_str("r14").is_err());
        assert_eq!(Reg::R10.to_string(), "r10");
    }

    #[test]
    fn pair_roundtrip() {
        for s in 0..16u8 {
            for d in 0..16u8 {
                let src = Reg::try_from(s).unwrap();
                let dst = Reg::try_from(d).unwrap();
                assert_eq!(Reg::unpair(Reg::pair(src, dst)), (src, dst));
            }
        }
    }

    #[test]
    fn out_of_range_index() {
        assert!(Reg::try_from(16u8).is_err());
        assert!(Reg::try_from(0xFFu8).is_err());
    }
}
