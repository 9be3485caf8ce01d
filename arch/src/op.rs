use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::Display;

/// The closed opcode enumeration. Discriminants are part of the image
/// format and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Display)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Op {
    Halt = 0,

    Mov = 1,
    Movb = 2,
    Movi = 3,
    Movze = 4,
    Movse = 5,

    Wr = 6,
    Wrb = 7,
    Rd = 8,
    Rdb = 9,

    Add = 10,
    Addb = 11,
    Sub = 12,
    Subb = 13,

    Cmp = 14,
    Cmpb = 15,

    /// All branches share one opcode; the condition byte follows.
    Jmp = 16,

    Push = 17,
    Pop = 18,

    Call = 19,
    Ret = 20,

    Syscall = 21,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_discriminants() {
        assert_eq!(u8::from(Op::Halt), 0);
        assert_eq!(u8::from(Op::Movi), 3);
        assert_eq!(u8::from(Op::Cmpb), 15);
        assert_eq!(u8::from(Op::Jmp), 16);
        assert_eq!(u8::from(Op::Syscall), 21);
    }

    #[test]
    fn unmapped_discriminant_is_an_error() {
        assert!(Op::try_from(22u8).is_err());
        assert!(Op::try_from(0xFFu8).is_err());
    }
}
