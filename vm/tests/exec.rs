use arch::exe::Image;
use arch::inst::DecodeError;
use arch::Reg;
use vm::{Bridge, State, VmError};

fn boot(code: Vec<u8>) -> State {
    State::load(&Image { entry: 0, code }).unwrap()
}

fn run(code: Vec<u8>) -> State {
    let mut state = boot(code);
    state.run(&mut Bridge::new()).unwrap();
    state
}

#[test]
fn halt_only() {
    let state = run(vec![0x00]);
    assert!(state.halted());
    assert_eq!(state.ip(), 1);
    for i in 0..16u8 {
        assert_eq!(state.get(Reg::try_from(i).unwrap()), 0);
    }
    assert_eq!(state.flags().bits(), 0);
}

#[test]
fn signed_overflow_boundary() {
    // r0 <- 0x7FFF; r1 <- 1; add r1, r0
    let state = run(vec![
        3, 0, 0xFF, 0x7F, // movi 0x7FFF, r0
        3, 1, 1, 0, // movi 1, r1
        10, 0x10, // add r1, r0
        0,
    ]);
    assert_eq!(state.get(Reg::R0), 0x8000);
    let f = state.flags();
    assert!(f.s() && f.o() && !f.c() && !f.z());
}

#[test]
fn carry_wraps_to_zero() {
    let state = run(vec![
        3, 0, 0xFF, 0xFF, // movi 0xFFFF, r0
        3, 1, 1, 0, // movi 1, r1
        10, 0x10, // add r1, r0
        0,
    ]);
    assert_eq!(state.get(Reg::R0), 0x0000);
    let f = state.flags();
    assert!(f.z() && f.c() && !f.s() && !f.o());
}

#[test]
fn flags_reset_wholesale() {
    // The overflowing add sets O; the next add must clear it.
    let state = run(vec![
        3, 0, 0xFF, 0x7F, // movi 0x7FFF, r0
        3, 1, 1, 0, // movi 1, r1
        10, 0x10, // add r1, r0  (S, O)
        10, 0x10, // add r1, r0  (S only)
        0,
    ]);
    assert_eq!(state.get(Reg::R0), 0x8001);
    let f = state.flags();
    assert!(f.s() && !f.o() && !f.c() && !f.z());
}

#[test]
fn loop_to_five() {
    // r0 <- 0; r2 <- 1; r3 <- 5; L: add r2, r0; cmp r3, r0; jne L; halt
    let state = run(vec![
        3, 0, 0, 0, // movi 0, r0
        3, 2, 1, 0, // movi 1, r2
        3, 3, 5, 0, // movi 5, r3
        10, 0x20, // L: add r2, r0
        14, 0x30, // cmp r3, r0
        16, 2, 12, 0, // jne L
        0,
    ]);
    assert_eq!(state.get(Reg::R0), 5);
    assert!(state.flags().z());
}

#[test]
fn sign_extension() {
    let state = run(vec![
        3, 0, 0xFF, 0, // movi 0x00FF, r0
        5, 0x01, // movse r0, r1
        3, 0, 0x7F, 0, // movi 0x007F, r0
        5, 0x02, // movse r0, r2
        0,
    ]);
    assert_eq!(state.get(Reg::R1), 0xFFFF);
    assert_eq!(state.get(Reg::R2), 0x007F);
}

#[test]
fn zero_extension() {
    let state = run(vec![
        3, 0, 0xFF, 0xAB, // movi 0xABFF, r0
        4, 0x01, // movze r0, r1
        0,
    ]);
    assert_eq!(state.get(Reg::R1), 0x00FF);
}

#[test]
fn byte_ops_preserve_the_high_byte() {
    let state = run(vec![
        3, 0, 0x34, 0x12, // movi 0x1234, r0
        3, 1, 0xFF, 0x00, // movi 0x00FF, r1
        11, 0x10, // addb r1, r0
        3, 2, 0xCD, 0xAB, // movi 0xABCD, r2
        2, 0x02, // movb r0, r2
        0,
    ]);
    assert_eq!(state.get(Reg::R0), 0x1233);
    assert!(state.flags().c());
    assert_eq!(state.get(Reg::R2), 0xAB33);
}

#[test]
fn memory_word_roundtrip() {
    let state = run(vec![
        3, 0, 0xEF, 0xBE, // movi 0xBEEF, r0
        3, 1, 0x00, 0x20, // movi 0x2000, r1
        6, 0x01, // wr r0, r1
        8, 0x12, // rd r1, r2
        0,
    ]);
    assert_eq!(state.read_byte(0x2000), 0xEF);
    assert_eq!(state.read_byte(0x2001), 0xBE);
    assert_eq!(state.get(Reg::R2), 0xBEEF);
}

#[test]
fn word_access_wraps_at_the_top_of_memory() {
    let state = run(vec![
        3, 0, 0x34, 0x12, // movi 0x1234, r0
        3, 1, 0xFF, 0xFF, // movi 0xFFFF, r1
        6, 0x01, // wr r0, r1
        0,
    ]);
    assert_eq!(state.read_byte(0xFFFF), 0x34);
    assert_eq!(state.read_byte(0x0000), 0x12);
}

#[test]
fn first_push_wraps_the_stack_pointer() {
    let mut state = boot(vec![
        3, 5, 0x34, 0x12, // movi 0x1234, r5
        17, 5, // push r5
        0,
    ]);
    let mut bridge = Bridge::new();
    state.step(&mut bridge).unwrap();
    state.step(&mut bridge).unwrap();
    assert_eq!(state.get(Reg::Rsp), 0xFFFE);
    assert_eq!(state.read_word(0xFFFE), 0x1234);
}

#[test]
fn push_pop_roundtrip() {
    let state = run(vec![
        3, 5, 0x34, 0x12, // movi 0x1234, r5
        17, 5, // push r5
        3, 5, 0, 0, // movi 0, r5
        18, 5, // pop r5
        0,
    ]);
    assert_eq!(state.get(Reg::R5), 0x1234);
    assert_eq!(state.get(Reg::Rsp), 0);
}

#[test]
fn call_ret_roundtrip() {
    // call L; halt; L: ret
    let state = run(vec![
        19, 4, 0, // call 4
        0,  // halt
        20, // L: ret
    ]);
    assert!(state.halted());
    assert_eq!(state.ip(), 4);
    assert_eq!(state.get(Reg::Rsp), 0);
    for i in 0..14u8 {
        assert_eq!(state.get(Reg::try_from(i).unwrap()), 0);
    }
}

#[test]
fn branch_taken_and_not_taken() {
    // jmp over a byte that cannot decode; then a conditional that must
    // fall through.
    let state = run(vec![
        16, 0, 5, 0, // jmp 5
        0xFF, // trap
        3, 0, 1, 0, // movi 1, r0
        3, 1, 1, 0, // movi 1, r1
        14, 0x10, // cmp r1, r0
        16, 2, 4, 0, // jne 4 (not taken: equal)
        0,
    ]);
    assert!(state.halted());
    assert!(state.flags().z());
}

#[test]
fn unknown_opcode_is_fatal() {
    let mut state = boot(vec![22]);
    let err = state.step(&mut Bridge::new()).unwrap_err();
    assert!(matches!(err, VmError::Decode(DecodeError::UnknownOp(22))));
}

#[test]
fn unknown_branch_code_is_fatal() {
    let mut state = boot(vec![16, 15, 0, 0]);
    let err = state.step(&mut Bridge::new()).unwrap_err();
    assert!(matches!(
        err,
        VmError::Decode(DecodeError::UnknownCond(15))
    ));
}

#[test]
fn invalid_register_byte_is_fatal() {
    let mut state = boot(vec![17, 16]);
    let err = state.step(&mut Bridge::new()).unwrap_err();
    assert!(matches!(err, VmError::Decode(DecodeError::InvalidReg(16))));
}

#[test]
fn unknown_syscall_kind_is_fatal() {
    let mut state = boot(vec![3, 0, 9, 0, 21]); // movi 9, r0; syscall
    let mut bridge = Bridge::new();
    state.step(&mut bridge).unwrap();
    let err = state.step(&mut bridge).unwrap_err();
    assert!(matches!(err, VmError::UnknownSyscall(9)));
}

#[test]
fn entry_point_is_honored() {
    let mut state = State::load(&Image {
        entry: 2,
        code: vec![0xFF, 0xFF, 3, 0, 7, 0, 0], // junk; movi 7, r0; halt
    })
    .unwrap();
    state.run(&mut Bridge::new()).unwrap();
    assert_eq!(state.get(Reg::R0), 7);
}
