use asm::assemble_source;

#[test]
fn links_assembled_modules_across_files() {
    let a = assemble_source(
        "a.asm",
        ".global _start\n.extern f\n_start:\ncall f\nhalt\n",
    )
    .unwrap();
    let b = assemble_source("b.asm", ".global f\nf:\nmovi 42, r0\nret\n").unwrap();

    let img = link::link(vec![a, b]).unwrap();

    // module a: call (3) + halt (1); f lands at 4
    assert_eq!(img.entry, 0);
    assert_eq!(img.code[..4], [19, 4, 0, 0x00]);
    // module b: movi 42, r0; ret
    assert_eq!(img.code[4..], [3, 0, 42, 0, 20]);
}

#[test]
fn no_placeholder_survives_linking() {
    // A data label at address 0 is the one legitimate zero, so place a
    // pad byte first to keep every target nonzero.
    let a = assemble_source(
        "a.asm",
        concat!(
            ".global _start\n",
            ".extern other\n",
            ".byte 0\n",
            "_start:\n",
            "movi msg, r1\n",
            "jmp next\n",
            "next:\n",
            "call other\n",
            "halt\n",
            "msg:\n",
            ".ascii \"x\"\n",
        ),
    )
    .unwrap();
    let b = assemble_source("b.asm", ".global other\nother:\nret\n").unwrap();

    let relocs: Vec<u16> = a.relocs.iter().map(|r| r.loc).collect();
    let img = link::link(vec![a, b]).unwrap();

    for loc in relocs {
        let at = usize::from(loc);
        let patched = u16::from_le_bytes([img.code[at], img.code[at + 1]]);
        assert_ne!(patched, 0, "placeholder left at {at}");
    }
}

#[test]
fn image_bytes_roundtrip() {
    let a = assemble_source("a.asm", ".global _start\n_start:\nhalt\n").unwrap();
    let img = link::link(vec![a]).unwrap();
    assert_eq!(img.to_bytes(), [0, 0, 1, 0, 0x00]);
    assert_eq!(arch::exe::Image::from_bytes(&img.to_bytes()), Ok(img));
}
