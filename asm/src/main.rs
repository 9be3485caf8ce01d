use clap::Parser as _;
use color_print::{ceprintln, cprintln};

use arch::Inst;
use asm::error::Error;

#[derive(Debug, clap::Parser)]
#[clap(version, about = "SM16 assembler")]
struct Args {
    /// Source file
    input: String,

    /// Output object file
    #[clap(short, long, default_value = "out.o")]
    output: String,

    /// Print the assembled listing
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        ceprintln!("<red,bold>error</>: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let src = std::fs::read_to_string(&args.input)
        .map_err(|e| Error::FileRead(args.input.clone(), e))?;

    let obj = asm::assemble_source(&args.input, &src)?;

    if args.dump {
        dump(&obj);
    }

    std::fs::write(&args.output, obj.to_bytes())
        .map_err(|e| Error::FileWrite(args.output.clone(), e))?;

    Ok(())
}

/// Prints the emitted module: symbols, then a decoded walk of the code
/// buffer. Data regions between instruction decodes come out as `db`
/// rows, so the walk only decodes where decoding succeeds.
fn dump(obj: &arch::obj::ObjectFile) {
    cprintln!("<bold>symbols</>");
    for sym in &obj.symbols {
        cprintln!(
            "  {:>2} <g>{:?}</> {:0>4X} {}",
            sym.idx,
            sym.kind,
            sym.addr,
            sym.label
        );
    }

    cprintln!("<bold>code</>");
    let mut at = 0usize;
    while at < obj.code.len() {
        match Inst::decode(&obj.code[at..]) {
            Ok((inst, size)) => {
                cprintln!("  <y>{:0>4X}</> | {}", at, inst.cformat());
                at += size as usize;
            }
            Err(_) => {
                cprintln!("  <y>{:0>4X}</> | db 0x{:0>2X}", at, obj.code[at]);
                at += 1;
            }
        }
    }

    cprintln!("<bold>relocations</>");
    for rel in &obj.relocs {
        cprintln!("  at {:0>4X} -> symbol {}", rel.loc, rel.symidx);
    }
}
