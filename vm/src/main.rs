use clap::Parser;
use color_print::ceprintln;

use arch::exe::Image;
use vm::dump::Dump;
use vm::{Bridge, State, VmError};

#[derive(Debug, clap::Parser)]
#[clap(version, about = "SM16 virtual machine")]
struct Args {
    /// Executable image
    input: String,

    /// Stop after N instructions
    #[clap(short, long)]
    tmax: Option<u64>,

    /// Print each executed instruction
    #[clap(long)]
    trace: bool,

    /// Dump machine state at addresses listed in a YAML config
    #[clap(long)]
    dump_cfg: Option<String>,

    /// Dump machine state after every instruction
    #[clap(long)]
    dump_all: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        ceprintln!("<red,bold>error</>: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), VmError> {
    let bytes =
        std::fs::read(&args.input).map_err(|e| VmError::FileRead(args.input.clone(), e))?;
    let image =
        Image::from_bytes(&bytes).map_err(|e| VmError::BadImage(args.input.clone(), e))?;

    let mut state = State::load(&image)?;
    let mut bridge = Bridge::with_host();
    let dump = Dump::from_args(args.dump_cfg.as_deref(), args.dump_all)?;

    let tmax = args.tmax.unwrap_or(u64::MAX);
    for time in 0..tmax {
        if state.halted() {
            break;
        }

        let at = state.ip();
        let inst = state.step(&mut bridge)?;

        if args.trace {
            println!("[{:0>4}] {:0>4X} | {}", time, at, inst.cformat());
        }
        dump.exec(at, &state);
    }

    Ok(())
}
