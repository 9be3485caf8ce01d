use clap::Parser;
use color_print::ceprintln;

use link::LinkError;

#[derive(Debug, clap::Parser)]
#[clap(version, about = "SM16 linker")]
struct Args {
    /// Object files, in concatenation order
    #[clap(required = true)]
    inputs: Vec<String>,

    /// Output executable image
    #[clap(short, long, default_value = "out.vm")]
    output: String,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        ceprintln!("<red,bold>error</>: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), LinkError> {
    let image = link::link_files(&args.inputs)?;
    std::fs::write(&args.output, image.to_bytes())
        .map_err(|e| LinkError::FileWrite(args.output.clone(), e))?;
    Ok(())
}
