use clap::Parser;
use verse_packs::builders::Commentary;
use verse_packs::cli::{self, PackArgs};

/// Build a commentary pack from OSIS commentary XML.
#[derive(Parser)]
#[command(name = "build_commentary")]
struct Cli {
    #[command(flatten)]
    pack: PackArgs,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let args = Cli::parse().pack;
    let builder = Commentary {
        input: args.input.clone(),
    };
    cli::run(&builder, &args)
}
