use clap::Parser;
use verse_packs::builders::OsisText;
use verse_packs::cli::{self, PackArgs};

/// Build a text pack from OSIS XML.
#[derive(Parser)]
#[command(name = "build_text_osis")]
struct Cli {
    #[command(flatten)]
    pack: PackArgs,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let args = Cli::parse().pack;
    let builder = OsisText {
        input: args.input.clone(),
    };
    cli::run(&builder, &args)
}
