use clap::Parser;
use verse_packs::builders::JsonText;
use verse_packs::cli::{self, PackArgs};

/// Build a text pack from JSON book/chapter/verse documents.
#[derive(Parser)]
#[command(name = "build_text_json")]
struct Cli {
    #[command(flatten)]
    pack: PackArgs,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let args = Cli::parse().pack;
    let builder = JsonText {
        input: args.input.clone(),
    };
    cli::run(&builder, &args)
}
