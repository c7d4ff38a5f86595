use clap::Parser;
use verse_packs::builders::Lexicon;
use verse_packs::cli::{self, PackArgs};

/// Build a lexicon pack from a tab-delimited pronunciation table or a wordlist.
#[derive(Parser)]
#[command(name = "build_lexicon")]
struct Cli {
    #[command(flatten)]
    pack: PackArgs,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let args = Cli::parse().pack;
    let builder = Lexicon {
        input: args.input.clone(),
    };
    cli::run(&builder, &args)
}
