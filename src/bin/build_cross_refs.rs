use clap::Parser;
use verse_packs::builders::CrossReferences;
use verse_packs::cli::{self, PackArgs};

/// Build a cross-reference pack from curated JSON or a tab-separated dump.
#[derive(Parser)]
#[command(name = "build_cross_refs")]
struct Cli {
    #[command(flatten)]
    pack: PackArgs,

    /// Value for the `source` column (default: curated for JSON, openbible otherwise)
    #[arg(long)]
    source: Option<String>,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let opts = Cli::parse();
    let builder = CrossReferences {
        input: opts.pack.input.clone(),
        source: opts.source,
    };
    cli::run(&builder, &opts.pack)
}
