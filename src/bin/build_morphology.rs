use clap::Parser;
use verse_packs::builders::Morphology;
use verse_packs::cli::{self, PackArgs};
use verse_packs::normalize::Language;

/// Build a morphology pack (verses + words) from OSIS XML with <w lemma morph> markup.
#[derive(Parser)]
#[command(name = "build_morphology")]
struct Cli {
    #[command(flatten)]
    pack: PackArgs,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let mut args = Cli::parse().pack;
    let language = args.strongs_language()?.unwrap_or(Language::Hebrew);
    args.language = Some(language.code().to_string());

    let builder = Morphology {
        input: args.input.clone(),
        language,
    };
    cli::run(&builder, &args)
}
