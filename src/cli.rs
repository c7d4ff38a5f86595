//! Shared command-line surface for the builder binaries.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;

use crate::builders::Builder;
use crate::error::{PackError, Result};
use crate::normalize::Language;
use crate::pipeline;
use crate::progress;
use crate::schema::{PackMetadata, PackType};
use crate::settings::Settings;

#[derive(Debug, Clone, Args)]
pub struct PackArgs {
    /// Source file, or a directory of source files
    pub input: PathBuf,

    /// Output pack path (default: <output_dir>/<id>.sqlite)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pack identifier (default: input file stem)
    #[arg(long)]
    pub id: Option<String>,

    /// Display name (default: the id)
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, default_value = "1.0.0")]
    pub version: String,

    #[arg(long, default_value = "")]
    pub license: String,

    #[arg(long, default_value = "")]
    pub attribution: String,

    /// Language code, e.g. hbo, grc, en
    #[arg(long)]
    pub language: Option<String>,
}

impl PackArgs {
    pub fn id(&self) -> String {
        self.id.clone().unwrap_or_else(|| stem(&self.input))
    }

    pub fn output_path(&self, settings: &Settings) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| settings.output_dir.join(format!("{}.sqlite", self.id())))
    }

    pub fn metadata(&self, pack_type: PackType) -> PackMetadata {
        let id = self.id();
        PackMetadata {
            name: self.name.clone().unwrap_or_else(|| id.clone()),
            id,
            version: self.version.clone(),
            pack_type,
            license: self.license.clone(),
            attribution: self.attribution.clone(),
            language: self.language.clone(),
        }
    }

    /// Strong's language for word-level sources; `None` when not given.
    pub fn strongs_language(&self) -> Result<Option<Language>> {
        match &self.language {
            None => Ok(None),
            Some(code) => Language::from_code(code).map(Some).ok_or_else(|| PackError::InvalidSetting {
                key: "language",
                reason: format!("expected hbo or grc, got {code:?}"),
            }),
        }
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pack".to_string())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}

/// Build one pack from parsed arguments and print the summary.
pub fn run(builder: &dyn Builder, args: &PackArgs) -> anyhow::Result<()> {
    let t0 = Instant::now();
    let settings = Settings::load().context("loading settings")?;
    let output = args.output_path(&settings);
    let meta = args.metadata(builder.pack_type());

    let mut observer = progress::for_stderr();
    let report = pipeline::build(builder, &meta, &output, &settings, observer.as_mut())
        .with_context(|| format!("building {} from {}", output.display(), args.input.display()))?;

    println!("{report}");
    println!("Done in {:.1}s", t0.elapsed().as_secs_f64());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        pack: PackArgs,
    }

    #[test]
    fn defaults_from_input_stem() {
        let cli = TestCli::parse_from(["t", "data/kjv.json"]);
        let settings = Settings::default();
        assert_eq!(cli.pack.id(), "kjv");
        assert_eq!(cli.pack.output_path(&settings), PathBuf::from("packs/kjv.sqlite"));

        let meta = cli.pack.metadata(PackType::Text);
        assert_eq!((meta.name.as_str(), meta.version.as_str()), ("kjv", "1.0.0"));
        assert_eq!(meta.language, None);
    }

    #[test]
    fn explicit_flags() {
        let cli = TestCli::parse_from([
            "t", "src.xml", "--id", "hebrew-wlc", "--output", "/tmp/h.sqlite", "--language", "hbo", "--license",
            "CC-BY 4.0",
        ]);
        assert_eq!(cli.pack.output_path(&Settings::default()), PathBuf::from("/tmp/h.sqlite"));
        assert_eq!(cli.pack.strongs_language().unwrap(), Some(Language::Hebrew));
        assert_eq!(cli.pack.metadata(PackType::Morphology).license, "CC-BY 4.0");

        let bad = TestCli::parse_from(["t", "x", "--language", "en"]);
        assert!(bad.pack.strongs_language().is_err());
    }
}
