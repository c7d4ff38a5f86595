//! Build manifest for `build_all`:
//!
//! ```toml
//! [[packs]]
//! kind = "text-json"
//! input = "sources/kjv.json"
//! id = "kjv"
//! license = "Public Domain"
//! ```

use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use serde::Deserialize;

use crate::builders::{self, Builder, BuilderKind};
use crate::error::{PackError, Result};
use crate::normalize::Language;
use crate::schema::PackMetadata;
use crate::settings::Settings;

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub packs: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub kind: BuilderKind,
    pub input: PathBuf,
    pub id: String,
    pub name: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub attribution: String,
    pub language: Option<String>,
    pub output: Option<PathBuf>,
    /// `source` column for cross-reference packs.
    pub source: Option<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PackError::SourceNotFound(path.to_path_buf()));
        }
        Self::from_config(Config::builder().add_source(File::from(path)).build()?)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Self::from_config(Config::builder().add_source(File::from_str(s, FileFormat::Toml)).build()?)
    }

    fn from_config(cfg: Config) -> Result<Self> {
        let manifest: Manifest = cfg.try_deserialize()?;
        if manifest.packs.is_empty() {
            return Err(PackError::EmptyResultSet("manifest lists no packs".into()));
        }
        Ok(manifest)
    }
}

impl ManifestEntry {
    pub fn builder(&self) -> Result<Box<dyn Builder>> {
        let language = match &self.language {
            Some(code) if self.kind == BuilderKind::Morphology => Some(Language::from_code(code).ok_or_else(|| {
                PackError::InvalidSetting {
                    key: "language",
                    reason: format!("{}: expected hbo or grc, got {code:?}", self.id),
                }
            })?),
            _ => None,
        };
        Ok(builders::from_kind(self.kind, self.input.clone(), language, self.source.clone()))
    }

    pub fn metadata(&self, builder: &dyn Builder) -> PackMetadata {
        PackMetadata {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| self.id.clone()),
            version: self.version.clone(),
            pack_type: builder.pack_type(),
            license: self.license.clone(),
            attribution: self.attribution.clone(),
            language: self.language.clone(),
        }
    }

    pub fn output_path(&self, settings: &Settings) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| settings.output_dir.join(format!("{}.sqlite", self.id)))
    }
}
