use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = PackError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("invalid reference format: {0:?}")]
    InvalidReferenceFormat(String),

    #[error("structural mismatch in {location}: expected {expected}")]
    StructuralMismatch { location: String, expected: String },

    /// A hand-written entry the author must fix; never isolated to its file.
    #[error("malformed entry at {location}: {reason}")]
    MalformedEntry { location: String, reason: String },

    #[error("no records produced: {0}")]
    EmptyResultSet(String),

    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl PackError {
    pub fn structural(location: impl Into<String>, expected: impl Into<String>) -> Self {
        PackError::StructuralMismatch {
            location: location.into(),
            expected: expected.into(),
        }
    }

    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        PackError::MalformedEntry {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Errors that spoil one source file but leave sibling files usable.
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            PackError::StructuralMismatch { .. }
                | PackError::Io(_)
                | PackError::Json(_)
                | PackError::Xml(_)
                | PackError::XmlAttribute(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_errors_are_not_file_level() {
        assert!(PackError::structural("a.json", "a list").is_file_level());
        assert!(!PackError::malformed("a.json entry[1]", "no `to`").is_file_level());
        assert!(!PackError::InvalidReferenceFormat("Genesis one".into()).is_file_level());
    }
}
