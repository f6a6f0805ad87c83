use std::fmt;

use thiserror::Error;

use crate::data::columns::CanonicalField;

/// Batch-level failures. Nothing is produced when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("missing columns: {} (headers present: {})", FieldList(.missing), .present.join(", "))]
    MissingColumns {
        missing: Vec<CanonicalField>,
        present: Vec<String>,
    },
}

/// Why a single row was dropped during normalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("empty subject")]
    EmptySubject,

    #[error("unparseable date: {0:?}")]
    UnparseableDate(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

struct FieldList<'a>(&'a [CanonicalField]);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}
