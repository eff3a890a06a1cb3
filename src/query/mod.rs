//! Query classification, execution and result formatting.
//!
//! This module sits between the session controller and the database gateway:
//! it decides whether SQL takes the read or the write path, runs it, and turns
//! read results into a display table.

mod classifier;
mod executor;
mod table;

pub use classifier::{classify, classify_loose, classify_strict};
pub use executor::{ExecutionOutcome, QueryExecutor};
pub use table::DisplayTable;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which gateway path a statement takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Produces a result set.
    Read,
    /// Produces an affected-row count.
    Write,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// How submitted SQL is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    /// Keyword heuristic: leading `select`, or `show`/`describe` anywhere.
    #[default]
    Loose,
    /// Parse with the backend's SQL dialect; falls back to `Loose` on parse errors.
    Strict,
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loose => write!(f, "loose"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for ClassificationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loose" => Ok(Self::Loose),
            "strict" => Ok(Self::Strict),
            _ => Err(format!(
                "Invalid classification mode: {s}. Expected: loose or strict"
            )),
        }
    }
}
