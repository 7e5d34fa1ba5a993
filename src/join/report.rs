//! Join report types.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::layout::Subset;

/// Outcome of a YFCC100M join.
#[derive(Clone, Debug, Default, Serialize)]
pub struct JoinReport {
    pub subsets: Vec<SubsetJoinSummary>,
    pub sources: Vec<SourceJoinSummary>,
}

/// What happened to one subset's manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubsetJoinSummary {
    pub subset: Subset,
    /// Rows read from the manifest, duplicates included.
    pub manifest_rows: usize,
    /// Rows whose key had already been seen in this manifest.
    pub duplicate_keys: usize,
    /// Rows written to the extended file.
    pub matched_rows: usize,
    /// The extended file, once written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// What happened while streaming one external source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceJoinSummary {
    pub source: String,
    pub rows_scanned: u64,
    /// Rows whose key matched a manifest row in at least one subset.
    pub rows_matched: u64,
}

impl fmt::Display for JoinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Join completed")?;

        if !self.sources.is_empty() {
            writeln!(f)?;
            writeln!(f, "Sources:")?;
            for s in &self.sources {
                writeln!(
                    f,
                    "  {:<18} {:>12} scanned  {:>10} matched",
                    s.source, s.rows_scanned, s.rows_matched
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Subsets:")?;
        for s in &self.subsets {
            write!(
                f,
                "  {:<12} {:>10} of {:>10} rows matched",
                s.subset, s.matched_rows, s.manifest_rows
            )?;
            if s.duplicate_keys > 0 {
                write!(f, " ({} duplicate key(s))", s.duplicate_keys)?;
            }
            writeln!(f)?;
            if let Some(output) = &s.output {
                writeln!(f, "    -> {}", output.display())?;
            }
        }

        Ok(())
    }
}
