//! Joining Open Images manifests to YFCC100M metadata.
//!
//! Open Images photos come from Flickr, and so does YFCC100M. The Flickr
//! photo id in each manifest row's `OriginalURL` links the two, so a join
//! can enrich the manifests with titles, tags, geotags and place names.
//!
//! # Algorithm
//!
//! 1. Load the three manifests and index every row by its Flickr id.
//!    Each row is copied into a new extended record carrying a blank
//!    placeholder for every column the external sources can supply.
//! 2. Stream each external source exactly once. For every external row
//!    whose id is indexed, copy its values (all but the id) into the
//!    placeholders of every subset holding that id. A later source
//!    overwrites columns an earlier one also supplied.
//! 3. Keep only the records that matched at least once, in manifest order.
//!
//! Output columns come from the manifest header plus the source layouts,
//! so a subset without a single match still gets a header-only file.

mod report;
mod source;

pub use report::{JoinReport, SourceJoinSummary, SubsetJoinSummary};
pub use source::{ExternalSource, KEY_COLUMN, YFCC100M_DATASET, YFCC100M_PLACES};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::OistatsError;
use crate::ident::extract_image_id;
use crate::layout::{extended_path, manifest_file, Subset};
use crate::progress::row_spinner;
use crate::table::{open_rows, read_table, write_csv, CsvFormat, Row, Schema, Table};

/// Manifest column holding the Flickr static URL.
pub const URL_COLUMN: &str = "OriginalURL";

/// Which external sources to join.
#[derive(Clone, Copy, Debug)]
pub struct JoinOptions {
    /// Join `yfcc100m_dataset`.
    pub dataset: bool,
    /// Join `yfcc100m_places`.
    pub places: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            dataset: true,
            places: true,
        }
    }
}

impl JoinOptions {
    /// Enabled sources, in join order.
    pub fn sources(&self) -> Vec<&'static ExternalSource> {
        let mut sources = Vec::new();
        if self.dataset {
            sources.push(&YFCC100M_DATASET);
        }
        if self.places {
            sources.push(&YFCC100M_PLACES);
        }
        sources
    }
}

/// A loaded manifest and where it came from.
#[derive(Clone, Debug)]
pub struct Manifest {
    pub subset: Subset,
    pub path: PathBuf,
    pub table: Table,
}

/// Extended records of one subset, ready to be written.
#[derive(Clone, Debug)]
pub struct JoinedSubset {
    pub subset: Subset,
    /// The manifest the records came from.
    pub path: PathBuf,
    /// Output header.
    pub columns: Vec<String>,
    /// Matched records, in manifest order.
    pub rows: Vec<Vec<String>>,
    pub manifest_rows: usize,
    pub duplicate_keys: usize,
}

impl JoinedSubset {
    pub fn summary(&self, output: Option<PathBuf>) -> SubsetJoinSummary {
        SubsetJoinSummary {
            subset: self.subset,
            manifest_rows: self.manifest_rows,
            duplicate_keys: self.duplicate_keys,
            matched_rows: self.rows.len(),
            output,
        }
    }
}

/// Extended records of one subset, indexed by key.
#[derive(Debug)]
struct SubsetIndex {
    subset: Subset,
    path: PathBuf,
    schema: Arc<Schema>,
    /// One record per distinct key, in first-appearance order.
    records: Vec<Vec<String>>,
    matched: Vec<bool>,
    /// Record position of every manifest row, in manifest order.
    order: Vec<usize>,
    positions: HashMap<String, usize>,
    manifest_rows: usize,
    duplicate_keys: usize,
}

impl SubsetIndex {
    fn build(manifest: Manifest, sources: &[&ExternalSource]) -> Result<Self, OistatsError> {
        let Manifest {
            subset,
            path,
            table,
        } = manifest;
        let url_column = table.schema.require(URL_COLUMN, &path)?;

        let mut columns: Vec<String> = table.schema.columns().to_vec();
        for source in sources {
            for column in source.value_columns() {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
        }
        let schema = Arc::new(Schema::new(columns));

        // Manifest columns that double as placeholders start out blank.
        let blanked: Vec<usize> = sources
            .iter()
            .flat_map(|s| s.value_columns())
            .filter_map(|c| table.schema.position(c))
            .collect();

        let manifest_rows = table.rows.len();
        let mut index = SubsetIndex {
            subset,
            path,
            schema,
            records: Vec::with_capacity(manifest_rows),
            matched: Vec::with_capacity(manifest_rows),
            order: Vec::with_capacity(manifest_rows),
            positions: HashMap::with_capacity(manifest_rows),
            manifest_rows,
            duplicate_keys: 0,
        };

        for row in table.rows {
            let key = extract_image_id(&row.values()[url_column]).to_string();

            let mut record = row.into_values();
            record.resize(index.schema.len(), String::new());
            for &i in &blanked {
                record[i].clear();
            }

            match index.positions.get(&key) {
                Some(&pos) => {
                    warn!(
                        subset = %subset,
                        key = %key,
                        "duplicate key in manifest, keeping the later row"
                    );
                    index.records[pos] = record;
                    index.order.push(pos);
                    index.duplicate_keys += 1;
                }
                None => {
                    let pos = index.records.len();
                    index.positions.insert(key, pos);
                    index.records.push(record);
                    index.matched.push(false);
                    index.order.push(pos);
                }
            }
        }

        Ok(index)
    }

    /// Copy an external row's values into the record for `key`, if any.
    fn merge(&mut self, key: &str, row: &Row) -> bool {
        let Some(&pos) = self.positions.get(key) else {
            return false;
        };

        let record = &mut self.records[pos];
        for (column, value) in row.iter() {
            if column == KEY_COLUMN {
                continue;
            }
            if let Some(i) = self.schema.position(column) {
                record[i].clear();
                record[i].push_str(value);
            }
        }
        self.matched[pos] = true;
        true
    }

    fn finish(self) -> JoinedSubset {
        // A repeated key emits its latest record once per manifest row.
        let rows = self
            .order
            .iter()
            .filter(|&&pos| self.matched[pos])
            .map(|&pos| self.records[pos].clone())
            .collect();

        JoinedSubset {
            subset: self.subset,
            path: self.path,
            columns: self.schema.columns().to_vec(),
            rows,
            manifest_rows: self.manifest_rows,
            duplicate_keys: self.duplicate_keys,
        }
    }
}

/// In-memory join of manifests against streamed external rows.
///
/// Build it with every manifest and every source that will be absorbed, so
/// each subset's output header covers all source columns. Columns of an
/// absorbed row that were not registered are ignored.
///
/// # Example
/// ```
/// use std::path::PathBuf;
/// use oistats::join::{Joiner, Manifest, YFCC100M_PLACES};
/// use oistats::layout::Subset;
/// use oistats::table::{from_csv_str, rows_from_slice};
///
/// let table = from_csv_str("ImageID,OriginalURL\nabc,https://x/1/42_s_o.jpg\n")?;
/// let manifest = Manifest { subset: Subset::Test, path: PathBuf::from("test.csv"), table };
///
/// let mut joiner = Joiner::new(vec![manifest], &[&YFCC100M_PLACES])?;
/// let places = rows_from_slice(b"42\tParis\n", YFCC100M_PLACES.format())?;
/// joiner.absorb(&YFCC100M_PLACES, places)?;
///
/// let joined = joiner.finish();
/// assert_eq!(joined[0].columns, ["ImageID", "OriginalURL", "PlacesInfo"]);
/// assert_eq!(joined[0].rows[0][2], "Paris");
/// # Ok::<(), oistats::OistatsError>(())
/// ```
#[derive(Debug)]
pub struct Joiner {
    subsets: Vec<SubsetIndex>,
}

impl Joiner {
    /// Index every manifest row by the Flickr id in its `OriginalURL`.
    ///
    /// # Errors
    /// Fails if a manifest has no `OriginalURL` column.
    pub fn new(manifests: Vec<Manifest>, sources: &[&ExternalSource]) -> Result<Self, OistatsError> {
        let subsets = manifests
            .into_iter()
            .map(|m| SubsetIndex::build(m, sources))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { subsets })
    }

    /// Stream one external source through the index.
    ///
    /// # Errors
    /// Propagates row errors, and fails if a row has no `ID` column.
    pub fn absorb<I>(
        &mut self,
        source: &ExternalSource,
        rows: I,
    ) -> Result<SourceJoinSummary, OistatsError>
    where
        I: IntoIterator<Item = Result<Row, OistatsError>>,
    {
        let mut summary = SourceJoinSummary {
            source: source.name.to_string(),
            rows_scanned: 0,
            rows_matched: 0,
        };

        for row in rows {
            let row = row?;
            summary.rows_scanned += 1;

            let key = row.get(KEY_COLUMN).ok_or_else(|| OistatsError::MissingColumn {
                path: PathBuf::from(source.file_name),
                column: KEY_COLUMN.to_string(),
            })?;

            let mut hit = false;
            for subset in &mut self.subsets {
                hit |= subset.merge(key, &row);
            }
            if hit {
                summary.rows_matched += 1;
            }
        }

        debug!(
            source = source.name,
            scanned = summary.rows_scanned,
            matched = summary.rows_matched,
            "absorbed external source"
        );
        Ok(summary)
    }

    /// Keep only matched rows, per subset, in manifest order.
    pub fn finish(self) -> Vec<JoinedSubset> {
        self.subsets.into_iter().map(SubsetIndex::finish).collect()
    }
}

/// Join the Open Images manifests in `labels_dir` to the YFCC100M files in
/// `yfcc_dir`.
///
/// Writes one `*-extended.csv` per subset next to its manifest, holding
/// only the rows that matched at least one source.
///
/// # Errors
/// Fails if a manifest or enabled source is missing or unparsable, or if
/// an output file cannot be written.
pub fn join_yfcc(
    labels_dir: &Path,
    yfcc_dir: &Path,
    opts: &JoinOptions,
) -> Result<JoinReport, OistatsError> {
    info!("Building dictionary mapping Flickr ID to OpenImages ID");
    let mut manifests = Vec::with_capacity(Subset::ALL.len());
    for subset in Subset::ALL {
        info!("Loading {}", subset);
        let path = labels_dir.join(manifest_file(subset));
        let table = read_table(&path, CsvFormat::CSV)?;
        manifests.push(Manifest {
            subset,
            path,
            table,
        });
    }

    let sources = opts.sources();
    let mut joiner = Joiner::new(manifests, &sources)?;

    let mut report = JoinReport::default();
    for source in &sources {
        info!("Matching Open Images to {}", source.name);
        let stream = open_rows(&yfcc_dir.join(source.file_name), source.format())?;
        let bar = row_spinner(source.name);
        let summary = joiner.absorb(source, stream.inspect(|_| bar.inc(1)))?;
        bar.finish_and_clear();
        report.sources.push(summary);
    }

    info!("Writing results to file");
    for joined in joiner.finish() {
        let output = extended_path(&joined.path);
        write_csv(
            &output,
            &joined.columns,
            joined.rows.iter().map(Vec::as_slice),
        )?;
        info!(
            subset = %joined.subset,
            rows = joined.rows.len(),
            "wrote {}",
            output.display()
        );
        report.subsets.push(joined.summary(Some(output)));
    }

    Ok(report)
}
