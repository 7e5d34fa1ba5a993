//! Dataset statistics.
//!
//! Counts labels and images across the train, validation and test subsets,
//! and totals the bytes needed to download every original image. Each
//! function builds its result locally from a fresh scan of the files under
//! a root directory.

mod report;

pub use report::{
    format_bytes, ClassCountEntry, ClassCountsReport, DownloadSizeReport, ImageCountsReport,
    SubsetCount,
};

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::OistatsError;
use crate::layout::{Annotations, Subset};
use crate::progress::row_spinner;
use crate::table::{open_rows, CsvFormat, RowStream};

/// Label column of the per-subset labels files.
pub const LABEL_COLUMN: &str = "LabelName";
/// Id column of the per-subset image-id files.
pub const IMAGE_ID_COLUMN: &str = "ImageID";
/// Byte-size column of the per-subset image-id files.
pub const SIZE_COLUMN: &str = "OriginalSize";

/// label → subset → number of label rows.
pub type ClassCounts = BTreeMap<String, BTreeMap<Subset, usize>>;

/// Options for dataset statistics.
#[derive(Clone, Copy, Debug)]
pub struct StatsOptions {
    /// Key class counts by human-readable names instead of label codes.
    pub human_readable: bool,
    /// Report image counts per subset instead of a single total.
    pub per_subset: bool,
    /// Which annotation files to read.
    pub annotations: Annotations,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            human_readable: true,
            per_subset: false,
            annotations: Annotations::ImageLevel,
        }
    }
}

/// Image counts, shaped by [`StatsOptions::per_subset`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageCounts {
    PerSubset(BTreeMap<Subset, usize>),
    Total(usize),
}

impl ImageCounts {
    pub fn total(&self) -> usize {
        match self {
            ImageCounts::PerSubset(map) => map.values().sum(),
            ImageCounts::Total(total) => *total,
        }
    }
}

/// Count label rows per label and subset.
///
/// With `human_readable`, label codes are renamed through the class
/// description file (see [`remap_labels`]).
///
/// # Errors
/// Fails if a labels file is missing, unparsable or has no `LabelName`
/// column, or if the description file is needed and cannot be read.
pub fn class_counts(root: &Path, opts: &StatsOptions) -> Result<ClassCounts, OistatsError> {
    let mut counts = ClassCounts::new();

    for subset in Subset::ALL {
        info!("Loading CSVs for {}", subset);
        let path = root.join(opts.annotations.labels_file(subset));
        let stream = open_rows(&path, CsvFormat::CSV)?;
        count_labels(stream, subset, &mut counts)?;
    }

    if opts.human_readable {
        let path = root.join(opts.annotations.class_descriptions_file());
        let lookup = load_class_descriptions(&path)?;
        counts = remap_labels(counts, &lookup);
    }

    Ok(counts)
}

/// Add one subset's label rows to `counts`.
pub fn count_labels<R: Read>(
    stream: RowStream<R>,
    subset: Subset,
    counts: &mut ClassCounts,
) -> Result<(), OistatsError> {
    let column = stream.schema().require(LABEL_COLUMN, stream.path())?;
    let bar = row_spinner(format!("{} labels", subset));

    for row in stream {
        let row = row?;
        let label = row.into_values().swap_remove(column);
        *counts
            .entry(label)
            .or_default()
            .entry(subset)
            .or_insert(0) += 1;
        bar.inc(1);
    }

    bar.finish_and_clear();
    debug!(subset = %subset, rows = bar.position(), "counted labels");
    Ok(())
}

/// Load the header-less `code,name` class description file.
///
/// Pairs come back in first-appearance order of their code. A code listed
/// twice keeps its first position and its last name.
pub fn load_class_descriptions(path: &Path) -> Result<Vec<(String, String)>, OistatsError> {
    const COLUMNS: [&str; 2] = ["LabelName", "DisplayName"];

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for row in open_rows(path, CsvFormat::headerless(&COLUMNS))? {
        let mut values = row?.into_values().into_iter();
        let code = values.next().unwrap_or_default();
        let name = values.next().unwrap_or_default();

        match seen.get(&code) {
            Some(&i) => pairs[i].1 = name,
            None => {
                seen.insert(code.clone(), pairs.len());
                pairs.push((code, name));
            }
        }
    }

    Ok(pairs)
}

/// Rename label codes to human-readable names.
///
/// For each `(code, name)` pair in order, the counts under `code` move to
/// `name`. Codes with no counts are skipped rather than rejected, since a
/// description file lists classes that may never occur in the labels. When
/// two codes share a name the later pair overwrites the earlier one.
pub fn remap_labels(mut counts: ClassCounts, lookup: &[(String, String)]) -> ClassCounts {
    for (code, name) in lookup {
        if let Some(per_subset) = counts.remove(code) {
            counts.insert(name.clone(), per_subset);
        }
    }
    counts
}

/// Count images per subset, or in total.
///
/// # Errors
/// Fails if an image-id file is missing, unparsable or has no `ImageID`
/// column.
pub fn image_counts(root: &Path, opts: &StatsOptions) -> Result<ImageCounts, OistatsError> {
    let mut counts = BTreeMap::new();

    for subset in Subset::ALL {
        info!("Loading CSVs for {}", subset);
        let path = root.join(opts.annotations.image_ids_file(subset));
        let stream = open_rows(&path, CsvFormat::CSV)?;
        stream.schema().require(IMAGE_ID_COLUMN, &path)?;

        let bar = row_spinner(format!("{} images", subset));
        let mut images = 0usize;
        for row in stream {
            row?;
            images += 1;
            bar.inc(1);
        }
        bar.finish_and_clear();

        counts.insert(subset, images);
    }

    Ok(if opts.per_subset {
        ImageCounts::PerSubset(counts)
    } else {
        ImageCounts::Total(counts.values().sum())
    })
}

/// Total bytes of every original image, from the `OriginalSize` column.
///
/// # Errors
/// Fails if an image-id file is missing or unparsable, has no
/// `OriginalSize` column, or holds a value that is not a non-negative
/// integer.
pub fn download_size(root: &Path, opts: &StatsOptions) -> Result<u64, OistatsError> {
    let mut size = 0u64;

    for subset in Subset::ALL {
        info!("Reading {}", subset);
        let path = root.join(opts.annotations.image_ids_file(subset));
        let stream = open_rows(&path, CsvFormat::CSV)?;
        size += sum_sizes(stream)?;
    }

    Ok(size)
}

/// Sum the `OriginalSize` column of one image-id file.
pub fn sum_sizes<R: Read>(mut stream: RowStream<R>) -> Result<u64, OistatsError> {
    let column = stream.schema().require(SIZE_COLUMN, stream.path())?;
    let bar = row_spinner(format!("sizes in {}", stream.path().display()));
    let mut size = 0u64;

    while let Some(row) = stream.next() {
        let row = row?;
        let raw = &row.values()[column];
        let bytes: u64 = raw
            .trim()
            .parse()
            .map_err(|_| OistatsError::InvalidInteger {
                path: stream.path().to_path_buf(),
                line: stream.line(),
                column: SIZE_COLUMN.to_string(),
                value: raw.clone(),
            })?;
        size += bytes;
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{rows_from_slice, CsvFormat};

    fn labels_csv() -> &'static str {
        "ImageID,Source,LabelName,Confidence\n\
         a,verification,/m/01,1\n\
         a,verification,/m/02,1\n\
         b,verification,/m/01,0\n"
    }

    fn count(csv: &str, subset: Subset, counts: &mut ClassCounts) {
        let stream = rows_from_slice(csv.as_bytes(), CsvFormat::CSV).expect("open");
        count_labels(stream, subset, counts).expect("count");
    }

    #[test]
    fn test_count_labels_across_subsets() {
        let mut counts = ClassCounts::new();
        count(labels_csv(), Subset::Train, &mut counts);
        count("LabelName\n/m/02\n", Subset::Test, &mut counts);

        assert_eq!(counts["/m/01"][&Subset::Train], 2);
        assert_eq!(counts["/m/02"][&Subset::Train], 1);
        assert_eq!(counts["/m/02"][&Subset::Test], 1);
        // No zero entries for subsets a label never appears in.
        assert!(!counts["/m/01"].contains_key(&Subset::Test));
    }

    #[test]
    fn test_count_labels_missing_column() {
        let stream = rows_from_slice(b"ImageID\nx\n", CsvFormat::CSV).expect("open");
        let err = count_labels(stream, Subset::Train, &mut ClassCounts::new()).unwrap_err();
        assert!(matches!(err, OistatsError::MissingColumn { ref column, .. } if column == "LabelName"));
    }

    #[test]
    fn test_remap_labels_renames_every_code() {
        let mut counts = ClassCounts::new();
        count(labels_csv(), Subset::Validation, &mut counts);

        let lookup = vec![
            ("/m/01".to_string(), "Cat".to_string()),
            ("/m/02".to_string(), "Dog".to_string()),
            ("/m/99".to_string(), "Unused".to_string()),
        ];
        let remapped = remap_labels(counts, &lookup);

        assert_eq!(remapped.len(), 2);
        assert_eq!(remapped["Cat"][&Subset::Validation], 2);
        assert_eq!(remapped["Dog"][&Subset::Validation], 1);
        assert!(!remapped.contains_key("Unused"));
    }

    #[test]
    fn test_remap_labels_duplicate_target_last_wins() {
        let mut counts = ClassCounts::new();
        count(labels_csv(), Subset::Train, &mut counts);

        let lookup = vec![
            ("/m/01".to_string(), "Pet".to_string()),
            ("/m/02".to_string(), "Pet".to_string()),
        ];
        let remapped = remap_labels(counts, &lookup);

        assert_eq!(remapped.len(), 1);
        assert_eq!(remapped["Pet"][&Subset::Train], 1);
    }

    #[test]
    fn test_sum_sizes() {
        let csv = "ImageID,OriginalSize\na,100\nb, 250 \n";
        let stream = rows_from_slice(csv.as_bytes(), CsvFormat::CSV).expect("open");
        assert_eq!(sum_sizes(stream).expect("sum"), 350);
    }

    #[test]
    fn test_sum_sizes_invalid_integer() {
        let csv = "ImageID,OriginalSize\na,100\nb,lots\n";
        let stream = rows_from_slice(csv.as_bytes(), CsvFormat::CSV).expect("open");
        match sum_sizes(stream) {
            Err(OistatsError::InvalidInteger { line, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidInteger, got {:?}", other),
        }
    }

    #[test]
    fn test_image_counts_total() {
        let counts = ImageCounts::PerSubset(BTreeMap::from([
            (Subset::Train, 2),
            (Subset::Validation, 1),
            (Subset::Test, 0),
        ]));
        assert_eq!(counts.total(), 3);
        assert_eq!(ImageCounts::Total(9).total(), 9);
    }

    #[test]
    fn test_default_options() {
        let opts = StatsOptions::default();
        assert!(opts.human_readable);
        assert!(!opts.per_subset);
        assert_eq!(opts.annotations, Annotations::ImageLevel);
    }
}
