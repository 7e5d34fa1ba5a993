//! Open Images file layout.
//!
//! The dataset is distributed as one set of CSV files per subset. Which
//! files are read depends on whether the image-level labels or the
//! bounding-box annotations are being examined.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// One of the dataset partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    Train,
    Validation,
    Test,
}

impl Subset {
    /// All subsets, in processing order.
    pub const ALL: [Subset; 3] = [Subset::Train, Subset::Validation, Subset::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Validation => "validation",
            Subset::Test => "test",
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which annotation flavour of the dataset to read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Annotations {
    /// Human-verified image-level labels.
    #[default]
    ImageLevel,
    /// Bounding-box annotations (the "boxable" subset).
    Boxes,
}

impl Annotations {
    /// Labels file for a subset (one row per label assignment).
    pub fn labels_file(&self, subset: Subset) -> String {
        match self {
            Annotations::ImageLevel => format!("{}-annotations-human-imagelabels.csv", subset),
            Annotations::Boxes => format!("{}-annotations-bbox.csv", subset),
        }
    }

    /// Image-id file for a subset (one row per image, with URLs and sizes).
    pub fn image_ids_file(&self, subset: Subset) -> String {
        match (self, subset) {
            (Annotations::ImageLevel, Subset::Train) => {
                "train-images-with-labels-with-rotation.csv".to_string()
            }
            (Annotations::Boxes, Subset::Train) => {
                "train-images-boxable-with-rotation.csv".to_string()
            }
            (_, subset) => format!("{}-images-with-rotation.csv", subset),
        }
    }

    /// Header-less `code,name` lookup for label codes.
    pub fn class_descriptions_file(&self) -> &'static str {
        match self {
            Annotations::ImageLevel => "class-descriptions.csv",
            Annotations::Boxes => "class-descriptions-boxable.csv",
        }
    }
}

/// Manifest file the YFCC100M join reads for a subset.
pub fn manifest_file(subset: Subset) -> String {
    Annotations::ImageLevel.image_ids_file(subset)
}

/// Inserts `-extended` between a file's stem and its extension.
///
/// Only the file name changes; parent directories are left alone.
pub fn extended_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-extended.{}", stem, ext.to_string_lossy()),
        None => format!("{}-extended", stem),
    };
    path.with_file_name(name)
}
