//! YFCC100M metadata files.
//!
//! Both files are header-less and tab-separated, with a fixed column
//! layout. Values are URL-encoded upstream, so quoting is disabled.

use crate::table::CsvFormat;

/// Column every external source is keyed by.
pub const KEY_COLUMN: &str = "ID";

/// A large external table streamed once per join.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExternalSource {
    /// Name used in logs and reports.
    pub name: &'static str,
    /// File name inside the YFCC100M directory.
    pub file_name: &'static str,
    /// Column layout, including [`KEY_COLUMN`].
    pub columns: &'static [&'static str],
}

impl ExternalSource {
    /// Columns merged into matching manifest rows (all but the key).
    pub fn value_columns(&self) -> impl Iterator<Item = &'static str> {
        let columns: &'static [&'static str] = self.columns;
        columns.iter().copied().filter(|c| *c != KEY_COLUMN)
    }

    pub fn format(&self) -> CsvFormat<'static> {
        CsvFormat::tsv(self.columns)
    }
}

/// The 100M-row photo/video metadata file.
pub const YFCC100M_DATASET: ExternalSource = ExternalSource {
    name: "YFCC100M Dataset",
    file_name: "yfcc100m_dataset",
    columns: &[
        "LineNumber",
        "ID",
        "Hash",
        "UserNSID",
        "UserNickname",
        "DateTaken",
        "DateUploaded",
        "CaptureDevice",
        "Title",
        "Description",
        "UserTags",
        "MachineTags",
        "Longitude",
        "Latitude",
        "LongLatAcc",
        "PageURL",
        "DownloadURL",
        "LicenseName",
        "LicenseURL",
        "ServerIdentifier",
        "FarmIdentifier",
        "Secret",
        "OriginalSecret",
        "OriginalExtension",
        "Video",
    ],
};

/// Reverse-geocoded place names, keyed by photo id.
pub const YFCC100M_PLACES: ExternalSource = ExternalSource {
    name: "YFCC100M Places",
    file_name: "yfcc100m_places",
    columns: &["ID", "PlacesInfo"],
};
