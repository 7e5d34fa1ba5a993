//! Stats report types and terminal formatting.
//!
//! Reports render as boxed text (Display) or serialize as JSON.

use serde::Serialize;
use std::fmt;

use super::{ClassCounts, ImageCounts};
use crate::layout::Subset;

/// Inner width of the report boxes, in characters.
const BOX_WIDTH: usize = 59;

/// Per-label counts, sorted by total descending then label.
#[derive(Clone, Debug, Serialize)]
pub struct ClassCountsReport {
    /// Whether labels are human-readable names rather than codes.
    pub human_readable: bool,
    /// Number of distinct labels.
    pub total_labels: usize,
    /// Number of label rows across all subsets.
    pub total_rows: usize,
    /// One entry per label.
    pub entries: Vec<ClassCountEntry>,
    /// Display-only: how many labels to draw.
    #[serde(skip)]
    pub(crate) top_n: usize,
    /// Display-only: histogram bar width.
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

/// Counts for a single label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassCountEntry {
    pub label: String,
    pub train: usize,
    pub validation: usize,
    pub test: usize,
    pub total: usize,
}

/// Image counts, per subset or as a grand total.
#[derive(Clone, Debug, Serialize)]
pub struct ImageCountsReport {
    /// Present only when per-subset counts were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_subset: Option<Vec<SubsetCount>>,
    pub total: usize,
}

/// Image count for one subset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubsetCount {
    pub subset: Subset,
    pub images: usize,
}

/// Bytes needed to download every original image.
#[derive(Clone, Debug, Serialize)]
pub struct DownloadSizeReport {
    pub bytes: u64,
    pub human: String,
}

impl ClassCountsReport {
    /// Builds a report from raw counts.
    pub fn new(counts: &ClassCounts, human_readable: bool) -> Self {
        let mut entries: Vec<ClassCountEntry> = counts
            .iter()
            .map(|(label, per_subset)| {
                let get = |s: Subset| per_subset.get(&s).copied().unwrap_or(0);
                let (train, validation, test) =
                    (get(Subset::Train), get(Subset::Validation), get(Subset::Test));
                ClassCountEntry {
                    label: label.clone(),
                    train,
                    validation,
                    test,
                    total: train + validation + test,
                }
            })
            .collect();

        entries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));

        Self {
            human_readable,
            total_labels: entries.len(),
            total_rows: entries.iter().map(|e| e.total).sum(),
            entries,
            top_n: 20,
            bar_width: 12,
        }
    }

    /// Sets how many labels the text rendering shows.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

impl ImageCountsReport {
    pub fn new(counts: &ImageCounts) -> Self {
        match counts {
            ImageCounts::PerSubset(map) => Self {
                per_subset: Some(
                    map.iter()
                        .map(|(&subset, &images)| SubsetCount { subset, images })
                        .collect(),
                ),
                total: map.values().sum(),
            },
            ImageCounts::Total(total) => Self {
                per_subset: None,
                total: *total,
            },
        }
    }
}

impl DownloadSizeReport {
    pub fn new(bytes: u64) -> Self {
        Self {
            bytes,
            human: format_bytes(bytes),
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for ClassCountsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = if self.total_labels > self.top_n {
            format!("Classes (top {} of {})", self.top_n, self.total_labels)
        } else {
            format!("Classes ({})", self.total_labels)
        };
        box_top(f, &header)?;
        box_blank(f)?;

        if self.entries.is_empty() {
            box_line(f, "  No labels found.")?;
        } else {
            box_line(
                f,
                &format!(
                    "  {:<16} {:>8} {:>8} {:>8}",
                    "label", "train", "val", "test"
                ),
            )?;
            let max_total = self.entries.iter().map(|e| e.total).max().unwrap_or(1);
            for entry in self.entries.iter().take(self.top_n) {
                box_line(
                    f,
                    &format!(
                        "  {:<16} {:>8} {:>8} {:>8} {}",
                        truncate_label(&entry.label, 16),
                        format_number(entry.train),
                        format_number(entry.validation),
                        format_number(entry.test),
                        render_bar(entry.total, max_total, self.bar_width)
                    ),
                )?;
            }
            let rest = self.entries.len().saturating_sub(self.top_n);
            if rest > 0 {
                box_line(f, &format!("  … and {} more", format_number(rest)))?;
            }
        }

        box_blank(f)?;
        box_line(
            f,
            &format!("  Label rows:  {:>12}", format_number(self.total_rows)),
        )?;
        box_blank(f)?;
        box_bottom(f)
    }
}

impl fmt::Display for ImageCountsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        box_top(f, "Images")?;
        box_blank(f)?;
        if let Some(per_subset) = &self.per_subset {
            for entry in per_subset {
                box_line(
                    f,
                    &format!(
                        "  {:<12} {:>12}",
                        format!("{}:", entry.subset),
                        format_number(entry.images)
                    ),
                )?;
            }
            box_blank(f)?;
        }
        box_line(
            f,
            &format!("  {:<12} {:>12}", "Total:", format_number(self.total)),
        )?;
        box_blank(f)?;
        box_bottom(f)
    }
}

impl fmt::Display for DownloadSizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        box_top(f, "Download Size")?;
        box_blank(f)?;
        box_line(
            f,
            &format!(
                "  {} bytes ({})",
                format_number_u64(self.bytes),
                self.human
            ),
        )?;
        box_blank(f)?;
        box_bottom(f)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn box_top(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let used = title.chars().count() + 3;
    writeln!(
        f,
        "┌─ {} {}┐",
        title,
        "─".repeat(BOX_WIDTH.saturating_sub(used))
    )
}

fn box_bottom(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "└{}┘", "─".repeat(BOX_WIDTH))
}

fn box_blank(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    box_line(f, "")
}

/// Write one boxed line, padding by visible character count.
fn box_line(f: &mut fmt::Formatter<'_>, content: &str) -> fmt::Result {
    let padding = BOX_WIDTH.saturating_sub(content.chars().count());
    writeln!(f, "│{}{}│", content, " ".repeat(padding))
}

/// Format a number with thousands separators.
pub(crate) fn format_number(n: usize) -> String {
    format_number_u64(n as u64)
}

fn format_number_u64(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a byte count with binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }

    let filled = (count * width) / max_count;
    let filled = filled.min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GiB");
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(5, 10, 10), "█████░░░░░");
        assert_eq!(render_bar(10, 10, 10), "██████████");
        assert_eq!(render_bar(0, 10, 10), "░░░░░░░░░░");
    }

    #[test]
    fn test_truncate_label_is_char_aware() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("verylonglabel", 10), "verylongl…");
        assert_eq!(truncate_label("Crème brûlée dessert", 6), "Crème…");
    }

    #[test]
    fn test_class_report_sorting_and_totals() {
        let mut counts: ClassCounts = BTreeMap::new();
        counts.insert(
            "Cat".to_string(),
            BTreeMap::from([(Subset::Train, 3), (Subset::Test, 1)]),
        );
        counts.insert("Dog".to_string(), BTreeMap::from([(Subset::Train, 4)]));
        counts.insert("Ant".to_string(), BTreeMap::from([(Subset::Validation, 4)]));

        let report = ClassCountsReport::new(&counts, true);

        let labels: Vec<&str> = report.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Ant", "Cat", "Dog"]);
        assert_eq!(report.entries[1].test, 1);
        assert_eq!(report.total_rows, 12);
        assert_eq!(report.total_labels, 3);
    }

    #[test]
    fn test_class_report_display_truncates_to_top_n() {
        let mut counts: ClassCounts = BTreeMap::new();
        for i in 0..5 {
            counts.insert(format!("label{}", i), BTreeMap::from([(Subset::Train, i + 1)]));
        }
        let report = ClassCountsReport::new(&counts, false).with_top_n(2);
        let output = report.to_string();

        assert!(output.contains("Classes (top 2 of 5)"));
        assert!(output.contains("label4"));
        assert!(!output.contains("label0"));
        assert!(output.contains("and 3 more"));
    }

    #[test]
    fn test_boxed_lines_have_equal_width() {
        let report = ImageCountsReport::new(&ImageCounts::PerSubset(BTreeMap::from([
            (Subset::Train, 1_000_000),
            (Subset::Validation, 41_620),
            (Subset::Test, 125_436),
        ])));
        let output = report.to_string();
        let widths: Vec<usize> = output.lines().map(|l| l.chars().count()).collect();

        assert!(widths.iter().all(|&w| w == BOX_WIDTH + 2), "{:?}", widths);
        assert!(output.contains("1,167,056"));
    }

    #[test]
    fn test_image_report_json_omits_subsets_for_total() {
        let report = ImageCountsReport::new(&ImageCounts::Total(7));
        let json = serde_json::to_string(&report).expect("serialize");
        assert_eq!(json, r#"{"total":7}"#);
    }

    #[test]
    fn test_download_report() {
        let report = DownloadSizeReport::new(2048);
        assert_eq!(report.human, "2.00 KiB");
        assert!(report.to_string().contains("2,048 bytes"));
    }
}
