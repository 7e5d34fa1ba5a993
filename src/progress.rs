//! Row-count spinners for long CSV scans.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// A spinner that counts rows while a file is streamed.
///
/// indicatif hides the bar on its own when stderr is not a terminal, so
/// callers can tick unconditionally.
pub(crate) fn row_spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {msg}: {human_pos} rows ({per_sec})",
    ) {
        bar.set_style(style);
    }
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
