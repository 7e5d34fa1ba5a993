//! Fuzz target for manifest CSV parsing and join-key extraction.
//!
//! This fuzzer feeds arbitrary byte sequences to the CSV table reader and
//! extracts a Flickr id from every `OriginalURL` it finds, checking for
//! panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use oistats::ident::extract_image_id;
use oistats::table::{rows_from_slice, CsvFormat};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(rows) = rows_from_slice(data, CsvFormat::CSV) else {
        return;
    };
    for row in rows.flatten() {
        if let Some(url) = row.get("OriginalURL") {
            let _ = extract_image_id(url);
        }
    }
});
