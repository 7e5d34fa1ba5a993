//! Fuzz target for YFCC100M TSV parsing.
//!
//! Feeds arbitrary bytes through the fixed-layout dataset reader into a
//! small join index.

#![no_main]

use std::path::PathBuf;

use libfuzzer_sys::fuzz_target;
use oistats::join::{Joiner, Manifest, YFCC100M_DATASET};
use oistats::layout::Subset;
use oistats::table::{from_csv_str, rows_from_slice};

const MANIFEST: &str = "ImageID,OriginalURL\na,https://x/1/1_s.jpg\nb,https://x/1/2_s.jpg\n";

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(table) = from_csv_str(MANIFEST) else {
        return;
    };
    let manifest = Manifest {
        subset: Subset::Train,
        path: PathBuf::from("train.csv"),
        table,
    };
    let Ok(mut joiner) = Joiner::new(vec![manifest], &[&YFCC100M_DATASET]) else {
        return;
    };
    let Ok(rows) = rows_from_slice(data, YFCC100M_DATASET.format()) else {
        return;
    };
    let _ = joiner.absorb(&YFCC100M_DATASET, rows);
    let _ = joiner.finish();
});
