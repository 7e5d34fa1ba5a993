#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::PathBuf;

use oistats::join::Manifest;
use oistats::layout::Subset;
use oistats::table::from_csv_str;
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A Flickr-style numeric photo id.
pub fn arb_flickr_id() -> impl Strategy<Value = String> {
    "[1-9][0-9]{0,10}"
}

/// Free text without tabs, newlines or quotes.
pub fn arb_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ,.%+-]{0,16}"
}

/// A static URL for a photo id, in one of the shapes Flickr serves.
pub fn arb_static_url(id: String) -> impl Strategy<Value = String> {
    (1u32..9, 1u32..9999, "[0-9a-f]{10}", prop::bool::ANY).prop_map(
        move |(farm, server, secret, original)| {
            let size = if original { "_o" } else { "" };
            format!("https://farm{farm}.staticflickr.com/{server}/{id}_{secret}{size}.jpg")
        },
    )
}

/// Distinct ids, split into those with external metadata and those without.
pub fn arb_key_split(max: usize) -> impl Strategy<Value = (Vec<String>, BTreeSet<String>)> {
    btree_set(arb_flickr_id(), 1..=max).prop_flat_map(|ids| {
        let ids: Vec<String> = ids.into_iter().collect();
        let n = ids.len();
        (Just(ids), vec(prop::bool::ANY, n)).prop_map(|(ids, known)| {
            let matched: BTreeSet<String> = ids
                .iter()
                .zip(&known)
                .filter(|(_, k)| **k)
                .map(|(id, _)| id.clone())
                .collect();
            (ids, matched)
        })
    })
}

/// A manifest whose rows carry the given ids in their `OriginalURL`.
pub fn manifest_for(subset: Subset, ids: &[String], titles: &[String]) -> Manifest {
    let mut csv = String::from("ImageID,OriginalURL,Title\n");
    for (i, id) in ids.iter().enumerate() {
        let title = titles.get(i).map(String::as_str).unwrap_or("");
        csv.push_str(&format!(
            "img{i},https://farm1.staticflickr.com/1/{id}_cafebabe_o.jpg,\"{title}\"\n"
        ));
    }
    Manifest {
        subset,
        path: PathBuf::from(format!("{subset}.csv")),
        table: from_csv_str(&csv).expect("generated manifest parses"),
    }
}
