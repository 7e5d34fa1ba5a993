#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const IMAGE_HEADER: &str =
    "ImageID,Subset,OriginalURL,OriginalLandingURL,License,AuthorProfileURL,Author,Title,OriginalSize,OriginalMD5,Thumbnail300KURL,Rotation";

pub fn write_file(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write fixture file");
}

/// One image-manifest row in the Open Images column layout.
pub fn image_row(image_id: &str, subset: &str, flickr_id: &str, title: &str, size: u64) -> String {
    format!(
        "{image_id},{subset},https://farm1.staticflickr.com/1/{flickr_id}_abc_o.jpg,\
         https://www.flickr.com/photos/u/{flickr_id},https://creativecommons.org/licenses/by/2.0/,\
         https://www.flickr.com/people/u/,Someone,{title},{size},md5==,,0\n"
    )
}

/// A small image-level Open Images layout:
///
/// - train: 3 images, labels /m/cat x2, /m/dog x1, /m/tree x1
/// - validation: 2 images, labels /m/cat x1
/// - test: 1 image, labels /m/dog x2
pub fn write_stats_fixture(dir: &Path) {
    write_file(
        dir,
        "train-annotations-human-imagelabels.csv",
        "ImageID,Source,LabelName,Confidence\n\
         t1,verification,/m/cat,1\n\
         t1,verification,/m/tree,1\n\
         t2,verification,/m/cat,1\n\
         t3,verification,/m/dog,0\n",
    );
    write_file(
        dir,
        "validation-annotations-human-imagelabels.csv",
        "ImageID,Source,LabelName,Confidence\n\
         v1,verification,/m/cat,1\n",
    );
    write_file(
        dir,
        "test-annotations-human-imagelabels.csv",
        "ImageID,Source,LabelName,Confidence\n\
         e1,verification,/m/dog,1\n\
         e1,verification,/m/dog,1\n",
    );
    write_file(
        dir,
        "class-descriptions.csv",
        "/m/cat,Cat\n/m/dog,Dog\n/m/tree,Tree\n/m/unused,Unused\n",
    );

    let train = [
        image_row("t1", "train", "101", "one", 1000),
        image_row("t2", "train", "102", "two", 2000),
        image_row("t3", "train", "103", "three", 3000),
    ]
    .concat();
    let validation = [
        image_row("v1", "validation", "201", "four", 400),
        image_row("v2", "validation", "202", "five", 500),
    ]
    .concat();
    let test = image_row("e1", "test", "301", "six", 60);

    write_file(
        dir,
        "train-images-with-labels-with-rotation.csv",
        &format!("{IMAGE_HEADER}\n{train}"),
    );
    write_file(
        dir,
        "validation-images-with-rotation.csv",
        &format!("{IMAGE_HEADER}\n{validation}"),
    );
    write_file(
        dir,
        "test-images-with-rotation.csv",
        &format!("{IMAGE_HEADER}\n{test}"),
    );
}

/// A `yfcc100m_dataset` line with the given id, title and user tags.
pub fn yfcc_dataset_line(line: u64, id: &str, title: &str, tags: &str) -> String {
    let mut fields = vec![String::new(); 25];
    fields[0] = line.to_string();
    fields[1] = id.to_string();
    fields[2] = format!("hash{id}");
    fields[8] = title.to_string();
    fields[10] = tags.to_string();
    fields[24] = "0".to_string();
    fields.join("\t") + "\n"
}

/// YFCC100M files matching some of the ids written by [`write_stats_fixture`]:
/// train 101 and 103, validation 202. Nothing matches test.
pub fn write_yfcc_fixture(dir: &Path) {
    let dataset = [
        yfcc_dataset_line(1, "999", "Unrelated", ""),
        yfcc_dataset_line(2, "103", "Sunset", "sky,orange"),
        yfcc_dataset_line(3, "101", "Harbour", "boats"),
        yfcc_dataset_line(4, "202", "Mountain", ""),
    ]
    .concat();
    write_file(dir, "yfcc100m_dataset", &dataset);
    write_file(dir, "yfcc100m_places", "101\tOslo\n555\tNowhere\n");
}
