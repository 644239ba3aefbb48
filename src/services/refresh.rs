use std::collections::HashSet;

use mongodb::bson::Document;

/// Diff two successive snapshots of a polled result set by primary key,
/// returning the rows that appeared in `next` but not in `prev`. The
/// dashboard polls the read endpoints on a fixed interval and highlights
/// additions; the comparison itself is UI-independent and lives here.
///
/// Rows without the key field never count as new (there is nothing stable
/// to compare them by across polls).
pub fn new_rows<'a>(prev: &[Document], next: &'a [Document], key: &str) -> Vec<&'a Document> {
    let seen: HashSet<String> = prev.iter().filter_map(|d| key_of(d, key)).collect();

    next.iter()
        .filter(|d| match key_of(d, key) {
            Some(k) => !seen.contains(&k),
            None => false,
        })
        .collect()
}

fn key_of(doc: &Document, key: &str) -> Option<String> {
    doc.get(key).map(|b| b.to_string())
}
