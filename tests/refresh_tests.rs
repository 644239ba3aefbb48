use mongodb::bson::doc;
use xrpl_miner_dashboard::services::refresh::new_rows;

#[test]
fn only_unseen_keys_count_as_new() {
    let prev = vec![doc! { "hash": "A" }, doc! { "hash": "B" }];
    let next = vec![
        doc! { "hash": "B" },
        doc! { "hash": "C" },
        doc! { "hash": "D" },
    ];

    let added = new_rows(&prev, &next, "hash");
    let hashes: Vec<&str> = added.iter().map(|d| d.get_str("hash").unwrap()).collect();
    assert_eq!(hashes, vec!["C", "D"]);
}

#[test]
fn identical_snapshots_yield_nothing() {
    let snapshot = vec![doc! { "hash": "A" }, doc! { "hash": "B" }];
    assert!(new_rows(&snapshot, &snapshot, "hash").is_empty());
}

#[test]
fn rows_without_the_key_are_never_new() {
    let prev: Vec<mongodb::bson::Document> = Vec::new();
    let next = vec![doc! { "other": 1 }, doc! { "hash": "A" }];

    let added = new_rows(&prev, &next, "hash");
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].get_str("hash"), Ok("A"));
}

#[test]
fn removed_rows_do_not_reappear_as_new() {
    let prev = vec![doc! { "hash": "A" }, doc! { "hash": "B" }];
    let next = vec![doc! { "hash": "A" }];
    assert!(new_rows(&prev, &next, "hash").is_empty());
}

#[test]
fn non_string_keys_work() {
    let prev = vec![doc! { "seq": 1i64 }];
    let next = vec![doc! { "seq": 1i64 }, doc! { "seq": 2i64 }];

    let added = new_rows(&prev, &next, "seq");
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].get_i64("seq"), Ok(2));
}
