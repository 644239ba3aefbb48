use mongodb::bson::{Bson, doc};
use xrpl_miner_dashboard::error::ApiError;
use xrpl_miner_dashboard::services::query::{Operation, QueryOutcome, QueryRequest};

#[test]
fn every_wire_verb_parses() {
    assert_eq!(Operation::parse("find").unwrap(), Operation::Find);
    assert_eq!(Operation::parse("findOne").unwrap(), Operation::FindOne);
    assert_eq!(Operation::parse("count").unwrap(), Operation::Count);
    assert_eq!(Operation::parse("aggregate").unwrap(), Operation::Aggregate);
    assert_eq!(Operation::parse("insertOne").unwrap(), Operation::InsertOne);
    assert_eq!(Operation::parse("updateOne").unwrap(), Operation::UpdateOne);
    assert_eq!(Operation::parse("deleteOne").unwrap(), Operation::DeleteOne);
}

#[test]
fn unknown_verbs_are_rejected_not_defaulted() {
    match Operation::parse("dropDatabase") {
        Err(ApiError::UnsupportedOperation(op)) => assert_eq!(op, "dropDatabase"),
        other => panic!("expected UnsupportedOperation, got {other:?}"),
    }
    // Casing matters on the wire.
    assert!(Operation::parse("FIND").is_err());
}

#[test]
fn verbs_round_trip_through_their_wire_spelling() {
    for verb in [
        "find",
        "findOne",
        "count",
        "aggregate",
        "insertOne",
        "updateOne",
        "deleteOne",
    ] {
        assert_eq!(Operation::parse(verb).unwrap().as_str(), verb);
    }
}

#[test]
fn request_defaults_to_find_with_no_constraints() {
    let req = QueryRequest::default();
    assert_eq!(req.operation, Operation::Find);
    assert!(req.filter.is_empty());
    assert!(req.pipeline.is_empty());
    assert_eq!(req.limit, None);
    assert_eq!(req.skip, None);
}

#[test]
fn outcome_size_counts_rows() {
    assert_eq!(
        QueryOutcome::Documents(vec![doc! {}, doc! {}, doc! {}]).size(),
        3
    );
    assert_eq!(QueryOutcome::MaybeDocument(Some(doc! {})).size(), 1);
    assert_eq!(QueryOutcome::MaybeDocument(None).size(), 0);
    assert_eq!(QueryOutcome::Count(42).size(), 42);
    assert_eq!(
        QueryOutcome::Inserted {
            id: Bson::String("abc".to_string())
        }
        .size(),
        1
    );
    assert_eq!(
        QueryOutcome::Updated {
            matched: 5,
            modified: 2
        }
        .size(),
        2
    );
    assert_eq!(QueryOutcome::Deleted { count: 1 }.size(), 1);
}
