use indoc::indoc;
use yaml_keys::{from_multiple, from_str, Documents, Error, Value};

#[test]
fn multiple_documents_one_no_markers() {
    let docs = from_multiple("name: John\n").expect("parse single doc as multi");
    assert_eq!(docs.len(), 1);
    assert!(docs[0].as_map().is_some());
}

#[test]
fn multiple_documents_one_with_markers() {
    let docs = from_multiple("---\nname: Jane\n...\n").expect("parse single doc delimited");
    assert_eq!(docs.len(), 1);
}

#[test]
fn multiple_documents_two_documents_in_order() {
    let yaml = indoc! {"
        ---
        value1
        ---
        [value2]
    "};
    let docs = from_multiple(yaml).expect("parse two docs");
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0], Value::from("value1"));
    assert_eq!(docs[1], Value::from(vec![Value::from("value2")]));
}

#[test]
fn empty_documents_decode_to_null() {
    let docs = from_multiple("---\n---\na\n").expect("parse");
    assert_eq!(docs, [Value::Null, Value::from("a")]);
}

#[test]
fn empty_input() {
    assert_eq!(from_multiple("").expect("empty stream"), Vec::<Value>::new());
    assert_eq!(from_str("").expect("empty input"), Value::Null);
    assert_eq!(from_str("# nothing here\n").expect("comment only"), Value::Null);
}

#[test]
fn from_str_rejects_second_document() {
    let err = from_str("a: 1\n---\nb: 2\n").expect_err("two documents");
    assert!(matches!(err, Error::MultipleDocuments { .. }), "got {err:?}");
    assert_eq!(err.location().map(|l| l.line()), Some(2));
}

#[test]
fn explicit_end_marker_alone_is_one_document() {
    let value = from_str("a: 1\n...\n").expect("single document with end marker");
    assert!(value.as_map().is_some());
}

#[test]
fn anchors_are_scoped_to_their_document() {
    let yaml = indoc! {"
        --- &shared {a: 1}
        --- *shared
    "};
    let err = from_multiple(yaml).expect_err("alias into previous document");
    assert!(
        matches!(err, Error::UnknownAnchor { .. } | Error::Scan { .. }),
        "got {err:?}"
    );
}

#[test]
fn duplicate_keys_are_checked_per_document() {
    let docs = from_multiple("a: 1\n---\na: 2\n").expect("same key in different documents");
    assert_eq!(docs.len(), 2);

    let mut iter = Documents::new("a: 1\n---\na: 2\na: 3\n---\nb: 1\n");
    assert!(iter.next().expect("first").is_ok());
    let err = iter.next().expect("second").expect_err("duplicate in second document");
    assert!(err.is_duplicate_key());
    assert_eq!(err.location().map(|l| l.line()), Some(4));
    assert!(iter.next().is_none(), "iteration stops after an error");
}
