use indoc::indoc;
use yaml_keys::{from_str, from_str_with_options, map_from_str, Error, Map, Value};

fn get<'a>(map: &'a Map, key: &str) -> Option<&'a Value> {
    map.get(&Value::from(key))
}

fn target(yaml: &str) -> Map {
    let root = map_from_str(yaml).expect("merge document must decode");
    match get(&root, "target") {
        Some(Value::Map(map)) => map.clone(),
        other => panic!("target must be a map, got {other:?}"),
    }
}

#[test]
fn explicit_key_beats_merged_key() {
    let map = map_from_str("{<<: {a: 1}, a: 2}").expect("decode");
    assert_eq!(map.len(), 1);
    assert_eq!(get(&map, "a"), Some(&Value::from(2)));

    // Position does not matter: the explicit key still wins when it comes first.
    let map = map_from_str("{a: 2, <<: {a: 1, b: 3}}").expect("decode");
    assert_eq!(get(&map, "a"), Some(&Value::from(2)));
    assert_eq!(get(&map, "b"), Some(&Value::from(3)));
}

#[test]
fn merge_expands_nested_mappings() {
    let yaml = indoc! {"
        base1: &B1 { a: 1, b: 2 }
        base2: &B2
          <<: { c: 3 }
          d: 4
        target:
          <<: [*B1, *B2]
          e: 5
    "};
    let expected = map_from_str("{a: 1, b: 2, c: 3, d: 4, e: 5}").unwrap();
    assert_eq!(target(yaml), expected);
}

#[test]
fn earlier_sources_win_within_a_sequence() {
    let yaml = indoc! {"
        base1: &B1 { a: 1, b: 2 }
        base2: &B2 { b: 20, c: 3 }
        target:
          <<: [*B1, *B2]
    "};
    let map = target(yaml);
    assert_eq!(get(&map, "a"), Some(&Value::from(1)));
    assert_eq!(get(&map, "b"), Some(&Value::from(2)));
    assert_eq!(get(&map, "c"), Some(&Value::from(3)));
}

#[test]
fn several_merge_keys_fold_in_document_order() {
    let yaml = indoc! {"
        target:
          <<: {a: first}
          <<: {a: second, b: second}
          c: own
    "};
    let map = target(yaml);
    assert_eq!(get(&map, "a"), Some(&Value::from("first")));
    assert_eq!(get(&map, "b"), Some(&Value::from("second")));
    assert_eq!(get(&map, "c"), Some(&Value::from("own")));
}

#[test]
fn merged_composite_keys_are_compared_structurally() {
    let yaml = indoc! {"
        base: &base
          {x: 1, y: 2}: merged
          [1, 2]: merged
        target:
          <<: *base
          {y: 2, x: 1}: own
    "};
    let map = target(yaml);
    assert_eq!(map.len(), 2);
    let key = from_str("{x: 1, y: 2}").unwrap();
    assert_eq!(map.get(&key), Some(&Value::from("own")));
}

#[test]
fn merge_value_must_be_map_or_sequence_of_maps() {
    let err = from_str("a: {<<: 5}").expect_err("scalar merge value");
    match err {
        Error::MalformedMerge { found, location } => {
            assert_eq!(found, "int");
            assert_eq!(location.line(), 1);
        }
        other => panic!("expected malformed merge, got {other:?}"),
    }

    let yaml = indoc! {"
        base: &b {a: 1}
        target:
          <<: [*b, oops]
    "};
    let err = from_str(yaml).expect_err("sequence with a scalar");
    assert!(matches!(err, Error::MalformedMerge { found: "string", .. }), "got {err:?}");
    assert_eq!(err.location().map(|l| l.line()), Some(3));
}

#[test]
fn quoted_merge_key_is_literal() {
    let map = map_from_str("{\"<<\": {a: 1}, b: 2}").expect("decode");
    assert_eq!(map.len(), 2);
    assert!(get(&map, "a").is_none());
    assert_eq!(get(&map, "<<"), Some(&from_str("{a: 1}").unwrap()));
}

#[test]
fn merge_tag_is_honored() {
    let map = map_from_str("{!!merge key: {a: 1}}").expect("decode");
    assert_eq!(get(&map, "a"), Some(&Value::from(1)));
    assert_eq!(map.len(), 1);
}

#[test]
fn merge_keys_can_be_disabled() {
    let options = yaml_keys::options! { merge_keys: false };
    let value = from_str_with_options("{<<: {a: 1}, a: 2}", options).expect("decode");
    let map = value.as_map().expect("map");
    assert_eq!(map.len(), 2);
    assert_eq!(get(map, "<<"), Some(&from_str("{a: 1}").unwrap()));

    let options = yaml_keys::options! { merge_keys: false };
    let err = from_str_with_options("<<: {a: 1}\n<<: {b: 2}\n", options).expect_err("plain duplicate");
    assert!(err.is_duplicate_key());
}

#[test]
fn merge_keys_never_count_as_duplicates() {
    let map = map_from_str("<<: {a: 1}\n<<: {b: 2}\n").expect("two merge keys are fine");
    assert_eq!(map.len(), 2);
}
