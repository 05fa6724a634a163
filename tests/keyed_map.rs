use yaml_keys::{from_str, key_data, map_from_str, Key, KeyLike, Map, MergePolicy, Value};

fn v(yaml: &str) -> Value {
    from_str(yaml).expect("fixture must decode")
}

#[test]
fn put_existing_composite_key_overwrites() {
    let mut map = Map::new();
    assert_eq!(map.put(v("[1, 2]"), v("a")).unwrap(), None);
    assert_eq!(map.len(), 1);

    let previous = map.put(v("[1, 2]"), v("b")).expect("put");
    assert_eq!(previous, Some(v("a")));
    assert_eq!(map.len(), 1);

    assert_eq!(map.put(v("[2, 1]"), v("c")).unwrap(), None);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&v("[1, 2]")), Some(&v("b")));
}

#[test]
fn put_through_key_wrapper() {
    let mut map = Map::new();
    let wrapped = Key::new(v("{x: 1}")).expect("composite");
    map.put(wrapped.clone(), v("wrapped")).unwrap();
    map.put(v("{x: 1}"), v("bare")).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&wrapped), Some(&v("bare")));
    assert_eq!(key_data(&wrapped), &v("{x: 1}"));
    assert_eq!(wrapped.key_data(), wrapped.data());
}

#[test]
fn delete_simple_and_composite() {
    let mut map = map_from_str("a: 1\n[k]: 2\nb: 3\n").expect("decode");
    assert_eq!(map.delete(&v("[k]")), Some(v("2")));
    assert_eq!(map.delete(&v("[k]")), None);
    assert_eq!(map.delete(&v("a")), Some(v("1")));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&v("b")), Some(&v("3")));
    assert!(!map.contains_key(&v("a")));
}

#[test]
fn merge_keep_existing_never_replaces() {
    let mut to = map_from_str("{[1]: one, a: keep}").expect("decode to");
    let from = map_from_str("{[1]: uno, a: replaced, b: new}").expect("decode from");
    to.merge(from, MergePolicy::KeepExisting);
    assert_eq!(to, map_from_str("{[1]: one, a: keep, b: new}").unwrap());
}

#[test]
fn merge_overwrite_always_replaces() {
    let mut to = map_from_str("{[1]: one, a: keep}").expect("decode to");
    let from = map_from_str("{[1]: uno, a: replaced, b: new}").expect("decode from");
    to.merge(from, MergePolicy::Overwrite);
    assert_eq!(to, map_from_str("{[1]: uno, a: replaced, b: new}").unwrap());
    assert_eq!(to.len(), 3);
}

#[test]
fn clone_shares_nothing() {
    let original = map_from_str("{{k: [1]}: {inner: 1}, s: [a]}").expect("decode");
    let mut copy = original.clone();
    assert_eq!(original, copy);

    if let Some(inner) = copy.get_mut(&v("{k: [1]}")).and_then(Value::as_map_mut) {
        inner.put(v("extra"), v("2")).unwrap();
    }
    copy.delete(&v("s"));

    assert_ne!(original, copy);
    assert_eq!(original.get(&v("{k: [1]}")), Some(&v("{inner: 1}")));
    assert_eq!(original.get(&v("s")), Some(&v("[a]")));
}

#[test]
fn map_equality_is_symmetric_and_order_free() {
    let a = map_from_str("{x: 1, [y]: 2, {z: 3}: 4}").unwrap();
    let b = map_from_str("{{z: 3}: 4, [y]: 2, x: 1}").unwrap();
    assert_eq!(a, b);
    assert_eq!(b, a);
    let c = map_from_str("{x: 1, [y]: 2, {z: 3}: 5}").unwrap();
    assert_ne!(a, c);
    assert_ne!(c, a);
}

#[test]
fn iteration_yields_every_entry() {
    let map = map_from_str("{a: 1, [b]: 2, c: 3}").unwrap();
    let mut rendered: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
    rendered.sort();
    assert_eq!(rendered, ["[b]=2", "a=1", "c=3"]);

    let total: i64 = (&map).into_iter().filter_map(|(_, v)| v.as_i64()).sum();
    assert_eq!(total, 6);

    let keys: Vec<Value> = map.into_iter().map(|(k, _)| k.into_data()).collect();
    assert_eq!(keys.len(), 3);
}
