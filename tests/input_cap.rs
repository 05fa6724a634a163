use std::io::Cursor;

use yaml_keys::{from_reader, from_reader_with_options, Budget, BudgetBreach, Error, Options, Value};

fn big_valid_yaml(n: usize) -> String {
    let mut yaml = String::new();
    for i in 1..=n {
        yaml.push_str(&format!("a{i}: {i}\n"));
    }
    yaml
}

#[test]
fn reader_respects_max_input_bytes_budget() {
    let yaml = big_valid_yaml(1024);
    let rdr = Cursor::new(yaml.as_bytes());

    let mut opts = Options::default();
    opts.budget = Some(Budget {
        max_reader_input_bytes: Some(160),
        ..Budget::default()
    });
    let err = from_reader_with_options(rdr.clone(), opts.clone()).expect_err("cap of 160 bytes");
    assert!(
        matches!(err, Error::Budget { breach: BudgetBreach::InputBytes { limit: 160 }, .. }),
        "got {err:?}"
    );

    opts.budget = Some(Budget {
        max_reader_input_bytes: Some(16_000),
        ..Budget::default()
    });
    let value = from_reader_with_options(rdr.clone(), opts).expect("fits in 16000 bytes");
    assert_eq!(value.as_map().map(|m| m.len()), Some(1024));

    assert!(from_reader(rdr).is_ok());
}

#[test]
fn reader_without_cap() {
    let options = yaml_keys::options! {
        budget: Some(yaml_keys::budget! { max_reader_input_bytes: None }),
    };
    let value = from_reader_with_options(big_valid_yaml(10).as_bytes(), options).expect("uncapped");
    assert_eq!(value.as_map().map(|m| m.len()), Some(10));
}

#[test]
fn reader_handles_utf8_bom() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("[1, 2]: pair\n".as_bytes());
    let value = from_reader(Cursor::new(bytes)).expect("utf-8 with BOM");
    let map = value.as_map().expect("map");
    let key = Value::from(vec![Value::from(1), Value::from(2)]);
    assert_eq!(map.get(&key), Some(&Value::from("pair")));
}

#[test]
fn reader_handles_utf16le_bom() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "k: \u{e9}t\u{e9}\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let value = from_reader(Cursor::new(bytes)).expect("utf-16le with BOM");
    let map = value.as_map().expect("map");
    assert_eq!(map.get(&Value::from("k")), Some(&Value::from("\u{e9}t\u{e9}")));
}

#[test]
fn reader_errors_are_io_errors() {
    struct Failing;
    impl std::io::Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }
    let err = from_reader(Failing).expect_err("read fails");
    assert!(matches!(err, Error::IOError { .. }), "got {err:?}");
    assert!(std::error::Error::source(&err).is_some());
}
