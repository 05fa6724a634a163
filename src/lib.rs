//! YAML decoding into a value tree whose maps accept sequences and mappings as keys.
//!
//! YAML allows any node as a mapping key (`? [a, b]` or `{x: 1}: value`), but most value
//! models only accept scalars. Here a decoded [`Map`] stores scalar keys directly and wraps
//! composite keys in a [`Key`], comparing them by structural equality: maps regardless of
//! entry order, sequences element by element.
//!
//! Decoding rejects duplicate keys, including keys that are only structurally equal, and
//! folds YAML merge keys (`<<`) with explicit keys taking precedence.
//!
//! ```rust
//! use indoc::indoc;
//! use yaml_keys::Value;
//!
//! let yaml = indoc! {"
//!     {complex1: 0, complex2: 1}: value1
//!     {complex1: 0, complex2: 2}: value2
//! "};
//! let map = yaml_keys::map_from_str(yaml).unwrap();
//!
//! let key = yaml_keys::from_str("{complex2: 2, complex1: 0}").unwrap();
//! assert_eq!(map.get(&key), Some(&Value::from("value2")));
//!
//! let err = yaml_keys::from_str("{a: 1, b: 2}: x\n{b: 2, a: 1}: y\n").unwrap_err();
//! assert!(err.is_duplicate_key());
//! ```

mod budget;
mod de;
mod emit;
mod error;
mod key;
mod macros;
mod map;
mod node;
mod options;
mod resolve;
mod tags;
mod value;

pub use budget::{Budget, BudgetBreach};
pub use de::{
    decode_node, decode_node_with_options, from_multiple, from_multiple_with_options, from_reader,
    from_reader_with_options, from_str, from_str_with_options, map_from_str,
    map_from_str_with_options, Documents,
};
pub use emit::to_flow_string;
pub use error::{Error, Location};
pub use key::{key_data, Key, KeyLike, MapKey};
pub use map::{IntoIter, Iter, Map, MergePolicy};
pub use node::{Node, NodeKind, NodeReader, ScalarStyle};
pub use options::{AliasLimits, Options};
pub use value::Value;
