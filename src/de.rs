//! Node decoder: turns [`Node`] trees into [`Value`] trees.
//!
//! Mappings are built into [`Map`]s, which is where duplicate keys (including keys that are
//! only structurally equal, such as maps written in a different order) are caught and where
//! merge keys (`<<`) are folded in. Aliases decode their target again, so every alias produces
//! an independent copy; [`AliasLimits`] bounds how much work that can cause.

use std::collections::HashMap;
use std::io::Read;
use std::rc::Rc;

use encoding_rs_io::DecodeReaderBytesBuilder;
use nohash_hasher::BuildNoHashHasher;

use crate::budget::BudgetBreach;
use crate::error::{budget_error, Error, Location};
use crate::key::KeyLike;
use crate::map::{Map, MergePolicy};
use crate::node::{Node, NodeKind, NodeReader};
use crate::options::{AliasLimits, Options};
use crate::resolve::resolve_scalar;
use crate::value::Value;

/// Scalar and mapping switches taken from [`Options`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cfg {
    pub(crate) yaml11_booleans: bool,
    pub(crate) legacy_octal_numbers: bool,
    pub(crate) merge_keys: bool,
}

impl Default for Cfg {
    fn default() -> Self {
        Cfg {
            yaml11_booleans: false,
            legacy_octal_numbers: false,
            merge_keys: true,
        }
    }
}

impl Cfg {
    pub(crate) fn from_options(options: &Options) -> Self {
        Cfg {
            yaml11_booleans: options.yaml11_booleans,
            legacy_octal_numbers: options.legacy_octal_numbers,
            merge_keys: options.merge_keys,
        }
    }
}

/// Recursive decoder for one document.
struct Decoder {
    cfg: Cfg,
    limits: AliasLimits,
    /// Number of aliases currently being expanded.
    alias_depth: usize,
    /// Values produced while inside an alias expansion.
    expanded: usize,
    per_anchor_expansions: HashMap<usize, usize, BuildNoHashHasher<usize>>,
}

impl Decoder {
    fn new(cfg: Cfg, limits: AliasLimits) -> Self {
        Decoder {
            cfg,
            limits,
            alias_depth: 0,
            expanded: 0,
            per_anchor_expansions: HashMap::default(),
        }
    }

    fn decode(&mut self, node: &Node) -> Result<Value, Error> {
        if self.alias_depth > 0 {
            self.expanded += 1;
            if self.expanded > self.limits.max_total_expanded_nodes {
                return Err(self.limit_error(
                    format!(
                        "alias expansion limit exceeded: expanded_nodes={} > {}",
                        self.expanded, self.limits.max_total_expanded_nodes
                    ),
                    node.location,
                ));
            }
        }

        match &node.kind {
            NodeKind::Scalar { value, style } => {
                resolve_scalar(value, *style, node.tag.as_deref(), &self.cfg)
                    .map_err(|err| err.with_location(node.location))
            }
            NodeKind::Sequence(items) => items
                .iter()
                .map(|item| self.decode(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence),
            NodeKind::Mapping(content) => self.decode_mapping(content, node.location).map(Value::Map),
            NodeKind::Alias { anchor, target } => self.decode_alias(*anchor, target, node.location),
            NodeKind::Document(children) => match children.as_slice() {
                [root] => self.decode(root),
                _ => Err(Error::malformed("document must have exactly one root node")
                    .with_location(node.location)),
            },
        }
    }

    fn decode_alias(
        &mut self,
        anchor: usize,
        target: &Node,
        location: Location,
    ) -> Result<Value, Error> {
        let count = self.per_anchor_expansions.entry(anchor).or_insert(0);
        *count += 1;
        let count = *count;
        if count > self.limits.max_alias_expansions_per_anchor {
            return Err(self.limit_error(
                format!(
                    "alias expansion limit exceeded for anchor id {anchor}: {count} > {}",
                    self.limits.max_alias_expansions_per_anchor
                ),
                location,
            ));
        }
        if self.alias_depth + 1 > self.limits.max_alias_depth {
            return Err(self.limit_error(
                format!(
                    "alias nesting depth exceeded: depth={} > {}",
                    self.alias_depth + 1,
                    self.limits.max_alias_depth
                ),
                location,
            ));
        }

        self.alias_depth += 1;
        let result = self.decode(target);
        self.alias_depth -= 1;
        result
    }

    fn decode_mapping(&mut self, content: &[Rc<Node>], location: Location) -> Result<Map, Error> {
        if content.len() % 2 != 0 {
            return Err(Error::malformed("mapping has a key without a value").with_location(location));
        }

        let mut map = Map::with_capacity(content.len() / 2);
        let mut merged: Option<Map> = None;

        for pair in content.chunks_exact(2) {
            let (key_node, value_node) = (&pair[0], &pair[1]);
            let value = self.decode(value_node)?;

            if self.cfg.merge_keys && key_node.is_merge_key() {
                let into = merged.get_or_insert_with(Map::new);
                fold_merge(into, value, key_node.location)?;
                continue;
            }

            let key = self.decode(key_node)?.into_map_key()?;
            if map.contains_key(&key) {
                return Err(Error::DuplicateKey {
                    key: key.to_string(),
                    location: key_node.location,
                });
            }
            map.push_new(key, value);
        }

        // Explicit keys win over merged ones.
        if let Some(merged) = merged {
            map.merge(merged, MergePolicy::KeepExisting);
        }
        Ok(map)
    }

    fn limit_error(&self, msg: String, location: Location) -> Error {
        tracing::debug!(line = location.line(), "{msg}");
        Error::alias_limit(msg).with_location(location)
    }
}

/// Fold the value of a `<<` entry into the merge accumulator, first writer wins.
fn fold_merge(into: &mut Map, value: Value, location: Location) -> Result<(), Error> {
    match value {
        Value::Map(source) => {
            tracing::trace!(line = location.line(), entries = source.len(), "folding merge key");
            into.merge(source, MergePolicy::KeepExisting);
            Ok(())
        }
        Value::Sequence(items) => {
            for item in items {
                match item {
                    Value::Map(source) => {
                        tracing::trace!(
                            line = location.line(),
                            entries = source.len(),
                            "folding merge key"
                        );
                        into.merge(source, MergePolicy::KeepExisting);
                    }
                    other => {
                        return Err(Error::MalformedMerge {
                            found: other.type_name(),
                            location,
                        });
                    }
                }
            }
            Ok(())
        }
        other => Err(Error::MalformedMerge {
            found: other.type_name(),
            location,
        }),
    }
}

fn root_location(document: &Node) -> Location {
    match &document.kind {
        NodeKind::Document(children) => children.first().map_or(document.location, |root| root.location),
        _ => document.location,
    }
}

/// Decode a node tree with default options.
///
/// ```rust
/// use yaml_keys::{decode_node, Node, NodeKind, Value};
/// use std::rc::Rc;
///
/// let node = Node::new(NodeKind::Sequence(vec![Rc::new(Node::scalar("1")), Rc::new(Node::scalar("x"))]));
/// assert_eq!(decode_node(&node).unwrap(), Value::from(vec![Value::from(1), Value::from("x")]));
/// ```
pub fn decode_node(node: &Node) -> Result<Value, Error> {
    decode_node_with_options(node, &Options::default())
}

/// Decode a node tree with configurable [`Options`]. Only the scalar, merge and alias settings
/// apply; the budget is enforced when nodes are read.
pub fn decode_node_with_options(node: &Node, options: &Options) -> Result<Value, Error> {
    Decoder::new(Cfg::from_options(options), options.alias_limits).decode(node)
}

/// Iterator over the documents of a YAML stream, decoding one per step.
///
/// Empty documents decode to [`Value::Null`]. The iterator stops after the first error.
///
/// ```rust
/// use yaml_keys::{Documents, Value};
///
/// let docs: Vec<Value> = Documents::new("a\n---\nb\n").collect::<Result<_, _>>().unwrap();
/// assert_eq!(docs, [Value::from("a"), Value::from("b")]);
/// ```
pub struct Documents<'a> {
    reader: NodeReader<'a>,
    cfg: Cfg,
    limits: AliasLimits,
    index: usize,
    done: bool,
}

impl<'a> Documents<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, Options::default())
    }

    pub fn with_options(input: &'a str, options: Options) -> Self {
        Documents {
            reader: NodeReader::with_budget(input, options.budget.clone())
                .with_merge_keys(options.merge_keys),
            cfg: Cfg::from_options(&options),
            limits: options.alias_limits,
            index: 0,
            done: false,
        }
    }
}

impl Iterator for Documents<'_> {
    type Item = Result<Value, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.reader.next_document() {
            Ok(Some(document)) => Decoder::new(self.cfg, self.limits).decode(&document),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(err) => Err(err),
        };
        match &result {
            Ok(value) => {
                tracing::debug!(document = self.index, root = value.type_name(), "decoded YAML document");
                self.index += 1;
            }
            Err(_) => self.done = true,
        }
        Some(result)
    }
}

/// Decode a single YAML document into a [`Value`].
///
/// Input without any document decodes to [`Value::Null`]. If the input contains more than one
/// document, this returns [`Error::MultipleDocuments`]; use [`from_multiple`] for streams.
///
/// ```rust
/// use yaml_keys::Value;
///
/// let value = yaml_keys::from_str("value1").unwrap();
/// assert_eq!(value, Value::from("value1"));
/// ```
pub fn from_str(input: &str) -> Result<Value, Error> {
    from_str_with_options(input, Options::default())
}

/// Decode a single YAML document with configurable [`Options`].
pub fn from_str_with_options(input: &str, options: Options) -> Result<Value, Error> {
    decode_single(input, options).map(|(value, _)| value)
}

fn decode_single(input: &str, options: Options) -> Result<(Value, Location), Error> {
    let mut reader = NodeReader::with_budget(input, options.budget.clone())
        .with_merge_keys(options.merge_keys);
    let Some(document) = reader.next_document()? else {
        return Ok((Value::Null, Location::UNKNOWN));
    };
    let value = Decoder::new(Cfg::from_options(&options), options.alias_limits).decode(&document)?;
    if reader.has_next_document()? {
        return Err(Error::MultipleDocuments {
            location: reader.last_location(),
        });
    }
    tracing::debug!(root = value.type_name(), "decoded YAML document");
    Ok((value, root_location(&document)))
}

/// Decode every document of a YAML stream, in stream order.
///
/// ```rust
/// let docs = yaml_keys::from_multiple("---\na: 1\n---\n- x\n").unwrap();
/// assert_eq!(docs.len(), 2);
/// assert!(docs[0].as_map().is_some());
/// assert!(docs[1].as_sequence().is_some());
/// ```
pub fn from_multiple(input: &str) -> Result<Vec<Value>, Error> {
    from_multiple_with_options(input, Options::default())
}

/// Decode every document of a YAML stream with configurable [`Options`].
pub fn from_multiple_with_options(input: &str, options: Options) -> Result<Vec<Value>, Error> {
    Documents::with_options(input, options).collect()
}

/// Decode a single document whose root must be a mapping.
///
/// ```rust
/// use yaml_keys::Value;
///
/// let map = yaml_keys::map_from_str("{[a, b]: pair}").unwrap();
/// let key = Value::from(vec![Value::from("a"), Value::from("b")]);
/// assert_eq!(map.get(&key), Some(&Value::from("pair")));
/// assert!(yaml_keys::map_from_str("- a").is_err());
/// ```
pub fn map_from_str(input: &str) -> Result<Map, Error> {
    map_from_str_with_options(input, Options::default())
}

/// Decode a single mapping document with configurable [`Options`].
pub fn map_from_str_with_options(input: &str, options: Options) -> Result<Map, Error> {
    match decode_single(input, options)? {
        (Value::Map(map), _) => Ok(map),
        (other, location) => Err(Error::NotAMap {
            found: other.type_name(),
            location,
        }),
    }
}

/// Decode a single YAML document from a reader.
///
/// UTF-8 and UTF-16 input is recognized by its byte order mark. The amount of text read is
/// capped by [`crate::Budget::max_reader_input_bytes`].
pub fn from_reader<R: Read>(reader: R) -> Result<Value, Error> {
    from_reader_with_options(reader, Options::default())
}

/// Decode a single YAML document from a reader with configurable [`Options`].
pub fn from_reader_with_options<R: Read>(reader: R, options: Options) -> Result<Value, Error> {
    let limit = options.budget.as_ref().and_then(|b| b.max_reader_input_bytes);
    let input = read_input(reader, limit)?;
    from_str_with_options(&input, options)
}

/// Read and transcode the whole input, failing once more than `limit` bytes arrive.
fn read_input<R: Read>(reader: R, limit: Option<usize>) -> Result<String, Error> {
    let decoder = DecodeReaderBytesBuilder::new()
        .encoding(None) // None = sniff BOM
        .strip_bom(true)
        .build(reader);

    let mut input = String::new();
    match limit {
        Some(limit) => {
            let max = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
            decoder.take(max).read_to_string(&mut input)?;
            if input.len() > limit {
                tracing::debug!(limit, "reader input exceeds budget");
                return Err(budget_error(BudgetBreach::InputBytes { limit }));
            }
        }
        None => {
            let mut decoder = decoder;
            decoder.read_to_string(&mut input)?;
        }
    }
    Ok(input)
}
