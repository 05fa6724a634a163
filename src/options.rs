use crate::budget::Budget;

/// Limits applied while aliases are expanded into values, to harden against alias bombs.
///
/// Every alias occurrence decodes into a full copy of its target, so a few kilobytes of
/// nested aliases can describe billions of values. These limits stop that during decoding.
#[derive(Clone, Copy, Debug)]
pub struct AliasLimits {
    /// Maximum number of values produced through alias expansion in one decode call.
    pub max_total_expanded_nodes: usize,
    /// Maximum nesting of aliases inside expanded aliases (`*a` whose target contains `*b` ...).
    pub max_alias_depth: usize,
    /// Maximum number of times a **single anchor id** may be expanded via alias.
    /// Use `usize::MAX` for "unlimited".
    pub max_alias_expansions_per_anchor: usize,
}

impl Default for AliasLimits {
    fn default() -> Self {
        Self {
            max_total_expanded_nodes: 1_000_000,
            max_alias_depth: 64,
            max_alias_expansions_per_anchor: usize::MAX,
        }
    }
}

/// Decoder configuration options.
///
/// ```rust
/// use yaml_keys::{from_str_with_options, Value};
///
/// let options = yaml_keys::options! {
///     yaml11_booleans: true,
///     budget: Some(yaml_keys::budget! {
///         max_documents: 2,
///     }),
/// };
///
/// let value = from_str_with_options("enabled: yes", options).unwrap();
/// let map = value.as_map().unwrap();
/// assert_eq!(map.get(&Value::from("enabled")), Some(&Value::Bool(true)));
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    /// Optional YAML budget enforced while events are read. `None` disables it.
    pub budget: Option<Budget>,
    /// Limits for alias expansion.
    pub alias_limits: AliasLimits,
    /// Honor YAML merge keys (`<<`). When false, `<<` is an ordinary key. Default: true.
    pub merge_keys: bool,
    /// Also accept the YAML 1.1 booleans `yes`/`no`/`on`/`off`/`y`/`n` (any case) in plain
    /// scalars. Default: false.
    pub yaml11_booleans: bool,
    /// Enable legacy octal parsing where values starting with `00` are treated as base-8.
    /// They are deprecated in YAML 1.2. Default: false.
    pub legacy_octal_numbers: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            budget: Some(Budget::default()),
            alias_limits: AliasLimits::default(),
            merge_keys: true,
            yaml11_booleans: false,
            legacy_octal_numbers: false,
        }
    }
}
