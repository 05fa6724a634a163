//! Recognition of YAML core-schema tags.
//!
//! `saphyr-parser` renders `!!int` as `tag:yaml.org,2002:!int`, keeping the `!` of the suffix.
//! Hand-built nodes may use `tag:yaml.org,2002:int`, `!!int` or the single-`!` shorthand `!int`,
//! so all of these spellings are accepted.

const CANONICAL_PREFIX_ALT: &str = "tag:yaml.org,2002:!";
const CANONICAL_PREFIX: &str = "tag:yaml.org,2002:";
const SHORTHAND_PREFIX: &str = "!!";
const LOCAL_PREFIX: &str = "!";

/// Tag classes the decoder distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CoreTag {
    /// No tag at all: resolve by style and content.
    None,
    /// The non-specific tag `!`: the scalar is a string.
    NonSpecific,
    Str,
    Int,
    Float,
    Bool,
    Null,
    Binary,
    Timestamp,
    Merge,
    Seq,
    Map,
    /// Local or unknown global tag; the decoder keeps scalar text as-is.
    Other,
}

impl CoreTag {
    pub(crate) fn classify(tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return CoreTag::None;
        };
        if tag == "!" {
            return CoreTag::NonSpecific;
        }
        let suffix = tag
            .strip_prefix(CANONICAL_PREFIX_ALT)
            .or_else(|| tag.strip_prefix(CANONICAL_PREFIX))
            .or_else(|| tag.strip_prefix(SHORTHAND_PREFIX))
            .or_else(|| tag.strip_prefix(LOCAL_PREFIX));
        match suffix {
            Some("str") => CoreTag::Str,
            Some("int") => CoreTag::Int,
            Some("float") => CoreTag::Float,
            Some("bool") => CoreTag::Bool,
            Some("null") => CoreTag::Null,
            Some("binary") => CoreTag::Binary,
            Some("timestamp") => CoreTag::Timestamp,
            Some("merge") => CoreTag::Merge,
            Some("seq") => CoreTag::Seq,
            Some("map") => CoreTag::Map,
            _ => CoreTag::Other,
        }
    }

    /// Tags under which scalar text is kept verbatim as a string.
    pub(crate) fn keeps_text(self) -> bool {
        matches!(
            self,
            CoreTag::NonSpecific
                | CoreTag::Str
                | CoreTag::Binary
                | CoreTag::Timestamp
                | CoreTag::Merge
                | CoreTag::Seq
                | CoreTag::Map
                | CoreTag::Other
        )
    }
}

/// True if the tag spells the merge type (`!!merge`).
pub(crate) fn is_merge_tag(tag: Option<&str>) -> bool {
    CoreTag::classify(tag) == CoreTag::Merge
}
