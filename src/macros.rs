//! Public macros for constructing option structs without relying on struct literal syntax.
//!
//! Fields can be added to the option structs later without breaking call sites that use these.

/// Construct [`crate::Options`] from `Default` and a list of field assignments.
///
/// Example:
///
/// ```rust
/// let options = yaml_keys::options! {
///     merge_keys: false,
///     legacy_octal_numbers: true,
/// };
/// assert!(!options.merge_keys);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::Options::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}

/// Construct [`crate::Budget`] from `Default` and a list of field assignments.
///
/// Example:
///
/// ```rust
/// let budget = yaml_keys::budget! {
///     max_depth: 32,
///     max_reader_input_bytes: None,
/// };
/// assert_eq!(budget.max_depth, 32);
/// ```
#[macro_export]
macro_rules! budget {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut budget = $crate::Budget::default();
        $(
            budget.$field = $value;
        )*
        budget
    }};
}
