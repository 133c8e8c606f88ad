//! Anchor identifier handling.
//!
//! Resolver records are addressed externally by a GS1 anchor such as
//! `/01/05392000229648`. Document stores generally dislike `/` in primary
//! keys, so records are stored under an internal key where the leading `/`
//! is dropped and every other `/` becomes `_`: `01_05392000229648`.
//!
//! Both conversions are total and safe to apply to a value that is already
//! in the target form.

/// Separator used in the external anchor form.
pub const EXTERNAL_SEPARATOR: char = '/';

/// Separator used in the internal storage key form.
pub const INTERNAL_SEPARATOR: char = '_';

/// Converts an anchor to its internal storage key.
///
/// `/01/05392000229648` becomes `01_05392000229648`. A value already in
/// internal form is returned unchanged.
pub fn to_internal(id: &str) -> String {
    let replaced = id.replace(EXTERNAL_SEPARATOR, "_");
    match replaced.strip_prefix(INTERNAL_SEPARATOR) {
        Some(rest) => rest.to_string(),
        None => replaced,
    }
}

/// Converts an internal storage key back to its external anchor.
///
/// `01_05392000229648` becomes `/01/05392000229648`. A value that already
/// starts with `/` is not prefixed again.
pub fn to_external(id: &str) -> String {
    let replaced = id.replace(INTERNAL_SEPARATOR, "/");
    if id.starts_with(EXTERNAL_SEPARATOR) {
        replaced
    } else {
        format!("{}{}", EXTERNAL_SEPARATOR, replaced)
    }
}

/// Joins the two path segments of `/{code}/{value}` into an internal key.
pub fn anchor_from_segments(code: &str, value: &str) -> String {
    format!("{}{}{}", code, INTERNAL_SEPARATOR, value)
}
