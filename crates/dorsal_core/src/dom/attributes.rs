//! Markup naming convention and data attribute extraction.
//!
//! # Responsibility
//! - Own the bit-exact attribute and class names shared with markup tooling.
//! - Convert `data-d-*` attributes into the flat map handed to plugins.
//!
//! # Invariants
//! - `data-d-fooBar` and `data-d-foo-bar` both extract to key `fooBar`.
//! - Attributes under the ignore prefix (`data-xd-*`) are never extracted.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Class prefix flagging an element as a candidate for a plugin.
pub const MARKER_CLASS_PREFIX: &str = "js-d-";
/// Dataset prefix of attributes forwarded to plugins.
pub const DATA_PREFIX: &str = "d";
/// Dataset prefix reserved for engine bookkeeping.
pub const DATA_IGNORE_PREFIX: &str = "xd";
/// Attribute holding the space-joined list of wired plugin names.
pub const WIRED_ATTRIBUTE: &str = "data-xd-wired";
/// Attribute holding the element identity.
pub const GUID_ATTRIBUTE: &str = "dorsal-guid";

const DATA_ATTRIBUTE_PREFIX: &str = "data-";

static DATASET_HYPHEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-([a-z])").expect("valid dataset hyphen regex"));
static PLUGIN_DATA_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^{DATA_PREFIX}[A-Z]")).expect("valid plugin data key regex")
});

/// Flat key/value data extracted from one element.
pub type DataAttributes = BTreeMap<String, String>;

/// Returns the marker class for one plugin name, e.g. `js-d-tabs`.
pub fn marker_class(plugin_name: &str) -> String {
    format!("{MARKER_CLASS_PREFIX}{plugin_name}")
}

/// Maps an attribute name to its dataset key the way browsers do.
///
/// `data-d-foo-bar` -> `dFooBar`. Returns `None` for non-`data-` attributes.
pub fn dataset_key(attribute_name: &str) -> Option<String> {
    let rest = attribute_name.strip_prefix(DATA_ATTRIBUTE_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    let key = DATASET_HYPHEN_RE.replace_all(rest, |caps: &regex::Captures<'_>| {
        caps[1].to_ascii_uppercase()
    });
    Some(key.into_owned())
}

/// Maps a dataset key to the plugin data key, e.g. `dFooBar` -> `fooBar`.
///
/// Returns `None` for keys outside the plugin data prefix (including the
/// ignore prefix used for `data-xd-wired`).
pub fn plugin_data_key(dataset_key: &str) -> Option<String> {
    if !PLUGIN_DATA_KEY_RE.is_match(dataset_key) {
        return None;
    }
    let name = &dataset_key[DATA_PREFIX.len()..];
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_lowercase().chain(chars).collect())
}

/// Extracts plugin data from a sequence of raw `(name, value)` attributes.
///
/// When two attributes map to the same key the later one wins.
pub fn extract_data_attributes<'a, I>(attributes: I) -> DataAttributes
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    attributes
        .into_iter()
        .filter_map(|(name, value)| {
            let key = plugin_data_key(&dataset_key(name)?)?;
            Some((key, value.to_string()))
        })
        .collect()
}
