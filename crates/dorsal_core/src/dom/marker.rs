//! Wired-plugin marker stored on each element.

use std::fmt::{Display, Formatter};

/// Ordered set of plugin names currently wired on one element.
///
/// Renders to and parses from the space-joined `data-xd-wired` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WiredMarker {
    names: Vec<String>,
}

impl WiredMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the attribute value; blank entries and duplicates are dropped.
    pub fn parse(value: &str) -> Self {
        let mut marker = Self::new();
        for name in value.split_whitespace() {
            marker.insert(name);
        }
        marker
    }

    pub fn contains(&self, plugin_name: &str) -> bool {
        self.names.iter().any(|name| name == plugin_name)
    }

    /// Appends `plugin_name` unless already present. Returns whether it was added.
    pub fn insert(&mut self, plugin_name: &str) -> bool {
        if self.contains(plugin_name) {
            return false;
        }
        self.names.push(plugin_name.to_string());
        true
    }

    /// Removes `plugin_name`. Returns whether it was present.
    pub fn remove(&mut self, plugin_name: &str) -> bool {
        let Some(index) = self.names.iter().position(|name| name == plugin_name) else {
            return false;
        };
        self.names.remove(index);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn to_attribute(&self) -> String {
        self.names.join(" ")
    }
}

impl Display for WiredMarker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_attribute())
    }
}

#[cfg(test)]
mod tests {
    use super::WiredMarker;

    #[test]
    fn parse_keeps_order_and_drops_duplicates() {
        let marker = WiredMarker::parse("  tabs modal tabs ");
        assert_eq!(marker.names(), ["tabs", "modal"]);
        assert_eq!(marker.to_attribute(), "tabs modal");
    }

    #[test]
    fn membership_is_exact_not_substring() {
        let marker = WiredMarker::parse("tabset");
        assert!(!marker.contains("tabs"));
        assert!(marker.contains("tabset"));
    }

    #[test]
    fn remove_missing_name_leaves_marker_untouched() {
        let mut marker = WiredMarker::parse("a b");
        assert!(!marker.remove("c"));
        assert_eq!(marker.to_attribute(), "a b");
        assert!(marker.remove("a"));
        assert_eq!(marker.to_attribute(), "b");
    }
}
