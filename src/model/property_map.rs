//! PropertyMap: the attribute bag on nodes and edges, plus the typed
//! accessor layer shared by [`NodeView`](super::NodeView) and
//! [`EdgeView`](super::EdgeView).
//!
//! Every value in a code property graph is stored as a string. The same
//! logical attribute may live under several storage names (older exports
//! append a `:type` suffix to the column name), so each accessor resolves
//! through an ordered list of candidates from [`attr`].

use hashbrown::HashMap;

/// A map of attribute names to raw string values.
pub type PropertyMap = HashMap<String, String>;

/// Build a [`PropertyMap`] from `(name, value)` pairs.
pub fn properties<I, K, V>(pairs: I) -> PropertyMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

// ============================================================================
// Attribute name table
// ============================================================================

/// Storage names for each logical attribute, in fallback order.
pub mod attr {
    pub const NODE_KIND: &[&str] = &["type"];
    pub const CODE: &[&str] = &["code"];
    pub const LABEL: &[&str] = &["labels:label", "labels"];
    pub const FLAGS: &[&str] = &["flags:string[]", "flags"];
    pub const LINE_NUMBER: &[&str] = &["lineno:int", "lineno"];
    pub const END_LINE_NUMBER: &[&str] = &["endlineno:int", "endlineno"];
    pub const CHILD_ORDINAL: &[&str] = &["childnum:int", "childnum"];
    pub const FUNCTION_ID: &[&str] = &["funcid:int", "funcid"];
    pub const CLASS_NAME: &[&str] = &["classname"];
    pub const NAMESPACE: &[&str] = &["namespace"];
    pub const NAME: &[&str] = &["name"];
    pub const DOC_COMMENT: &[&str] = &["doccomment"];

    pub const EDGE_START: &[&str] = &["start:START_ID", "start"];
    pub const EDGE_END: &[&str] = &["end:END_ID", "end"];
    pub const TAINT_SOURCE: &[&str] = &["taint_src"];
    pub const TAINT_DESTINATION: &[&str] = &["taint_dst"];
    pub const EDGE_KIND: &[&str] = &["type:TYPE", "type"];
}

// ============================================================================
// Coercion
// ============================================================================

/// Parse a non-negative integer literal. Anything that is not a non-empty
/// run of ASCII digits fitting in a `u64` yields `None`.
pub fn parse_uint(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

// ============================================================================
// PropertyView
// ============================================================================

/// Read-only typed access over a single attribute bag.
pub trait PropertyView {
    /// The raw attribute bag fetched when the view was built.
    fn properties(&self) -> &PropertyMap;

    /// First present value among `names`, tried in order.
    fn get(&self, names: &[&str]) -> Option<&str> {
        let props = self.properties();
        names.iter().find_map(|name| props.get(*name).map(String::as_str))
    }

    /// Numeric attribute; absent or non-numeric values yield `None`.
    fn get_uint(&self, names: &[&str]) -> Option<u64> {
        self.get(names).and_then(parse_uint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bag(PropertyMap);

    impl PropertyView for Bag {
        fn properties(&self) -> &PropertyMap {
            &self.0
        }
    }

    fn bag<const N: usize>(pairs: [(&str, &str); N]) -> Bag {
        Bag(properties(pairs))
    }

    #[test]
    fn test_get_falls_back_in_order() {
        let props = bag([("lineno", "7")]);
        assert_eq!(props.get(attr::LINE_NUMBER), Some("7"));

        let both = bag([("lineno:int", "3"), ("lineno", "7")]);
        assert_eq!(both.get(attr::LINE_NUMBER), Some("3"));

        assert_eq!(props.get(attr::CODE), None);
    }

    #[test]
    fn test_parse_uint() {
        assert_eq!(parse_uint("42"), Some(42));
        assert_eq!(parse_uint("0"), Some(0));
        assert_eq!(parse_uint(""), None);
        assert_eq!(parse_uint("-1"), None);
        assert_eq!(parse_uint("+1"), None);
        assert_eq!(parse_uint("4.2"), None);
        assert_eq!(parse_uint(" 42"), None);
        assert_eq!(parse_uint("abc"), None);
        // Overflow is treated like any other malformed value.
        assert_eq!(parse_uint("99999999999999999999999"), None);
    }

    #[test]
    fn test_get_uint_absent_or_malformed() {
        let props = bag([("lineno", "abc"), ("childnum", "2")]);
        assert_eq!(props.get_uint(attr::LINE_NUMBER), None);
        assert_eq!(props.get_uint(attr::CHILD_ORDINAL), Some(2));
        assert_eq!(props.get_uint(attr::FUNCTION_ID), None);
    }
}
