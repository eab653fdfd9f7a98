//! `${name}` placeholder expansion.

use crate::types::PropertyTable;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("Invalid regex"));

/// Upper bound on substitutions performed by a single [`resolve_properties`] call.
pub const MAX_PROPERTY_EXPANSIONS: usize = 64;

/// Upper bound on the length of an expanded value, in bytes.
pub const MAX_EXPANDED_LEN: usize = 64 * 1024;

/// Expands `${name}` placeholders in `text` using `properties`.
///
/// The first placeholder is substituted (every occurrence of it) until none
/// remain. Expansion stops early, returning the partially resolved text, when
/// a name is unknown, when a name reappears after it was substituted, when the
/// result would exceed [`MAX_EXPANDED_LEN`], or after
/// [`MAX_PROPERTY_EXPANSIONS`] substitutions.
pub fn resolve_properties(text: &str, properties: &PropertyTable) -> String {
    let mut resolved = text.to_string();
    let mut substituted = HashSet::new();

    for _ in 0..MAX_PROPERTY_EXPANSIONS {
        let Some((placeholder, name)) = PLACEHOLDER_PATTERN
            .captures(&resolved)
            .map(|caps| (caps[0].to_string(), caps[1].to_string()))
        else {
            return resolved;
        };

        let Some(value) = properties.get(&name) else {
            tracing::warn!(property = %name, text = %text, "property not found");
            return resolved;
        };
        if !substituted.insert(name.clone()) || value.contains(&placeholder) {
            tracing::warn!(property = %name, text = %text, "recursive property reference");
            return resolved;
        }

        let occurrences = resolved.matches(placeholder.as_str()).count();
        let grown = resolved.len() - occurrences * placeholder.len() + occurrences * value.len();
        if grown > MAX_EXPANDED_LEN {
            tracing::warn!(
                property = %name,
                text = %text,
                limit = MAX_EXPANDED_LEN,
                "expanded property value too long"
            );
            return resolved;
        }

        resolved = resolved.replace(&placeholder, value);
    }

    if PLACEHOLDER_PATTERN.is_match(&resolved) {
        tracing::warn!(
            text = %text,
            limit = MAX_PROPERTY_EXPANSIONS,
            "property expansion limit reached"
        );
    }
    resolved
}
