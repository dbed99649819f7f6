//! Discipline slug normalization
//!
//! The same event appears under several slugs across age categories
//! (`shot-put-6kg`, `shot-put-5kg`, `100m-hurdles-u20`). Normalization maps
//! them to one canonical key so their toplists are combined.

use regex::Regex;
use std::sync::OnceLock;

/// Slug aliases, applied in order
pub const ALIASES: &[(&str, &str)] = &[
    ("100m-hurdles", "100-metres-hurdles"),
    ("110m-hurdles", "110-metres-hurdles"),
    ("400m-hurdles", "400-metres-hurdles"),
    ("decathlon-u20", "decathlon"),
    ("decathlon-boys", "decathlon"),
    ("heptathlon-girls", "heptathlon"),
];

fn suffix_regex() -> &'static Regex {
    static SUFFIX_RE: OnceLock<Regex> = OnceLock::new();
    SUFFIX_RE.get_or_init(|| {
        Regex::new(r"[-_](\d+(kg|g|cm)|u18|u20|senior|girls|boys)$")
            .expect("Invalid regex pattern")
    })
}

/// Canonical key for a raw discipline slug
///
/// An exact alias match wins outright. Otherwise every alias source found in
/// the slug is replaced in table order, then one trailing equipment or age
/// suffix is removed.
///
/// Replacements are applied sequentially, so a replacement that produces
/// another alias source is rewritten again by a later entry. Only one suffix
/// is removed, so stacked suffixes (`shot-put-6kg-u18`) need a second call.
pub fn normalize_discipline(slug: &str) -> String {
    if let Some((_, target)) = ALIASES.iter().find(|(source, _)| *source == slug) {
        return (*target).to_string();
    }

    let mut normalized = slug.to_string();
    for (source, target) in ALIASES {
        if normalized.contains(source) {
            normalized = normalized.replace(source, target);
        }
    }

    suffix_regex().replace(&normalized, "").into_owned()
}
