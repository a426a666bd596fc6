//! Domain-name helpers.
//!
//! Names are compared case-insensitively and always carried in their
//! fully-qualified form (`example.org.`), the root being `.`.

/// Lowercase `name` and make sure it ends with a single trailing dot.
pub fn fqdn(name: &str) -> String {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        return ".".to_string();
    }
    let mut out = String::with_capacity(trimmed.len() + 1);
    out.extend(trimmed.chars().map(|c| c.to_ascii_lowercase()));
    out.push('.');
    out
}

/// Whether `name` equals `zone` or sits below it.
///
/// Both arguments must already be normalized with [`fqdn`].
pub fn is_subdomain(name: &str, zone: &str) -> bool {
    if zone == "." || name == zone {
        return true;
    }
    name.len() > zone.len()
        && name.ends_with(zone)
        && name.as_bytes()[name.len() - zone.len() - 1] == b'.'
}

/// Number of labels in a normalized name, the root having none.
pub fn label_count(name: &str) -> usize {
    if name == "." {
        0
    } else {
        name.trim_end_matches('.').split('.').count()
    }
}
