//! Domain name helpers
//!
//! Record names arrive relative ("www"), fully specified ("www.example.com")
//! or absolute ("www.example.com."). These helpers bring them into the two
//! shapes the rest of the crate works with.

/// Fully qualified name with trailing dot, e.g. `www.example.com.`
pub fn fqdn_name(name: &str, domain: &str) -> String {
    format!("{}.", full_name(name.trim_end_matches('.'), domain))
}

/// Fully specified name without trailing dot, e.g. `www.example.com`
///
/// An absolute name only loses its trailing dot; `@` and the empty name
/// stand for the domain itself.
pub fn full_name(name: &str, domain: &str) -> String {
    let domain = domain.trim_end_matches('.');
    if name.is_empty() || name == "@" {
        return domain.to_string();
    }
    if let Some(absolute) = name.strip_suffix('.') {
        return absolute.to_string();
    }
    if is_within(name, domain) {
        name.to_string()
    } else {
        format!("{}.{}", name, domain)
    }
}

/// Whether `name` equals `domain` or lies below it (case-insensitive)
pub fn is_within(name: &str, domain: &str) -> bool {
    let name = name.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    name == domain || name.ends_with(&format!(".{}", domain))
}

/// Absolute form of a zone-file name relative to `origin`
///
/// `origin` must be absolute (trailing dot).
pub fn absolutize(name: &str, origin: &str) -> String {
    if name == "@" {
        origin.to_string()
    } else if name.ends_with('.') {
        name.to_string()
    } else if origin == "." {
        format!("{}.", name)
    } else {
        format!("{}.{}", name, origin)
    }
}

/// Relative form of an absolute name below `origin`, `@` for the origin itself
///
/// Names outside the origin are returned unchanged.
pub fn relativize(name: &str, origin: &str) -> String {
    if name.eq_ignore_ascii_case(origin) {
        return "@".to_string();
    }
    let suffix = format!(".{}", origin);
    if name.len() > suffix.len() && name.to_ascii_lowercase().ends_with(&suffix.to_ascii_lowercase()) {
        return name[..name.len() - suffix.len()].to_string();
    }
    name.to_string()
}

/// Parent of an absolute name, `None` at the root
pub fn parent(name: &str) -> Option<String> {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.split_once('.') {
        Some((_, rest)) => Some(format!("{}.", rest)),
        None => Some(".".to_string()),
    }
}

/// Number of non-root labels
pub fn label_count(name: &str) -> usize {
    let trimmed = name.trim_end_matches('.');
    if trimmed.is_empty() {
        0
    } else {
        trimmed.split('.').count()
    }
}
