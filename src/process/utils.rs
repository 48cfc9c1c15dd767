/// Trim whitespace and strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Comparison key for free-text labels such as project names and statuses.
pub fn fold_label(raw: &str) -> String {
    clean_str(raw).to_lowercase()
}

/// Header cleanup applied right after parsing: drops a UTF-8 byte-order mark
/// and surrounding whitespace.
pub fn clean_header(raw: &str) -> String {
    clean_str(raw.trim_start_matches('\u{feff}'))
}

/// Names that occur more than once, in first-seen order.
pub fn duplicate_names(names: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut dups = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) && !dups.contains(name) {
            dups.push(name.clone());
        }
    }
    dups
}
