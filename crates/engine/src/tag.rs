//! Tag segmentation
//!
//! Tags are dot-delimited routing labels. Templates can reference the
//! individual segments (`tag_parts`), every cumulative prefix
//! (`tag_prefix`) and every cumulative suffix (`tag_suffix`), with
//! Python-style negative indexing.

#[cfg(test)]
#[path = "tag_test.rs"]
mod tests;

/// Split a tag into its dot-delimited parts.
///
/// An empty tag yields a single empty segment, never an empty sequence,
/// so index-based template references stay well defined.
pub fn split(tag: &str) -> Vec<String> {
    tag.split('.').map(str::to_string).collect()
}

/// Cumulative prefixes of the tag parts, joined with `.`.
///
/// `["a","b","c"]` yields `["a", "a.b", "a.b.c"]`.
pub fn prefixes(parts: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(parts.len());
    let mut running = String::new();
    for part in parts {
        if !running.is_empty() {
            running.push('.');
        }
        running.push_str(part);
        out.push(running.clone());
    }
    out
}

/// Cumulative suffixes of the tag parts, joined with `.`.
///
/// `["a","b","c"]` yields `["a.b.c", "b.c", "c"]`.
pub fn suffixes(parts: &[String]) -> Vec<String> {
    let mut out = vec![String::new(); parts.len()];
    let mut running = String::new();
    for (i, part) in parts.iter().enumerate().rev() {
        if running.is_empty() {
            running = part.clone();
        } else {
            running = format!("{part}.{running}");
        }
        out[i] = running.clone();
    }
    out
}

/// Resolve a possibly-negative index into a slice.
///
/// `-1` denotes the last element, `-2` the second-to-last. Out-of-range
/// indices in either direction return `None`; callers surface that as an
/// error condition rather than panicking.
pub fn at(items: &[String], index: i64) -> Option<&str> {
    let len = items.len() as i64;
    let resolved = if index < 0 { len + index } else { index };
    if resolved < 0 || resolved >= len {
        return None;
    }
    Some(items[resolved as usize].as_str())
}
