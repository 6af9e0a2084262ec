//! Module identifier resolution
//!
//! Pure string arithmetic that turns a dependency identifier, as written by a
//! module author, into the registry key it refers to. No filesystem access and
//! no normalization of interior `.`/`..` segments.

/// Path separator used in module ids
pub const SEPARATOR: u8 = b'/';

/// Identifier classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// No separator: looked up by bare id
    Builtin,
    /// Starts with a separator: used directly as the registry key
    Absolute,
    /// Anything else: resolved against the requester's directory
    Relative,
}

/// Classify a dependency identifier
pub fn classify(id: &str) -> IdKind {
    let bytes = id.as_bytes();
    if !bytes.contains(&SEPARATOR) {
        IdKind::Builtin
    } else if bytes[0] == SEPARATOR {
        IdKind::Absolute
    } else {
        IdKind::Relative
    }
}

/// True if `id` names a built-in module
pub fn is_builtin(id: &str) -> bool {
    classify(id) == IdKind::Builtin
}

/// Resolve `id` against the id of the module that references it
pub fn resolve(id: &str, requester: &str) -> String {
    match classify(id) {
        IdKind::Builtin | IdKind::Absolute => id.to_string(),
        IdKind::Relative => relative_path(id, requester),
    }
}

/// Compute the path of `path` relative to the directory of `dir`
///
/// Only a leading `./` or a run of leading `../` is interpreted. Paths that
/// do not start with `.` come back unchanged.
pub fn relative_path(path: &str, dir: &str) -> String {
    let p = path.as_bytes();
    if p.first() != Some(&b'.') {
        return path.to_string();
    }

    let d = dir.as_bytes();
    // Separator that closes the requester's directory
    let mut j = match d.last() {
        Some(&SEPARATOR) => Some(d.len() - 1),
        _ => d.iter().rposition(|&c| c == SEPARATOR),
    };

    let mut i = 0;
    while i < p.len() {
        if p[i] != b'.' {
            break;
        }
        if p.get(i + 1) == Some(&SEPARATOR) {
            i += 2;
            break;
        }
        if p.get(i + 1) != Some(&b'.') || p.get(i + 2) != Some(&SEPARATOR) {
            break;
        }
        i += 3;
        j = separator_at_or_before(d, j.map_or(-1, |j| j as isize) - 1);
    }

    let rest = &path[i..];
    match j {
        Some(j) => format!("{}{}", &dir[..=j], rest),
        None => rest.to_string(),
    }
}

// A negative start clamps to the first byte, so climbing past an absolute
// root stays on the root separator.
fn separator_at_or_before(d: &[u8], from: isize) -> Option<usize> {
    if d.is_empty() {
        return None;
    }
    let from = (from.max(0) as usize).min(d.len() - 1);
    d[..=from].iter().rposition(|&c| c == SEPARATOR)
}

/// Position of the dot separating a file name from its suffix
fn file_dot(id: &str) -> Option<usize> {
    for (i, &c) in id.as_bytes().iter().enumerate().rev() {
        if c == SEPARATOR {
            return None;
        }
        if c == b'.' {
            return Some(i);
        }
    }
    None
}

/// Suffix of `id`: the text after the last `.` of its final segment
pub fn suffix(id: &str) -> &str {
    file_dot(id).map_or("", |dot| &id[dot + 1..])
}

/// Module name of `id`: the id without its suffix
pub fn module_name(id: &str) -> &str {
    file_dot(id).map_or(id, |dot| &id[..dot])
}
