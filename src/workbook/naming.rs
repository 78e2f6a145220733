use std::collections::HashSet;
use std::path::Path;

/// Longest sheet name the spreadsheet format accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const RESERVED_NAME: &str = "History";
const FALLBACK_NAME: &str = "Sheet";

/// Derives the sheet name for a source file: its base name with a trailing
/// `.csv` removed, compared case-insensitively.
pub fn sheet_name_for(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem_len = base.len().saturating_sub(4);
    match base.get(stem_len..) {
        Some(ext) if ext.eq_ignore_ascii_case(".csv") => base[..stem_len].to_string(),
        _ => base,
    }
}

/// Rewrites `raw` into a name the spreadsheet format accepts.
pub fn sanitize_sheet_name(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|ch| {
            if INVALID_CHARS.contains(&ch) || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .collect();

    let mut sanitized = truncate_chars(replaced.trim().trim_matches('\''), MAX_SHEET_NAME_LEN);
    // Truncation can expose a trailing apostrophe.
    while sanitized.ends_with('\'') {
        sanitized.pop();
    }

    if sanitized.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    if sanitized.eq_ignore_ascii_case(RESERVED_NAME) {
        sanitized.push('_');
    }
    sanitized
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Tracks the sheet names already handed out. Names are compared
/// case-insensitively, matching how spreadsheet applications resolve them.
#[derive(Debug, Default)]
pub struct SheetNameRegistry {
    used: HashSet<String>,
}

impl SheetNameRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(&name.to_lowercase())
    }

    /// Records `name` as taken. Returns `false` if it already was.
    pub fn claim(&mut self, name: &str) -> bool {
        self.used.insert(name.to_lowercase())
    }

    /// Returns `name` if free, otherwise the first free `name_N` variant
    /// shortened to fit the length limit. The returned name is not claimed.
    pub fn next_free(&self, name: &str) -> String {
        if !self.contains(name) {
            return name.to_string();
        }

        let mut counter = 1;
        loop {
            let suffix = format!("_{counter}");
            let prefix = truncate_chars(name, MAX_SHEET_NAME_LEN - suffix.len());
            let candidate = format!("{prefix}{suffix}");
            if !self.contains(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}
