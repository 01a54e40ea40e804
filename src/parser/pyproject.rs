//! Line-oriented scan of `pyproject.toml`.
//!
//! This is a heuristic, not a TOML parser: any non-header line carrying a
//! comparison operator is read as a dependency declaration. Multi-line
//! values and indirect table references are not followed, and keys such as
//! `name = "demo"` are picked up as package names.

use std::collections::BTreeSet;

use super::{manifest_lines, name_before_operator};

/// Characters that mark a line as a dependency declaration.
const DECLARATION_MARKERS: [char; 4] = ['<', '>', '=', '~'];

const MAX_NAME_LEN: usize = 80;

pub fn parse_pyproject(text: &str) -> BTreeSet<String> {
    let mut packages = BTreeSet::new();

    for line in manifest_lines(text) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            continue;
        }

        let line = line.trim_matches('"').trim_matches('\'');
        if !line.contains(&DECLARATION_MARKERS[..]) {
            continue;
        }

        let name = name_before_operator(line).trim();
        if name.is_empty() || name.contains(char::is_whitespace) || name.chars().count() > MAX_NAME_LEN {
            continue;
        }

        let name = strip_extras(name);
        if !name.is_empty() {
            packages.insert(name.to_owned());
        }
    }

    packages
}

/// `uvicorn[standard]` -> `uvicorn`
fn strip_extras(name: &str) -> &str {
    match name.split_once('[') {
        Some((base, _)) => base.trim(),
        None => name,
    }
}
