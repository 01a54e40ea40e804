use std::collections::BTreeSet;

use super::{manifest_lines, name_before_operator};

/// Extracts package names from a pip requirements list.
///
/// Blank lines and `#` comments are skipped. Everything from the first
/// version operator onward is dropped.
pub fn parse_requirements(text: &str) -> BTreeSet<String> {
    let mut packages = BTreeSet::new();

    for line in manifest_lines(text) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let name = name_before_operator(line).trim();
        if !name.is_empty() {
            packages.insert(name.to_owned());
        }
    }

    packages
}
