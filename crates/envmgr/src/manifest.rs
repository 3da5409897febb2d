//! Requirements manifest reading

use std::path::Path;

/// Default manifest file name
pub const DEFAULT_REQUIREMENTS_FILE: &str = "requirements.txt";

/// Package specifiers listed in a requirements manifest.
///
/// Blank lines and `#` comments are dropped; everything else is returned
/// trimmed, in file order, without interpreting the specifier.
pub fn read_manifest<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_manifest(&content))
}

pub fn parse_manifest(content: &str) -> Vec<String> {
    content
        .lines()
        .map(strip_comment)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// pip treats `#` as a comment at line start or after whitespace
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(index) => &line[..index],
        None => line,
    }
}
