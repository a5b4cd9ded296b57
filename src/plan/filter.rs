//! Reduce a resource block to the lines that carry a change

/// Keywords that open a declaration in the rendered diff
const DECLARATION_KEYWORDS: &[&str] = &["resource", "data", "module"];

/// Markers that start a changed or structural line
const CHANGE_MARKERS: &[char] = &['+', '-', '~', '#', '}', '{'];

/// Whether a line should be kept when showing only changes
pub fn is_changed_line(line: &str) -> bool {
    let trimmed = line.trim_start();

    // Not indented at all: structural content
    if trimmed.len() == line.len() {
        return true;
    }

    if trimmed.starts_with(CHANGE_MARKERS) {
        return true;
    }

    DECLARATION_KEYWORDS.iter().any(|keyword| {
        trimmed
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

/// Filter lines down to the changed ones, preserving order
pub fn changed_lines<S: AsRef<str>>(lines: &[S]) -> Vec<&str> {
    lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| is_changed_line(line))
        .collect()
}
