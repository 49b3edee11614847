use crate::error::{MnemonicError, Result};

const BULLET_MARKERS: [char; 3] = ['•', '-', '*'];

/// Split free text into terms, one per non-blank line.
///
/// Lines are trimmed and lose their leading bullets (`•`, `-` or `*`
/// followed by whitespace), so parsing the joined result again is a no-op.
/// Order and duplicates are preserved.
pub fn parse_terms(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(strip_bullet)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let mut rest = line;
    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some(marker) if BULLET_MARKERS.contains(&marker) => {
                let after = chars.as_str();
                if after.is_empty() || after.starts_with(char::is_whitespace) {
                    rest = after.trim_start();
                } else {
                    return rest;
                }
            }
            _ => return rest,
        }
    }
}

/// Uppercased first character of every term.
pub fn first_letters(terms: &[String]) -> Result<Vec<char>> {
    if terms.is_empty() {
        return Err(MnemonicError::EmptyTerm);
    }

    terms
        .iter()
        .map(|term| {
            term.chars()
                .next()
                .and_then(|c| c.to_uppercase().next())
                .ok_or(MnemonicError::EmptyTerm)
        })
        .collect()
}
