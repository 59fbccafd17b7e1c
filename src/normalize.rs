//! Template normalization: drop `//` comments and blank lines, keep source line numbers.

use crate::error::Error;

/// A significant template line, trimmed, with its 1-based source line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

/// Normalized template: the leading version line and the remaining significant lines.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub version: Line,
    pub lines: Vec<Line>,
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(i) => &line[..i],
        None => line,
    }
}

/// All significant lines of `source` in order.
pub fn significant_lines(source: &str) -> Vec<Line> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let text = strip_comment(raw).trim();
            if text.is_empty() {
                None
            } else {
                Some(Line {
                    number: i + 1,
                    text: text.to_string(),
                })
            }
        })
        .collect()
}

/// Split `source` into its version line and the structural lines that follow.
pub fn normalize(source: &str) -> Result<Normalized, Error> {
    let mut lines = significant_lines(source).into_iter();
    let version = lines
        .next()
        .ok_or_else(|| Error::structure(0, "empty template: missing version line"))?;
    Ok(Normalized {
        version,
        lines: lines.collect(),
    })
}
