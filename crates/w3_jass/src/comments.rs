//! Extraction of line comments, which the parser discards

use std::collections::BTreeMap;

use tracing::instrument;

/// Every `//` comment in `text`, keyed by 1-based line number
///
/// The comment text starts at the `//` and runs to the end of the line. Markers inside string and
/// raw id literals are not comments; literals may span lines.
#[instrument(skip_all, fields(len = text.len()))]
pub fn comments(text: &str) -> BTreeMap<usize, String> {
    let mut comments = BTreeMap::new();
    let mut line = 1;
    let mut quote = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match (quote, c) {
            (_, '\n') => line += 1,
            (Some('"'), '\\') => {
                if let Some((_, '\n')) = chars.next() {
                    line += 1;
                }
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '/') if chars.peek().is_some_and(|&(_, next)| next == '/') => {
                let end = text[i..].find('\n').map_or(text.len(), |n| i + n);
                comments.insert(line, text[i..end].trim_end_matches('\r').to_owned());
                while chars.next_if(|&(j, _)| j < end).is_some() {}
            }
            (None, _) => {}
        }
    }
    comments
}
