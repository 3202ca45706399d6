use serde::Serialize;

use crate::error::CorpusError;

/// One line of a stored file, positioned within that file only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub index: usize,
    pub text: String,
}

impl Line {
    /// Length in Unicode scalar values, the unit lines are ranked by.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Characters that terminate a line, besides the `\r\n` pair.
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Splits text on universal line boundaries.
///
/// A trailing boundary does not yield a trailing empty line, so `"a\nb\n"` gives two lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(text.get(start..pos).unwrap_or_default());
        let mut end = pos + c.len_utf8();
        if c == '\r' {
            if let Some(&(next_pos, '\n')) = chars.peek() {
                chars.next();
                end = next_pos + 1;
            }
        }
        start = end;
    }

    if start < text.len() {
        lines.push(text.get(start..).unwrap_or_default());
    }

    lines
}

/// Decodes a blob as UTF-8 and turns it into indexed lines.
///
/// Fails with [`CorpusError::Decoding`] for invalid UTF-8 and with
/// [`CorpusError::EmptyContent`] when the text holds no lines at all.
pub fn extract_lines(bytes: &[u8]) -> Result<Vec<Line>, CorpusError> {
    let text = std::str::from_utf8(bytes)?;

    let lines: Vec<Line> = split_lines(text)
        .into_iter()
        .enumerate()
        .map(|(index, text)| Line {
            index,
            text: text.to_string(),
        })
        .collect();

    if lines.is_empty() {
        return Err(CorpusError::EmptyContent(String::new()));
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_trailing_newline_is_not_a_line() {
        let lines = extract_lines(b"a\nb\n").expect("valid text");
        assert_eq!(texts(&lines), vec!["a", "b"]);
        assert_eq!(lines[1].index, 1);
    }

    #[test]
    fn test_mixed_boundaries() {
        let lines = extract_lines("one\r\ntwo\rthree\u{2028}four\x0cfive".as_bytes())
            .expect("valid text");
        assert_eq!(texts(&lines), vec!["one", "two", "three", "four", "five"]);
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let lines = extract_lines(b"first\n\nthird").expect("valid text");
        assert_eq!(texts(&lines), vec!["first", "", "third"]);

        let lines = extract_lines(b"\n").expect("valid text");
        assert_eq!(texts(&lines), vec![""]);
    }

    #[test]
    fn test_round_trip_reconstructs_text() {
        let original = "alpha\nbeta\n\ngamma delta\nepsilon";
        let lines = extract_lines(original.as_bytes()).expect("valid text");
        assert_eq!(lines.len(), 5);
        let rebuilt = texts(&lines).join("\n");
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_indices_are_sequential() {
        let lines = extract_lines(b"x\ny\nz").expect("valid text");
        let indices: Vec<usize> = lines.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_input_is_empty_content() {
        assert!(matches!(
            extract_lines(b""),
            Err(CorpusError::EmptyContent(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_decoding_error() {
        assert!(matches!(
            extract_lines(&[0x66, 0x6f, 0xff, 0xfe]),
            Err(CorpusError::Decoding(_))
        ));
    }

    #[test]
    fn test_char_len_counts_code_points() {
        let line = Line {
            index: 0,
            text: "héllo".to_string(),
        };
        assert_eq!(line.char_len(), 5);
        assert_eq!(line.text.len(), 6);
    }
}
