//! Line-oriented lexing for Riddical source text.
//!
//! There is no token grammar beyond splitting: the same routine splits the
//! source into trimmed lines and a line into whitespace-separated words.
//! Section discovery works over the line list, so every index reported in a
//! diagnostic is an index into the trimmed, non-empty line sequence.

use regex::Regex;
use std::ops::Range;

/// Splits `text` on `delim`, trimming each piece and dropping pieces that
/// trim to nothing. Relative order is preserved; no delimiter escaping.
pub fn tokenize(text: &str, delim: char) -> Vec<String> {
    text.split(delim)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Marker line indices of one named section. The body lies strictly between
/// the two markers; `close` may precede `open` if the source is scrambled,
/// which simply yields an empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub open: usize,
    pub close: usize,
}

impl Section {
    /// Index range of the section body, exclusive of both marker lines.
    pub fn body(&self) -> Range<usize> {
        if self.close > self.open {
            self.open + 1..self.close
        } else {
            0..0
        }
    }

    pub fn overlaps(&self, other: &Section) -> bool {
        let (a0, a1) = (self.open.min(self.close), self.open.max(self.close));
        let (b0, b1) = (other.open.min(other.close), other.open.max(other.close));
        !(a1 < b0 || b1 < a0)
    }
}

/// Finds the `section <name>:` and `end <name>` marker lines in one forward
/// scan. Each marker is searched independently and the last occurrence wins.
/// Returns `None` unless both markers are present.
pub fn find_section(lines: &[String], name: &str) -> Option<Section> {
    let open_marker = format!("section {}:", name);
    let close_marker = format!("end {}", name);

    let mut open = None;
    let mut close = None;
    for (i, line) in lines.iter().enumerate() {
        if *line == open_marker {
            open = Some(i);
        } else if *line == close_marker {
            close = Some(i);
        }
    }

    match (open, close) {
        (Some(open), Some(close)) => Some(Section { open, close }),
        _ => None,
    }
}

/// Compiled character-class matchers for the three word shapes the parser
/// distinguishes. Built once per `Compiler`.
pub struct TokenClasses {
    number: Regex,
    ident: Regex,
    opcode: Regex,
}

impl TokenClasses {
    pub fn new() -> Self {
        // The patterns are fixed and known-good, so construction cannot fail.
        TokenClasses {
            number: Regex::new(r"^-?[0-9]+$").unwrap(),
            ident: Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").unwrap(),
            opcode: Regex::new(r"^[A-Za-z]+:?$").unwrap(),
        }
    }

    /// A signed decimal integer literal.
    pub fn is_number(&self, word: &str) -> bool {
        self.number.is_match(word)
    }

    /// A variable name: a letter followed by letters or digits.
    pub fn is_ident(&self, word: &str) -> bool {
        self.ident.is_match(word)
    }

    /// An opcode name (alphabetic only), or a label (the same with a
    /// trailing colon).
    pub fn is_opcode(&self, word: &str) -> bool {
        self.opcode.is_match(word)
    }
}

impl Default for TokenClasses {
    fn default() -> Self {
        TokenClasses::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_lines() {
        assert_eq!(tokenize("  a  \n\nb\n  ", '\n'), vec!["a", "b"]);
        assert_eq!(tokenize("", '\n'), Vec::<String>::new());
        assert_eq!(tokenize("   \n \t \n", '\n'), Vec::<String>::new());
    }

    #[test]
    fn test_tokenize_words() {
        assert_eq!(tokenize("add  3   x", ' '), vec!["add", "3", "x"]);
        assert_eq!(tokenize("exit 0", ' '), vec!["exit", "0"]);
    }

    #[test]
    fn test_find_section() {
        let src = lines(&["section Start:", "exit 0", "end Start"]);
        let sec = find_section(&src, "Start").unwrap();
        assert_eq!(sec, Section { open: 0, close: 2 });
        assert_eq!(sec.body(), 1..2);

        assert_eq!(find_section(&src, "Data"), None);
    }

    #[test]
    fn test_find_section_last_marker_wins() {
        let src = lines(&[
            "section Start:",
            "exit 0",
            "end Start",
            "section Start:",
            "exit 1",
            "end Start",
        ]);
        let sec = find_section(&src, "Start").unwrap();
        assert_eq!(sec, Section { open: 3, close: 5 });
    }

    #[test]
    fn test_find_section_half_formed() {
        let src = lines(&["section Start:", "exit 0"]);
        assert_eq!(find_section(&src, "Start"), None);

        let src = lines(&["exit 0", "end Start"]);
        assert_eq!(find_section(&src, "Start"), None);
    }

    #[test]
    fn test_empty_body() {
        let src = lines(&["section Data:", "end Data"]);
        let sec = find_section(&src, "Data").unwrap();
        assert_eq!(sec.body().count(), 0);
    }

    #[test]
    fn test_overlap() {
        let a = Section { open: 0, close: 2 };
        let b = Section { open: 1, close: 3 };
        let c = Section { open: 3, close: 5 };
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn test_token_classes() {
        let classes = TokenClasses::new();

        assert!(classes.is_number("0"));
        assert!(classes.is_number("42"));
        assert!(classes.is_number("-17"));
        assert!(!classes.is_number("4x"));
        assert!(!classes.is_number("-"));
        assert!(!classes.is_number(""));

        assert!(classes.is_ident("msg"));
        assert!(classes.is_ident("x2"));
        assert!(!classes.is_ident("2x"));
        assert!(!classes.is_ident("foo:"));
        assert!(!classes.is_ident(""));

        assert!(classes.is_opcode("write"));
        assert!(classes.is_opcode("loop:"));
        assert!(!classes.is_opcode("wr1te"));
        assert!(!classes.is_opcode(":"));
    }
}
