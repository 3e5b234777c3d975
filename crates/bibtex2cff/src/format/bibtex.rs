use std::{iter::Peekable, str::Chars};

use log::trace;

use crate::{
    ast::{BibEntry, EntryKind},
    Error, ErrorKind,
};

use super::{Format, Parse};

use biblatex::{Bibliography, EntryType};

/// Entry types that hold no citation data and are skipped.
const NON_CITATION_KINDS: [&str; 3] = ["comment", "preamble", "string"];

/// A type wrapper around [`String`] to represent a `BibTeX` format string.
#[derive(Debug)]
pub struct BibTex(String);

impl Format for BibTex {
    fn new(val: String) -> Self {
        Self(val)
    }

    fn raw(self) -> String {
        self.0
    }

    fn name() -> &'static str {
        "BibTeX"
    }

    fn ext() -> &'static str {
        "bib"
    }
}

impl Parse for BibTex {
    fn parse(self) -> Result<Vec<BibEntry>, Error> {
        check_structure(&self.0)?;

        let biblio = Bibliography::parse(&self.0).ok_or_else(|| {
            Error::new(
                ErrorKind::Parse,
                format!("Unable to parse string as {}", Self::name()),
            )
        })?;

        let entries = biblio
            .into_iter()
            .filter(|entry| !is_non_citation(&entry.entry_type))
            .map(BibEntry::from)
            .collect::<Vec<_>>();

        if entries.is_empty() {
            return Err(Error::new(ErrorKind::Parse, "No BibTeX entries found"));
        }

        if let Some(entry) = entries.iter().find(|entry| entry.cite().is_empty()) {
            return Err(Error::new(
                ErrorKind::Parse,
                format!("The @{} entry has no citation key", entry.kind()),
            ));
        }

        trace!("Parsed {} BibTeX entries", entries.len());
        Ok(entries)
    }
}

fn is_non_citation(entry_type: &EntryType) -> bool {
    matches!(entry_type, EntryType::Unknown(name) if NON_CITATION_KINDS.contains(&name.as_str()))
}

/// A character stream that counts the lines it has consumed.
struct Scanner<'s> {
    chars: Peekable<Chars<'s>>,
    line: usize,
}

impl<'s> Scanner<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.peek().filter(|&c| pred(c)) {
            self.bump();
            taken.push(c);
        }
        taken
    }
}

/// Checks the structure of the source before handing it to biblatex, which does not report
/// where the input is malformed.
///
/// Braces are counted outside of `%` comment lines, a backslash escapes the next character.
/// Every `@` outside of an entry starts an entry header which must read `@type{key,`.
fn check_structure(src: &str) -> Result<(), Error> {
    let mut scanner = Scanner::new(src);
    let mut depth = 0_usize;
    let mut entry_line = 1_usize;

    while let Some(c) = scanner.bump() {
        match c {
            '\\' => {
                scanner.bump();
            }
            '%' if depth == 0 => {
                scanner.take_while(|c| c != '\n');
            }
            '@' if depth == 0 => {
                entry_line = scanner.line;
                check_entry_header(&mut scanner, entry_line)?;
            }
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    Error::new(
                        ErrorKind::Parse,
                        format!("Unbalanced braces: unexpected '}}' on line {}", scanner.line),
                    )
                })?;
            }
            _ => {}
        }
    }

    if depth == 0 {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::Parse,
            format!("Unbalanced braces: the entry starting on line {entry_line} is never closed"),
        ))
    }
}

/// Checks the header of the entry after its `@`, leaving the scanner on the opening brace.
fn check_entry_header(scanner: &mut Scanner<'_>, line: usize) -> Result<(), Error> {
    scanner.take_while(char::is_whitespace);
    let kind = scanner.take_while(char::is_alphanumeric);
    scanner.take_while(char::is_whitespace);

    let parse_error =
        |message: String| -> Result<(), Error> { Err(Error::new(ErrorKind::Parse, message)) };
    match scanner.peek() {
        Some('{' | '(') if kind.is_empty() => {
            parse_error(format!("Missing entry type after '@' on line {line}"))
        }
        // Text outside of entries is ignored, so is a lone '@'
        _ if kind.is_empty() => Ok(()),
        Some('{') if NON_CITATION_KINDS.iter().any(|k| k.eq_ignore_ascii_case(&kind)) => Ok(()),
        Some('{') => check_cite_key(scanner, &kind, line),
        Some('(') => parse_error(format!(
            "The @{kind} entry on line {line} is delimited by parentheses, use braces instead"
        )),
        _ => parse_error(format!("Expected '{{' after '@{kind}' on line {line}")),
    }
}

fn check_cite_key(scanner: &Scanner<'_>, kind: &str, line: usize) -> Result<(), Error> {
    let key = scanner
        .chars
        .clone()
        .skip(1)
        .take_while(|c| !matches!(c, ',' | '{' | '}' | '='))
        .collect::<String>();
    let key = key.trim();

    if key.is_empty() {
        Err(Error::new(
            ErrorKind::Parse,
            format!("The @{kind} entry on line {line} has no citation key"),
        ))
    } else if key.contains(char::is_whitespace) {
        Err(Error::new(
            ErrorKind::Parse,
            format!(
                "The citation key '{key}' of the @{kind} entry on line {line} contains whitespace, \
                 is a ',' missing after the key?"
            ),
        ))
    } else {
        Ok(())
    }
}

impl From<biblatex::Entry> for BibEntry {
    fn from(entry: biblatex::Entry) -> Self {
        // Deconstruct to avoid cloning
        let biblatex::Entry {
            key: cite,
            entry_type,
            fields,
        } = entry;

        let kind = match entry_type {
            EntryType::Unknown(name) => EntryKind::from(name.as_str()),
            known => EntryKind::from(known.to_string().as_str()),
        };
        Self::new(
            kind,
            cite,
            fields
                .into_iter()
                .map(|(name, chunks)| (name, chunks_to_raw(chunks))),
        )
    }
}

/// Joins biblatex chunks back into a raw value, verbatim chunks are wrapped in braces again.
fn chunks_to_raw(chunks: biblatex::Chunks) -> String {
    use biblatex::Chunk::{self, Normal, Verbatim};

    // Check last character for an escape and if found then start merging using `merge_escaped`
    fn verbatim_chunk_merge(verbatim_str: &mut String, chunks: &mut impl Iterator<Item = Chunk>) {
        if verbatim_str.ends_with('/') {
            merge_escaped(verbatim_str, chunks);
        }
    }

    // biblatex treats a '/' inside a verbatim chunk as an escape, so `{(HTTP/1.1)}` is parsed
    // as V-N-V-N-V where V is verbatim and N is normal:
    //
    // [Verbatim("(HTTP/"), Normal("1"), Verbatim("."), Normal("1"), Verbatim(")")]
    //
    // The chunks up to and including the verbatim chunk after the second normal chunk are
    // merged back into one verbatim chunk. Each merged verbatim part may itself be escaped.
    fn merge_escaped(dest: &mut String, chunks: &mut impl Iterator<Item = Chunk>) {
        let mut normal_count = 0;
        while let Some(chunk) = chunks.next() {
            match chunk {
                Normal(s) => {
                    normal_count += 1;
                    dest.push_str(&s);
                }
                Verbatim(mut s) => {
                    verbatim_chunk_merge(&mut s, chunks);
                    dest.push_str(&s);
                    if normal_count == 2 {
                        return;
                    }
                }
            }
        }
    }

    let mut raw = String::new();
    let mut chunk_iter = chunks.into_iter();
    while let Some(chunk) = chunk_iter.next() {
        match chunk {
            Verbatim(mut s) => {
                verbatim_chunk_merge(&mut s, &mut chunk_iter);
                raw.push('{');
                raw.push_str(&s);
                raw.push('}');
            }
            Normal(s) => raw.push_str(&s),
        }
    }

    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FieldQuery;

    fn parse(src: &str) -> Result<Vec<BibEntry>, Error> {
        BibTex::new(src.to_owned()).parse()
    }

    #[test]
    fn parses_entries_in_source_order() {
        let entries = parse(include_str!("../../tests/data/article.bib")).unwrap();

        let cites = entries.iter().map(BibEntry::cite).collect::<Vec<_>>();
        assert_eq!(vec!["doe2023study", "smith2021survey"], cites);
        assert_eq!(&EntryKind::Other("article".to_owned()), entries[0].kind());
    }

    #[test]
    fn protective_braces_are_kept_in_raw_values() {
        let entries = parse(include_str!("../../tests/data/software.bib")).unwrap();
        let entry = &entries[0];

        assert_eq!(&EntryKind::Software, entry.kind());
        assert!(entry.get_field("title").unwrap().contains("{GPU}"));
        assert_eq!(
            Some("GPU kernels for BibTeX conversion".to_owned()),
            entry.get_text("title")
        );
    }

    #[test]
    fn misspelled_dataset_kind_is_accepted() {
        let entries = parse(include_str!("../../tests/data/dataset.bib")).unwrap();

        assert!(entries.iter().all(|e| e.kind() == &EntryKind::Dataset));
    }

    #[test]
    fn unknown_kind_keeps_its_name() {
        let entries = parse("@thesisdraft{key1, title = {A Study}}").unwrap();

        assert_eq!(&EntryKind::Other("thesisdraft".to_owned()), entries[0].kind());
    }

    #[test]
    fn leading_preamble_is_skipped() {
        let src = "@preamble{\"\\newcommand{\\noop}[1]{}\"}\n@misc{key1, title = {A Study}}\n";
        let entries = parse(src).unwrap();

        assert_eq!(1, entries.len());
        assert_eq!("key1", entries[0].cite());
        assert_eq!(&EntryKind::Misc, entries[0].kind());
    }

    #[test]
    fn leading_comment_is_skipped() {
        let entries = parse("@comment{ignored}\n@misc{key1, title = {A Study}}\n").unwrap();

        assert_eq!(1, entries.len());
        assert_eq!("key1", entries[0].cite());
    }

    #[test]
    fn trailing_jabref_comment_is_skipped() {
        let src = "@misc{key1, title = {A Study}}\n\n@Comment{jabref-meta: databaseType:bibtex;}\n";
        let entries = parse(src).unwrap();

        assert_eq!(1, entries.len());
        assert_eq!("key1", entries[0].cite());
    }

    #[test]
    fn only_comments_is_a_parse_error() {
        let err = parse("@comment{nothing to see}\n").unwrap_err();

        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.to_string().contains("No BibTeX entries found"));
    }

    #[test]
    fn parenthesized_entry_is_a_parse_error() {
        let err = parse("\n@misc(key1, title = {A Study}, year = {2020})\n").unwrap_err();

        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.to_string().contains("@misc entry on line 2"), "{err}");
    }

    #[test]
    fn missing_comma_after_cite_key_is_a_parse_error() {
        let err = parse("@misc{key1 title = {A Study}}").unwrap_err();

        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.to_string().contains("'key1 title'"), "{err}");
        assert!(err.to_string().contains("line 1"), "{err}");
    }

    #[test]
    fn missing_cite_key_is_a_parse_error() {
        let err = parse("@misc{, title = {A Study}}").unwrap_err();

        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.to_string().contains("has no citation key"), "{err}");
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        for src in ["", "   \n", "% only a comment\n"] {
            let err = parse(src).unwrap_err();
            assert_eq!(ErrorKind::Parse, err.kind(), "{src:?}");
        }
    }

    #[test]
    fn unclosed_brace_reports_the_entry_line() {
        let err = parse("\n\n@article{key1,\n  title = {A Study,\n  year = 2023\n}\n").unwrap_err();

        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn stray_brace_reports_its_line() {
        let err = parse("@misc{key1, title = {A}}\n}\n").unwrap_err();

        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn missing_entry_type_is_a_parse_error() {
        let err = parse("@{key1, title = {A Study}}").unwrap_err();

        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.to_string().contains("Missing entry type"));
    }

    #[test]
    fn braces_in_comments_are_ignored() {
        assert!(check_structure("% a stray { in a comment\n@misc{key1, title = {A}}\n").is_ok());
    }

    #[test]
    fn biblatex_verbatim_chunk_escape_is_corrected() {
        use biblatex::Chunk::{Normal, Verbatim};
        // `{(HTTP/1.1)}` is split up by the '/' escape in biblatex
        let chunks = vec![
            Verbatim("(HTTP/".to_owned()),
            Normal("1".to_owned()),
            Verbatim(".".to_owned()),
            Normal("1".to_owned()),
            Verbatim(")".to_owned()),
        ];

        assert_eq!("{(HTTP/1.1)}", chunks_to_raw(chunks));
    }

    #[test]
    fn normal_and_verbatim_chunks_are_joined() {
        use biblatex::Chunk::{Normal, Verbatim};
        let chunks = vec![
            Normal("A ".to_owned()),
            Verbatim("GPU".to_owned()),
            Normal(" Study".to_owned()),
        ];

        assert_eq!("A {GPU} Study", chunks_to_raw(chunks));
    }
}
