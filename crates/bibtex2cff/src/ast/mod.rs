//! The in-memory representation of a parsed BibTeX entry.
//!
//! A [`BibEntry`] stores field values as raw strings which still contain the protective braces
//! of the source, [`FieldQuery::get_text`] returns the cleaned value used for output.

mod entry;
pub(crate) mod text;

pub use entry::{BibEntry, EntryKind};

/// Query the fields of a bibliographic entry by name.
pub trait FieldQuery {
    /// Searches for a raw field value that matches the `name` given.
    ///
    /// Field names are stored in lowercase so `name` should be lowercase too.
    fn get_field(&self, name: &str) -> Option<&str>;

    /// Returns the field value as plain text: BibTeX braces removed, LaTeX accents converted and
    /// whitespace collapsed.
    ///
    /// Returns `None` when the field is missing or has no text once cleaned.
    fn get_text(&self, name: &str) -> Option<String> {
        self.get_field(name)
            .map(text::clean)
            .filter(|s| !s.is_empty())
    }

    /// Returns the field value with only the braces removed and whitespace collapsed.
    ///
    /// Identifiers such as DOIs, URLs and dates use this so that LaTeX conversion cannot change
    /// them.
    fn get_literal(&self, name: &str) -> Option<String> {
        self.get_field(name)
            .map(text::literal)
            .filter(|s| !s.is_empty())
    }
}
