#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![doc = include_str!("../README.md")]

pub mod ast;
pub mod cff;
mod error;
#[cfg(feature = "file")]
pub mod file;
pub mod format;

use ast::BibEntry;
use cff::{CffDocument, Overrides, Resolver};
pub use error::{Error, ErrorKind};
use format::{BibTex, Cff, Compose, Format, Parse};
use log::{trace, warn};

/// Parses BibTeX text into its entries in source order.
///
/// # Errors
///
/// Returns a [`ErrorKind::Parse`] error when the text is not well-formed BibTeX or contains no
/// entries.
pub fn parse_bibtex(src: &str) -> Result<Vec<BibEntry>, Error> {
    trace!("Parse {} bytes of BibTeX", src.len());
    BibTex::new(src.to_owned()).parse()
}

/// Picks the entry to convert.
///
/// With a `cite` key the entry with that key is returned, keys are compared case-insensitively.
/// Without one the first entry is returned and a warning is logged when there are more.
///
/// # Errors
///
/// Returns a [`ErrorKind::Validation`] error when no entry has the `cite` key or `entries` is
/// empty.
pub fn select_entry(mut entries: Vec<BibEntry>, cite: Option<&str>) -> Result<BibEntry, Error> {
    match cite {
        Some(cite) => entries
            .into_iter()
            .find(|entry| entry.cite().eq_ignore_ascii_case(cite))
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::Validation,
                    format!("No entry with the cite key '{cite}'"),
                )
            }),
        None => {
            if entries.len() > 1 {
                warn!(
                    "Found {} entries, converting the first one '{}'",
                    entries.len(),
                    entries[0].cite()
                );
            }
            if entries.is_empty() {
                Err(Error::new(ErrorKind::Validation, "No entry to convert"))
            } else {
                Ok(entries.swap_remove(0))
            }
        }
    }
}

/// Maps one entry, with the `overrides` applied, onto a [`CffDocument`].
///
/// # Errors
///
/// Returns a [`ErrorKind::Validation`] error when a field cannot be coerced or a required field
/// is missing.
pub fn map_entry(entry: &BibEntry, overrides: Overrides) -> Result<CffDocument, Error> {
    let mut resolver = Resolver::from_entry(entry)?;
    resolver.apply(overrides)?;
    resolver.resolve().map_err(Error::from)
}

/// Composes a [`CffDocument`] to CFF YAML text.
///
/// # Errors
///
/// Returns a [`ErrorKind::Serialize`] error when the document cannot be serialized.
pub fn compose_cff(document: &CffDocument) -> Result<String, Error> {
    Cff::compose(document).map(Format::raw)
}

/// Runs the whole pipeline: parse `src`, pick the entry and map it, then compose the YAML.
///
/// # Errors
///
/// Returns the first error of [`parse_bibtex`], [`select_entry`], [`map_entry`] or
/// [`compose_cff`].
pub fn convert(src: &str, cite: Option<&str>, overrides: Overrides) -> Result<String, Error> {
    let entry = select_entry(parse_bibtex(src)?, cite)?;
    let document = map_entry(&entry, overrides)?;
    compose_cff(&document)
}
