//! Contains the [`Format`], [`Reader`] and [`Writer`] traits and the formats of the pipeline.
//!
//! [`BibTex`] is the input format that can be parsed into entries and [`Cff`] is the output
//! format that can be composed from a [`CffDocument`].
use std::marker::PhantomData;

mod bibtex;
mod cff;

use crate::{ast::BibEntry, cff::CffDocument, Error};
pub use bibtex::BibTex;
pub use cff::Cff;

/// A textual representation of bibliographic data.
///
/// Formats are promises at the type level about what a [`String`] (or similar) represents.
pub trait Format {
    /// Construct a new type using a [`String`] input.
    ///
    /// This function should not panic or fail as creating a [`Format`] is a type promise about
    /// what the [`String`] represents.
    fn new(val: String) -> Self;

    /// The current [`Format`] in a raw [`String`].
    fn raw(self) -> String;

    /// The display name of the format.
    fn name() -> &'static str;

    /// The file extension associated with this format.
    fn ext() -> &'static str;
}

/// A [`Format`] that can be parsed into [`BibEntry`]s.
pub trait Parse: Format {
    /// Parses this [`Format`] into its entries in source order.
    ///
    /// # Errors
    ///
    /// Will return a [`crate::ErrorKind::Parse`] error if the text is not well-formed or has no
    /// entries.
    fn parse(self) -> Result<Vec<BibEntry>, Error>;
}

/// A [`Format`] that can be composed from a [`CffDocument`].
pub trait Compose: Format + Sized {
    /// Composes a [`CffDocument`] to this [`Format`].
    ///
    /// # Errors
    ///
    /// Will return a [`crate::ErrorKind::Serialize`] error if the document cannot be
    /// represented in this format.
    fn compose(document: &CffDocument) -> Result<Self, Error>;
}

/// A trait for objects which are [`Format`]-oriented sinks.
///
/// Writers have a default implemention of [`Writer::write_document`] using the [`Writer::write`]
/// method.
pub trait Writer {
    /// The format associated with the writer.
    type Format: Format;

    /// Write a format into this writer.
    ///
    /// # Errors
    ///
    /// The call to write should only return an [`Err`] when writing to the writer cannot be
    /// completed.
    fn write(&mut self, format: Self::Format) -> Result<(), Error>;

    /// Compose the [`CffDocument`] with the [`Writer::Format`] and write it into this writer.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] when composing fails or writing cannot be completed.
    fn write_document(&mut self, document: &CffDocument) -> Result<(), Error>
    where
        Self::Format: Compose,
    {
        let format = Self::Format::compose(document)?;
        self.write(format)
    }
}

/// The [`Reader`] trait allows for reading a [`Format`] from a source.
///
/// Readers have a default implemention of [`Reader::read_entries`] using the [`Reader::read`]
/// method.
pub trait Reader {
    /// The format associated with the reader.
    type Format: Format;

    /// Pull some bytes from this reader in order to produce a [`Reader::Format`] instance.
    ///
    /// # Errors
    /// If this method encounters any form of error making it unable to read the bytes in order to
    /// create the format.
    fn read(&mut self) -> Result<Self::Format, Error>;

    /// Read using [`Reader::read`] and then parse with [`Parse::parse`].
    ///
    /// # Errors
    /// This will return [`Err`] if there is an error from [`Reader::read`] or an error when parsing
    /// using [`Parse::parse`].
    fn read_entries(&mut self) -> Result<Vec<BibEntry>, Error>
    where
        Self::Format: Parse,
    {
        let format = self.read()?;
        format.parse()
    }
}

/// A [`String`] wrapper that includes type information of the format the wrapped [`String`]
/// represents.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, PartialEq, Eq)]
pub struct FormatString<F: Format> {
    inner: String,
    _format: PhantomData<F>,
}

impl<F: Format> Default for FormatString<F> {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl<F: Format> FormatString<F> {
    /// Construct a new instance by wrapping an existing [`String`].
    #[must_use]
    pub const fn new(val: String) -> Self {
        Self {
            inner: val,
            _format: PhantomData,
        }
    }
}

impl<F: Format> From<FormatString<F>> for String {
    fn from(val: FormatString<F>) -> Self {
        val.inner
    }
}

impl<F: Format> Reader for FormatString<F> {
    type Format = F;

    fn read(&mut self) -> Result<Self::Format, Error> {
        Ok(F::new(self.inner.clone()))
    }
}

impl<F: Format> Writer for FormatString<F> {
    type Format = F;

    fn write(&mut self, format: F) -> Result<(), Error> {
        self.inner.push_str(&format.raw());
        Ok(())
    }
}
