use crate::{cff::CffDocument, Error, ErrorKind};

use super::{Compose, Format};

/// The comment line every composed document starts with.
pub const HEADER: &str = concat!(
    "# This CITATION.cff file was generated with bibtex2cff ",
    env!("CARGO_PKG_VERSION"),
    "\n"
);

/// A type wrapper around [`String`] to represent a Citation File Format YAML string.
#[derive(Debug)]
pub struct Cff(String);

impl Format for Cff {
    fn new(val: String) -> Self {
        Self(val)
    }

    fn raw(self) -> String {
        self.0
    }

    fn name() -> &'static str {
        "Citation File Format"
    }

    fn ext() -> &'static str {
        "cff"
    }
}

impl Compose for Cff {
    fn compose(document: &CffDocument) -> Result<Self, Error> {
        let yaml =
            serde_yaml::to_string(document).map_err(|e| Error::wrap(ErrorKind::Serialize, e))?;

        let mut raw = String::with_capacity(HEADER.len() + yaml.len());
        raw.push_str(HEADER);
        raw.push_str(&yaml);
        Ok(Self(raw))
    }
}
