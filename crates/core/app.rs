use std::path::PathBuf;

use bibtex2cff::{cff::License, cff::Overrides, file::FormatFile, format::BibTex};

use chrono::NaiveDate;
use clap::Args;
use eyre::eyre;
use log::trace;

// Values that replace or extend the ones mapped from the BibTeX entry
#[derive(Debug, Default, Args)]
pub struct OverrideOpts {
    /// The message asking users to cite the work
    #[clap(long)]
    message: Option<String>,

    /// A summary of the work
    #[clap(long = "abstract")]
    abstract_text: Option<String>,

    /// The DOI of the work, a https://doi.org/ URL is reduced to the bare DOI
    #[clap(long)]
    doi: Option<String>,

    /// The URL of the landing page of the work
    #[clap(long)]
    url: Option<String>,

    /// The URL of the work in a repository that is neither a source code nor a build artifact
    /// repository
    #[clap(long)]
    repository: Option<String>,

    /// The URL of the source code repository
    #[clap(long)]
    repository_code: Option<String>,

    /// The URL of the build artifact repository
    #[clap(long)]
    repository_artifact: Option<String>,

    /// The SPDX license identifier, defaults to Unlicense
    #[clap(long)]
    license: Option<License>,

    /// The version of the work, defaults to the entry version or 0.0.1
    #[clap(long = "version-string")]
    version_string: Option<String>,

    /// The full SHA-1 hash of the released commit
    #[clap(long)]
    commit: Option<String>,

    /// The release date as YYYY-MM-DD, satisfies a missing year field
    #[clap(long)]
    date_released: Option<NaiveDate>,

    /// A keyword to add, can be used more than once
    #[clap(long = "keyword")]
    keywords: Vec<String>,
}

impl OverrideOpts {
    pub fn into_overrides(self) -> Overrides {
        Overrides {
            message: self.message,
            abstract_text: self.abstract_text,
            doi: self.doi,
            url: self.url,
            repository: self.repository,
            repository_code: self.repository_code,
            repository_artifact: self.repository_artifact,
            license: self.license,
            version: self.version_string,
            commit: self.commit,
            date_released: self.date_released,
            keywords: self.keywords,
            ..Overrides::default()
        }
    }
}

pub fn open_bib_file(bibfile: Option<PathBuf>) -> eyre::Result<FormatFile<BibTex>> {
    if let Some(path) = bibfile {
        trace!("Opening '{}' as the BibTeX file", path.display());
        Ok(FormatFile::open(path)?)
    } else {
        trace!("No BibTeX file given - try and find a .bib file in the current directory");
        FormatFile::find(".").map_err(|e| eyre!("{e}, pass the BibTeX file to convert"))
    }
}

/// Checks that every column is at most as long as the `key` column, which must not be empty.
pub fn check_columns(key: (&str, usize), columns: &[(&str, usize)]) -> eyre::Result<()> {
    let (key_name, key_len) = key;
    if key_len == 0 {
        return Err(eyre!("At least one --{key_name} is required"));
    }

    match columns.iter().find(|(_, len)| *len > key_len) {
        Some((name, len)) => Err(eyre!(
            "Found {len} values for --{name} but only {key_len} for --{key_name}, \
             values are matched by position"
        )),
        None => Ok(()),
    }
}
