use bibtex2cff::cff::{Author, Identifier, IdentifierKind, Overrides, Person};

use clap::{AppSettings, Subcommand};
use log::trace;

use crate::app::check_columns;

#[derive(Subcommand)]
#[non_exhaustive]
pub enum Commands {
    /// Replace the authors of the entry
    ///
    /// Each option can be used more than once, values are matched by position so the second
    /// --given-name belongs to the second --family-name.
    #[clap(setting(AppSettings::ArgRequiredElseHelp))]
    Authors {
        /// The family names of an author
        #[clap(long = "family-name", required = true)]
        family_names: Vec<String>,
        /// The given names of an author
        #[clap(long = "given-name")]
        given_names: Vec<String>,
        /// The surname prefix of an author, such as 'van'
        #[clap(long = "name-particle")]
        name_particles: Vec<String>,
        /// The name suffix of an author, such as 'Jr.'
        #[clap(long = "name-suffix")]
        name_suffixes: Vec<String>,
        /// The affiliation of an author
        #[clap(long = "affiliation")]
        affiliations: Vec<String>,
        /// The ORCID of an author, as the bare id or the https://orcid.org/ URL
        #[clap(long = "orcid")]
        orcids: Vec<String>,
        /// The email address of an author
        #[clap(long = "email")]
        emails: Vec<String>,
    },
    /// Add identifiers of the work
    ///
    /// --type and --value must be used the same number of times, values are matched by position.
    #[clap(setting(AppSettings::ArgRequiredElseHelp))]
    Identifiers {
        /// The type of an identifier: doi, url, swh or other
        #[clap(long = "type", required = true)]
        kinds: Vec<IdentifierKind>,
        /// The value of an identifier
        #[clap(long = "value", required = true)]
        values: Vec<String>,
        /// What an identifier refers to
        #[clap(long = "description")]
        descriptions: Vec<String>,
    },
}

impl Commands {
    pub fn apply(self, overrides: &mut Overrides) -> eyre::Result<()> {
        match self {
            Commands::Authors {
                family_names,
                given_names,
                name_particles,
                name_suffixes,
                affiliations,
                orcids,
                emails,
            } => {
                check_columns(
                    ("family-name", family_names.len()),
                    &[
                        ("given-name", given_names.len()),
                        ("name-particle", name_particles.len()),
                        ("name-suffix", name_suffixes.len()),
                        ("affiliation", affiliations.len()),
                        ("orcid", orcids.len()),
                        ("email", emails.len()),
                    ],
                )?;
                trace!("Replacing the entry authors with {} authors", family_names.len());

                let authors = family_names
                    .into_iter()
                    .enumerate()
                    .map(|(i, family_names)| {
                        Author::Person(Person {
                            given_names: given_names.get(i).cloned(),
                            name_particle: name_particles.get(i).cloned(),
                            name_suffix: name_suffixes.get(i).cloned(),
                            affiliation: affiliations.get(i).cloned(),
                            orcid: orcids.get(i).cloned(),
                            email: emails.get(i).cloned(),
                            ..Person::new(family_names)
                        })
                    })
                    .collect();

                overrides.authors = Some(authors);
            }
            Commands::Identifiers {
                kinds,
                values,
                descriptions,
            } => {
                check_columns(
                    ("value", values.len()),
                    &[
                        ("type", kinds.len()),
                        ("description", descriptions.len()),
                    ],
                )?;
                if kinds.len() != values.len() {
                    return Err(eyre::eyre!(
                        "Found {} values for --type but {} for --value, each identifier needs both",
                        kinds.len(),
                        values.len()
                    ));
                }

                let mut descriptions = descriptions.into_iter();
                overrides.identifiers.extend(
                    kinds
                        .into_iter()
                        .zip(values)
                        .map(|(kind, value)| Identifier::new(kind, value, descriptions.next())),
                );
            }
        }

        Ok(())
    }
}
