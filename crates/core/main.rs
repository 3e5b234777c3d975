#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![allow(clippy::mod_module_files)]

use std::{path::PathBuf, process};

mod app;
mod commands;

use app::OverrideOpts;
use commands::Commands;

use bibtex2cff::{
    file::FormatFile,
    format::{Cff, Compose, Format, Reader, Writer},
};

use clap::{Args, Parser};
use eyre::WrapErr;
use log::{info, trace};

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        process::exit(2);
    }
}

fn try_main() -> eyre::Result<()> {
    let Cli {
        bibfile,
        outfile,
        cite,
        stdout,
        overrides,
        command,
        global_opts: GlobalOpts { verbosity, quiet },
    } = Cli::parse();

    setup_errlog(usize::from(verbosity), quiet)?;

    let mut overrides = overrides.into_overrides();
    if let Some(command) = command {
        command.apply(&mut overrides)?;
    }

    let mut file = app::open_bib_file(bibfile)?;
    let entries = file.read_entries()?;
    let entry = bibtex2cff::select_entry(entries, cite.as_deref())?;
    trace!("Converting entry '{}'", entry.cite());

    let document = bibtex2cff::map_entry(&entry, overrides)?;
    // composed before the outfile is created so bad input never leaves a file behind
    let cff = Cff::compose(&document)?;

    if stdout {
        print!("{}", cff.raw());
    } else {
        let mut out = FormatFile::<Cff>::create(&outfile)?;
        out.write(cff)?;
        info!("Citation written to {}", out.path().display());
    }

    Ok(())
}

fn setup_errlog(verbosity: usize, quiet: bool) -> eyre::Result<()> {
    // quiet still shows errors, otherwise start at warnings
    let verbosity = if quiet { 0 } else { verbosity + 1 };

    stderrlog::new()
        .verbosity(verbosity)
        .init()
        .wrap_err("Cannot set up logging to stderr")
}

#[derive(Parser)]
#[clap(name = "bibtex2cff")]
#[clap(about = "Convert a BibTeX entry into a Citation File Format (CFF) file")]
#[clap(version, author)]
struct Cli {
    /// The BibTeX file to convert
    ///
    /// A name without an extension gets the .bib extension. When omitted the single .bib file in
    /// the current directory is used.
    #[clap(parse(from_os_str))]
    bibfile: Option<PathBuf>,

    /// The CFF file to write
    #[clap(short, long, parse(from_os_str), default_value = "CITATION.cff")]
    outfile: PathBuf,

    /// Convert the entry with this cite key instead of the first entry
    #[clap(short, long)]
    cite: Option<String>,

    /// Print the CFF document to stdout instead of writing the outfile
    #[clap(long)]
    stdout: bool,

    #[clap(flatten)]
    overrides: OverrideOpts,

    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(flatten)]
    global_opts: GlobalOpts,
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// How chatty the program is when converting
    ///
    /// The number of times this flag is used will increase how chatty
    /// the program is.
    #[clap(short, long, parse(from_occurrences), global = true)]
    verbosity: u8,

    /// Only log errors, the verbosity flag is ignored.
    #[clap(short, long, global = true)]
    quiet: bool,
}
