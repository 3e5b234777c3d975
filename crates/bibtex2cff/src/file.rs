//! Format supporting Filesystem operations.
//!
//! Input files are only ever opened for reading, output files are created (or truncated) for
//! writing.

use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
};

use crate::{
    format::{Format, Reader, Writer},
    Error, ErrorKind,
};

use glob::{glob, Pattern};

/// A reference to an open file on the filesystem which should have the textual content that
/// matches the generic [`Format`].
///
/// `FormatFile`s are automatically closed when they go out of scope.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug)]
pub struct FormatFile<F: Format> {
    file: File,
    path: PathBuf,
    _format: PhantomData<F>,
}

impl<F: Format> FormatFile<F> {
    const fn new(file: File, path: PathBuf) -> Self {
        Self {
            file,
            path,
            _format: PhantomData,
        }
    }

    /// Attempts to open a format file in read-only mode.
    ///
    /// A path without an extension gets the [`Format::ext`] extension.
    ///
    /// # Errors
    /// This function will return an error if the path has a different extension, does not exist
    /// or the user lacks permissions to open the file.
    ///
    /// # Examples
    /// ```no_run
    /// use bibtex2cff::{
    ///     file::FormatFile,
    ///     format::BibTex
    /// };
    ///
    /// fn main() -> Result<(), bibtex2cff::Error> {
    ///     // opens refs.bib
    ///     let mut f = FormatFile::<BibTex>::open("refs")?;
    ///     Ok(())
    /// }
    ///
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        match path.extension() {
            None => open_file_for_read(path.with_extension(F::ext())),
            Some(ext) if ext.eq_ignore_ascii_case(F::ext()) => open_file_for_read(path.to_owned()),
            Some(ext) => Err(Error::new(
                ErrorKind::IO,
                format!(
                    "'{}' has the extension '.{}', expected a .{} file",
                    path.display(),
                    ext.to_string_lossy(),
                    F::ext()
                ),
            )),
        }
    }

    /// Attempts to find a single format file in the directory.
    ///
    /// This function will use the value from the [`Format::ext`] associated function to
    /// find a file with the same extension.
    ///
    /// # Errors
    /// This function will return an error if:
    /// - The path is not a directory
    /// - No file or more than one file can be found in the directory
    /// - User lacks permissions to open the file
    ///
    /// # Examples
    /// ```no_run
    /// use bibtex2cff::{
    ///     file::FormatFile,
    ///     format::BibTex,
    /// };
    ///
    /// fn main() -> Result<(), bibtex2cff::Error> {
    ///     let mut f = FormatFile::<BibTex>::find(".")?;
    ///     Ok(())
    /// }
    ///
    /// ```
    pub fn find<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(Error::new(
                ErrorKind::IO,
                format!("{} is not a directory", dir.display()),
            ));
        }

        find_format_file_in_directory(dir)
    }

    /// Opens a format file for writing.
    ///
    /// This function will create a file if it does not exist, and will truncate it if it does. A
    /// path without an extension gets the [`Format::ext`] extension.
    ///
    /// # Errors
    /// This function will return an error if the user lacks permissions to create the file or
    /// its directory does not exist.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let path = if path.extension().is_none() {
            path.with_extension(F::ext())
        } else {
            path.to_owned()
        };
        create_file_for_write(path)
    }

    /// Returns the path the file was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<F: Format> Reader for FormatFile<F> {
    type Format = F;

    fn read(&mut self) -> Result<Self::Format, Error> {
        let mut content = String::new();
        let bytes = self.file.read_to_string(&mut content).map_err(|e| {
            Error::wrap_with(
                ErrorKind::IO,
                e,
                format!("Cannot read contents of '{}'", self.path.display()),
            )
        })?;

        log::info!(
            "Read {bytes} bytes of {} from {}",
            F::name(),
            self.path.display()
        );
        Ok(F::new(content))
    }
}

impl<F: Format> Writer for FormatFile<F> {
    type Format = F;

    fn write(&mut self, format: F) -> Result<(), Error> {
        fn overwrite_file_from_start(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
            // Rewind so that a second write replaces the contents instead of appending
            file.rewind()?;
            file.set_len(bytes.len() as u64)?;
            file.write_all(bytes)?;
            file.flush()
        }

        let bytes = format.raw().into_bytes();
        overwrite_file_from_start(&mut self.file, &bytes).map_err(|e| {
            Error::wrap_with(
                ErrorKind::IO,
                e,
                format!("Cannot write to '{}'", self.path.display()),
            )
        })?;

        log::info!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

#[inline]
fn open_file_for_read<F: Format>(path: PathBuf) -> Result<FormatFile<F>, Error> {
    match File::open(&path) {
        Ok(file) => Ok(FormatFile::new(file, path)),
        Err(e) => Err(Error::wrap_with(
            ErrorKind::IO,
            e,
            format!("Failed to open the '{}' file for reading", path.display()),
        )),
    }
}

#[inline]
fn create_file_for_write<F: Format>(path: PathBuf) -> Result<FormatFile<F>, Error> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&path);

    match file {
        Ok(file) => Ok(FormatFile::new(file, path)),
        Err(e) => Err(Error::wrap_with(
            ErrorKind::IO,
            e,
            format!("Failed to create the '{}' file for writing", path.display()),
        )),
    }
}

fn find_format_file_in_directory<F: Format>(dir: &Path) -> Result<FormatFile<F>, Error> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        F::ext()
    );

    let mut paths = glob(&pattern)
        .map_err(|e| Error::wrap_with(ErrorKind::IO, e, "Invalid directory pattern"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            Error::wrap_with(
                ErrorKind::IO,
                e,
                "Cannot determine a file path - Do you have the correct permissions?",
            )
        })?;

    match paths.len() {
        0 => Err(Error::new(
            ErrorKind::IO,
            format!(
                "No .{} file found in the '{}' directory",
                F::ext(),
                dir.display()
            ),
        )),
        1 => {
            let path = paths.remove(0);
            log::debug!("Found {}", path.display());
            open_file_for_read(path)
        }
        n => Err(Error::new(
            ErrorKind::IO,
            format!(
                "More than one .{} file found ({n}), pass the one to convert",
                F::ext()
            ),
        )),
    }
}
