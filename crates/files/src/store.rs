//! Photo store implementation
//!
//! The [`PhotoStore`] owns a single flat directory of uploaded photos. It is the only
//! component that creates, reads, enumerates or removes files in that directory.
//!
//! # Naming
//!
//! A stored photo is named `<unix-millis><extension>`, where the extension is taken from
//! the uploader's original file name. Files are opened with create-new semantics; when the
//! name for the current millisecond is already taken the millisecond component is bumped
//! until a free slot is found, so two uploads never share a name and a later upload never
//! replaces an earlier one.
//!
//! # Concurrency
//!
//! There is no lock around the directory. [`PhotoStore::clear`] enumerates and then removes
//! entries one at a time, so a photo written while a clear is running may survive it, and a
//! concurrent [`PhotoStore::get`] may observe [`FilesError::NotFound`].

use crate::constants::{DEFAULT_MEDIA_TYPE, MAX_NAME_ATTEMPTS};
use crate::{FilesError, FilesResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A photo held by the store
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StoredPhoto {
    /// Generated, store-unique file name
    pub name: String,

    /// Extension carried over from the original upload name, including the dot (may be empty)
    pub extension: String,

    /// Size of the stored payload in bytes
    pub size_bytes: u64,

    /// When the photo was written (file modification time for enumerated photos)
    pub stored_at: DateTime<Utc>,
}

/// Bytes of a stored photo together with a best-effort media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoContent {
    pub bytes: Vec<u8>,

    /// Detected from the payload's magic bytes; not authoritative
    pub media_type: String,
}

/// A single entry that could not be removed during a bulk clear
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct ClearFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of [`PhotoStore::clear`]
#[derive(Debug, Clone, Default, serde::Serialize, PartialEq, Eq)]
pub struct ClearReport {
    pub deleted: Vec<String>,
    pub failed: Vec<ClearFailure>,
}

/// Service for the upload directory
///
/// The store does no I/O at construction; the directory is created on the first upload.
#[derive(Debug)]
pub struct PhotoStore {
    directory: PathBuf,
}

impl PhotoStore {
    /// Creates a store rooted at `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Returns the directory this store manages
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes an uploaded photo under a freshly generated name
    ///
    /// # Arguments
    ///
    /// * `original_filename` - Name the client gave the file; only its extension is kept
    /// * `payload` - The photo bytes
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `payload` is empty
    /// - the upload directory cannot be created (I/O)
    /// - no free name is found within [`MAX_NAME_ATTEMPTS`] milliseconds
    /// - the file cannot be written (I/O)
    pub fn put(&self, original_filename: &str, payload: &[u8]) -> FilesResult<StoredPhoto> {
        if payload.is_empty() {
            return Err(FilesError::EmptyPayload);
        }

        fs::create_dir_all(&self.directory).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create upload directory {}: {}",
                    self.directory.display(),
                    e
                ),
            ))
        })?;

        let extension = original_extension(original_filename);
        let stored_at = Utc::now();
        let base_millis = stored_at.timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = format!("{}{}", base_millis + i64::from(attempt), extension);
            let path = self.directory.join(&name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!("photo name {} taken, trying next slot", name);
                    continue;
                }
                Err(e) => {
                    return Err(FilesError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to create {}: {}", path.display(), e),
                    )))
                }
            };

            if let Err(e) = file.write_all(payload) {
                // Do not leave a truncated photo behind under a name we handed out.
                drop(file);
                let _ = fs::remove_file(&path);
                return Err(FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to write photo to {}: {}", path.display(), e),
                )));
            }

            return Ok(StoredPhoto {
                name,
                extension,
                size_bytes: payload.len() as u64,
                stored_at,
            });
        }

        Err(FilesError::NameExhausted(MAX_NAME_ATTEMPTS))
    }

    /// Reads a stored photo by name
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `name` is not a plain file name (`InvalidName`)
    /// - no photo with that name exists (`NotFound`)
    /// - the file cannot be read (I/O)
    pub fn get(&self, name: &str) -> FilesResult<PhotoContent> {
        let path = self.resolve(name)?;

        if !path.is_file() {
            return Err(FilesError::NotFound(name.to_string()));
        }

        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                return FilesError::NotFound(name.to_string());
            }
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read photo from {}: {}", path.display(), e),
            ))
        })?;

        let media_type = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();

        Ok(PhotoContent { bytes, media_type })
    }

    /// Enumerates every stored photo, ordered by name
    ///
    /// A directory that has not been created yet holds no photos.
    pub fn list(&self) -> FilesResult<Vec<StoredPhoto>> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut photos = Vec::new();
        for entry in entries {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::warn!("skipping non UTF-8 entry in upload directory: {:?}", raw);
                    continue;
                }
            };

            let stored_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            photos.push(StoredPhoto {
                extension: original_extension(&name),
                name,
                size_bytes: metadata.len(),
                stored_at,
            });
        }

        photos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(photos)
    }

    /// Removes every entry in the upload directory
    ///
    /// Not atomic: the directory is read first, then each entry is removed in turn.
    /// Entries that cannot be removed are reported in [`ClearReport::failed`].
    ///
    /// # Errors
    ///
    /// Returns `FilesError::Io` if the directory exists but cannot be read.
    pub fn clear(&self) -> FilesResult<ClearReport> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ClearReport::default()),
            Err(e) => {
                return Err(FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to scan upload directory {}: {}",
                        self.directory.display(),
                        e
                    ),
                )))
            }
        };

        let mut report = ClearReport::default();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report.failed.push(ClearFailure {
                        name: String::new(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            match fs::remove_file(entry.path()) {
                Ok(()) => report.deleted.push(name),
                Err(e) => {
                    tracing::warn!("failed to delete {}: {}", name, e);
                    report.failed.push(ClearFailure {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.deleted.sort();
        Ok(report)
    }

    /// Maps a photo name onto a path inside the store, rejecting anything that is not a
    /// single plain path component
    fn resolve(&self, name: &str) -> FilesResult<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
            return Err(FilesError::InvalidName(name.to_string()));
        }
        Ok(self.directory.join(name))
    }
}

/// Extracts the extension of an uploaded file name, dot included
///
/// Only the final path component is considered. A leading dot does not start an
/// extension (`.hidden` has none). Extensions with characters outside ASCII
/// alphanumerics, `-` and `_` are discarded so generated names stay plain.
pub fn original_extension(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    match base.rfind('.') {
        None | Some(0) => String::new(),
        Some(idx) => {
            let extension = &base[idx..];
            let plain = extension[1..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if plain {
                extension.to_string()
            } else {
                String::new()
            }
        }
    }
}
