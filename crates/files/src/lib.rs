//! snaplog photo storage
//!
//! This crate owns the directory of uploaded photos behind the snaplog HTTP service.
//!
//! ## Storage Model
//!
//! - One flat directory, no subdirectories and no sidecar metadata
//! - Each photo is named `<unix-millis><original extension>` at upload time
//! - Photos are never modified after they are written
//! - The only removal is a bulk clear of the whole directory
//!
//! ```text
//! uploads/
//! ├── 1718000000000.png
//! ├── 1718000000001.png
//! └── 1718000004521.jpg
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use snaplog_files::PhotoStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PhotoStore::new("uploads");
//! let photo = store.put("holiday.png", b"\x89PNG\r\n\x1a\n")?;
//! let content = store.get(&photo.name)?;
//! assert_eq!(content.bytes.len(), 8);
//! # Ok(())
//! # }
//! ```

mod constants;
mod store;

pub use constants::{DEFAULT_MEDIA_TYPE, MAX_NAME_ATTEMPTS};
pub use store::{
    original_extension, ClearFailure, ClearReport, PhotoContent, PhotoStore, StoredPhoto,
};

/// Errors that can occur during photo storage operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// The upload carried no bytes
    #[error("Payload is empty")]
    EmptyPayload,

    /// Name is not a plain file name inside the store (potential directory traversal)
    #[error("Invalid photo name: {0}")]
    InvalidName(String),

    /// No photo with this name exists
    #[error("Photo not found: {0}")]
    NotFound(String),

    /// Every candidate name for this upload was already taken
    #[error("Could not allocate a free name after {0} attempts")]
    NameExhausted(u32),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FilesResult<T> = std::result::Result<T, FilesError>;
