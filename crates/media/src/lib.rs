//! Media storage for Murmur
//!
//! This crate stores uploaded images on disk under an explicitly
//! configured root directory and hands back opaque reference strings.
//! The engagement core attaches those references to tweets and profiles
//! without ever interpreting them.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

/// Maximum accepted upload size in bytes
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Media store error types
#[derive(Debug, Error)]
pub enum MediaError {
    /// Unsupported image format
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Upload exceeds the size cap
    #[error("Upload size {size} exceeds maximum {max}")]
    FileTooLarge {
        /// Actual upload size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Bytes do not decode as an image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Reference escapes the store root or is empty
    #[error("Invalid media reference: {0}")]
    InvalidReference(String),

    /// No media stored under the reference
    #[error("Media not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for media operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Image formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedFormat {
    /// JPEG format
    Jpeg,
    /// PNG format
    Png,
}

impl SupportedFormat {
    /// Canonical file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Try to detect the format from a file extension
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(MediaError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Media store configuration
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Root directory for stored files
    pub root: PathBuf,
    /// Maximum upload size in bytes
    pub max_size: usize,
}

impl MediaConfig {
    /// Create a configuration with the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), max_size: MAX_UPLOAD_SIZE }
    }

    /// Set the maximum upload size in bytes
    pub fn max_size(mut self, bytes: usize) -> Self {
        self.max_size = bytes;
        self
    }
}

/// Disk-backed media store
///
/// Each stored upload gets a collision-free generated name. The returned
/// reference is the file name relative to the configured root; callers
/// treat it as opaque.
///
/// # Example
///
/// ```rust,no_run
/// use media::{MediaConfig, MediaStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MediaStore::open(MediaConfig::new("uploads")).await?;
/// let bytes = std::fs::read("photo.png")?;
/// let reference = store.store(&bytes, "png").await?;
/// let loaded = store.load(&reference).await?;
/// assert_eq!(loaded, bytes);
/// # Ok(())
/// # }
/// ```
pub struct MediaStore {
    root: PathBuf,
    max_size: usize,
}

impl MediaStore {
    /// Open a media store, creating the root directory if needed
    pub async fn open(config: MediaConfig) -> Result<Self> {
        fs::create_dir_all(&config.root).await?;

        Ok(Self { root: config.root, max_size: config.max_size })
    }

    /// Store image bytes, returning the opaque reference
    ///
    /// # Errors
    ///
    /// - `MediaError::FileTooLarge` - payload over the configured cap
    /// - `MediaError::UnsupportedFormat` - extension is not JPEG or PNG
    /// - `MediaError::Decode` - bytes are not a decodable image
    pub async fn store(&self, bytes: &[u8], extension: &str) -> Result<String> {
        if bytes.len() > self.max_size {
            return Err(MediaError::FileTooLarge { size: bytes.len(), max: self.max_size });
        }

        let format = SupportedFormat::from_extension(extension)?;

        image::load_from_memory(bytes).map_err(|e| MediaError::Decode(e.to_string()))?;

        let reference = format!("{}.{}", Uuid::new_v4(), format.extension());
        fs::write(self.root.join(&reference), bytes).await?;
        tracing::debug!("Stored media {}", reference);

        Ok(reference)
    }

    /// Load stored bytes by reference
    pub async fn load(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.resolve(reference)?;

        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(reference.to_string()))
            }
            Err(e) => Err(MediaError::Io(e)),
        }
    }

    /// Remove stored media by reference, returning whether it existed
    pub async fn remove(&self, reference: &str) -> Result<bool> {
        let path = self.resolve(reference)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(MediaError::Io(e)),
        }
    }

    /// Resolve a reference to a path inside the root
    ///
    /// References are bare file names; anything with a path component is
    /// rejected so a reference can never escape the store.
    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        if reference.is_empty()
            || reference.contains(['/', '\\'])
            || Path::new(reference).components().count() != 1
            || reference == "."
            || reference == ".."
        {
            return Err(MediaError::InvalidReference(reference.to_string()));
        }

        Ok(self.root.join(reference))
    }
}
