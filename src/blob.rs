use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::prelude::*;

/// Extensions accepted for uploads, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["mp4", "mov", "avi"];

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Public path prefix under which stored blobs are served.
pub const PUBLIC_PREFIX: &str = "uploads";

/// Room left in the request body limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum UploadError {
    #[snafu(display("No file uploaded"))]
    NoFile,

    #[snafu(display("File type not supported"))]
    UnsupportedType { filename: String },

    #[snafu(display("File is larger than the {limit} bytes limit"))]
    TooLarge { limit: u64 },

    #[snafu(display("failed to read the uploaded file: {source}"))]
    Read { source: BoxError },

    #[snafu(display("failed to write blob `{}`: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Server-assigned relative path of a stored blob, e.g. `uploads/<name>.mp4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoragePath(String);

impl StoragePath {
    pub(crate) fn for_file(name: &str) -> Self {
        Self(format!("{PUBLIC_PREFIX}/{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The generated file name, without the public prefix.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persists uploaded files under a single directory.
///
/// Only the file extension is checked, the content itself is never inspected.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    max_bytes: u64,
}

impl BlobStore {
    /// Opens the store, creating `root` if it does not exist yet.
    pub async fn open(root: impl Into<PathBuf>, max_bytes: u64) -> std::io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root, max_bytes })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Request body limit for the upload route.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_bytes.saturating_add(MULTIPART_OVERHEAD)).unwrap_or(usize::MAX)
    }

    /// Returns the normalized extension of `filename` if it is allowed.
    pub fn check_extension(filename: &str) -> Result<&'static str, UploadError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        extension
            .and_then(|ext| ALLOWED_EXTENSIONS.into_iter().find(|allowed| *allowed == ext))
            .context(UnsupportedTypeSnafu { filename })
    }

    /// Streams `body` to a freshly named file.
    ///
    /// Nothing is written when the extension is rejected, and a partially written file is removed
    /// when the body turns out to be too large or cannot be read.
    #[instrument(skip(self, body))]
    pub async fn store<S, E>(&self, filename: &str, body: S) -> Result<StoragePath, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        let extension = Self::check_extension(filename)?;
        let name = format!("{}.{extension}", Uuid::new_v4().simple());
        let path = self.root.join(&name);

        let mut file = File::create(&path).await.context(WriteSnafu { path: &path })?;

        match self.copy(body, &mut file, &path).await {
            Ok(size) => {
                tracing::info!(filename, blob = %name, size, "stored uploaded file");
                Ok(StoragePath::for_file(&name))
            }
            Err(err) => {
                drop(file);
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(path = %path.display(), error = %cleanup, "could not remove a partially written blob");
                }
                Err(err)
            }
        }
    }

    async fn copy<S, E>(&self, body: S, file: &mut File, path: &Path) -> Result<u64, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        pin_mut!(body);

        let mut written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| -> BoxError { err.into() }).context(ReadSnafu)?;

            written += chunk.len() as u64;
            ensure!(written <= self.max_bytes, TooLargeSnafu { limit: self.max_bytes });

            file.write_all(&chunk).await.context(WriteSnafu { path })?;
        }

        file.flush().await.context(WriteSnafu { path })?;
        Ok(written)
    }

    /// Deletes a stored blob.
    pub async fn remove(&self, path: &StoragePath) -> std::io::Result<()> {
        tokio::fs::remove_file(self.root.join(path.file_name())).await
    }
}
