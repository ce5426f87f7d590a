//! Host media storage boundary.
//!
//! Media fields carry references, not blobs. During translation the blob is
//! fetched from the remote media store and handed to a [`MediaSink`], and the
//! embed written into the note uses whatever name the sink settled on.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{ImportError, Result};

/// Where fetched media blobs land on the host side.
#[async_trait]
pub trait MediaSink: Send + Sync {
    /// Store a blob under `filename`, returning the name actually used.
    ///
    /// The returned name differs from the requested one when another blob
    /// already owns it; storing identical bytes under an existing name is a
    /// no-op that returns the existing name.
    async fn store(&self, filename: &str, bytes: Bytes) -> Result<String>;
}

/// The `n`th candidate name for `filename`: the name itself for `n == 0`,
/// then `stem-n.ext` variants.
fn nth_candidate(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{n}.{ext}"),
        _ => format!("{filename}-{n}"),
    }
}

/// Media sink backed by a directory of flat files.
#[derive(Debug, Clone)]
pub struct FsMediaSink {
    root: PathBuf,
}

impl FsMediaSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn write_media(root: &Path, filename: &str, bytes: &[u8]) -> Result<String> {
    std::fs::create_dir_all(root)?;
    let mut n = 0;
    loop {
        let candidate = nth_candidate(filename, n);
        let path = root.join(&candidate);
        match std::fs::read(&path) {
            Ok(existing) if existing == bytes => return Ok(candidate),
            Ok(_) => n += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                std::fs::write(&path, bytes)?;
                return Ok(candidate);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[async_trait]
impl MediaSink for FsMediaSink {
    async fn store(&self, filename: &str, bytes: Bytes) -> Result<String> {
        let root = self.root.clone();
        let filename = filename.to_string();
        tokio::task::spawn_blocking(move || write_media(&root, &filename, &bytes))
            .await
            .map_err(|e| {
                ImportError::Io(io::Error::new(
                    io::ErrorKind::Other,
                    format!("spawn_blocking failed: {e}"),
                ))
            })?
    }
}

pub mod memory {
    //! In-memory sink for tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// [`MediaSink`] that keeps blobs in a map, with the same naming rules
    /// as [`FsMediaSink`].
    #[derive(Debug, Default)]
    pub struct MemoryMediaSink {
        files: Mutex<HashMap<String, Bytes>>,
    }

    impl MemoryMediaSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// The stored bytes under `name`, if any.
        pub fn get(&self, name: &str) -> Option<Bytes> {
            self.files.lock().unwrap().get(name).cloned()
        }

        /// Number of stored blobs.
        pub fn len(&self) -> usize {
            self.files.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl MediaSink for MemoryMediaSink {
        async fn store(&self, filename: &str, bytes: Bytes) -> Result<String> {
            let mut files = self.files.lock().unwrap();
            let mut n = 0;
            loop {
                let candidate = nth_candidate(filename, n);
                match files.get(&candidate) {
                    Some(existing) if *existing == bytes => return Ok(candidate),
                    Some(_) => n += 1,
                    None => {
                        files.insert(candidate.clone(), bytes);
                        return Ok(candidate);
                    }
                }
            }
        }
    }
}
