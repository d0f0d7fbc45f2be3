//! The monotone counter at the heart of the Identifier component.
//!
//! `identifier/state` on disk is a bincode-encoded `u64` checkpoint — the
//! next id the counter will hand out. It is rewritten, via write-then-
//! rename, before every `request` is acknowledged, so a crash between
//! persisting and replying never causes id reuse on restart (spec.md §8
//! property 7, scenario S6).

use std::ops::Range;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::IdentifierError;

#[derive(Debug)]
pub struct IdentifierState {
    next: u64,
    state_path: PathBuf,
}

impl IdentifierState {
    /// Recovers `next` from `state_path` if it exists, or starts a fresh
    /// counter at zero.
    pub async fn load_or_create(state_path: impl Into<PathBuf>) -> Result<Self, IdentifierError> {
        let state_path = state_path.into();
        let next = match fs::read(&state_path).await {
            Ok(bytes) => {
                let (next, _): (u64, usize) =
                    bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                        .map_err(|source| IdentifierError::Decode { path: display(&state_path), source })?;
                next
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => 0,
            Err(source) => return Err(IdentifierError::Read { path: display(&state_path), source }),
        };
        Ok(IdentifierState { next, state_path })
    }

    /// Current value of `next`, exposed for tests and diagnostics.
    pub fn next(&self) -> u64 {
        self.next
    }

    /// Atomically reserves `n` ids, persisting the new `next` before
    /// returning so a reply is never sent for an id that could be handed
    /// out again after a crash.
    pub async fn request(&mut self, n: u64) -> Result<Range<u64>, IdentifierError> {
        let lo = self.next;
        let hi = lo + n;
        self.persist(hi).await?;
        self.next = hi;
        Ok(lo..hi)
    }

    async fn persist(&self, next: u64) -> Result<(), IdentifierError> {
        let bytes = bincode::serde::encode_to_vec(next, bincode::config::standard())?;
        let tmp_path = self.state_path.with_extension("tmp");
        fs::write(&tmp_path, &bytes)
            .await
            .map_err(|source| IdentifierError::Persist { path: display(&tmp_path), source })?;
        fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(|source| IdentifierError::Persist { path: display(&self.state_path), source })
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
