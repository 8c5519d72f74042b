//! prepdrill-store — Durable draft persistence.
//!
//! Drafts protect long-form answers against accidental reloads, so the
//! filesystem store must survive a full process restart. Writes are
//! idempotent and last-write-wins; a single session controller owns a given
//! key at a time.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use prepdrill_core::model::DraftKey;
use prepdrill_core::traits::DraftStore;

/// Filesystem-backed draft store: one file per key under a root directory.
///
/// Layout is `{root}/{category}/{question_id}.txt` with both components
/// sanitized to slug characters. Catalog identifiers are slugs already, so
/// sanitization is collision-free in practice.
pub struct FsDraftStore {
    root: PathBuf,
}

impl FsDraftStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &DraftKey) -> PathBuf {
        self.root
            .join(sanitize(&key.category))
            .join(format!("{}.txt", sanitize(&key.question_id)))
    }
}

/// Reduce a key component to filesystem-safe slug characters.
fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[async_trait]
impl DraftStore for FsDraftStore {
    async fn save(&self, key: &DraftKey, text: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create draft dir {}", parent.display()))?;
        }
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("failed to write draft {}", path.display()))?;
        debug!(key = %key, path = %path.display(), "draft saved");
        Ok(())
    }

    async fn load(&self, key: &DraftKey) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read draft {}", path.display()))
            }
        }
    }

    async fn clear(&self, key: &DraftKey) -> anyhow::Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to remove draft {}", path.display()))
            }
        }
    }
}

/// In-memory draft store for tests and ephemeral sessions. Not durable.
#[derive(Default)]
pub struct MemoryDraftStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of drafts currently held.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn save(&self, key: &DraftKey, text: &str) -> anyhow::Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.storage_key(), text.to_string());
        Ok(())
    }

    async fn load(&self, key: &DraftKey) -> anyhow::Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(&key.storage_key()).cloned())
    }

    async fn clear(&self, key: &DraftKey) -> anyhow::Result<()> {
        self.entries.lock().unwrap().remove(&key.storage_key());
        Ok(())
    }
}

/// Default on-disk location for drafts, under the user's home directory.
pub fn default_draft_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|h| Path::new(&h).join(".local/share/prepdrill/drafts"))
        .unwrap_or_else(|_| PathBuf::from("./prepdrill-drafts"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(category: &str, id: &str) -> DraftKey {
        DraftKey::new(category, id)
    }

    #[tokio::test]
    async fn fs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDraftStore::new(dir.path());
        let k = key("javascript", "js-closures");

        assert_eq!(store.load(&k).await.unwrap(), None);
        store.save(&k, "hello").await.unwrap();
        assert_eq!(store.load(&k).await.unwrap().as_deref(), Some("hello"));

        store.clear(&k).await.unwrap();
        assert_eq!(store.load(&k).await.unwrap(), None);
    }

    #[tokio::test]
    async fn fs_save_is_idempotent_and_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDraftStore::new(dir.path());
        let k = key("network", "tcp-handshake");

        store.save(&k, "first").await.unwrap();
        store.save(&k, "first").await.unwrap();
        assert_eq!(store.load(&k).await.unwrap().as_deref(), Some("first"));

        store.save(&k, "second").await.unwrap();
        assert_eq!(store.load(&k).await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn fs_clear_absent_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDraftStore::new(dir.path());
        store.clear(&key("os", "never-saved")).await.unwrap();
    }

    #[tokio::test]
    async fn fs_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let k = key("database", "acid");

        {
            let store = FsDraftStore::new(dir.path());
            store.save(&k, "durability is the D").await.unwrap();
        }

        // A fresh instance over the same root sees the draft, as a restarted
        // process would.
        let store = FsDraftStore::new(dir.path());
        assert_eq!(
            store.load(&k).await.unwrap().as_deref(),
            Some("durability is the D")
        );
    }

    #[tokio::test]
    async fn fs_keys_do_not_collide_across_categories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDraftStore::new(dir.path());

        store.save(&key("os", "scheduling"), "round robin").await.unwrap();
        store
            .save(&key("database", "scheduling"), "query planner")
            .await
            .unwrap();

        assert_eq!(
            store.load(&key("os", "scheduling")).await.unwrap().as_deref(),
            Some("round robin")
        );
        assert_eq!(
            store
                .load(&key("database", "scheduling"))
                .await
                .unwrap()
                .as_deref(),
            Some("query planner")
        );
    }

    #[tokio::test]
    async fn fs_sanitizes_awkward_components() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDraftStore::new(dir.path());
        let k = key("c++ & systems", "what/is: a futex?");

        store.save(&k, "fast userspace mutex").await.unwrap();
        assert_eq!(
            store.load(&k).await.unwrap().as_deref(),
            Some("fast userspace mutex")
        );
        store.clear(&k).await.unwrap();
        assert_eq!(store.load(&k).await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_round_trip() {
        let store = MemoryDraftStore::new();
        let k = key("algorithm", "two-pointers");

        store.save(&k, "walk from both ends").await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.load(&k).await.unwrap().as_deref(),
            Some("walk from both ends")
        );

        store.clear(&k).await.unwrap();
        store.clear(&k).await.unwrap();
        assert!(store.is_empty());
        assert_eq!(store.load(&k).await.unwrap(), None);
    }
}
