//! Bookmark Store
//!
//! Owns the bookmark collection and its backing JSON file. Every mutation is
//! validated, applied in memory, then the whole collection is rewritten to
//! disk. Transports talk to the store through [`BookmarkService`].

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{PersistenceError, StoreError};
use crate::fetch::TitleFetcher;
use crate::model::{Bookmark, BookmarkInput, Draft};
use crate::seed::seed_bookmarks;
use crate::validation::{self, MAX_TITLE_LEN};

/// Operations every transport needs from a bookmark backend.
pub trait BookmarkService {
    fn list(&self, tag: Option<&str>) -> impl Future<Output = Vec<Bookmark>> + Send;

    fn search(&self, query: &str, tag: Option<&str>) -> impl Future<Output = Vec<Bookmark>> + Send;

    fn create(&self, input: BookmarkInput) -> impl Future<Output = Result<Bookmark, StoreError>> + Send;

    fn update(
        &self,
        id: &str,
        input: BookmarkInput,
    ) -> impl Future<Output = Result<Bookmark, StoreError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<Bookmark, StoreError>> + Send;
}

pub struct Store {
    path: PathBuf,
    bookmarks: Mutex<Vec<Bookmark>>,
    fetcher: Option<TitleFetcher>,
}

impl Store {
    /// Loads `path`, seeding it when it does not exist. Never fails: an
    /// unreadable file falls back to the seed collection.
    pub async fn open(path: impl Into<PathBuf>, fetcher: Option<TitleFetcher>) -> Self {
        let path = path.into();
        let bookmarks = load_or_seed(&path).await;
        Store {
            path,
            bookmarks: Mutex::new(bookmarks),
            fetcher,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self, id: &str) -> Option<Bookmark> {
        self.bookmarks.lock().await.iter().find(|b| b.id == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.bookmarks.lock().await.len()
    }

    async fn enrich_title(&self, url: &str) -> Option<String> {
        let fetcher = self.fetcher.as_ref()?;
        let title = fetcher.fetch_title(url).await?;
        Some(title.chars().take(MAX_TITLE_LEN).collect())
    }

    async fn save(&self, bookmarks: &[Bookmark]) {
        if let Err(e) = persist(&self.path, bookmarks).await {
            tracing::error!(path = ?self.path, error = %crate::unpack_error(&e), "failed to save bookmarks");
        }
    }
}

impl BookmarkService for Store {
    async fn list(&self, tag: Option<&str>) -> Vec<Bookmark> {
        filter_by_tag(&self.bookmarks.lock().await, tag)
    }

    async fn search(&self, query: &str, tag: Option<&str>) -> Vec<Bookmark> {
        search(&self.bookmarks.lock().await, query, tag)
    }

    async fn create(&self, input: BookmarkInput) -> Result<Bookmark, StoreError> {
        let mut draft = Draft::from(input);
        let mut errors = validation::check_fields(&draft);
        let url_ok = !errors.iter().any(|e| e.param == "url");

        // The fetch runs before the lock is taken.
        if draft.title.is_empty() && url_ok && !draft.is_malformed("title") {
            if let Some(title) = self.enrich_title(&draft.url).await {
                draft.title = title;
            }
        }
        if let Some(err) = validation::require_title(&draft) {
            validation::insert_title_error(&mut errors, err);
        }
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let bookmark = Bookmark {
            id: generate_id(),
            url: draft.url,
            title: draft.title,
            description: draft.description,
            tags: normalize_tags(draft.tags),
            created_at: now_iso8601(),
        };

        let mut bookmarks = self.bookmarks.lock().await;
        bookmarks.insert(0, bookmark.clone());
        self.save(&bookmarks).await;

        tracing::info!(id = %bookmark.id, url = %bookmark.url, "created bookmark");
        Ok(bookmark)
    }

    async fn update(&self, id: &str, input: BookmarkInput) -> Result<Bookmark, StoreError> {
        let draft = Draft::from(input);
        let errors = validation::validate(&draft);
        if !errors.is_empty() {
            return Err(StoreError::Validation(errors));
        }

        let mut bookmarks = self.bookmarks.lock().await;
        let existing = bookmarks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;

        existing.url = draft.url;
        existing.title = draft.title;
        existing.description = draft.description;
        existing.tags = normalize_tags(draft.tags);
        let updated = existing.clone();

        self.save(&bookmarks).await;

        tracing::info!(id = %updated.id, "updated bookmark");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<Bookmark, StoreError> {
        let mut bookmarks = self.bookmarks.lock().await;
        let index = bookmarks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;

        let removed = bookmarks.remove(index);
        self.save(&bookmarks).await;

        tracing::info!(id = %removed.id, "deleted bookmark");
        Ok(removed)
    }
}

/// Bookmarks carrying `tag` (case-insensitive), in collection order.
pub fn filter_by_tag(bookmarks: &[Bookmark], tag: Option<&str>) -> Vec<Bookmark> {
    match tag.filter(|t| !t.is_empty()) {
        Some(tag) => {
            let tag = tag.to_lowercase();
            bookmarks.iter().filter(|b| b.has_tag(&tag)).cloned().collect()
        }
        None => bookmarks.to_vec(),
    }
}

/// Tag filter first, then a case-insensitive substring match on title, url
/// or description. Only the empty query keeps everything; whitespace is
/// matched literally.
pub fn search(bookmarks: &[Bookmark], query: &str, tag: Option<&str>) -> Vec<Bookmark> {
    let mut found = filter_by_tag(bookmarks, tag);
    if !query.is_empty() {
        found.retain(|b| b.matches(query));
    }
    found
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter().map(|t| t.to_lowercase()).collect()
}

fn generate_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}{}", Utc::now().timestamp_millis(), &random[..9])
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn load_or_seed(path: &Path) -> Vec<Bookmark> {
    match load(path).await {
        Ok(Some(bookmarks)) => {
            tracing::info!(path = ?path, count = bookmarks.len(), "loaded bookmarks");
            bookmarks
        }
        Ok(None) => {
            let seed = seed_bookmarks();
            tracing::info!(path = ?path, count = seed.len(), "no bookmark file found, writing seed data");
            if let Err(e) = persist(path, &seed).await {
                tracing::error!(path = ?path, error = %crate::unpack_error(&e), "failed to write seed data");
            }
            seed
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %crate::unpack_error(&e), "failed to load bookmarks, using seed data");
            seed_bookmarks()
        }
    }
}

/// `Ok(None)` when the file does not exist.
pub async fn load(path: &Path) -> Result<Option<Vec<Bookmark>>, PersistenceError> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&data)?))
}

/// Pretty-printed whole-file rewrite. Goes through a sibling temp file and a
/// rename so readers never see a partial write.
pub async fn persist(path: &Path, bookmarks: &[Bookmark]) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(bookmarks)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
