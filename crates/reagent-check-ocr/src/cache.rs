//! Content-keyed cache of recognized text
//!
//! Recognizing a multi-page scan takes seconds, and the same document is
//! usually checked against several analyzers in a row. Results are keyed by
//! the SHA-256 of the document bytes, so a renamed copy still hits.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::engine::OcrEngine;
use crate::error::OcrResult;

/// How long a recognized document stays fresh
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Hex SHA-256 of a document
pub fn compute_hash(document: &[u8]) -> String {
    format!("{:x}", Sha256::digest(document))
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Wraps an engine and memoizes its output
///
/// Entries always live in memory; with [`with_dir`](Self::with_dir) they are
/// also stored as `<sha256>.txt` files whose modification time is checked
/// against the TTL. Failed recognitions are never cached.
pub struct CachedEngine<E> {
    inner: E,
    ttl: Duration,
    dir: Option<PathBuf>,
    memory: Mutex<HashMap<String, (Instant, String)>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<E: OcrEngine> CachedEngine<E> {
    /// Cache in memory with the default TTL
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            ttl: DEFAULT_TTL,
            dir: None,
            memory: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Also persist entries in `dir`, creating it on first write
    pub fn with_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop every in-memory entry
    pub fn clear(&self) {
        self.lock_memory().clear();
    }

    fn lock_memory(&self) -> std::sync::MutexGuard<'_, HashMap<String, (Instant, String)>> {
        self.memory.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn from_memory(&self, key: &str) -> Option<String> {
        let mut memory = self.lock_memory();
        match memory.get(key) {
            Some((stored, text)) if stored.elapsed() < self.ttl => Some(text.clone()),
            Some(_) => {
                memory.remove(key);
                None
            }
            None => None,
        }
    }

    fn from_dir(&self, key: &str) -> Option<String> {
        let path = self.dir.as_deref().map(|dir| entry_path(dir, key))?;
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age >= self.ttl {
            return None;
        }
        fs::read_to_string(&path).ok()
    }

    fn store(&self, key: &str, text: &str) {
        self.lock_memory()
            .insert(key.to_string(), (Instant::now(), text.to_string()));

        if let Some(dir) = &self.dir {
            let result = fs::create_dir_all(dir).and_then(|_| fs::write(entry_path(dir, key), text));
            if let Err(e) = result {
                warn!("Could not write OCR cache entry in {}: {}", dir.display(), e);
            }
        }
    }
}

fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.txt", key))
}

impl<E: OcrEngine> OcrEngine for CachedEngine<E> {
    fn recognize(&self, document: &[u8]) -> OcrResult<String> {
        let key = compute_hash(document);

        if let Some(text) = self.from_memory(&key) {
            debug!("OCR cache hit (memory) for {}", key);
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(text);
        }
        if let Some(text) = self.from_dir(&key) {
            debug!("OCR cache hit (disk) for {}", key);
            self.hits.fetch_add(1, Ordering::Relaxed);
            self.lock_memory()
                .insert(key, (Instant::now(), text.clone()));
            return Ok(text);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let text = self.inner.recognize(document)?;
        self.store(&key, &text);
        Ok(text)
    }
}
