// Favorite barcodes - persisted on every change, loaded once at startup
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use nutriscout_store::KeyValueStore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{models::Product, repository::ProductRepository, Result};

/// Storage key holding the JSON array of barcodes
pub const FAVORITES_STORAGE_KEY: &str = "@favorites";

/// Ordered list of favorite barcodes
///
/// Every mutation rewrites the whole persisted array. Mutations take turns
/// through one async lock held from read to persist, so two quick toggles can
/// no longer overwrite each other. If persisting fails the in-memory list
/// keeps its previous value and the failure is only logged.
///
/// `add` does not deduplicate: adding the same barcode twice stores it twice.
pub struct FavoriteStore {
    storage: Arc<dyn KeyValueStore>,
    codes: RwLock<Vec<String>>,
    turn: Mutex<()>,
}

/// Outcome of resolving every favorite against the catalog
#[derive(Debug, Clone, Default)]
pub struct Hydration {
    /// One product per distinct favorite, in favorite order
    pub products: Vec<Product>,
    /// Favorites the catalog couldn't resolve
    pub missing: Vec<String>,
}

impl FavoriteStore {
    /// Empty store; call `load` to pick up what was persisted
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            codes: RwLock::new(Vec::new()),
            turn: Mutex::new(()),
        }
    }

    /// Read the persisted list
    ///
    /// Missing, unreadable or corrupt data all end up as an empty list.
    pub async fn load(&self) -> Vec<String> {
        let _turn = self.turn.lock().await;

        let codes = match self.read_persisted().await {
            Ok(Some(codes)) => codes,
            Ok(None) => {
                debug!("No favorites persisted yet");
                Vec::new()
            }
            Err(e) => {
                warn!("Error loading favorites, starting empty: {}", e);
                Vec::new()
            }
        };

        info!("Loaded {} favorites", codes.len());
        self.replace(codes.clone());
        codes
    }

    /// Append a barcode and persist. Returns whether the write stuck.
    pub async fn add(&self, code: &str) -> bool {
        let code = code.to_string();
        self.mutate("add", move |codes| codes.push(code)).await
    }

    /// Drop every entry equal to `code` and persist. Removing a non-member is
    /// a no-op (the list is still rewritten).
    pub async fn remove(&self, code: &str) -> bool {
        self.mutate("remove", |codes| codes.retain(|c| c != code))
            .await
    }

    /// Add if absent, remove if present, in a single turn
    ///
    /// Returns the new membership, or `None` if persisting failed.
    pub async fn toggle(&self, code: &str) -> Option<bool> {
        let persisted = self
            .mutate("toggle", |codes| {
                if codes.iter().any(|c| c == code) {
                    codes.retain(|c| c != code);
                } else {
                    codes.push(code.to_string());
                }
            })
            .await;
        persisted.then(|| self.contains(code))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.read_codes().iter().any(|c| c == code)
    }

    /// Snapshot of the list, duplicates and all
    pub fn codes(&self) -> Vec<String> {
        self.read_codes().clone()
    }

    pub fn len(&self) -> usize {
        self.read_codes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_codes().is_empty()
    }

    /// Fetch every favorite from the catalog concurrently
    ///
    /// Lookups that come back absent are reported in `missing`; one failure
    /// never stops the others.
    pub async fn hydrate(&self, repository: &ProductRepository) -> Hydration {
        let mut seen = HashSet::new();
        let distinct: Vec<String> = self
            .codes()
            .into_iter()
            .filter(|code| !code.is_empty() && seen.insert(code.clone()))
            .collect();

        let lookups = distinct
            .iter()
            .map(|code| repository.get_product_by_barcode(code));
        let resolved = join_all(lookups).await;

        let mut hydration = Hydration::default();
        for (code, product) in distinct.into_iter().zip(resolved) {
            match product {
                Some(product) => hydration.products.push(product),
                None => hydration.missing.push(code),
            }
        }

        if !hydration.missing.is_empty() {
            warn!(
                "{} favorites could not be resolved: {:?}",
                hydration.missing.len(),
                hydration.missing
            );
        }
        hydration
    }

    /// Remove the favorites a hydration pass couldn't resolve
    pub async fn prune_missing(&self, hydration: &Hydration) -> bool {
        if hydration.missing.is_empty() {
            return true;
        }
        let missing: HashSet<&str> = hydration.missing.iter().map(String::as_str).collect();
        self.mutate("prune", |codes| codes.retain(|c| !missing.contains(c.as_str())))
            .await
    }

    async fn mutate<F>(&self, op: &str, apply: F) -> bool
    where
        F: FnOnce(&mut Vec<String>),
    {
        let _turn = self.turn.lock().await;

        let mut next = self.codes();
        apply(&mut next);

        match self.persist(&next).await {
            Ok(()) => {
                debug!("Favorites {}: now {} entries", op, next.len());
                self.replace(next);
                true
            }
            Err(e) => {
                warn!("Error persisting favorites ({}): {}", op, e);
                false
            }
        }
    }

    async fn read_persisted(&self) -> Result<Option<Vec<String>>> {
        let storage = Arc::clone(&self.storage);
        let raw = tokio::task::spawn_blocking(move || storage.get_item(FAVORITES_STORAGE_KEY))
            .await??;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn persist(&self, codes: &[String]) -> Result<()> {
        let blob = serde_json::to_string(codes)?;
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || storage.set_item(FAVORITES_STORAGE_KEY, &blob))
            .await??;
        Ok(())
    }

    fn replace(&self, codes: Vec<String>) {
        *self.codes.write().unwrap_or_else(PoisonError::into_inner) = codes;
    }

    fn read_codes(&self) -> std::sync::RwLockReadGuard<'_, Vec<String>> {
        self.codes.read().unwrap_or_else(PoisonError::into_inner)
    }
}
