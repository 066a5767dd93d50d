//! Process-wide dataset store.
//!
//! Holds one baseline and at most one overlay. Loaded datasets are immutable
//! and shared behind `Arc`, so a query takes a [`Snapshot`] under a short read
//! lock and then runs without holding it. Loads build the new dataset before
//! taking the write lock and swap it in with a single assignment; a
//! concurrent query sees either the old state or the new one, never a mix.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::classify::Classification;
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::input::SourceMetadata;

/// A dataset together with what was learned while loading it.
#[derive(Debug)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub source: SourceMetadata,
    pub classification: Classification,
}

/// Consistent view of the store at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub baseline: Arc<LoadedDataset>,
    pub overlay: Option<Arc<LoadedDataset>>,
}

#[derive(Debug, Default)]
struct Slots {
    baseline: Option<Arc<LoadedDataset>>,
    overlay: Option<Arc<LoadedDataset>>,
}

/// The single baseline/overlay slot pair.
#[derive(Debug, Default)]
pub struct DatasetStore {
    slots: RwLock<Slots>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a whole-value assignment, so a poisoned lock still
    // guards consistent slots.
    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the baseline and drop any overlay.
    pub fn load_baseline(&self, loaded: LoadedDataset) -> Arc<LoadedDataset> {
        let loaded = Arc::new(loaded);
        let mut slots = self.write();
        slots.baseline = Some(Arc::clone(&loaded));
        slots.overlay = None;
        loaded
    }

    /// Set the overlay after checking its column names against the baseline.
    ///
    /// On mismatch the existing overlay is left untouched.
    pub fn load_overlay(&self, loaded: LoadedDataset) -> Result<Arc<LoadedDataset>> {
        let loaded = Arc::new(loaded);
        let mut slots = self.write();
        let baseline = slots.baseline.as_ref().ok_or(DashboardError::NoDataLoaded)?;

        let (missing, unexpected) = baseline
            .dataset
            .schema()
            .name_difference(loaded.dataset.schema());
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(DashboardError::SchemaMismatch { missing, unexpected });
        }

        slots.overlay = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Remove the overlay. Returns whether one was present.
    pub fn clear_overlay(&self) -> bool {
        self.write().overlay.take().is_some()
    }

    /// Current baseline and overlay, or `NoDataLoaded`.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let slots = self.read();
        let baseline = slots.baseline.clone().ok_or(DashboardError::NoDataLoaded)?;
        Ok(Snapshot {
            baseline,
            overlay: slots.overlay.clone(),
        })
    }

    pub fn has_baseline(&self) -> bool {
        self.read().baseline.is_some()
    }

    pub fn has_overlay(&self) -> bool {
        self.read().overlay.is_some()
    }
}
