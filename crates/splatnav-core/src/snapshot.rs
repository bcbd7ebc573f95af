//! Scene snapshot persistence.
//!
//! The persistence collaborator asks for the model transform and the
//! hidden/selected sets; everything else (the position buffer itself, camera
//! pose) is either owned by the asset pipeline or deliberately transient.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::store::PointCloudStore;
use crate::transform::ModelTransform;

/// Persisted interactive state of a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Model transform at capture time.
    pub transform: ModelTransform,
    /// Hidden point indices, sorted.
    pub hidden: Vec<usize>,
    /// Selected point indices, sorted.
    pub selected: Vec<usize>,
}

impl SceneSnapshot {
    /// Captures the persistable state of a store.
    #[must_use]
    pub fn capture(store: &PointCloudStore) -> Self {
        let mut hidden: Vec<usize> = store.hidden().iter().copied().collect();
        hidden.sort_unstable();
        let mut selected: Vec<usize> = store.selected().iter().copied().collect();
        selected.sort_unstable();
        Self {
            transform: store.transform(),
            hidden,
            selected,
        }
    }

    /// Restores this snapshot into a store.
    ///
    /// Indices out of range for the currently loaded cloud are dropped, and
    /// the store re-enforces selected ⊆ visible, so snapshots from a
    /// different or stale cloud degrade gracefully.
    pub fn apply(&self, store: &mut PointCloudStore) {
        store.set_transform(self.transform);
        store.clear_hidden();
        store.clear_selected();
        store.set_hidden(&self.hidden, true);
        store.set_selected(&self.selected);
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the snapshot to a JSON file.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!(
            "saved scene snapshot to {} ({} hidden, {} selected)",
            path.display(),
            self.hidden.len(),
            self.selected.len()
        );
        Ok(())
    }

    /// Reads a snapshot from a JSON file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&text)?;
        log::info!("loaded scene snapshot from {}", path.display());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn store_with_state() -> PointCloudStore {
        let mut store = PointCloudStore::new();
        store
            .set_positions((0..6).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect())
            .unwrap();
        store.set_hidden(&[1, 4], true);
        store.set_selected(&[0, 2]);
        store.set_transform(ModelTransform::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        store
    }

    #[test]
    fn test_capture_apply_roundtrip() {
        let store = store_with_state();
        let snapshot = SceneSnapshot::capture(&store);

        let mut fresh = PointCloudStore::new();
        fresh
            .set_positions((0..6).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect())
            .unwrap();
        snapshot.apply(&mut fresh);

        assert_eq!(fresh.hidden(), store.hidden());
        assert_eq!(fresh.selected(), store.selected());
        assert!((fresh.transform().translation.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_json_roundtrip() {
        let snapshot = SceneSnapshot::capture(&store_with_state());
        let json = snapshot.to_json().unwrap();
        let back = SceneSnapshot::from_json(&json).unwrap();
        assert_eq!(back.hidden, snapshot.hidden);
        assert_eq!(back.selected, snapshot.selected);
    }

    #[test]
    fn test_apply_filters_stale_indices() {
        let snapshot = SceneSnapshot {
            transform: ModelTransform::identity(),
            hidden: vec![0, 50],
            selected: vec![0, 1, 60],
        };
        let mut store = PointCloudStore::new();
        store
            .set_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
            .unwrap();
        snapshot.apply(&mut store);
        // Out-of-range indices dropped; index 0 is hidden so not selectable.
        assert!(store.is_hidden(0));
        assert!(!store.is_selected(0));
        assert!(store.is_selected(1));
        assert_eq!(store.selected().len(), 1);
    }
}
