//! File-backed snapshot storage.
//!
//! Layout inside the store directory:
//! ```text
//! objects.snapshot.json     - latest snapshot, map id -> object records
//! objects.snapshot.sha256   - hex sha256 of the snapshot file
//! ```

use std::path::{Path, PathBuf};

use crate::snapshot::{Snapshot, SnapshotError, sha256_hex};

const SNAPSHOT_FILE: &str = "objects.snapshot.json";
const CHECKSUM_FILE: &str = "objects.snapshot.sha256";

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("no snapshot found in {0}")]
    NoSnapshot(PathBuf),
}

/// Directory holding the latest registry snapshot and its checksum.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Open or create a store at the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE)
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot_path().is_file()
    }

    /// Write the snapshot, replacing the previous one.
    ///
    /// The data file is written to a temporary name and renamed into place
    /// before the checksum is updated.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = snapshot.to_json()?;
        let hash = sha256_hex(json.as_bytes());

        let tmp = self.root.join(format!("{SNAPSHOT_FILE}.tmp"));
        std::fs::write(&tmp, json.as_bytes())?;
        std::fs::rename(&tmp, self.snapshot_path())?;
        std::fs::write(self.root.join(CHECKSUM_FILE), &hash)?;

        tracing::info!(
            path = %self.snapshot_path().display(),
            objects = snapshot.object_count(),
            sha256 = %hash,
            "saved snapshot"
        );
        Ok(())
    }

    /// Load and verify the latest snapshot.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let path = self.snapshot_path();
        if !path.is_file() {
            return Err(StoreError::NoSnapshot(self.root.clone()));
        }
        let data = std::fs::read(&path)?;
        self.verify_bytes(&data)?;
        let text = String::from_utf8_lossy(&data);
        Ok(Snapshot::from_json(&text)?)
    }

    /// Recompute the snapshot file's checksum and compare.
    pub fn verify_integrity(&self) -> Result<(), StoreError> {
        let data = std::fs::read(self.snapshot_path())?;
        self.verify_bytes(&data)
    }

    fn verify_bytes(&self, data: &[u8]) -> Result<(), StoreError> {
        let expected = std::fs::read_to_string(self.root.join(CHECKSUM_FILE))?;
        let expected = expected.trim();
        let actual = sha256_hex(data);
        if actual != expected {
            tracing::warn!(%expected, %actual, "snapshot checksum mismatch");
            return Err(StoreError::IntegrityMismatch {
                expected: expected.to_owned(),
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objectmap_common::{ClientId, ItemRef, MapId, OwnerId, Position};
    use objectmap_kernel::{
        ObjectRegistry, PlaceOptions, PlaceRequest, PlacementInfo, StaticItemCatalog,
    };
    use std::sync::Arc;

    fn registry_with_objects(count: usize) -> ObjectRegistry {
        let mut reg = ObjectRegistry::new(Arc::new(
            StaticItemCatalog::new().with_item("wall", PlacementInfo::blocking(1, 1)),
        ));
        for i in 0..count {
            reg.place_object(
                OwnerId::from("alice"),
                PlaceRequest::new(
                    "m",
                    ItemRef::new(format!("w{i}"), "wall"),
                    Position::new(i as f32 * 64.0, 0.0),
                ),
                ClientId(1),
                PlaceOptions::default(),
            )
            .unwrap();
        }
        reg
    }

    #[test]
    fn store_open_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path().join("objects")).unwrap();
        assert!(store.root().is_dir());
        assert!(!store.has_snapshot());
    }

    #[test]
    fn load_without_snapshot_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).unwrap();
        assert!(matches!(store.load(), Err(StoreError::NoSnapshot(_))));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path().join("objects")).unwrap();
        let reg = registry_with_objects(12);

        let snap = Snapshot::capture(&reg);
        store.save(&snap).unwrap();
        store.verify_integrity().unwrap();

        let reopened = SnapshotStore::open(tmp.path().join("objects")).unwrap();
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded, snap);

        let mut restored = registry_with_objects(0);
        loaded.restore_into(&mut restored).unwrap();
        assert_eq!(restored.object_count(), 12);
        let query = |r: &ObjectRegistry| {
            let mut ids: Vec<_> = r
                .objects_in_area(&MapId::from("m"), Position::new(64.0, 0.0), 32.0, 32.0)
                .into_iter()
                .map(|o| o.id)
                .collect();
            ids.sort();
            ids
        };
        // Objects at x = 0..=480 touch chunk (0, 0).
        assert_eq!(query(&restored).len(), 8);
        assert_eq!(query(&restored), query(&reg));
    }

    #[test]
    fn corruption_fails_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).unwrap();
        store.save(&Snapshot::capture(&registry_with_objects(3))).unwrap();

        let path = store.snapshot_path();
        let mut data = std::fs::read(&path).unwrap();
        let idx = data.len() / 2;
        data[idx] ^= 0x01;
        std::fs::write(&path, &data).unwrap();

        assert!(matches!(
            store.verify_integrity(),
            Err(StoreError::IntegrityMismatch { .. })
        ));
        assert!(matches!(
            store.load(),
            Err(StoreError::IntegrityMismatch { .. })
        ));
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).unwrap();
        store.save(&Snapshot::capture(&registry_with_objects(5))).unwrap();
        store.save(&Snapshot::capture(&registry_with_objects(2))).unwrap();
        assert_eq!(store.load().unwrap().object_count(), 2);
    }
}
