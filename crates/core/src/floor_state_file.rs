//! Persisted run progress (`{seed, floor, isGenerated}`) and the floor-to-floor bookkeeping
//! built on top of it.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::mapgen::{self, Layout, derive_floor_seed, resolve_base_seed};

pub const FLOOR_STATE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FloorStateFile {
    pub format_version: u32,
    pub seed: u64,
    pub floor: u32,
    pub is_generated: bool,
}

impl FloorStateFile {
    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        debug!(floor = self.floor, "saved floor state to {}", path.display());

        Ok(())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let state: Self = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if state.floor == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "floor numbers start at 1"));
        }
        Ok(state)
    }
}

/// Base seed and current floor of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloorProgress {
    base_seed: u64,
    floor: u32,
    is_generated: bool,
}

impl FloorProgress {
    /// Starts a run on floor 1. A seed of 0 draws a fresh one.
    pub fn new(seed: u64) -> Self {
        Self { base_seed: resolve_base_seed(seed), floor: 1, is_generated: false }
    }

    pub fn from_file(file: &FloorStateFile) -> Self {
        Self {
            base_seed: resolve_base_seed(file.seed),
            floor: file.floor.max(1),
            is_generated: file.is_generated,
        }
    }

    pub fn to_file(&self) -> FloorStateFile {
        FloorStateFile {
            format_version: FLOOR_STATE_FORMAT_VERSION,
            seed: self.base_seed,
            floor: self.floor,
            is_generated: self.is_generated,
        }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn is_generated(&self) -> bool {
        self.is_generated
    }

    pub fn floor_seed(&self) -> u64 {
        derive_floor_seed(self.base_seed, self.floor)
    }

    pub fn mark_generated(&mut self) {
        self.is_generated = true;
    }

    /// Moves to the next floor, which still needs generating.
    pub fn descend(&mut self) {
        self.floor += 1;
        self.is_generated = false;
    }

    /// Generates the current floor and marks it generated on success.
    pub fn generate(&mut self, config: &GeneratorConfig) -> Result<Layout, GenerationError> {
        let layout = mapgen::generate(self.base_seed, self.floor, config)?;
        self.mark_generated();
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn json_uses_camel_case_field_names() {
        let state = FloorStateFile { format_version: 1, seed: 42, floor: 3, is_generated: true };

        let json = serde_json::to_string(&state).unwrap();

        assert!(json.contains("\"isGenerated\":true"), "{json}");
        assert!(json.contains("\"formatVersion\":1"), "{json}");
    }

    #[test]
    fn atomic_write_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saves").join("floor_state.json");
        let state = FloorStateFile { format_version: 1, seed: 99, floor: 2, is_generated: false };

        state.write_atomic(&path).unwrap();
        assert!(path.exists());

        let loaded = FloorStateFile::load(&path).unwrap();
        assert_eq!(state, loaded);

        let tmp_path = path.with_extension("json.tmp");
        assert!(!tmp_path.exists());
    }

    #[test]
    fn loading_a_zero_floor_is_invalid_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("floor_state.json");
        fs::write(&path, r#"{"formatVersion":1,"seed":5,"floor":0,"isGenerated":false}"#).unwrap();

        let error = FloorStateFile::load(&path).unwrap_err();

        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn descending_moves_the_floor_seed_by_one_stride() {
        let mut progress = FloorProgress::new(42);
        assert_eq!(progress.floor_seed(), 42);
        progress.mark_generated();

        progress.descend();

        assert_eq!(progress.floor(), 2);
        assert!(!progress.is_generated());
        assert_eq!(progress.floor_seed(), 10_042);
    }

    #[test]
    fn progress_round_trips_through_the_state_file() {
        let mut progress = FloorProgress::new(7);
        progress.descend();
        progress.mark_generated();

        let restored = FloorProgress::from_file(&progress.to_file());

        assert_eq!(restored, progress);
    }

    #[test]
    fn unassigned_seed_is_replaced_when_progress_starts() {
        let progress = FloorProgress::new(0);
        assert_ne!(progress.base_seed(), 0);
    }

    #[test]
    fn generating_marks_the_floor_generated() {
        let mut progress = FloorProgress::new(1_234);
        progress.descend();

        let layout = progress.generate(&GeneratorConfig::default()).unwrap();

        assert!(progress.is_generated());
        assert_eq!(layout.floor, 2);
        assert_eq!(layout.base_seed, 1_234);
    }
}
