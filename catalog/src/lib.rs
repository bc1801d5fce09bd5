#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory wave catalog consulted by the spawn scheduler.
//!
//! A [`WaveLibrary`] is authored or deserialized up front and stays read-only
//! while runs are active. Registration replaces any existing entry under the
//! same name; sequences are addressed by insertion order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wave_spawn_core::{Wave, WaveCatalog, WaveSequence};

/// Named single waves plus indexed wave sequences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveLibrary {
    single_waves: BTreeMap<String, Wave>,
    sequences: Vec<WaveSequence>,
}

impl WaveLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single wave under `name`, replacing any previous entry.
    pub fn register_single(&mut self, name: impl Into<String>, wave: Wave) {
        let _ = self.single_waves.insert(name.into(), wave);
    }

    /// Appends a wave sequence, returning the index it was registered at.
    pub fn register_sequence(&mut self, sequence: WaveSequence) -> usize {
        self.sequences.push(sequence);
        self.sequences.len() - 1
    }

    /// Names of all registered single waves, in sorted order.
    pub fn single_wave_names(&self) -> impl Iterator<Item = &str> {
        self.single_waves.keys().map(String::as_str)
    }
}

impl WaveCatalog for WaveLibrary {
    fn single_wave(&self, name: &str) -> Option<&Wave> {
        self.single_waves.get(name)
    }

    fn sequence(&self, index: usize) -> Option<&WaveSequence> {
        self.sequences.get(index)
    }

    fn sequence_count(&self) -> usize {
        self.sequences.len()
    }
}
