#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the wave-spawn engine.
//!
//! This crate defines the authored data model (waves, wave sequences, spawn
//! bounds), the [`SchedulerEvent`] stream that makes a run's effects
//! observable, the [`SpawnError`] surface, and the collaborator traits the
//! scheduler is injected with: [`WaveCatalog`] for wave resolution,
//! [`ObjectPool`] for handle allocation and placement, and [`ContainerOps`]
//! for releasing a container's children between waves.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a spawnable object descriptor consumed by the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnObjectId(u32);

impl SpawnObjectId {
    /// Creates a new descriptor identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw value backing the identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Identifies a pooled object handle issued by an [`ObjectPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandleId(u32);

impl HandleId {
    /// Creates a new handle identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw value backing the identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Identifies the container spawned objects are parented to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(u32);

impl ContainerId {
    /// Creates a new container identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw value backing the identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// World-space position assigned to a spawned object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
    /// Depth coordinate.
    pub z: f32,
}

impl Position {
    /// Creates a position from its three coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Inclusive `[min, max]` interval along a single axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    min: f32,
    max: f32,
}

impl AxisRange {
    /// Creates a range. `min` must not exceed `max`.
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        debug_assert!(min <= max, "axis range requires min <= max");
        Self { min, max }
    }

    /// Lower inclusive end of the range.
    #[must_use]
    pub const fn min(self) -> f32 {
        self.min
    }

    /// Upper inclusive end of the range.
    #[must_use]
    pub const fn max(self) -> f32 {
        self.max
    }
}

/// Planar placement region: two sampled axes plus a fixed depth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds2D {
    horizontal: AxisRange,
    vertical: AxisRange,
    depth: f32,
}

impl SpawnBounds2D {
    /// Creates planar bounds from the left/right and top/bottom edges plus
    /// the fixed depth every planar spawn receives. `left <= right` and
    /// `top <= bottom` are required.
    #[must_use]
    pub fn new(left: f32, right: f32, top: f32, bottom: f32, depth: f32) -> Self {
        Self {
            horizontal: AxisRange::new(left, right),
            vertical: AxisRange::new(top, bottom),
            depth,
        }
    }

    /// Sampled horizontal extent.
    #[must_use]
    pub const fn horizontal(self) -> AxisRange {
        self.horizontal
    }

    /// Sampled vertical extent.
    #[must_use]
    pub const fn vertical(self) -> AxisRange {
        self.vertical
    }

    /// Fixed depth assigned to every planar spawn.
    #[must_use]
    pub const fn depth(self) -> f32 {
        self.depth
    }
}

/// Volumetric placement region: an axis-aligned box sampled on all axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds3D {
    x: AxisRange,
    y: AxisRange,
    z: AxisRange,
}

impl SpawnBounds3D {
    /// Creates volumetric bounds from the per-axis ranges.
    #[must_use]
    pub const fn new(x: AxisRange, y: AxisRange, z: AxisRange) -> Self {
        Self { x, y, z }
    }

    /// Sampled extent along the x axis.
    #[must_use]
    pub const fn x(self) -> AxisRange {
        self.x
    }

    /// Sampled extent along the y axis.
    #[must_use]
    pub const fn y(self) -> AxisRange {
        self.y
    }

    /// Sampled extent along the z axis.
    #[must_use]
    pub const fn z(self) -> AxisRange {
        self.z
    }
}

/// Selects which bounds configuration places a wave's objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// Sample x and y within the planar bounds; depth is fixed.
    Planar,
    /// Sample x, y, and z within the volumetric bounds.
    Volume,
}

/// One timed batch of spawn events sharing a delay and placement mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    spawnable_objects: Vec<SpawnObjectId>,
    spawn_delay: Duration,
    placement: Placement,
}

impl Wave {
    /// Creates a wave from its ordered descriptors, the delay applied before
    /// each spawn, and the placement mode.
    #[must_use]
    pub fn new(
        spawnable_objects: Vec<SpawnObjectId>,
        spawn_delay: Duration,
        placement: Placement,
    ) -> Self {
        Self {
            spawnable_objects,
            spawn_delay,
            placement,
        }
    }

    /// Ordered descriptors spawned by this wave.
    #[must_use]
    pub fn spawnable_objects(&self) -> &[SpawnObjectId] {
        &self.spawnable_objects
    }

    /// Number of spawn events this wave emits.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.spawnable_objects.len()
    }

    /// Delay applied before each spawn event within the wave.
    #[must_use]
    pub const fn spawn_delay(&self) -> Duration {
        self.spawn_delay
    }

    /// Placement mode used for every object in the wave.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.placement
    }

    /// Whether the wave carries at least one spawnable descriptor.
    #[must_use]
    pub fn is_schedulable(&self) -> bool {
        !self.spawnable_objects.is_empty()
    }
}

/// Ordered list of waves with an inter-sequence delay policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSequence {
    waves: Vec<Wave>,
    sequence_delay: Duration,
}

impl WaveSequence {
    /// Creates a sequence from its ordered waves and the delay inserted
    /// before the next sequence index begins.
    #[must_use]
    pub fn new(waves: Vec<Wave>, sequence_delay: Duration) -> Self {
        Self {
            waves,
            sequence_delay,
        }
    }

    /// Ordered waves walked by the scheduler.
    #[must_use]
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Number of waves in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Whether the sequence holds no waves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Delay inserted between this sequence and the next sequence index.
    #[must_use]
    pub const fn sequence_delay(&self) -> Duration {
        self.sequence_delay
    }
}

/// Ephemeral ordered handles backing the current wave's spawn events.
///
/// A fresh set is allocated at the start of every wave and owned exclusively
/// by the active run; sets are replaced, never reused.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandleSet {
    handles: Vec<HandleId>,
}

impl HandleSet {
    /// Creates a set from the pool-issued handles in spawn order.
    #[must_use]
    pub fn from_handles(handles: Vec<HandleId>) -> Self {
        Self { handles }
    }

    /// Number of handles in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the set holds no handles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handle reserved for the spawn event at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<HandleId> {
        self.handles.get(index).copied()
    }

    /// Handles in spawn order.
    #[must_use]
    pub fn as_slice(&self) -> &[HandleId] {
        &self.handles
    }
}

/// Observable effects emitted while a spawn run progresses.
#[derive(Clone, Debug, PartialEq)]
pub enum SchedulerEvent {
    /// A pooled handle was acquired and positioned. One discrete spawn event.
    ObjectSpawned {
        /// Handle acquired from the pool for this spawn index.
        handle: HandleId,
        /// Zero-based index of the spawn event within its wave.
        index: usize,
        /// Position assigned to the acquired handle.
        position: Position,
    },
    /// A single-wave run finished its last spawn event.
    WaveComplete,
    /// A sequence run advanced from one wave to the next within a sequence.
    SequenceStepAdvanced {
        /// Sequence index the run is walking.
        sequence: usize,
        /// Wave index that became active.
        wave: usize,
    },
    /// The last wave of the last sequence finished. Terminal.
    AllSequencesComplete,
}

/// Kind of catalog entry a failed lookup was asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotFoundKind {
    /// A named single wave.
    SingleWave,
    /// An indexed wave sequence.
    Sequence,
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleWave => f.write_str("single wave"),
            Self::Sequence => f.write_str("wave sequence"),
        }
    }
}

/// Errors a spawn run can fail with. All are local to the run; the catalog
/// and pool stay reusable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The catalog has no entry for the requested key. The run never starts.
    #[error("no {kind} registered for key `{key}`")]
    NotFound {
        /// Kind of entry the lookup asked for.
        kind: NotFoundKind,
        /// Name or index the lookup was keyed by.
        key: String,
    },
    /// A run is already active; cancel it before beginning another.
    #[error("a spawn run is already in progress")]
    RunInProgress,
    /// The pool could not hand out the handle for a spawn index. The run
    /// aborts; spawn events are not replayable.
    #[error("pool acquisition failed for spawn index {index}")]
    AcquisitionFailed {
        /// Spawn index whose acquisition failed.
        index: usize,
    },
}

impl SpawnError {
    /// Builds the lookup failure for a missing single wave.
    #[must_use]
    pub fn wave_not_found(name: &str) -> Self {
        Self::NotFound {
            kind: NotFoundKind::SingleWave,
            key: name.to_owned(),
        }
    }

    /// Builds the lookup failure for a missing sequence index.
    #[must_use]
    pub fn sequence_not_found(index: usize) -> Self {
        Self::NotFound {
            kind: NotFoundKind::Sequence,
            key: index.to_string(),
        }
    }
}

/// Read-only provider of named single waves and indexed wave sequences.
///
/// Implementations are expected to stay stable for the duration of a run.
pub trait WaveCatalog {
    /// Resolves a single wave by its registered name.
    fn single_wave(&self, name: &str) -> Option<&Wave>;

    /// Resolves the wave sequence registered at `index`.
    fn sequence(&self, index: usize) -> Option<&WaveSequence>;

    /// Number of registered wave sequences.
    fn sequence_count(&self) -> usize;
}

/// Provider of reusable object handles.
pub trait ObjectPool {
    /// Reserves `count` handles for `wave`, parented to `container`, in
    /// spawn order.
    fn allocate(&mut self, wave: &Wave, container: ContainerId, count: usize) -> HandleSet;

    /// Hands out the handle reserved for spawn `index`, reparenting it to
    /// `container`. Returns `None` when the pool cannot satisfy the request.
    fn acquire(
        &mut self,
        handles: &HandleSet,
        index: usize,
        container: ContainerId,
    ) -> Option<HandleId>;

    /// Assigns a world position to an acquired handle.
    fn place(&mut self, handle: HandleId, position: Position);
}

/// Host-side container maintenance invoked at wave boundaries.
pub trait ContainerOps {
    /// Releases every child of `container` back to an empty state.
    fn clear_children(&mut self, container: ContainerId);
}
