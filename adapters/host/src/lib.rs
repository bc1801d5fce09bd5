#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Thin orchestration binding between a host and the spawn scheduler.
//!
//! [`SpawnManager`] holds the run configuration a host authors once (run
//! mode and target container) and delegates every scheduling decision to
//! [`SpawnScheduler`]. It adds no timing logic of its own.

use std::time::Duration;

use rand::Rng;
use wave_spawn_core::{ContainerId, ContainerOps, ObjectPool, SchedulerEvent, SpawnError, WaveCatalog};
use wave_spawn_system_sampling::BoundsSampler;
use wave_spawn_system_scheduler::SpawnScheduler;

/// Selects how [`SpawnManager::begin_spawning`] interprets a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Spawn one named wave, ignoring the sequence number.
    Single {
        /// Catalog name of the wave to run.
        wave_name: String,
    },
    /// Walk the wave sequence addressed by the sequence number.
    Sequenced,
}

/// Host-facing entry point that owns the scheduler and its configuration.
#[derive(Debug)]
pub struct SpawnManager {
    mode: RunMode,
    container: ContainerId,
    scheduler: SpawnScheduler,
}

impl SpawnManager {
    /// Creates a manager that spawns into `container` using `mode`.
    #[must_use]
    pub fn new(mode: RunMode, container: ContainerId) -> Self {
        Self {
            mode,
            container,
            scheduler: SpawnScheduler::new(),
        }
    }

    /// Starts a run. In single mode the configured wave name is used and
    /// `sequence_number` is ignored; in sequenced mode the walk starts at
    /// `sequence_number`.
    pub fn begin_spawning<W, H, R>(
        &mut self,
        sequence_number: usize,
        catalog: &W,
        host: &mut H,
        sampler: &mut BoundsSampler<R>,
        out: &mut Vec<SchedulerEvent>,
    ) -> Result<(), SpawnError>
    where
        W: WaveCatalog + ?Sized,
        H: ObjectPool + ContainerOps,
        R: Rng,
    {
        match &self.mode {
            RunMode::Single { wave_name } => self.scheduler.begin_single(
                catalog,
                wave_name,
                self.container,
                host,
                sampler,
                out,
            ),
            RunMode::Sequenced => self.scheduler.begin_sequence(
                catalog,
                sequence_number,
                self.container,
                host,
                sampler,
                out,
            ),
        }
    }

    /// Feeds elapsed host time to the scheduler.
    pub fn advance<W, H, R>(
        &mut self,
        elapsed: Duration,
        catalog: &W,
        host: &mut H,
        sampler: &mut BoundsSampler<R>,
        out: &mut Vec<SchedulerEvent>,
    ) -> Result<(), SpawnError>
    where
        W: WaveCatalog + ?Sized,
        H: ObjectPool + ContainerOps,
        R: Rng,
    {
        self.scheduler
            .advance(elapsed, catalog, host, sampler, out)
    }

    /// Stops the active run, if any.
    pub fn cancel(&mut self) {
        self.scheduler.cancel();
    }

    /// Whether a run is currently in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.scheduler.is_active()
    }

    /// Whether the last run walked everything it was asked to.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.scheduler.is_complete()
    }
}
