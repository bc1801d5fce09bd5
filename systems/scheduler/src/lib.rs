#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed walk through waves and wave sequences.
//!
//! [`SpawnScheduler`] is the state machine that decides when each spawn
//! event fires. It holds only run-scoped state; the catalog, the pool, and
//! the sampler are injected on every call, and all observable effects are
//! pushed into the caller's event buffer. The host drives the walk by
//! calling [`SpawnScheduler::advance`] with elapsed time from its tick
//! loop; the scheduler consumes as many spawn delays as the elapsed time
//! covers, so a single large tick can fire several spawn events and cross
//! wave or sequence boundaries.

use std::mem;
use std::time::Duration;

use rand::Rng;
use wave_spawn_core::{
    ContainerId, ContainerOps, HandleSet, ObjectPool, Placement, SchedulerEvent, SpawnError, Wave,
    WaveCatalog, WaveSequence,
};
use wave_spawn_system_sampling::BoundsSampler;

/// Progression pointer of a sequence run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    sequence_index: usize,
    wave_index: usize,
}

impl Cursor {
    /// Index of the wave sequence currently being walked.
    #[must_use]
    pub const fn sequence_index(self) -> usize {
        self.sequence_index
    }

    /// Index of the active wave within the current sequence.
    #[must_use]
    pub const fn wave_index(self) -> usize {
        self.wave_index
    }
}

/// Spawn progress through a single wave. Replaced at every wave start.
#[derive(Debug, Default)]
struct WaveProgress {
    handles: HandleSet,
    next_index: usize,
    until_next_spawn: Duration,
}

#[derive(Debug)]
struct SingleRun {
    wave: Wave,
    container: ContainerId,
    progress: WaveProgress,
}

#[derive(Debug)]
enum SequencePhase {
    Wave(WaveProgress),
    Gap { remaining: Duration },
}

#[derive(Debug)]
struct SequenceRun {
    cursor: Cursor,
    container: ContainerId,
    /// Active sequence, cloned from the catalog when its index was entered.
    sequence: WaveSequence,
    phase: SequencePhase,
}

#[derive(Debug)]
enum RunState {
    Idle,
    Single(SingleRun),
    Sequenced(SequenceRun),
    Complete,
}

enum WaveStep {
    NeedsTime,
    Finished,
}

/// Drives at most one timed wave or sequence walk at a time.
#[derive(Debug)]
pub struct SpawnScheduler {
    state: RunState,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RunState::Idle,
        }
    }

    /// Whether a run is currently walking waves or waiting out a delay.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, RunState::Single(_) | RunState::Sequenced(_))
    }

    /// Whether the last run finished every wave it was asked to walk.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.state, RunState::Complete)
    }

    /// Progression cursor of the active sequence run, if one exists.
    #[must_use]
    pub fn cursor(&self) -> Option<Cursor> {
        match &self.state {
            RunState::Sequenced(run) => Some(run.cursor),
            _ => None,
        }
    }

    /// Stops the active run at its current suspension point. No-op when no
    /// run is active; a completed run stays observable as complete.
    pub fn cancel(&mut self) {
        if self.is_active() {
            self.state = RunState::Idle;
        }
    }

    /// Starts a single-wave run for the catalog entry named `name`.
    ///
    /// Fails with [`SpawnError::NotFound`] before any state is touched when
    /// the name is unknown, and with [`SpawnError::RunInProgress`] while
    /// another run is active. Zero-delay and zero-object waves progress
    /// immediately; everything else waits for [`SpawnScheduler::advance`].
    pub fn begin_single<W, H, R>(
        &mut self,
        catalog: &W,
        name: &str,
        container: ContainerId,
        host: &mut H,
        sampler: &mut BoundsSampler<R>,
        out: &mut Vec<SchedulerEvent>,
    ) -> Result<(), SpawnError>
    where
        W: WaveCatalog + ?Sized,
        H: ObjectPool + ContainerOps,
        R: Rng,
    {
        self.ensure_inactive()?;
        let wave = catalog
            .single_wave(name)
            .ok_or_else(|| SpawnError::wave_not_found(name))?
            .clone();
        let progress = WaveProgress {
            handles: host.allocate(&wave, container, wave.object_count()),
            next_index: 0,
            until_next_spawn: wave.spawn_delay(),
        };
        self.state = RunState::Single(SingleRun {
            wave,
            container,
            progress,
        });
        self.advance(Duration::ZERO, catalog, host, sampler, out)
    }

    /// Starts a sequence run at `start_index`.
    ///
    /// The sequence is resolved from the catalog up front; an unknown index
    /// fails with [`SpawnError::NotFound`] and starts nothing.
    pub fn begin_sequence<W, H, R>(
        &mut self,
        catalog: &W,
        start_index: usize,
        container: ContainerId,
        host: &mut H,
        sampler: &mut BoundsSampler<R>,
        out: &mut Vec<SchedulerEvent>,
    ) -> Result<(), SpawnError>
    where
        W: WaveCatalog + ?Sized,
        H: ObjectPool + ContainerOps,
        R: Rng,
    {
        self.ensure_inactive()?;
        let sequence = catalog
            .sequence(start_index)
            .ok_or_else(|| SpawnError::sequence_not_found(start_index))?
            .clone();
        let cursor = Cursor {
            sequence_index: start_index,
            wave_index: 0,
        };
        let phase = SequencePhase::Wave(allocate_progress(&sequence, cursor, container, host));
        self.state = RunState::Sequenced(SequenceRun {
            cursor,
            container,
            sequence,
            phase,
        });
        self.advance(Duration::ZERO, catalog, host, sampler, out)
    }

    /// Consumes `elapsed` time from the host's tick loop and fires every
    /// spawn event whose delay it covers, applying the wave and sequence
    /// transition policy at each boundary. No-op when no run is active.
    ///
    /// A failed pool acquisition aborts the run: the scheduler returns to
    /// idle, the error is reported, and the catalog and pool stay reusable.
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
        let mut remaining = elapsed;
        // Taking the state out keeps the borrow checker out of the walk and
        // leaves the scheduler idle if the run aborts through `?`.
        match mem::replace(&mut self.state, RunState::Idle) {
            RunState::Idle => Ok(()),
            RunState::Complete => {
                self.state = RunState::Complete;
                Ok(())
            }
            RunState::Single(mut run) => {
                let step = run_wave_slice(
                    run.wave.spawn_delay(),
                    run.wave.placement(),
                    run.wave.object_count(),
                    &mut run.progress,
                    run.container,
                    &mut remaining,
                    host,
                    sampler,
                    out,
                )?;
                match step {
                    WaveStep::NeedsTime => self.state = RunState::Single(run),
                    WaveStep::Finished => {
                        out.push(SchedulerEvent::WaveComplete);
                        self.state = RunState::Complete;
                    }
                }
                Ok(())
            }
            RunState::Sequenced(run) => {
                self.state = advance_sequenced(run, remaining, catalog, host, sampler, out)?;
                Ok(())
            }
        }
    }

    fn ensure_inactive(&self) -> Result<(), SpawnError> {
        if self.is_active() {
            return Err(SpawnError::RunInProgress);
        }
        Ok(())
    }
}

/// Walks a sequence run until the elapsed time is spent or the run ends.
fn advance_sequenced<W, H, R>(
    mut run: SequenceRun,
    mut remaining: Duration,
    catalog: &W,
    host: &mut H,
    sampler: &mut BoundsSampler<R>,
    out: &mut Vec<SchedulerEvent>,
) -> Result<RunState, SpawnError>
where
    W: WaveCatalog + ?Sized,
    H: ObjectPool + ContainerOps,
    R: Rng,
{
    loop {
        if let SequencePhase::Gap { remaining: gap } = &mut run.phase {
            if remaining < *gap {
                *gap -= remaining;
                return Ok(RunState::Sequenced(run));
            }
            remaining -= *gap;
            // The gap elapsed: re-resolve the sequence for the advanced
            // cursor, mirroring the original's re-entry through the catalog.
            run.sequence = catalog
                .sequence(run.cursor.sequence_index)
                .ok_or_else(|| SpawnError::sequence_not_found(run.cursor.sequence_index))?
                .clone();
            run.phase =
                SequencePhase::Wave(allocate_progress(&run.sequence, run.cursor, run.container, host));
        }

        let (delay, placement, count) = match run.sequence.waves().get(run.cursor.wave_index) {
            Some(wave) => (wave.spawn_delay(), wave.placement(), wave.object_count()),
            None => (Duration::ZERO, Placement::Planar, 0),
        };
        let SequencePhase::Wave(progress) = &mut run.phase else {
            unreachable!("gap phase handled above")
        };
        let step = run_wave_slice(
            delay,
            placement,
            count,
            progress,
            run.container,
            &mut remaining,
            host,
            sampler,
            out,
        )?;
        if matches!(step, WaveStep::NeedsTime) {
            return Ok(RunState::Sequenced(run));
        }

        // Transition policy, checked in priority order: next wave in the
        // same sequence, then next sequence, then terminal completion.
        if run.cursor.wave_index + 1 < run.sequence.len() {
            run.cursor.wave_index += 1;
            host.clear_children(run.container);
            out.push(SchedulerEvent::SequenceStepAdvanced {
                sequence: run.cursor.sequence_index,
                wave: run.cursor.wave_index,
            });
            run.phase =
                SequencePhase::Wave(allocate_progress(&run.sequence, run.cursor, run.container, host));
        } else if run.cursor.sequence_index + 1 < catalog.sequence_count() {
            let gap = run.sequence.sequence_delay();
            run.cursor = Cursor {
                sequence_index: run.cursor.sequence_index + 1,
                wave_index: 0,
            };
            run.phase = SequencePhase::Gap { remaining: gap };
        } else {
            host.clear_children(run.container);
            out.push(SchedulerEvent::AllSequencesComplete);
            return Ok(RunState::Complete);
        }
    }
}

/// Fires spawn events for one wave until its delay outlasts the remaining
/// time or the wave runs out of indices. Acquire plus place is atomic per
/// event; the only suspension point is the inter-spawn delay.
#[allow(clippy::too_many_arguments)]
fn run_wave_slice<H, R>(
    spawn_delay: Duration,
    placement: Placement,
    count: usize,
    progress: &mut WaveProgress,
    container: ContainerId,
    remaining: &mut Duration,
    host: &mut H,
    sampler: &mut BoundsSampler<R>,
    out: &mut Vec<SchedulerEvent>,
) -> Result<WaveStep, SpawnError>
where
    H: ObjectPool,
    R: Rng,
{
    while progress.next_index < count {
        if *remaining < progress.until_next_spawn {
            progress.until_next_spawn -= *remaining;
            *remaining = Duration::ZERO;
            return Ok(WaveStep::NeedsTime);
        }
        *remaining -= progress.until_next_spawn;

        let index = progress.next_index;
        let handle = host
            .acquire(&progress.handles, index, container)
            .ok_or(SpawnError::AcquisitionFailed { index })?;
        let position = sampler.sample(placement);
        host.place(handle, position);
        out.push(SchedulerEvent::ObjectSpawned {
            handle,
            index,
            position,
        });

        progress.next_index += 1;
        progress.until_next_spawn = spawn_delay;
    }
    Ok(WaveStep::Finished)
}

fn allocate_progress<H: ObjectPool>(
    sequence: &WaveSequence,
    cursor: Cursor,
    container: ContainerId,
    host: &mut H,
) -> WaveProgress {
    match sequence.waves().get(cursor.wave_index) {
        Some(wave) => WaveProgress {
            handles: host.allocate(wave, container, wave.object_count()),
            next_index: 0,
            until_next_spawn: wave.spawn_delay(),
        },
        None => WaveProgress::default(),
    }
}
