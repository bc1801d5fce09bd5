use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wave_spawn_catalog::WaveLibrary;
use wave_spawn_core::{
    AxisRange, ContainerId, ContainerOps, HandleId, HandleSet, ObjectPool, Placement, Position,
    SchedulerEvent, SpawnBounds2D, SpawnBounds3D, SpawnError, Wave, WaveSequence,
};
use wave_spawn_pool::ObjectArena;
use wave_spawn_system_sampling::BoundsSampler;
use wave_spawn_system_scheduler::SpawnScheduler;

const CONTAINER: ContainerId = ContainerId::new(7);

/// Degenerate bounds make every sampled position exact: volume spawns land
/// on (1, 2, 3) and planar spawns on (5, 6, 9).
fn exact_sampler() -> BoundsSampler<ChaCha8Rng> {
    BoundsSampler::new(
        SpawnBounds2D::new(5.0, 5.0, 6.0, 6.0, 9.0),
        SpawnBounds3D::new(
            AxisRange::new(1.0, 1.0),
            AxisRange::new(2.0, 2.0),
            AxisRange::new(3.0, 3.0),
        ),
        ChaCha8Rng::seed_from_u64(0x0dd5_eed5),
    )
}

fn wave(count: u32, delay_ms: u64) -> Wave {
    Wave::new(
        (0..count).map(wave_spawn_core::SpawnObjectId::new).collect(),
        Duration::from_millis(delay_ms),
        Placement::Volume,
    )
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn spawn_indices(events: &[SchedulerEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event {
            SchedulerEvent::ObjectSpawned { index, .. } => Some(*index),
            _ => None,
        })
        .collect()
}

#[test]
fn single_wave_spawns_each_index_after_its_full_delay() {
    let mut library = WaveLibrary::new();
    library.register_single("one", wave(3, 100));
    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    scheduler
        .begin_single(&library, "one", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("begin single");
    assert!(events.is_empty(), "no spawn before the first delay");
    assert!(scheduler.is_active());

    scheduler
        .advance(ms(99), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert!(events.is_empty(), "99ms is short of the 100ms delay");

    scheduler
        .advance(ms(1), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert_eq!(spawn_indices(&events), vec![0]);

    scheduler
        .advance(ms(100), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    scheduler
        .advance(ms(100), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");

    assert_eq!(spawn_indices(&events), vec![0, 1, 2]);
    assert_eq!(events.last(), Some(&SchedulerEvent::WaveComplete));
    assert!(scheduler.is_complete());
    assert!(!scheduler.is_active());

    for event in &events {
        if let SchedulerEvent::ObjectSpawned { handle, position, .. } = event {
            assert_eq!(*position, Position::new(1.0, 2.0, 3.0));
            assert_eq!(arena.position(*handle), Some(*position));
        }
    }
}

#[test]
fn one_large_tick_fires_every_covered_spawn() {
    let mut library = WaveLibrary::new();
    library.register_single("one", wave(4, 250));
    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    scheduler
        .begin_single(&library, "one", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("begin single");
    scheduler
        .advance(ms(1_000), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");

    assert_eq!(spawn_indices(&events), vec![0, 1, 2, 3]);
    assert_eq!(events.last(), Some(&SchedulerEvent::WaveComplete));
}

#[test]
fn unknown_single_wave_reports_not_found_and_starts_nothing() {
    let library = WaveLibrary::new();
    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    let error = scheduler
        .begin_single(&library, "unknown", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect_err("missing wave");
    assert_eq!(error, SpawnError::wave_not_found("unknown"));
    assert!(events.is_empty());
    assert!(!scheduler.is_active());
    assert_eq!(arena.capacity(), 0, "nothing was allocated");
}

#[test]
fn unknown_sequence_index_reports_not_found() {
    let library = WaveLibrary::new();
    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    let error = scheduler
        .begin_sequence(&library, 5, CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect_err("missing sequence");
    assert_eq!(error, SpawnError::sequence_not_found(5));
    assert!(events.is_empty());
    assert!(!scheduler.is_active());
}

#[test]
fn sequence_walk_orders_spawns_boundaries_and_the_gap() {
    let mut library = WaveLibrary::new();
    let _ = library.register_sequence(WaveSequence::new(
        vec![wave(2, 100), wave(1, 100)],
        ms(500),
    ));
    let _ = library.register_sequence(WaveSequence::new(vec![wave(1, 100)], ms(500)));

    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    scheduler
        .begin_sequence(&library, 0, CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("begin sequence");
    let cursor = scheduler.cursor().expect("active cursor");
    assert_eq!((cursor.sequence_index(), cursor.wave_index()), (0, 0));

    scheduler
        .advance(ms(100), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert_eq!(spawn_indices(&events), vec![0]);

    // Second spawn finishes wave 0, so the same tick advances to wave 1.
    scheduler
        .advance(ms(100), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert_eq!(
        events.last(),
        Some(&SchedulerEvent::SequenceStepAdvanced { sequence: 0, wave: 1 })
    );
    let cursor = scheduler.cursor().expect("active cursor");
    assert_eq!((cursor.sequence_index(), cursor.wave_index()), (0, 1));

    // Wave 1's only spawn ends sequence 0 and opens the inter-sequence gap.
    scheduler
        .advance(ms(100), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert_eq!(spawn_indices(&events), vec![0, 1, 0]);
    let cursor = scheduler.cursor().expect("active cursor");
    assert_eq!((cursor.sequence_index(), cursor.wave_index()), (1, 0));

    scheduler
        .advance(ms(499), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert_eq!(spawn_indices(&events).len(), 3, "gap suppresses spawning");

    scheduler
        .advance(ms(1), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert_eq!(spawn_indices(&events).len(), 3, "next wave still owes its delay");

    scheduler
        .advance(ms(100), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert_eq!(spawn_indices(&events), vec![0, 1, 0, 0]);
    assert_eq!(events.last(), Some(&SchedulerEvent::AllSequencesComplete));
    assert!(scheduler.is_complete());

    let step_advances = events
        .iter()
        .filter(|event| matches!(event, SchedulerEvent::SequenceStepAdvanced { .. }))
        .count();
    assert_eq!(step_advances, 1);
    assert_eq!(arena.active_in(CONTAINER), 0, "final clear released the container");
}

#[test]
fn empty_wave_applies_the_transition_policy_without_spawning() {
    let mut library = WaveLibrary::new();
    let _ = library.register_sequence(WaveSequence::new(vec![wave(0, 100), wave(1, 100)], ms(500)));

    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    scheduler
        .begin_sequence(&library, 0, CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("begin sequence");
    assert_eq!(
        events,
        vec![SchedulerEvent::SequenceStepAdvanced { sequence: 0, wave: 1 }],
        "the zero-iteration wave advances immediately"
    );

    scheduler
        .advance(ms(100), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert_eq!(spawn_indices(&events), vec![0]);
    assert_eq!(events.last(), Some(&SchedulerEvent::AllSequencesComplete));
}

#[test]
fn empty_single_wave_completes_at_begin() {
    let mut library = WaveLibrary::new();
    library.register_single("hollow", wave(0, 100));
    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    scheduler
        .begin_single(&library, "hollow", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("begin single");
    assert_eq!(events, vec![SchedulerEvent::WaveComplete]);
    assert!(scheduler.is_complete());
}

#[test]
fn beginning_while_active_is_a_checked_conflict() {
    let mut library = WaveLibrary::new();
    library.register_single("one", wave(2, 100));
    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    scheduler
        .begin_single(&library, "one", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("begin single");
    let error = scheduler
        .begin_single(&library, "one", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect_err("second begin while active");
    assert_eq!(error, SpawnError::RunInProgress);

    scheduler.cancel();
    assert!(!scheduler.is_active());
    scheduler
        .begin_single(&library, "one", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("begin after cancel");
}

#[test]
fn cancel_stops_the_suspended_walk_and_is_idempotent() {
    let mut library = WaveLibrary::new();
    library.register_single("one", wave(3, 100));
    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    scheduler.cancel();
    assert!(!scheduler.is_active(), "cancel with no run is a no-op");

    scheduler
        .begin_single(&library, "one", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("begin single");
    scheduler
        .advance(ms(100), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance");
    assert_eq!(spawn_indices(&events), vec![0]);

    scheduler.cancel();
    scheduler
        .advance(ms(10_000), &library, &mut arena, &mut sampler, &mut events)
        .expect("advance after cancel");
    assert_eq!(spawn_indices(&events), vec![0], "cancelled run emits nothing further");
}

#[test]
fn completed_run_allows_a_fresh_begin_without_cancel() {
    let mut library = WaveLibrary::new();
    library.register_single("one", wave(1, 0));
    let mut arena = ObjectArena::new();
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    scheduler
        .begin_single(&library, "one", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("first run");
    assert!(scheduler.is_complete());
    scheduler
        .begin_single(&library, "one", CONTAINER, &mut arena, &mut sampler, &mut events)
        .expect("second run");
}

struct FlakyPool {
    inner: ObjectArena,
    fail_at: Option<usize>,
}

impl ObjectPool for FlakyPool {
    fn allocate(&mut self, wave: &Wave, container: ContainerId, count: usize) -> HandleSet {
        self.inner.allocate(wave, container, count)
    }

    fn acquire(
        &mut self,
        handles: &HandleSet,
        index: usize,
        container: ContainerId,
    ) -> Option<HandleId> {
        if self.fail_at == Some(index) {
            return None;
        }
        self.inner.acquire(handles, index, container)
    }

    fn place(&mut self, handle: HandleId, position: Position) {
        self.inner.place(handle, position);
    }
}

impl ContainerOps for FlakyPool {
    fn clear_children(&mut self, container: ContainerId) {
        self.inner.clear_children(container);
    }
}

#[test]
fn failed_acquisition_aborts_the_run_with_its_index() {
    let mut library = WaveLibrary::new();
    library.register_single("one", wave(3, 100));
    let mut pool = FlakyPool {
        inner: ObjectArena::new(),
        fail_at: Some(1),
    };
    let mut sampler = exact_sampler();
    let mut scheduler = SpawnScheduler::new();
    let mut events = Vec::new();

    scheduler
        .begin_single(&library, "one", CONTAINER, &mut pool, &mut sampler, &mut events)
        .expect("begin single");
    let error = scheduler
        .advance(ms(300), &library, &mut pool, &mut sampler, &mut events)
        .expect_err("acquisition fails at index 1");
    assert_eq!(error, SpawnError::AcquisitionFailed { index: 1 });
    assert_eq!(spawn_indices(&events), vec![0], "index 0 fired before the abort");
    assert!(!scheduler.is_active(), "aborted run returns to idle");

    // The pool and catalog stay usable for a fresh run.
    pool.fail_at = None;
    events.clear();
    scheduler
        .begin_single(&library, "one", CONTAINER, &mut pool, &mut sampler, &mut events)
        .expect("begin after abort");
    scheduler
        .advance(ms(300), &library, &mut pool, &mut sampler, &mut events)
        .expect("advance after abort");
    assert_eq!(spawn_indices(&events), vec![0, 1, 2]);
}

#[test]
fn seeded_runs_replay_identical_event_logs() {
    fn replay(seed: u64) -> Vec<SchedulerEvent> {
        let mut library = WaveLibrary::new();
        let _ = library.register_sequence(WaveSequence::new(
            vec![wave(2, 100), wave(2, 50)],
            ms(300),
        ));
        let _ = library.register_sequence(WaveSequence::new(vec![wave(3, 75)], ms(300)));

        let wide = SpawnBounds3D::new(
            AxisRange::new(-50.0, 50.0),
            AxisRange::new(-50.0, 50.0),
            AxisRange::new(-50.0, 50.0),
        );
        let mut sampler = BoundsSampler::new(
            SpawnBounds2D::new(-10.0, 10.0, -10.0, 10.0, 0.0),
            wide,
            ChaCha8Rng::seed_from_u64(seed),
        );
        let mut arena = ObjectArena::new();
        let mut scheduler = SpawnScheduler::new();
        let mut events = Vec::new();

        scheduler
            .begin_sequence(&library, 0, CONTAINER, &mut arena, &mut sampler, &mut events)
            .expect("begin sequence");
        for _ in 0..50 {
            scheduler
                .advance(ms(25), &library, &mut arena, &mut sampler, &mut events)
                .expect("advance");
        }
        assert!(scheduler.is_complete(), "script covers the whole walk");
        events
    }

    let first = replay(0x5eed_cafe);
    let second = replay(0x5eed_cafe);
    assert_eq!(first, second, "replay diverged between runs");
}
