#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a demo spawn run and prints its events.

use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wave_spawn_catalog::WaveLibrary;
use wave_spawn_core::{
    AxisRange, ContainerId, Placement, SchedulerEvent, SpawnBounds2D, SpawnBounds3D,
    SpawnObjectId, Wave, WaveSequence,
};
use wave_spawn_host::{RunMode, SpawnManager};
use wave_spawn_pool::ObjectArena;
use wave_spawn_system_sampling::BoundsSampler;

const CONTAINER: ContainerId = ContainerId::new(0);
const MAX_TICKS: u32 = 100_000;

/// Runs the demo wave catalog through the spawn scheduler.
#[derive(Debug, Parser)]
#[command(name = "wave-spawn")]
struct Args {
    /// Seed for the placement random source.
    #[arg(long, default_value_t = 0xb1a5_5eed)]
    seed: u64,

    /// Length of one simulated tick in milliseconds.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Sequence index to start the sequenced run at.
    #[arg(long, default_value_t = 0)]
    sequence: usize,

    /// Run the named single wave instead of a sequence.
    #[arg(long)]
    single: Option<String>,
}

fn demo_library() -> WaveLibrary {
    let descriptors = |count: u32| (0..count).map(SpawnObjectId::new).collect();
    let mut library = WaveLibrary::new();
    library.register_single(
        "one",
        Wave::new(descriptors(5), Duration::from_millis(400), Placement::Volume),
    );
    let _ = library.register_sequence(WaveSequence::new(
        vec![
            Wave::new(descriptors(3), Duration::from_millis(300), Placement::Volume),
            Wave::new(descriptors(2), Duration::from_millis(200), Placement::Planar),
        ],
        Duration::from_secs(2),
    ));
    let _ = library.register_sequence(WaveSequence::new(
        vec![Wave::new(
            descriptors(4),
            Duration::from_millis(250),
            Placement::Volume,
        )],
        Duration::from_secs(2),
    ));
    library
}

fn print_events(tick: u32, events: &[SchedulerEvent]) {
    for event in events {
        match event {
            SchedulerEvent::ObjectSpawned {
                handle,
                index,
                position,
            } => println!(
                "[tick {tick:>5}] spawned index {index} as handle {} at ({:.2}, {:.2}, {:.2})",
                handle.get(),
                position.x,
                position.y,
                position.z
            ),
            SchedulerEvent::WaveComplete => println!("[tick {tick:>5}] wave complete"),
            SchedulerEvent::SequenceStepAdvanced { sequence, wave } => {
                println!("[tick {tick:>5}] sequence {sequence} advanced to wave {wave}")
            }
            SchedulerEvent::AllSequencesComplete => {
                println!("[tick {tick:>5}] all sequences complete")
            }
        }
    }
}

/// Entry point for the wave-spawn command-line demo.
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let library = demo_library();
    let mut arena = ObjectArena::new();
    let mut sampler = BoundsSampler::new(
        SpawnBounds2D::new(-60.0, 60.0, -40.0, 40.0, 0.0),
        SpawnBounds3D::new(
            AxisRange::new(-60.0, 60.0),
            AxisRange::new(-40.0, 40.0),
            AxisRange::new(-10.0, 10.0),
        ),
        ChaCha8Rng::seed_from_u64(args.seed),
    );

    let mode = match &args.single {
        Some(name) => RunMode::Single {
            wave_name: name.clone(),
        },
        None => RunMode::Sequenced,
    };
    let mut manager = SpawnManager::new(mode, CONTAINER);

    let mut events = Vec::new();
    manager
        .begin_spawning(args.sequence, &library, &mut arena, &mut sampler, &mut events)
        .with_context(|| {
            let known: Vec<&str> = library.single_wave_names().collect();
            format!("failed to begin spawning (known single waves: {known:?})")
        })?;
    print_events(0, &events);

    let tick = Duration::from_millis(args.tick_ms.max(1));
    for tick_index in 1..=MAX_TICKS {
        if !manager.is_active() {
            break;
        }
        events.clear();
        manager
            .advance(tick, &library, &mut arena, &mut sampler, &mut events)
            .context("spawn run aborted")?;
        print_events(tick_index, &events);
    }

    if manager.is_active() {
        bail!("run did not finish within {MAX_TICKS} ticks");
    }
    Ok(())
}
