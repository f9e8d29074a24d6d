//! Arena Core Demo
//!
//! Runs a scripted match through the frame orchestrator, replays it to
//! check the final hash, and prints the final frame as JSON.

use anyhow::{ensure, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use arena_core::{
    FRAME_MS, VERSION,
    game::{
        tick::{replay, update},
        Controls, FrameInput, FrameObserver, Game, NoopObserver, PlayerSlot, SimConfig, Stage,
        TracingObserver,
    },
};

/// Scripted match length (ms).
const DEMO_DURATION_MS: f64 = 10_000.0;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Arena Core v{}", VERSION);
    info!("Frame step: {} ms", FRAME_MS);

    demo_match()
}

/// Scripted controls for one frame.
///
/// P1 circles and taps the shot key, P3 sweeps left and right, P2 charges
/// long shots from its spawn, P4 idles.
fn scripted_controls(frame: u64) -> [Controls; 4] {
    let angle = (frame % 360) as f64 * std::f64::consts::PI / 180.0;
    let sweep = if (frame / 120) % 2 == 0 { 0.0 } else { std::f64::consts::PI };

    [
        Controls::thrust(angle * 3.0).with_shot(frame % 40 < 20),
        Controls::idle().with_shot(frame % 90 < 60),
        Controls::thrust(sweep).with_shot(frame % 25 < 5),
        Controls::idle(),
    ]
}

/// Counts admissions and logs them; forwards stages to tracing when enabled.
struct DemoObserver {
    admitted: usize,
    collisions: usize,
    inner: Box<dyn FrameObserver>,
}

impl FrameObserver for DemoObserver {
    fn on_stage(&mut self, stage: Stage, game: &Game) {
        self.inner.on_stage(stage, game);
    }

    fn on_collision(&mut self, resolution: &arena_core::game::Resolution) {
        if resolution.applied {
            self.collisions += 1;
        }
        self.inner.on_collision(resolution);
    }

    fn on_ball_admitted(&mut self, id: arena_core::game::BallId, game: &Game) {
        self.admitted += 1;
        info!("Ball {} entered at t={:.0} ms (frame {})", id, game.frame_time, game.frame_id);
        self.inner.on_ball_admitted(id, game);
    }
}

fn demo_match() -> anyhow::Result<()> {
    info!("=== Starting Demo Match ===");

    let config = SimConfig::default();
    let initial = Game::init(0.0);

    let inner: Box<dyn FrameObserver> = if cfg!(feature = "debug-tracing") {
        Box::new(TracingObserver)
    } else {
        Box::new(NoopObserver)
    };
    let mut observer = DemoObserver { admitted: 0, collisions: 0, inner };

    let frame_count = (DEMO_DURATION_MS / FRAME_MS) as u64;
    let inputs: Vec<FrameInput> = (1..=frame_count)
        .map(|k| FrameInput::new(k as f64 * FRAME_MS, FRAME_MS, scripted_controls(k)))
        .collect();

    info!("Running {} frames...", frame_count);

    let mut game = initial.clone();
    for input in &inputs {
        game = update(&game, input, &config, &mut observer)
            .with_context(|| format!("frame at t={} ms rejected", input.frame_time))?;

        if game.frame_id % 125 == 0 {
            info!(
                "Frame {}: {} balls, {} queued, {} bullets",
                game.frame_id,
                game.balls.in_game.len(),
                game.balls.incoming.len(),
                game.bullet_count()
            );
        }
    }

    // Print final results
    info!("=== Match Results ===");
    info!("Balls admitted: {}", observer.admitted);
    info!("Collisions applied: {}", observer.collisions);
    for slot in PlayerSlot::ALL {
        let player = game.player(slot);
        info!(
            "P{}: at {}, {} bullets in flight",
            slot.number(),
            player.position,
            game.bullets_of(slot).len()
        );
    }

    let hash = game.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let replayed = replay(&initial, &inputs, &config)?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));
    ensure!(hash == replay_hash, "replay diverged from the recorded run");
    info!("REPLAY VERIFIED: Hashes match!");

    let snapshot = serde_json::to_string_pretty(&game).context("serializing final frame")?;
    println!("{snapshot}");

    Ok(())
}
