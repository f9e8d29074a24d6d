//! Frame Orchestrator
//!
//! Advances a `Game` by one frame. The prior frame is borrowed immutably;
//! a new frame is built from a clone and returned.
//!
//! Stage order is fixed:
//! 1. Ball lifecycle (re-arm, admission)
//! 2. Player preparation (input to velocity and facing)
//! 3. Collision detection and resolution over `[previous, new)` frame time
//! 4. Motion of every entity to the new frame time
//! 5. Bullet spawning and frame id increment

use crate::game::collision::{detect, resolve};
use crate::game::config::SimConfig;
use crate::game::error::FrameError;
use crate::game::field::{Time, FIELD_HEIGHT, FIELD_WIDTH};
use crate::game::input::{Controls, FrameInput};
use crate::game::kinematics::{check_wall_obstacle, move_until, prepare_movement, update_shot, ShotResult};
use crate::game::observer::{FrameObserver, NoopObserver, Stage};
use crate::game::state::{Bullet, BulletSize, Game, PlayerSlot};

/// Run one frame update.
///
/// Returns the new frame, or a `FrameError` if the input is invalid. On
/// error nothing was computed and the caller still holds the prior frame.
pub fn update(
    game: &Game,
    input: &FrameInput,
    config: &SimConfig,
    observer: &mut dyn FrameObserver,
) -> Result<Game, FrameError> {
    validate(game, input)?;

    let window_start = game.frame_time;
    let window_end = input.frame_time;
    let mut next = game.clone();

    // 1. Ball lifecycle
    if let Some(id) = next.balls.step(window_end, window_start, config.admission_delay_ms) {
        observer.on_ball_admitted(id, &next);
    }
    observer.on_stage(Stage::BallLifecycle, &next);

    // 2. Player preparation
    prepare_players(&mut next, input);
    observer.on_stage(Stage::PlayerPreparation, &next);

    // 3. Collisions
    let events = detect(window_start, window_end, &next, &config.enabled);
    for resolution in resolve(events, &mut next, config) {
        observer.on_collision(&resolution);
    }
    observer.on_stage(Stage::Collisions, &next);

    // 4. Motion
    move_entities(&mut next, window_end);
    observer.on_stage(Stage::Motion, &next);

    // 5. Spawning
    spawn_bullets(&mut next, input);
    next.frame_id += 1;
    observer.on_stage(Stage::Spawning, &next);

    Ok(next)
}

/// Replay a sequence of frame inputs from `initial`.
///
/// Same initial state, inputs and config always give the same final state
/// on one machine.
pub fn replay<'a>(
    initial: &Game,
    frames: impl IntoIterator<Item = &'a FrameInput>,
    config: &SimConfig,
) -> Result<Game, FrameError> {
    let mut observer = NoopObserver;
    frames
        .into_iter()
        .try_fold(initial.clone(), |game, input| update(&game, input, config, &mut observer))
}

impl Game {
    /// Advance one frame with the default config and no observer.
    pub fn update(&self, frame_time: Time, duration_ms: f64, controls: [Controls; 4]) -> Result<Game, FrameError> {
        let input = FrameInput::new(frame_time, duration_ms, controls);
        update(self, &input, &SimConfig::default(), &mut NoopObserver)
    }
}

fn validate(game: &Game, input: &FrameInput) -> Result<(), FrameError> {
    let directions_finite = input
        .controls
        .iter()
        .all(|c| c.direction.map_or(true, f64::is_finite));

    if !input.frame_time.is_finite() || !input.duration_ms.is_finite() || !directions_finite {
        return Err(FrameError::NonFiniteInput);
    }
    if input.duration_ms < 0.0 {
        return Err(FrameError::NegativeDuration(input.duration_ms));
    }
    if input.frame_time < game.frame_time {
        return Err(FrameError::FrameTimeRegressed {
            previous: game.frame_time,
            requested: input.frame_time,
        });
    }
    Ok(())
}

/// Apply each player's controls to its facing and velocity.
fn prepare_players(game: &mut Game, input: &FrameInput) {
    for slot in PlayerSlot::ALL {
        let controls = input.controls_for(slot);
        let player = game.player_mut(slot);

        let direction = controls.direction.unwrap_or(player.direction);
        let mut prepared = prepare_movement(
            input.duration_ms,
            controls.is_thrusting(),
            direction,
            player.clone(),
        );
        prepared.holding_shot = controls.holding_shot;
        *player = prepared;
    }
}

/// Move every entity to `time` and make it the frame time. Players are
/// kept inside the field.
fn move_entities(game: &mut Game, time: Time) {
    for player in game.players.iter_mut() {
        let moved = move_until(time, player.clone());
        *player = check_wall_obstacle(0.0, FIELD_WIDTH, 0.0, FIELD_HEIGHT, moved);
    }

    for bullets in game.bullets.iter_mut() {
        for bullet in bullets.values_mut() {
            *bullet = move_until(time, bullet.clone());
        }
    }

    for ball in game.balls.in_game.values_mut() {
        *ball = move_until(time, ball.clone());
    }

    game.frame_time = time;
}

/// Fire bullets for players releasing a charged shot.
///
/// A bullet's id is the frame id before the increment, so one owner never
/// gets the same id twice.
fn spawn_bullets(game: &mut Game, input: &FrameInput) {
    let bullet_id = game.frame_id;

    for slot in PlayerSlot::ALL {
        let holding = input.controls_for(slot).holding_shot;
        let (player, result) = update_shot(holding, input.frame_time, game.player(slot).clone());

        if let ShotResult::Shot { charge_ms } = result {
            let bullet = Bullet::new(
                player.position,
                player.direction,
                BulletSize::from_charge(charge_ms),
                input.frame_time,
            );
            debug_assert!(!game.bullets[slot.index()].contains_key(&bullet_id));
            game.bullets[slot.index()].insert(bullet_id, bullet);
        }

        *game.player_mut(slot) = player;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::balls::BallTimer;
    use crate::game::collision::EnabledCollisions;
    use crate::game::config::BALL_IMPULSE;
    use crate::game::events::{CollisionCategory, CollisionKind};
    use crate::game::field::{player_spawn, BULLET_SPEED, FIELD_CENTER, PLAYER_RADIUS};
    use crate::game::observer::RecordingObserver;
    use crate::game::state::ShotCharge;

    const FRAME_MS: f64 = 16.0;

    fn idle() -> [Controls; 4] {
        [Controls::idle(); 4]
    }

    fn controls_with(slot: PlayerSlot, controls: Controls) -> [Controls; 4] {
        let mut all = idle();
        all[slot.index()] = controls;
        all
    }

    /// Run idle 16 ms frames from the current frame time up to `until`.
    fn run_idle(mut game: Game, until: Time) -> Game {
        while game.frame_time + FRAME_MS <= until {
            game = game.update(game.frame_time + FRAME_MS, FRAME_MS, idle()).unwrap();
        }
        game
    }

    #[test]
    fn test_frame_id_and_time_advance() {
        let game = Game::init(0.0);
        let next = game.update(16.0, 16.0, idle()).unwrap();

        assert_eq!(next.frame_id(), 1);
        assert_eq!(next.frame_time(), 16.0);
        // Prior frame is untouched
        assert_eq!(game.frame_id(), 0);
        assert_eq!(game.frame_time(), 0.0);
    }

    #[test]
    fn test_invalid_input_rejected() {
        let game = run_idle(Game::init(0.0), 160.0);
        let before = game.clone();

        assert_eq!(
            game.update(176.0, -1.0, idle()),
            Err(FrameError::NegativeDuration(-1.0))
        );
        assert_eq!(game.update(f64::NAN, 16.0, idle()), Err(FrameError::NonFiniteInput));
        assert_eq!(game.update(176.0, f64::INFINITY, idle()), Err(FrameError::NonFiniteInput));
        assert_eq!(
            game.update(176.0, 16.0, controls_with(PlayerSlot::P2, Controls::thrust(f64::NAN))),
            Err(FrameError::NonFiniteInput)
        );
        assert_eq!(
            game.update(100.0, 16.0, idle()),
            Err(FrameError::FrameTimeRegressed { previous: 160.0, requested: 100.0 })
        );

        assert_eq!(game, before);
        // A later valid frame still works
        assert_eq!(game.update(176.0, 16.0, idle()).unwrap().frame_id(), before.frame_id() + 1);
    }

    #[test]
    fn test_first_ball_after_two_seconds() {
        let game = run_idle(Game::init(0.0), 1984.0);
        assert_eq!(game.balls_in_game().count(), 0);

        let game = run_idle(game, 2000.0);
        let balls: Vec<_> = game.balls_in_game().collect();
        assert_eq!(balls.len(), 1);
        assert_eq!(balls[0].0, 0);
        assert_eq!(balls[0].1.position, FIELD_CENTER);
        assert_eq!(balls[0].1.velocity, Vec2::ZERO);
        assert_eq!(game.incoming().next(), Some(1));
        assert_eq!(game.incoming().count(), 2);
        assert_eq!(game.timer(), BallTimer::WaitingForFreeSpace);
    }

    #[test]
    fn test_admission_on_uneven_frames() {
        let game = Game::init(0.0);
        let game = game.update(1999.0, 1999.0, idle()).unwrap();
        assert_eq!(game.balls_in_game().count(), 0);

        let game = game.update(2000.0, 1.0, idle()).unwrap();
        let ball = &game.balls.in_game[&0];
        assert_eq!(ball.position, FIELD_CENTER);
        assert_eq!(ball.time, 2000.0);
    }

    #[test]
    fn test_center_cleared_rearms_timer() {
        let mut game = run_idle(Game::init(0.0), 2000.0);

        // Ball 0 blocks the center
        game = run_idle(game, 5000.0);
        assert_eq!(game.balls_in_game().count(), 1);
        assert_eq!(game.timer(), BallTimer::WaitingForFreeSpace);

        // Move it away: the next frame re-arms at its frame time
        game.balls.in_game.get_mut(&0).unwrap().position = Vec2::new(100.0, 100.0);
        game = game.update(5008.0, 8.0, idle()).unwrap();
        assert_eq!(game.timer(), BallTimer::FreeSince(5008.0));

        game = game.update(7007.0, 1999.0, idle()).unwrap();
        assert_eq!(game.balls_in_game().count(), 1);

        game = game.update(7008.0, 1.0, idle()).unwrap();
        assert_eq!(game.balls_in_game().map(|(id, _)| id).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(game.incoming().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_thrust_moves_player() {
        let game = Game::init(0.0);
        let start = game.player(PlayerSlot::P3).position;

        let next = game
            .update(16.0, 16.0, controls_with(PlayerSlot::P3, Controls::thrust(std::f64::consts::FRAC_PI_2)))
            .unwrap();
        let player = next.player(PlayerSlot::P3);
        assert!(player.thrusting);
        assert_eq!(player.direction, std::f64::consts::FRAC_PI_2);
        assert!(player.velocity.y > 0.0);
        assert!(player.position.y > start.y);
        assert_eq!(player.time, 16.0);

        // Coasting keeps the facing
        let coasting = next.update(32.0, 16.0, idle()).unwrap();
        assert!(!coasting.player(PlayerSlot::P3).thrusting);
        assert_eq!(coasting.player(PlayerSlot::P3).direction, std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_player_stays_inside_field() {
        let mut game = Game::init(0.0);
        let left = controls_with(PlayerSlot::P1, Controls::thrust(std::f64::consts::PI));
        for k in 1..=200 {
            game = game.update(FRAME_MS * k as f64, FRAME_MS, left).unwrap();
        }
        let player = game.player(PlayerSlot::P1);
        assert_eq!(player.position.x, PLAYER_RADIUS);
        assert_eq!(player.velocity.x, 0.0);
    }

    #[test]
    fn test_charged_shot_spawns_bullet() {
        let hold = controls_with(PlayerSlot::P1, Controls::idle().with_shot(true));

        let game = Game::init(0.0);
        let game = game.update(16.0, 16.0, hold).unwrap();
        assert_eq!(game.player(PlayerSlot::P1).charge, ShotCharge::Charging { since: 16.0 });

        let game = game.update(416.0, 400.0, hold).unwrap();
        assert_eq!(game.bullet_count(), 0);

        // Release during frame id 2
        let game = game.update(432.0, 16.0, idle()).unwrap();
        assert_eq!(game.frame_id(), 3);
        assert_eq!(game.bullet_count(), 1);

        let (spawn, facing) = player_spawn(PlayerSlot::P1);
        let bullet = &game.bullets_of(PlayerSlot::P1)[&2];
        assert_eq!(bullet.position, spawn);
        assert_eq!(bullet.direction, facing);
        assert_eq!(bullet.size, BulletSize::Medium);
        assert_eq!(bullet.time, 432.0);
        assert_eq!(game.player(PlayerSlot::P1).charge, ShotCharge::Idle);

        // Bullets fly on the next frame
        let game = game.update(448.0, 16.0, idle()).unwrap();
        let bullet = &game.bullets_of(PlayerSlot::P1)[&2];
        assert!((bullet.position.x - (spawn.x + 16.0 * BULLET_SPEED)).abs() < 1e-9);
    }

    #[test]
    fn test_bullet_leaves_field() {
        let fire = |holding: bool| controls_with(PlayerSlot::P3, Controls::idle().with_shot(holding));
        let mut game = Game::init(0.0);
        game = game.update(16.0, 16.0, fire(true)).unwrap();
        game = game.update(32.0, 16.0, fire(false)).unwrap();
        assert_eq!(game.bullet_count(), 1);

        // P3 faces left from x = 900: gone after ~1000 ms
        let mut observer = RecordingObserver::default();
        let config = SimConfig::default();
        for k in 3..=80 {
            let input = FrameInput::idle(FRAME_MS * k as f64, FRAME_MS);
            game = update(&game, &input, &config, &mut observer).unwrap();
        }
        assert_eq!(game.bullet_count(), 0);

        let exits: Vec<_> = observer
            .collisions
            .iter()
            .filter(|r| r.applied && r.collision.category() == CollisionCategory::BulletWall)
            .collect();
        assert_eq!(exits.len(), 1);
        assert!(matches!(exits[0].collision.kind, CollisionKind::BulletWall(key, _) if key.owner == PlayerSlot::P3));
    }

    #[test]
    fn test_disabled_wall_lets_bullet_escape() {
        let config = SimConfig::default().with_collisions(EnabledCollisions::none());
        let mut observer = RecordingObserver::default();
        let fire = |holding: bool| controls_with(PlayerSlot::P3, Controls::idle().with_shot(holding));

        let mut game = Game::init(0.0);
        for k in 1..=80 {
            let controls = if k == 1 { fire(true) } else { fire(false) };
            let input = FrameInput::new(FRAME_MS * k as f64, FRAME_MS, controls);
            game = update(&game, &input, &config, &mut observer).unwrap();
        }

        assert!(observer.collisions.is_empty());
        assert_eq!(game.bullet_count(), 1);
        let bullet = game.bullets_of(PlayerSlot::P3).values().next().unwrap();
        assert!(bullet.position.x < 0.0);
    }

    #[test]
    fn test_bullet_pushes_ball() {
        let mut game = run_idle(Game::init(0.0), 2000.0);
        assert_eq!(game.balls_in_game().count(), 1);

        // Line P1 up with the center ball
        let shooter = game.player_mut(PlayerSlot::P1);
        shooter.position = Vec2::new(400.0, FIELD_CENTER.y);
        shooter.direction = 0.0;

        let fire = |holding: bool| controls_with(PlayerSlot::P1, Controls::idle().with_shot(holding));
        game = game.update(2016.0, 16.0, fire(true)).unwrap();
        game = game.update(2032.0, 16.0, fire(false)).unwrap();
        assert_eq!(game.bullet_count(), 1);

        // 166 units of gap at 0.9 units/ms
        game = run_idle(game, 2032.0 + 16.0 * 13.0);
        assert_eq!(game.bullet_count(), 0);

        let ball = &game.balls.in_game[&0];
        assert!((ball.velocity.x - BALL_IMPULSE).abs() < 1e-9);
        assert!(ball.velocity.y.abs() < 1e-9);
        assert!(ball.position.x > FIELD_CENTER.x);
        // Moved only since the contact instant
        let contact = 2032.0 + 166.0 / BULLET_SPEED;
        let expected_x = FIELD_CENTER.x + BALL_IMPULSE * (game.frame_time - contact);
        assert!((ball.position.x - expected_x).abs() < 1e-6);
    }

    #[test]
    fn test_observer_sees_every_stage_in_order() {
        let mut observer = RecordingObserver::default();
        let config = SimConfig::default();
        let mut game = Game::init(0.0);
        for k in 1..=3 {
            game = update(&game, &FrameInput::idle(FRAME_MS * k as f64, FRAME_MS), &config, &mut observer).unwrap();
        }

        assert_eq!(observer.stages.len(), 15);
        for (frame, chunk) in observer.stages.chunks(5).enumerate() {
            let stages: Vec<Stage> = chunk.iter().map(|(stage, _, _)| *stage).collect();
            assert_eq!(stages, Stage::ALL.to_vec());
            // Frame id bumps only in the spawning stage
            assert_eq!(chunk[3].1, frame as u64);
            assert_eq!(chunk[4].1, frame as u64 + 1);
            // Frame time moves with the motion stage
            let previous = FRAME_MS * frame as f64;
            assert_eq!(chunk[2].2, previous);
            assert_eq!(chunk[3].2, previous + FRAME_MS);
            assert_eq!(chunk[4].2, previous + FRAME_MS);
        }
    }

    #[test]
    fn test_observer_sees_admission() {
        let mut observer = RecordingObserver::default();
        let game = Game::init(0.0);
        update(&game, &FrameInput::idle(2500.0, 2500.0), &SimConfig::default(), &mut observer).unwrap();
        assert_eq!(observer.admitted, vec![0]);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let frames: Vec<FrameInput> = (1..=300)
            .map(|k| {
                let t = FRAME_MS * k as f64;
                let angle = (k % 7) as f64 * 0.9;
                FrameInput::new(
                    t,
                    FRAME_MS,
                    [
                        Controls::thrust(angle).with_shot(k % 20 < 10),
                        Controls::idle().with_shot(k % 33 < 5),
                        Controls::thrust(-angle),
                        if k % 2 == 0 { Controls::thrust(3.0) } else { Controls::idle() },
                    ],
                )
            })
            .collect();

        let initial = Game::init(0.0);
        let config = SimConfig::default();
        let a = replay(&initial, &frames, &config).unwrap();
        let b = replay(&initial, &frames, &config).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(a.frame_id(), 300);

        let stepped = frames
            .iter()
            .fold(initial, |game, input| update(&game, input, &config, &mut NoopObserver).unwrap());
        assert_eq!(stepped.compute_hash(), a.compute_hash());
    }

    #[test]
    fn test_replay_stops_at_invalid_frame() {
        let frames = [
            FrameInput::idle(16.0, 16.0),
            FrameInput::idle(8.0, 16.0),
            FrameInput::idle(32.0, 16.0),
        ];
        let result = replay(&Game::init(0.0), &frames, &SimConfig::default());
        assert_eq!(
            result,
            Err(FrameError::FrameTimeRegressed { previous: 16.0, requested: 8.0 })
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeSet;
        use crate::game::balls::INITIAL_BALL_IDS;

        fn controls() -> impl Strategy<Value = Controls> {
            (proptest::option::of(-4.0f64..4.0), any::<bool>())
                .prop_map(|(direction, holding_shot)| Controls { direction, holding_shot })
        }

        fn frame() -> impl Strategy<Value = (f64, [Controls; 4])> {
            (0.0f64..400.0, proptest::array::uniform4(controls()))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(48))]

            /// Property: frame ids count updates, ball ids stay partitioned,
            /// bullet ids come from past frames, players stay in the field.
            #[test]
            fn prop_frame_invariants(frames in proptest::collection::vec(frame(), 1..120)) {
                let mut game = Game::init(0.0);
                let config = SimConfig::default().with_collisions(EnabledCollisions::all());

                for (i, (duration, controls)) in frames.into_iter().enumerate() {
                    let input = FrameInput::new(game.frame_time + duration, duration, controls);
                    let next = update(&game, &input, &config, &mut NoopObserver).unwrap();

                    prop_assert_eq!(next.frame_id(), i as u64 + 1);
                    prop_assert!(next.frame_time() >= game.frame_time());

                    let in_game: BTreeSet<_> = next.balls_in_game().map(|(id, _)| id).collect();
                    let incoming: BTreeSet<_> = next.incoming().collect();
                    prop_assert!(in_game.is_disjoint(&incoming));
                    prop_assert_eq!(in_game.len() + incoming.len(), INITIAL_BALL_IDS.len());
                    prop_assert!(in_game.iter().chain(&incoming).all(|id| INITIAL_BALL_IDS.contains(id)));

                    for slot in PlayerSlot::ALL {
                        // New ids are the frame id of this update
                        let new_ids: Vec<_> = next
                            .bullets_of(slot)
                            .keys()
                            .filter(|id| !game.bullets_of(slot).contains_key(id))
                            .copied()
                            .collect();
                        prop_assert!(new_ids.len() <= 1);
                        prop_assert!(new_ids.iter().all(|id| *id == game.frame_id()));
                        prop_assert!(next.bullets_of(slot).keys().all(|id| *id < next.frame_id()));

                        let p = next.player(slot).position;
                        prop_assert!(p.x >= PLAYER_RADIUS && p.x <= FIELD_WIDTH - PLAYER_RADIUS);
                        prop_assert!(p.y >= PLAYER_RADIUS && p.y <= FIELD_HEIGHT - PLAYER_RADIUS);
                    }

                    game = next;
                }
            }

            /// Property: replaying identical inputs gives an identical hash.
            #[test]
            fn prop_replay_hash_stable(frames in proptest::collection::vec(frame(), 1..60)) {
                let mut inputs = Vec::with_capacity(frames.len());
                let mut t = 0.0;
                for (duration, controls) in frames {
                    t += duration;
                    inputs.push(FrameInput::new(t, duration, controls));
                }

                let initial = Game::init(0.0);
                let a = replay(&initial, &inputs, &SimConfig::default()).unwrap();
                let b = replay(&initial, &inputs, &SimConfig::default()).unwrap();
                prop_assert_eq!(a.compute_hash(), b.compute_hash());
            }
        }
    }
}
