//! Fixed-rate simulation tick
//!
//! Movement → collision pass → color feedback → cleanup → death-line → spawn.

use rand::Rng;

use super::collision::{Response, collide, detect};
use super::entity::{Color, EntityId};
use super::powerup::{PowerUpKind, apply_effect, maybe_release};
use super::state::{GameEvent, GameState, MoverKind};
use crate::settings::Settings;

/// Paddle/session commands decoded from input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start moving left (also resumes play)
    MoveLeft,
    /// Start moving right (also resumes play)
    MoveRight,
    /// Key released
    Stop,
    /// Flip the pause flag
    TogglePause,
}

/// Apply an input command between ticks
pub fn apply_command(state: &mut GameState, command: Command) {
    let speed = state.paddle_speed;
    match command {
        Command::MoveLeft | Command::MoveRight => {
            let vx = if command == Command::MoveLeft { -speed } else { speed };
            if let Some(paddle) = state.paddle_mut() {
                paddle.rect.body.vel.x = vx;
            }
            state.paused = false;
        }
        Command::Stop => {
            if let Some(paddle) = state.paddle_mut() {
                paddle.rect.body.vel.x = 0.0;
            }
        }
        Command::TogglePause => state.paused = !state.paused,
    }
}

/// Advance the world by one fixed tick
///
/// Does nothing while paused or after the session has ended. Returns what
/// happened, in order.
pub fn tick<R: Rng + ?Sized>(
    state: &mut GameState,
    rng: &mut R,
    settings: &Settings,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.paused || state.is_over() {
        return events;
    }
    state.time_ticks += 1;

    // --- MOVEMENT ---
    for rect in state.rects.values_mut() {
        rect.step();
    }
    for mover in &mut state.movers {
        mover.circle.body.step();
    }

    // --- COLLISION PASS ---
    let mut hit_bricks: Vec<EntityId> = Vec::new();
    let mut collected: Vec<(EntityId, PowerUpKind)> = Vec::new();
    let mut removed: Vec<EntityId> = Vec::new();
    let mut fallen_balls: Vec<EntityId> = Vec::new();

    for rect in state.rects.values() {
        for mover in state.movers.iter_mut() {
            if removed.contains(&mover.id) {
                continue;
            }
            let side = detect(&rect.rect, &mover.circle);
            if !side.is_hit() {
                continue;
            }
            let response = collide(rect.kind, &rect.rect, &mover.kind, &mut mover.circle, side);

            // Each ball contact costs the brick one point, even in the same tick
            if mover.is_ball() {
                if let Some(durability) = state.durability.get_mut(&rect.id) {
                    *durability -= 1;
                    if !hit_bricks.contains(&rect.id) {
                        hit_bricks.push(rect.id);
                    }
                }
            }

            match response {
                Response::Reflected => {}
                Response::PickedUp => {
                    if let MoverKind::PowerUp(kind) = &mover.kind {
                        collected.push((mover.id, kind.clone()));
                    }
                    removed.push(mover.id);
                }
                Response::Missed => {
                    events.push(GameEvent::PowerUpMissed { id: mover.id });
                    removed.push(mover.id);
                }
                Response::LifeLost => {
                    if !fallen_balls.contains(&mover.id) {
                        fallen_balls.push(mover.id);
                    }
                }
            }
        }
    }

    for (id, kind) in collected {
        apply_effect(state, &kind);
        events.push(GameEvent::PowerUpCollected { id, kind });
    }

    // --- COLOR FEEDBACK ---
    for (id, &durability) in &state.durability {
        if durability > 0 {
            if let Some(rect) = state.rects.get_mut(id) {
                rect.rect.body.color = Color::for_durability(durability);
            }
        }
    }

    // --- CLEANUP ---
    for id in hit_bricks {
        match state.durability.get(&id).copied() {
            Some(remaining) if remaining > 0 => {
                events.push(GameEvent::BrickHit { id, remaining });
            }
            Some(_) => {
                state.durability.remove(&id);
                state.rects.remove(&id);
                events.push(GameEvent::BrickDestroyed { id });
            }
            None => {}
        }
    }

    // Power-ups only fall, so once below every rectangle nothing can catch them
    let floor = state.floor();
    state.movers.retain(|mover| {
        if removed.contains(&mover.id) {
            return false;
        }
        if mover.is_ball() {
            return true;
        }
        let below = floor.is_some_and(|floor| mover.circle.top() > floor);
        if below {
            events.push(GameEvent::PowerUpMissed { id: mover.id });
        }
        !below
    });

    // --- DEATH LINE ---
    for ball in fallen_balls {
        state.lives -= 1;
        if let Some(mover) = state.movers.iter_mut().find(|m| m.id == ball) {
            mover.respawn();
        }
        // Serve again once the player moves
        state.paused = true;
        events.push(GameEvent::LifeLost {
            ball,
            lives: state.lives,
        });
    }

    // --- SPAWN ---
    if let Some((id, kind)) = maybe_release(state, rng, settings) {
        events.push(GameEvent::PowerUpReleased { id, kind });
    }

    if let Some(event) = state.update_phase() {
        events.push(event);
    }

    for event in &events {
        log::debug!("tick {}: {:?}", state.time_ticks, event);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette;
    use crate::sim::entity::{Circle, Rect};
    use crate::sim::state::{GamePhase, RectKind};
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Paddle at (250,480) width 60, death-line at y=500, one brick at (100,90)
    fn arena() -> (GameState, EntityId) {
        let mut state = GameState::new(3);
        state.paddle_speed = 3.0;
        state.add_rect(
            RectKind::Paddle {
                left_bound: 0,
                right_bound: 500,
            },
            Rect::new(60, 10, DVec2::new(250.0, 480.0), palette::PADDLE),
        );
        state.add_rect(
            RectKind::DeathLine,
            Rect::new(500, 10, DVec2::new(250.0, 500.0), palette::DEATH_LINE),
        );
        let brick = state.add_brick(
            Rect::new(20, 10, DVec2::new(100.0, 90.0), palette::BRICK),
            2,
        );
        state.paused = false;
        (state, brick)
    }

    fn ball(x: f64, y: f64, vx: f64, vy: f64) -> Circle {
        Circle::new(5, DVec2::new(x, y), DVec2::new(vx, vy), palette::BALL)
    }

    fn powerup(x: f64, y: f64) -> Circle {
        Circle::new(4, DVec2::new(x, y), DVec2::new(0.0, 0.25), palette::POWERUP)
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(12345)
    }

    #[test]
    fn test_tick_paused_does_nothing() {
        let (mut state, _) = arena();
        state.add_ball(ball(300.0, 300.0, 1.0, 1.0));
        state.paused = true;
        let events = tick(&mut state, &mut rng(), &Settings::default());
        assert!(events.is_empty());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.movers[0].circle.body.pos, DVec2::new(300.0, 300.0));
    }

    #[test]
    fn test_tick_moves_everything() {
        let (mut state, _) = arena();
        state.add_ball(ball(300.0, 300.0, 1.5, -2.0));
        apply_command(&mut state, Command::MoveRight);
        tick(&mut state, &mut rng(), &Settings::default());

        assert_eq!(state.movers[0].circle.body.pos, DVec2::new(301.5, 298.0));
        assert_eq!(state.paddle().unwrap().rect.body.pos.x, 253.0);
    }

    #[test]
    fn test_ball_hit_decrements_and_recolors() {
        let (mut state, brick) = arena();
        state.add_ball(ball(100.0, 100.0, 0.0, -5.0));
        let events = tick(&mut state, &mut rng(), &Settings::default());

        assert_eq!(state.durability.get(&brick), Some(&1));
        assert_eq!(state.movers[0].circle.body.vel, DVec2::new(0.0, 5.0));
        assert_eq!(
            state.rects.get(&brick).unwrap().rect.body.color,
            Color::for_durability(1)
        );
        assert!(events.contains(&GameEvent::BrickHit {
            id: brick,
            remaining: 1
        }));

        // Ball is now only touching the brick: no second hit
        tick(&mut state, &mut rng(), &Settings::default());
        assert_eq!(state.durability.get(&brick), Some(&1));
    }

    #[test]
    fn test_simultaneous_hits_each_count_and_win() {
        let (mut state, brick) = arena();
        state.add_ball(ball(95.0, 100.0, 0.0, -5.0));
        state.add_ball(ball(105.0, 100.0, 0.0, -5.0));
        let events = tick(&mut state, &mut rng(), &Settings::default());

        assert!(!state.durability.contains_key(&brick));
        assert!(!state.rects.contains_key(&brick));
        assert!(events.contains(&GameEvent::BrickDestroyed { id: brick }));
        assert_eq!(events.last(), Some(&GameEvent::Won));
        assert_eq!(state.phase, GamePhase::Won);

        // Finished sessions stay frozen
        let ticks = state.time_ticks;
        assert!(tick(&mut state, &mut rng(), &Settings::default()).is_empty());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_walls_and_paddle_are_indestructible() {
        let (mut state, _) = arena();
        let wall = state.add_rect(
            RectKind::Wall,
            Rect::new(10, 500, DVec2::new(5.0, 250.0), palette::WALL),
        );
        state.add_ball(ball(14.0, 250.0, -2.0, 0.0));
        tick(&mut state, &mut rng(), &Settings::default());

        assert!(state.rects.contains_key(&wall));
        assert!(!state.durability.contains_key(&wall));
        assert_eq!(state.movers[0].circle.body.vel, DVec2::new(2.0, 0.0));
    }

    #[test]
    fn test_death_line_costs_one_life_and_serves_again() {
        let (mut state, _) = arena();
        let id = state.add_ball(ball(50.0, 492.0, 0.0, 2.0));
        let events = tick(&mut state, &mut rng(), &Settings::default());

        assert_eq!(state.lives, 2);
        assert!(events.contains(&GameEvent::LifeLost { ball: id, lives: 2 }));
        assert!(state.paused);
        assert_eq!(state.movers[0].circle.body.pos, DVec2::new(50.0, 492.0));
        assert_eq!(state.phase, GamePhase::Playing);

        // No further loss while paused
        tick(&mut state, &mut rng(), &Settings::default());
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_last_life_loses_with_bricks_left() {
        let (mut state, brick) = arena();
        state.lives = 1;
        state.add_ball(ball(50.0, 492.0, 0.0, 2.0));
        let events = tick(&mut state, &mut rng(), &Settings::default());

        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::Lost);
        assert_eq!(events.last(), Some(&GameEvent::Lost));
        assert!(state.durability.contains_key(&brick));
    }

    #[test]
    fn test_powerup_pickup_applies_once() {
        let (mut state, _) = arena();
        let first = state.add_powerup(PowerUpKind::FastPaddle, powerup(250.0, 471.5));
        let events = tick(&mut state, &mut rng(), &Settings::default());

        assert_eq!(state.paddle_speed, 6.0);
        assert!(state.movers.is_empty());
        let collected = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PowerUpCollected { .. }))
            .count();
        assert_eq!(collected, 1);
        assert!(events.contains(&GameEvent::PowerUpCollected {
            id: first,
            kind: PowerUpKind::FastPaddle
        }));

        // A second FastPaddle compounds to 4x
        state.add_powerup(PowerUpKind::FastPaddle, powerup(250.0, 471.5));
        tick(&mut state, &mut rng(), &Settings::default());
        assert_eq!(state.paddle_speed, 12.0);

        // Move commands pick up the new speed
        apply_command(&mut state, Command::MoveLeft);
        assert_eq!(state.paddle().unwrap().rect.body.vel.x, -12.0);
    }

    #[test]
    fn test_powerup_does_not_damage_bricks() {
        let (mut state, brick) = arena();
        state.add_powerup(PowerUpKind::ExtraLife, powerup(100.0, 84.0));
        tick(&mut state, &mut rng(), &Settings::default());
        assert_eq!(state.durability.get(&brick), Some(&2));
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_powerup_missed_at_death_line() {
        let (mut state, _) = arena();
        let id = state.add_powerup(PowerUpKind::ExtraLife, powerup(50.0, 491.0));
        let events = tick(&mut state, &mut rng(), &Settings::default());

        assert!(state.movers.is_empty());
        assert_eq!(state.lives, 3);
        assert!(!state.paused);
        assert!(events.contains(&GameEvent::PowerUpMissed { id }));
    }

    #[test]
    fn test_powerup_below_floor_is_dropped() {
        let (mut state, _) = arena();
        state.add_powerup(PowerUpKind::SlowPaddle, powerup(250.0, 600.0));
        tick(&mut state, &mut rng(), &Settings::default());
        assert!(state.movers.is_empty());
    }

    #[test]
    fn test_wide_level_keeps_powerups() {
        use crate::sim::PendingPowerUp;

        let mut state = GameState::new(3);
        state.add_rect(
            RectKind::Paddle {
                left_bound: 0,
                right_bound: 800,
            },
            Rect::new(60, 10, DVec2::new(400.0, 580.0), palette::PADDLE),
        );
        state.add_rect(
            RectKind::DeathLine,
            Rect::new(800, 10, DVec2::new(400.0, 600.0), palette::DEATH_LINE),
        );
        state.add_brick(
            Rect::new(20, 10, DVec2::new(100.0, 90.0), palette::BRICK),
            2,
        );
        state.pending.push_back(PendingPowerUp {
            kind: PowerUpKind::ExtraLife,
            min_x: 700,
            max_x: 700,
        });
        state.paused = false;

        // Field size settings describe the screen, not the level
        let settings = Settings {
            powerup_frequency: 2,
            ..Settings::default()
        };
        let mut rng = rng();
        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(tick(&mut state, &mut rng, &settings));
            if state.pending.is_empty() {
                break;
            }
        }
        assert!(state.pending.is_empty());
        for _ in 0..10 {
            events.extend(tick(&mut state, &mut rng, &settings));
        }

        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::PowerUpMissed { .. }))
        );
        assert_eq!(state.movers.len(), 1);
        assert_eq!(state.movers[0].circle.body.pos.x, 700.0);
    }

    #[test]
    fn test_spawn_releases_pending() {
        use crate::sim::PendingPowerUp;

        let (mut state, _) = arena();
        state.pending.push_back(PendingPowerUp {
            kind: PowerUpKind::ExtraLife,
            min_x: 200,
            max_x: 300,
        });
        let settings = Settings {
            powerup_frequency: 2,
            ..Settings::default()
        };
        let mut rng = rng();
        let mut released = false;
        for _ in 0..100 {
            let events = tick(&mut state, &mut rng, &settings);
            if events
                .iter()
                .any(|e| matches!(e, GameEvent::PowerUpReleased { .. }))
            {
                released = true;
                break;
            }
        }
        assert!(released);
        assert!(state.pending.is_empty());
        assert_eq!(state.movers.len(), 1);
    }

    #[test]
    fn test_durability_never_stored_non_positive() {
        let (mut state, _) = arena();
        state.add_brick(Rect::new(20, 10, DVec2::new(200.0, 90.0), palette::BRICK), 1);
        state.add_ball(ball(100.0, 100.0, 0.0, -5.0));
        state.add_ball(ball(200.0, 100.0, 0.0, -5.0));
        let mut rng = rng();
        for _ in 0..50 {
            tick(&mut state, &mut rng, &Settings::default());
            assert!(state.durability.values().all(|&d| d > 0));
        }
    }

    #[test]
    fn test_commands() {
        let (mut state, _) = arena();
        state.paused = true;

        apply_command(&mut state, Command::TogglePause);
        assert!(!state.paused);
        apply_command(&mut state, Command::TogglePause);
        assert!(state.paused);

        apply_command(&mut state, Command::MoveLeft);
        assert!(!state.paused);
        assert_eq!(state.paddle().unwrap().rect.body.vel.x, -3.0);

        apply_command(&mut state, Command::TogglePause);
        assert!(state.paused);
        assert_eq!(state.paddle().unwrap().rect.body.vel.x, -3.0);

        apply_command(&mut state, Command::Stop);
        assert!(state.paused);
        assert_eq!(state.paddle().unwrap().rect.body.vel.x, 0.0);
    }

    #[test]
    fn test_determinism() {
        use crate::sim::PendingPowerUp;

        // Two worlds with the same seed produce identical results
        let settings = Settings {
            powerup_frequency: 3,
            ..Settings::default()
        };
        let build = || {
            let (mut state, _) = arena();
            state.add_ball(ball(300.0, 300.0, 2.0, -3.0));
            for kind in [PowerUpKind::ExtraLife, PowerUpKind::SlowPaddle] {
                state.pending.push_back(PendingPowerUp {
                    kind,
                    min_x: 0,
                    max_x: 500,
                });
            }
            state
        };
        let mut state1 = build();
        let mut state2 = build();
        let mut rng1 = Pcg32::seed_from_u64(99999);
        let mut rng2 = Pcg32::seed_from_u64(99999);

        for _ in 0..40 {
            let e1 = tick(&mut state1, &mut rng1, &settings);
            let e2 = tick(&mut state2, &mut rng2, &settings);
            assert_eq!(e1, e2);
        }
        assert_eq!(state1.movers.len(), state2.movers.len());
        for (a, b) in state1.movers.iter().zip(&state2.movers) {
            assert_eq!(a.circle.body.pos, b.circle.body.pos);
        }
    }
}
