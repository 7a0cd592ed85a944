//! Zodiac Arena headless runner
//!
//! Runs a seeded demo session with an idle-mode pilot: the player drifts
//! toward the nearest pickup and fires at the nearest enemy once a second.
//! Frames are pumped at a jittered display rate to exercise the fixed
//! timestep loop.
//!
//! Usage: `zodiac-arena [seed] [config.json]`

// The runner is native only; wasm hosts drive `GameLoop` themselves
#![cfg_attr(target_arch = "wasm32", allow(dead_code, unused_imports))]

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use zodiac_arena::events::GameEventKind;
use zodiac_arena::sim::{
    EntityKind, EntityTag, GameState, RenderHandle, Systems, default_arena, spawn_enemy, spawn_pickup,
    spawn_player, spawn_projectile,
};
use zodiac_arena::timestep::{GameLoop, ManualScheduler};
use zodiac_arena::{GameEvent, SimConfig};

/// Seconds of simulated play
const SESSION_SECONDS: f64 = 30.0;
/// Seconds between idle-mode shots
const FIRE_INTERVAL: f32 = 1.0;

const ENEMY_COUNT: usize = 6;
const PICKUP_COUNT: usize = 8;

struct Session {
    state: GameState,
    systems: Systems,
    fire_cooldown: f32,
    next_render: u64,
}

impl Session {
    fn new(config: &SimConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut state = GameState::with_max_hp(config.max_hp);
        let mut next_render = 0;
        let mut handle = || {
            next_render += 1;
            RenderHandle(next_render)
        };

        spawn_player(&mut state, handle());

        let spread = (config.arena_half_extent - 2.0).max(1.0);
        for _ in 0..ENEMY_COUNT {
            let x = rng.random_range(-spread..spread);
            let z = rng.random_range(-spread..spread);
            spawn_enemy(&mut state, x, z, handle());
        }
        for _ in 0..PICKUP_COUNT {
            let x = rng.random_range(-spread..spread);
            let z = rng.random_range(-spread..spread);
            spawn_pickup(&mut state, x, z, handle());
        }

        let walls = if config.arena_half_extent > 0.0 {
            default_arena(config.arena_half_extent)
        } else {
            Vec::new()
        };

        Self {
            state,
            systems: Systems::with_config(walls, config),
            fire_cooldown: FIRE_INTERVAL,
            next_render,
        }
    }

    /// Nearest live entity with `tag` to `from`
    fn nearest(&self, tag: EntityTag, from: Vec3) -> Option<Vec3> {
        self.state
            .iter()
            .filter(|e| e.alive && e.tag() == tag)
            .map(|e| e.pos)
            .min_by(|a, b| {
                a.distance_squared(from)
                    .partial_cmp(&b.distance_squared(from))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Idle-mode pilot, run before each tick
    fn pilot(&mut self, dt: f32) {
        let Some(player) = self.state.player() else {
            return;
        };
        let (player_id, player_pos) = (player.id, player.pos);
        let speed = match player.kind {
            EntityKind::Player { speed, .. } => speed,
            _ => 0.0,
        };

        if let Some(target) = self.nearest(EntityTag::Pickup, player_pos) {
            let mut dir = target - player_pos;
            dir.y = 0.0;
            let step = speed * dt;
            let new_pos = if dir.length() <= step {
                Vec3::new(target.x, player_pos.y, target.z)
            } else {
                player_pos + dir.normalize() * step
            };
            if let Some(p) = self.state.get_mut(player_id) {
                p.pos = new_pos;
            }
        }

        self.fire_cooldown -= dt;
        if self.fire_cooldown <= 0.0 {
            self.fire_cooldown += FIRE_INTERVAL;
            if let Some(enemy) = self.nearest(EntityTag::Enemy, player_pos) {
                let dir = (enemy - player_pos).normalize_or_zero();
                if dir != Vec3::ZERO {
                    self.next_render += 1;
                    let render = RenderHandle(self.next_render);
                    spawn_projectile(&mut self.state, player_pos, dir, render);
                }
            }
        }
    }

    fn tick(&mut self, dt: f32) {
        if self.state.is_dead() {
            return;
        }
        self.pilot(dt);
        self.systems.update(&mut self.state, dt);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x5EED);
    let config = match args.next() {
        Some(path) => SimConfig::load_or_default(path),
        None => SimConfig::default(),
    };

    log::info!("Zodiac Arena (headless) starting...");
    log::info!("Session seed: {}", seed);

    let session = Rc::new(RefCell::new(Session::new(&config, seed)));
    {
        let mut s = session.borrow_mut();
        s.state.bus_mut().subscribe(GameEventKind::Score, |e: &GameEvent| {
            if let GameEvent::Score { delta, total } = e {
                log::info!("Score +{} -> {}", delta, total);
            }
        });
        s.state.bus_mut().subscribe(GameEventKind::Hit, |e: &GameEvent| {
            if let GameEvent::Hit { hp } = e {
                log::debug!("Hit! hp {}", hp);
            }
        });
        s.state.bus_mut().subscribe(GameEventKind::Pickup, |e: &GameEvent| {
            if let GameEvent::Pickup { id } = e {
                log::info!("Collected pickup #{}", id);
            }
        });
    }

    let fixed = session.clone();
    let frames = Rc::new(RefCell::new(0u64));
    let frame_count = frames.clone();
    let mut game_loop = GameLoop::with_rate(
        ManualScheduler::new(),
        move |dt| fixed.borrow_mut().tick(dt),
        move |_dt| *frame_count.borrow_mut() += 1,
        f64::from(config.tick_hz),
    )
    .with_max_frame_dt(config.max_frame_dt);

    // Jittered ~144 Hz display
    let mut jitter = Pcg32::seed_from_u64(seed ^ 0xF4A3E);
    let mut now = 0.0f64;
    game_loop.start(now);
    while now < SESSION_SECONDS {
        now += 1.0 / 144.0 + jitter.random_range(-0.002..0.002);
        game_loop.on_animation_frame(now);

        let s = session.borrow();
        if s.state.is_dead() || s.state.count(EntityTag::Pickup) == 0 {
            break;
        }
    }
    game_loop.stop();

    let s = session.borrow();
    log::info!(
        "Session over after {:.2}s: {} ticks, {} frames, score {}, hp {}, {} enemies left, {} pickups left",
        now,
        game_loop.ticks,
        frames.borrow(),
        s.state.score(),
        s.state.hp(),
        s.state.count(EntityTag::Enemy),
        s.state.count(EntityTag::Pickup),
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on wasm; the host owns the frame callback
}
