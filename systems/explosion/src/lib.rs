#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave-expanding bomb detonation.
//!
//! A bomb's footprint is staged by a power-up handler via
//! [`match3_world::GameState::begin_explosion`], grouped into Chebyshev-radius
//! waves. This crate steps those waves forward one radius at a time, every
//! [`match3_core::SimulationConfig::explosion_wave_seconds`], resolving each
//! cell a wave reaches into one of three outcomes: a cover layer absorbs the
//! hit and protects the tile underneath this pass; a bomb tile is queued as a
//! chain reaction for the orchestrator to activate next tick; otherwise the
//! tile is destroyed and the ground beneath it takes one hit.

use match3_core::{
    ContinuousPosition, DestroyReason, Event, EventCollector, EventKind,
    ExplosionSystem as ExplosionSystemTrait, Position, Tile,
};
use match3_world::GameState;

/// Steps every active explosion's wave timer forward, resolving whichever
/// radius each crosses into.
#[derive(Clone, Debug, Default)]
pub struct WaveExplosion;

impl WaveExplosion {
    /// Creates a new explosion stepper. Holds no state of its own; every
    /// active explosion lives on the board.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ExplosionSystemTrait<GameState> for WaveExplosion {
    fn step(&mut self, state: &mut GameState, dt: f64, collector: &mut dyn EventCollector) -> bool {
        let wave_seconds = state.simulation_config().explosion_wave_seconds;
        let mut explosions = std::mem::take(state.explosions_mut());

        for explosion in &mut explosions {
            explosion.timer += dt;
            while explosion.timer >= wave_seconds && !explosion.is_finished() {
                explosion.timer -= wave_seconds;
                let radius = explosion.next_wave as u32;
                let cells = explosion.waves[explosion.next_wave].clone();
                explosion.next_wave += 1;

                collector.collect(Event::new(
                    state.tick(),
                    state.simulation_time(),
                    EventKind::ExplosionWave {
                        origin: explosion.origin,
                        radius,
                    },
                ));

                for cell in cells {
                    resolve_cell(state, cell, collector);
                }
            }
        }

        explosions.retain(|explosion| !explosion.is_finished());
        let still_active = !explosions.is_empty();
        state.explosions_mut().extend(explosions);
        still_active
    }
}

fn resolve_cell(state: &mut GameState, cell: Position, collector: &mut dyn EventCollector) {
    if let Some(cover) = state.cover_mut(cell) {
        if cover.is_present() {
            let kind_before = cover.kind;
            if cover.absorb_hit() {
                collector.collect(Event::new(
                    state.tick(),
                    state.simulation_time(),
                    EventKind::CoverDestroyed {
                        position: cell,
                        kind: kind_before,
                    },
                ));
            }
            if let Some(tile) = state.tile_mut(cell) {
                tile.is_suspended = false;
            }
            return;
        }
    }

    let Some(tile) = state.tile_mut(cell) else {
        return;
    };
    if tile.is_empty() {
        return;
    }
    tile.is_suspended = false;

    if tile.bomb.is_bomb() {
        state.stage_chain_bomb(cell);
        return;
    }

    let id = tile.id;
    let _ = state.set_tile(cell, Tile::empty(ContinuousPosition::from_cell(cell)));
    collector.collect(Event::new(
        state.tick(),
        state.simulation_time(),
        EventKind::TileDestroyed {
            id,
            position: cell,
            reason: DestroyReason::Bomb,
        },
    ));

    if let Some(ground) = state.ground_mut(cell) {
        let kind_before = ground.kind;
        if ground.is_present() && ground.apply_hit() {
            collector.collect(Event::new(
                state.tick(),
                state.simulation_time(),
                EventKind::GroundDestroyed {
                    position: cell,
                    kind: kind_before,
                },
            ));
        }
    }
}
