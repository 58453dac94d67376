#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! UFO projectile flight: takeoff, pursuit, and impact.
//!
//! A UFO bomb activation launches a [`match3_core::Projectile`] via
//! [`match3_world::GameState::begin_projectile`]. This crate advances every
//! in-flight projectile through three phases each tick: a short vertical
//! takeoff arc, a linear cruise toward its current target, and an impact that
//! queues the target cell for the orchestrator to clear.

use match3_core::{
    ContinuousPosition, Event, EventCollector, EventKind, Position,
    ProjectileFlightPhase, ProjectileSystem as ProjectileSystemTrait, RngDomain, TargetMode,
};
use match3_world::GameState;

/// Advances every in-flight UFO projectile by one fixed timestep.
#[derive(Clone, Debug, Default)]
pub struct UfoFlight;

impl UfoFlight {
    /// Creates a new projectile stepper. Holds no state of its own; every
    /// in-flight projectile lives on the board.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProjectileSystemTrait<GameState> for UfoFlight {
    fn step(&mut self, state: &mut GameState, dt: f64, collector: &mut dyn EventCollector) {
        let config = state.simulation_config();
        let mut projectiles = std::mem::take(state.projectiles_mut());

        for projectile in &mut projectiles {
            match projectile.phase {
                ProjectileFlightPhase::Takeoff => {
                    projectile.phase_elapsed += dt;
                    let progress = (projectile.phase_elapsed / config.ufo_takeoff_seconds).min(1.0);
                    let eased = 1.0 - (1.0 - progress) * (1.0 - progress);
                    projectile.height = eased * config.ufo_max_height;
                    if progress >= 1.0 {
                        projectile.phase = ProjectileFlightPhase::Flight;
                        projectile.phase_elapsed = 0.0;
                    }
                }
                ProjectileFlightPhase::Flight => {
                    let Some(target) = resolve_target(state, projectile, collector) else {
                        projectile.phase = ProjectileFlightPhase::Impact;
                        continue;
                    };
                    let target_continuous = ContinuousPosition::from_cell(target);
                    let dx = target_continuous.x - projectile.position.x;
                    let dy = target_continuous.y - projectile.position.y;
                    let distance = dx.hypot(dy);
                    if distance <= config.ufo_impact_threshold {
                        projectile.phase = ProjectileFlightPhase::Impact;
                    } else {
                        let step = (config.ufo_flight_speed * dt).min(distance);
                        projectile.position = ContinuousPosition::new(
                            projectile.position.x + dx / distance * step,
                            projectile.position.y + dy / distance * step,
                        );
                        collector.collect(Event::new(
                            state.tick(),
                            state.simulation_time(),
                            EventKind::ProjectileMoved {
                                id: projectile.id,
                                position: projectile.position.to_cell(),
                            },
                        ));
                    }
                }
                ProjectileFlightPhase::Impact => {}
            }
        }

        for projectile in &projectiles {
            if projectile.phase == ProjectileFlightPhase::Impact {
                let target = projectile
                    .fixed_target()
                    .unwrap_or_else(|| projectile.position.to_cell());
                collector.collect(Event::new(
                    state.tick(),
                    state.simulation_time(),
                    EventKind::ProjectileImpact {
                        id: projectile.id,
                        position: target,
                    },
                ));
                state.stage_projectile_impact(target);
            }
        }

        projectiles.retain(|projectile| projectile.phase != ProjectileFlightPhase::Impact);
        state.projectiles_mut().extend(projectiles);
    }
}

fn resolve_target(
    state: &mut GameState,
    projectile: &mut match3_core::Projectile,
    collector: &mut dyn EventCollector,
) -> Option<Position> {
    match projectile.target_mode {
        TargetMode::FixedCell(cell) => {
            if state.tile(cell).map(|t| !t.is_empty()).unwrap_or(false) {
                return Some(cell);
            }
            let replacement = random_non_empty_cell(state)?;
            projectile.target_mode = TargetMode::FixedCell(replacement);
            collector.collect(Event::new(
                state.tick(),
                state.simulation_time(),
                EventKind::ProjectileRetargeted {
                    id: projectile.id,
                    target: replacement,
                },
            ));
            Some(replacement)
        }
        TargetMode::Dynamic => {
            let nearest = nearest_non_empty_cell(state, projectile.position)?;
            Some(nearest)
        }
        TargetMode::TrackTile(id) => {
            if let Some(position) = find_tile(state, id) {
                return Some(position);
            }
            let replacement = random_non_empty_cell(state)?;
            projectile.target_mode = TargetMode::FixedCell(replacement);
            collector.collect(Event::new(
                state.tick(),
                state.simulation_time(),
                EventKind::ProjectileRetargeted {
                    id: projectile.id,
                    target: replacement,
                },
            ));
            Some(replacement)
        }
    }
}

fn find_tile(state: &GameState, id: match3_core::TileId) -> Option<Position> {
    state
        .positions()
        .find(|&position| state.tile(position).map(|t| t.id == id).unwrap_or(false))
}

fn random_non_empty_cell(state: &mut GameState) -> Option<Position> {
    let candidates: Vec<Position> = state
        .positions()
        .filter(|&position| state.tile(position).map(|t| !t.is_empty()).unwrap_or(false))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let index = state.rng_mut().next_index(RngDomain::PowerUp, candidates.len() as u32);
    Some(candidates[index as usize])
}

fn nearest_non_empty_cell(state: &GameState, from: ContinuousPosition) -> Option<Position> {
    state
        .positions()
        .filter(|&position| state.tile(position).map(|t| !t.is_empty()).unwrap_or(false))
        .min_by(|&a, &b| {
            let da = distance_sq(from, a);
            let db = distance_sq(from, b);
            da.partial_cmp(&db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then((a.y, a.x).cmp(&(b.y, b.x)))
        })
}

fn distance_sq(from: ContinuousPosition, cell: Position) -> f64 {
    let dx = from.x - f64::from(cell.x);
    let dy = from.y - f64::from(cell.y);
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use match3_core::{
        BombKind, LevelConfig, NullCollector, ObjectiveSpec, SessionConfig, SimulationConfig,
        Tile, TileColor, TileId,
    };

    fn state_with_target(width: u32, height: u32) -> GameState {
        let mut state = GameState::new(SessionConfig {
            width,
            height,
            tile_type_count: 4,
            seed: 1,
            move_limit: 10,
            objective: ObjectiveSpec::score_target(100),
            target_difficulty: 0.5,
            level: LevelConfig::empty(width, height),
            simulation: SimulationConfig::default_constants(),
        })
        .expect("valid config");
        let target = Position::new(width - 1, height - 1);
        let tile = Tile::new(
            TileId::new(1),
            TileColor::Red,
            BombKind::None,
            ContinuousPosition::from_cell(target),
        );
        assert!(state.set_tile(target, tile));
        state
    }

    #[test]
    fn a_projectile_rises_through_takeoff_before_cruising() {
        let mut state = state_with_target(3, 3);
        let target = Position::new(2, 2);
        let _ = state.begin_projectile(Position::new(0, 0), TargetMode::FixedCell(target));
        let mut system = UfoFlight::new();
        let mut collector = NullCollector;
        system.step(&mut state, 0.05, &mut collector);
        assert_eq!(state.projectiles_mut().len(), 1);
        assert_eq!(state.projectiles_mut()[0].phase, ProjectileFlightPhase::Takeoff);
        assert!(state.projectiles_mut()[0].height > 0.0);
    }

    #[test]
    fn a_projectile_reaches_impact_and_stages_its_target() {
        let mut state = state_with_target(3, 3);
        let target = Position::new(2, 2);
        let _ = state.begin_projectile(Position::new(0, 0), TargetMode::FixedCell(target));
        let mut system = UfoFlight::new();
        let mut collector = NullCollector;
        for _ in 0..200 {
            system.step(&mut state, 0.05, &mut collector);
        }
        assert!(state.projectiles_mut().is_empty());
        assert_eq!(state.take_projectile_impacts(), vec![target]);
    }

    #[test]
    fn a_fixed_target_that_empties_before_impact_is_retargeted() {
        let mut state = state_with_target(3, 3);
        let emptied = Position::new(2, 2);
        let _ = state.set_tile(emptied, Tile::empty(ContinuousPosition::from_cell(emptied)));
        let still_here = Position::new(1, 1);
        let tile = Tile::new(
            TileId::new(2),
            TileColor::Blue,
            BombKind::None,
            ContinuousPosition::from_cell(still_here),
        );
        assert!(state.set_tile(still_here, tile));
        let _ = state.begin_projectile(Position::new(0, 0), TargetMode::FixedCell(emptied));
        let mut system = UfoFlight::new();
        let mut collector = NullCollector;
        for _ in 0..200 {
            system.step(&mut state, 0.05, &mut collector);
        }
        assert_eq!(state.take_projectile_impacts(), vec![still_here]);
    }
}
