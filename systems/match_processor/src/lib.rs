#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scores, clears, and converts staged match groups into bombs.

use match3_core::{
    BombKind, ContinuousPosition, DestroyReason, Event, EventCollector, EventKind,
    MatchProcessor as MatchProcessorTrait, ObjectiveKind, Tile, TileColor,
};
use match3_world::GameState;

/// Base score awarded per tile cleared, whether by a match group or by an
/// out-of-band clear such as a projectile impact.
pub const POINTS_PER_TILE: u32 = 10;
const OVERSIZE_BONUS_PER_TILE: u32 = 5;

/// Scores and clears every match group a [`match3_match_finder::GroupMatchFinder`]
/// staged, spawning a bomb tile at each group's origin when its shape earns one.
#[derive(Clone, Debug, Default)]
pub struct GroupMatchProcessor {
    ground_cleared: u32,
    colors_collected: u32,
    tracked_color: Option<TileColor>,
}

impl GroupMatchProcessor {
    /// Creates a processor with no color-collection objective tracking.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a processor that tracks clears of `color` toward a
    /// color-collection objective.
    #[must_use]
    pub fn with_tracked_color(color: TileColor) -> Self {
        Self {
            tracked_color: Some(color),
            ..Self::default()
        }
    }

    fn score_for(size: u32) -> u32 {
        let base = size * POINTS_PER_TILE;
        let bonus = size.saturating_sub(3) * OVERSIZE_BONUS_PER_TILE;
        base + bonus
    }

    /// Records a ground layer break that happened outside a processed match
    /// group (for example a projectile impact), keeping `ClearGround`
    /// objective tracking accurate regardless of which phase did the clearing.
    pub fn note_ground_hit(&mut self) {
        self.ground_cleared += 1;
    }

    /// Records a tile of `color` cleared outside a processed match group,
    /// keeping `CollectColor` objective tracking accurate regardless of which
    /// phase did the clearing.
    pub fn note_tile_cleared(&mut self, color: TileColor) {
        if self.tracked_color.map(|c| c == color).unwrap_or(true) {
            self.colors_collected += 1;
        }
    }

    /// Current tallies, in `(ground_cleared, colors_collected)` order, for
    /// syncing a non-score objective after an out-of-band clear.
    #[must_use]
    pub const fn tallies(&self) -> (u32, u32) {
        (self.ground_cleared, self.colors_collected)
    }
}

impl MatchProcessorTrait<GameState> for GroupMatchProcessor {
    fn process_matches(&mut self, state: &mut GameState, collector: &mut dyn EventCollector) {
        let groups = state.take_staged_matches();
        for group in groups {
            let bomb = group.bomb;
            let score = Self::score_for(group.size() as u32);

            for &position in &group.positions {
                if position == group.origin && bomb.is_bomb() {
                    continue;
                }
                let Some(tile) = state.tile(position) else {
                    continue;
                };
                let id = tile.id;
                let _ = state.set_tile(position, Tile::empty(ContinuousPosition::from_cell(position)));
                collector.collect(Event::new(
                    state.tick(),
                    state.simulation_time(),
                    EventKind::TileDestroyed {
                        id,
                        position,
                        reason: DestroyReason::Match,
                    },
                ));

                if let Some(ground) = state.ground_mut(position) {
                    let kind_before = ground.kind;
                    if ground.is_present() && ground.apply_hit() {
                        self.ground_cleared += 1;
                        collector.collect(Event::new(
                            state.tick(),
                            state.simulation_time(),
                            EventKind::GroundDestroyed {
                                position,
                                kind: kind_before,
                            },
                        ));
                    }
                }

                if self.tracked_color.map(|c| c == group.color).unwrap_or(true) {
                    self.colors_collected += 1;
                }
            }

            if bomb.is_bomb() {
                let id = state.next_tile_id();
                let bomb_color = if bomb == BombKind::ColorBomb {
                    TileColor::BombCarrier
                } else {
                    group.color
                };
                let _ = state.set_tile(
                    group.origin,
                    Tile::new(id, bomb_color, bomb, ContinuousPosition::from_cell(group.origin)),
                );
                collector.collect(Event::new(
                    state.tick(),
                    state.simulation_time(),
                    EventKind::BombCreated {
                        id,
                        kind: bomb,
                        position: group.origin,
                    },
                ));
            }

            let total = state.add_score(score);
            collector.collect(Event::new(
                state.tick(),
                state.simulation_time(),
                EventKind::ScoreAdded {
                    amount: score,
                    total,
                },
            ));

            match state.objective().kind {
                ObjectiveKind::ScoreTarget => {}
                ObjectiveKind::ClearGround => state.set_objective_progress(self.ground_cleared),
                ObjectiveKind::CollectColor => state.set_objective_progress(self.colors_collected),
            }

            if state.objective_complete() {
                collector.collect(Event::new(
                    state.tick(),
                    state.simulation_time(),
                    EventKind::ObjectiveCompleted,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match3_core::{
        LevelConfig, MatchGroup, NullCollector, ObjectiveSpec, Position, SessionConfig,
        SimulationConfig, TileId,
    };

    fn state_with_line(length: u32) -> GameState {
        let mut state = GameState::new(SessionConfig {
            width: length.max(4),
            height: 4,
            tile_type_count: 4,
            seed: 1,
            move_limit: 10,
            objective: ObjectiveSpec::score_target(1_000_000),
            target_difficulty: 0.5,
            level: LevelConfig::empty(length.max(4), 4),
            simulation: SimulationConfig::default_constants(),
        })
        .expect("valid config");

        let positions: Vec<Position> = (0..length).map(|x| Position::new(x, 0)).collect();
        for (i, &position) in positions.iter().enumerate() {
            let tile = Tile::new(
                TileId::new(i as u64 + 1),
                TileColor::Red,
                BombKind::None,
                ContinuousPosition::from_cell(position),
            );
            assert!(state.set_tile(position, tile));
        }
        let bomb = match length {
            4 => BombKind::Horizontal,
            5.. => BombKind::ColorBomb,
            _ => BombKind::None,
        };
        state.stage_match(MatchGroup {
            color: TileColor::Red,
            positions: positions.clone(),
            origin: positions[0],
            bomb,
        });
        state
    }

    #[test]
    fn three_match_clears_with_no_bomb_and_scores_points() {
        let mut state = state_with_line(3);
        let mut processor = GroupMatchProcessor::new();
        let mut collector = NullCollector;
        processor.process_matches(&mut state, &mut collector);
        assert_eq!(state.score(), 30);
        for x in 0..3 {
            assert!(state.tile(Position::new(x, 0)).unwrap().is_empty());
        }
    }

    #[test]
    fn four_match_spawns_a_bomb_at_its_origin() {
        let mut state = state_with_line(4);
        let mut processor = GroupMatchProcessor::new();
        let mut collector = NullCollector;
        processor.process_matches(&mut state, &mut collector);
        let origin_tile = state.tile(Position::new(0, 0)).unwrap();
        assert_eq!(origin_tile.bomb, BombKind::Horizontal);
        assert!(state.tile(Position::new(1, 0)).unwrap().is_empty());
    }

    #[test]
    fn ground_under_a_cleared_tile_takes_one_hit() {
        let mut state = state_with_line(3);
        *state.ground_mut(Position::new(0, 0)).unwrap() = match3_core::Ground::dirt();
        let mut processor = GroupMatchProcessor::new();
        let mut collector = NullCollector;
        processor.process_matches(&mut state, &mut collector);
        assert!(!state.ground(Position::new(0, 0)).unwrap().is_present());
    }
}
