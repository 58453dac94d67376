//! End-to-end scenarios driving a [`Session`] the way a player or replay
//! would: preset a board, apply a move or bomb tap, and tick forward.

use std::collections::HashSet;

use match3_core::{
    BombKind, ContinuousPosition, DestroyReason, EventKind, LevelConfig, ObjectiveSpec, Position,
    SessionConfig, SimulationConfig, Tile, TileColor, TileId,
};
use match3_session::Session;

const SEED: u64 = 12345;
const DT: f64 = 1.0 / 60.0;

fn config(width: u32, height: u32) -> SessionConfig {
    SessionConfig {
        width,
        height,
        tile_type_count: 6,
        seed: SEED,
        move_limit: 50,
        objective: ObjectiveSpec::score_target(1_000_000),
        target_difficulty: 0.5,
        level: LevelConfig::empty(width, height),
        simulation: SimulationConfig::default_constants(),
    }
}

fn place(session: &mut Session, x: u32, y: u32, color: TileColor, bomb: BombKind, id: u64) {
    let position = Position::new(x, y);
    let tile = Tile::new(TileId::new(id), color, bomb, ContinuousPosition::from_cell(position));
    assert!(session.state_mut().set_tile(position, tile));
}

fn run_ticks(session: &mut Session, count: u32) {
    for _ in 0..count {
        let _ = session.tick(DT);
    }
}

/// Scenario 1: a horizontal 3-match on a preset 4x4 board clears the row and
/// refills it, leaving every other row untouched (gravity in this engine
/// pulls tiles toward increasing `y`, so clearing the top row never shifts
/// the rows below it; they only move once something beneath them empties
/// out).
#[test]
fn a_preset_horizontal_three_match_clears_and_refills_its_row() {
    let mut session = Session::new(config(4, 4)).expect("valid config");

    let rows = [
        [TileColor::Red, TileColor::Red, TileColor::Red, TileColor::Blue],
        [TileColor::Green, TileColor::Blue, TileColor::Blue, TileColor::Red],
        [TileColor::Yellow, TileColor::Purple, TileColor::Green, TileColor::Yellow],
        [TileColor::Orange, TileColor::Green, TileColor::Red, TileColor::Blue],
    ];
    let mut id = 1u64;
    for (y, row) in rows.iter().enumerate() {
        for (x, &color) in row.iter().enumerate() {
            place(&mut session, x as u32, y as u32, color, BombKind::None, id);
            id += 1;
        }
    }

    let result = session.run_until_stable();
    assert!(result.reached_stability);
    assert!(result.score_gained >= 30);

    for x in 0..3u32 {
        assert!(!session.state().tile(Position::new(x, 0)).unwrap().is_empty());
    }

    for (y, row) in rows.iter().enumerate().skip(1) {
        for (x, &color) in row.iter().enumerate() {
            let tile = session.state().tile(Position::new(x as u32, y as u32)).unwrap();
            assert_eq!(tile.color, color, "row {y} should be untouched by the row-0 match");
        }
    }
}

/// Scenario 2: swapping a tile into a 4-run earns a Horizontal bomb at the
/// focus cell that landed inside the run, with the match's other three
/// cells destroyed and scored at the standard oversize bonus.
#[test]
fn a_swap_completing_a_four_run_spawns_a_horizontal_bomb_at_the_landing_focus() {
    let mut session = Session::new(config(4, 3)).expect("valid config");

    place(&mut session, 0, 0, TileColor::Red, BombKind::None, 1);
    place(&mut session, 1, 0, TileColor::Red, BombKind::None, 2);
    place(&mut session, 2, 0, TileColor::Blue, BombKind::None, 3);
    place(&mut session, 3, 0, TileColor::Red, BombKind::None, 4);
    place(&mut session, 0, 1, TileColor::Green, BombKind::None, 5);
    place(&mut session, 1, 1, TileColor::Yellow, BombKind::None, 6);
    place(&mut session, 2, 1, TileColor::Red, BombKind::None, 7);
    place(&mut session, 3, 1, TileColor::Purple, BombKind::None, 8);

    assert!(session.apply_move(Position::new(2, 0), Position::new(2, 1)));

    let mut bomb_landed = false;
    for _ in 0..40 {
        let _ = session.tick(DT);
        if session
            .state()
            .tile(Position::new(2, 0))
            .map(|t| t.bomb == BombKind::Horizontal)
            .unwrap_or(false)
        {
            bomb_landed = true;
            break;
        }
    }

    assert!(bomb_landed, "the landing focus should carry the new Horizontal bomb");
    let landed = session.state().tile(Position::new(2, 0)).unwrap();
    assert_eq!(landed.color, TileColor::Red);
    assert_eq!(session.state().score(), 45);
    assert!(session.state().tile(Position::new(0, 0)).unwrap().is_empty());
    assert!(session.state().tile(Position::new(1, 0)).unwrap().is_empty());
    assert!(session.state().tile(Position::new(3, 0)).unwrap().is_empty());
}

/// Scenario 3: an `R` row with an `R` above and below its middle column
/// carves into one Square bomb at the intersection, with every other cell
/// of the five-cell shape destroyed.
#[test]
fn a_t_shape_spawns_a_square_bomb_at_the_intersection() {
    let mut session = Session::new(config(5, 5)).expect("valid config");

    place(&mut session, 1, 1, TileColor::Yellow, BombKind::None, 1);
    place(&mut session, 2, 1, TileColor::Yellow, BombKind::None, 2);
    place(&mut session, 3, 1, TileColor::Yellow, BombKind::None, 3);
    place(&mut session, 2, 0, TileColor::Yellow, BombKind::None, 4);
    place(&mut session, 2, 2, TileColor::Yellow, BombKind::None, 5);

    run_ticks(&mut session, 1);

    let intersection = session.state().tile(Position::new(2, 1)).unwrap();
    assert_eq!(intersection.bomb, BombKind::Square);
    assert_eq!(intersection.color, TileColor::Yellow);

    for position in [
        Position::new(1, 1),
        Position::new(3, 1),
        Position::new(2, 0),
        Position::new(2, 2),
    ] {
        assert!(session.state().tile(position).unwrap().is_empty());
    }
    // Five cells: 10 per tile plus the oversize bonus for the two beyond three.
    assert_eq!(session.state().score(), 60);
}

/// Scenario 4: a swap with no match and no bomb involved reverts exactly
/// once its animation timer elapses, restoring both the grid and the
/// original tile identities.
#[test]
fn an_unmatched_swap_reverts_after_its_animation_completes() {
    let mut session = Session::new(config(4, 4)).expect("valid config");

    place(&mut session, 0, 0, TileColor::Red, BombKind::None, 1);
    place(&mut session, 1, 0, TileColor::Blue, BombKind::None, 2);
    place(&mut session, 0, 1, TileColor::Green, BombKind::None, 3);
    place(&mut session, 1, 1, TileColor::Yellow, BombKind::None, 4);

    assert!(session.apply_move(Position::new(0, 0), Position::new(1, 0)));
    let accepted = session
        .drain_events()
        .into_iter()
        .any(|e| matches!(e.kind, EventKind::SwapAccepted { a, b } if a == Position::new(0, 0) && b == Position::new(1, 0)));
    assert!(accepted);

    // Right after the swap, (0,0) holds the Blue tile and (1,0) the Red one.
    assert_eq!(session.state().tile(Position::new(0, 0)).unwrap().color, TileColor::Blue);
    assert_eq!(session.state().tile(Position::new(1, 0)).unwrap().color, TileColor::Red);

    let mut reverted = false;
    for _ in 0..30 {
        let _ = session.tick(DT);
        if session
            .drain_events()
            .into_iter()
            .any(|e| matches!(e.kind, EventKind::SwapReverted { .. }))
        {
            reverted = true;
            break;
        }
    }

    assert!(reverted, "an unmatched, non-bomb swap must eventually revert");
    assert_eq!(session.state().tile(Position::new(0, 0)).unwrap().id, TileId::new(1));
    assert_eq!(session.state().tile(Position::new(0, 0)).unwrap().color, TileColor::Red);
    assert_eq!(session.state().tile(Position::new(1, 0)).unwrap().id, TileId::new(2));
    assert_eq!(session.state().tile(Position::new(1, 0)).unwrap().color, TileColor::Blue);
}

/// Scenario 5: tapping a lone UFO bomb destroys it immediately, then its
/// launched projectile destroys exactly one other non-empty cell on impact.
#[test]
fn a_lone_ufo_activation_destroys_exactly_one_other_cell() {
    let mut session = Session::new(config(4, 4)).expect("valid config");

    let colors = [
        TileColor::Red,
        TileColor::Blue,
        TileColor::Green,
        TileColor::Yellow,
        TileColor::Purple,
        TileColor::Orange,
    ];
    let mut id = 1u64;
    for y in 0..4u32 {
        for x in 0..4u32 {
            let color = colors[((x + y * 4) as usize) % colors.len()];
            let bomb = if (x, y) == (3, 3) { BombKind::Ufo } else { BombKind::None };
            place(&mut session, x, y, color, bomb, id);
            id += 1;
        }
    }

    assert!(session.activate_bomb(Position::new(3, 3)));
    run_ticks(&mut session, 120);

    let events = session.drain_events();
    let bomb_destructions = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::TileDestroyed { reason: DestroyReason::Bomb, .. }))
        .count();
    let projectile_destructions: Vec<Position> = events
        .iter()
        .filter_map(|e| match e.kind {
            EventKind::TileDestroyed { position, reason: DestroyReason::Projectile, .. } => Some(position),
            _ => None,
        })
        .collect();

    assert_eq!(bomb_destructions, 1, "the UFO tile itself is destroyed once, tagged as a bomb kill");
    assert_eq!(projectile_destructions.len(), 1, "exactly one other cell is destroyed by the homing impact");
    assert_ne!(projectile_destructions[0], Position::new(3, 3));
}

/// Scenario 6: swapping a Color (Rainbow) bomb into a Red line bomb turns
/// every Red tile's row into a detonating line, clearing both full rows the
/// Red tiles occupy while leaving an unrelated row untouched.
#[test]
fn a_color_bomb_and_line_bomb_swap_clears_every_row_holding_the_common_color() {
    let mut session = Session::new(config(4, 3)).expect("valid config");

    let mut id = 1u64;
    place(&mut session, 0, 0, TileColor::Red, BombKind::ColorBomb, id);
    id += 1;
    place(&mut session, 1, 0, TileColor::Red, BombKind::Horizontal, id);
    id += 1;
    for x in 2..4u32 {
        place(&mut session, x, 0, TileColor::Red, BombKind::None, id);
        id += 1;
    }
    for x in 0..4u32 {
        place(&mut session, x, 1, TileColor::Red, BombKind::None, id);
        id += 1;
    }
    for x in 0..4u32 {
        place(&mut session, x, 2, TileColor::Blue, BombKind::None, id);
        id += 1;
    }

    assert!(session.apply_move(Position::new(0, 0), Position::new(1, 0)));

    let mut combo_seen = false;
    let mut destroyed: HashSet<Position> = HashSet::new();
    for _ in 0..90 {
        let _ = session.tick(DT);
        for event in session.drain_events() {
            match event.kind {
                EventKind::BombComboTriggered { first, second, .. } => {
                    assert_eq!(first, BombKind::ColorBomb);
                    assert_eq!(second, BombKind::Horizontal);
                    combo_seen = true;
                }
                EventKind::TileDestroyed { position, .. } => {
                    let _ = destroyed.insert(position);
                }
                _ => {}
            }
        }
    }

    assert!(combo_seen, "the bomb-to-bomb swap must resolve as a combo, not a plain match");
    for x in 0..4u32 {
        assert!(destroyed.contains(&Position::new(x, 0)), "row 0 (Red) should be cleared");
        assert!(destroyed.contains(&Position::new(x, 1)), "row 1 (Red) should be cleared");
        assert!(!destroyed.contains(&Position::new(x, 2)), "row 2 (Blue) has no Red tile and stays put");
    }
    for x in 0..4u32 {
        let tile = session.state().tile(Position::new(x, 2)).unwrap();
        assert_eq!(tile.color, TileColor::Blue);
    }
}
