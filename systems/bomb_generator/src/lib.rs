#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Carves a connected same-color region into one or more bomb-earning shapes.
//!
//! A match finder hands this crate every cell of a 4-connected same-color
//! component of three or more tiles. Most components are a single plain run
//! or junction, but a large or irregular blob (several runs merged by shared
//! cells) can contain more than one recognizable shape at once; this crate
//! enumerates every axis-aligned run and T/L junction the region contains,
//! picks a non-overlapping subset that covers as much of the region as
//! possible under priority order, folds any leftover cells into whichever
//! chosen shape they touch, and turns any cells that touch nothing into one
//! final plain group with no bomb.

use std::collections::HashSet;

use match3_core::{BombKind, Position};

/// One shape carved out of a region, with the bomb (if any) it earns and the
/// cell a bomb tile created from it should occupy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeGroup {
    /// Every cell belonging to this shape, including any scrap cells folded
    /// in after carving.
    pub cells: Vec<Position>,
    /// Bomb kind this shape earns.
    pub bomb: BombKind,
    /// Cell a bomb created from this shape should occupy.
    pub origin: Position,
}

#[derive(Clone, Debug)]
struct Candidate {
    cells: Vec<Position>,
    weight: u8,
    bomb: BombKind,
}

const WEIGHT_LINE5: u8 = 4;
const WEIGHT_JUNCTION: u8 = 3;
const WEIGHT_LINE4: u8 = 2;
const WEIGHT_LINE3: u8 = 1;

/// Carves `region` (every cell of one 4-connected same-color component) into
/// one or more [`ShapeGroup`]s, biasing shape selection toward whichever
/// candidates contain a cell in `foci` (the cells of the swap that triggered
/// this match, if any).
#[must_use]
pub fn carve(region: &[Position], foci: &[Position]) -> Vec<ShapeGroup> {
    let set: HashSet<Position> = region.iter().copied().collect();
    let mut candidates = enumerate_candidates(region, &set);
    candidates.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| intersects(b, foci).cmp(&intersects(a, foci)))
            .then_with(|| b.cells.len().cmp(&a.cells.len()))
    });

    let mut claimed: HashSet<Position> = HashSet::new();
    let mut groups: Vec<(Vec<Position>, u8, BombKind)> = Vec::new();
    for candidate in candidates {
        if candidate.cells.iter().any(|c| claimed.contains(c)) {
            continue;
        }
        claimed.extend(candidate.cells.iter().copied());
        groups.push((candidate.cells, candidate.weight, candidate.bomb));
    }

    absorb_scrap(&mut groups, &mut claimed, &set);

    let mut remaining: Vec<Position> = region
        .iter()
        .copied()
        .filter(|c| !claimed.contains(c))
        .collect();
    remaining.sort_by_key(|c| (c.y, c.x));
    if !remaining.is_empty() {
        groups.push((remaining, 0, BombKind::None));
    }

    groups
        .into_iter()
        .map(|(cells, _weight, bomb)| {
            let origin = choose_origin(&cells, foci);
            ShapeGroup { cells, bomb, origin }
        })
        .collect()
}

fn intersects(candidate: &Candidate, foci: &[Position]) -> bool {
    candidate.cells.iter().any(|c| foci.contains(c))
}

/// Attaches every region cell not yet claimed by a chosen shape to whichever
/// neighboring shape has the highest weight, repeating to a fixpoint since
/// one absorption can newly border another unclaimed cell.
fn absorb_scrap(
    groups: &mut [(Vec<Position>, u8, BombKind)],
    claimed: &mut HashSet<Position>,
    region: &HashSet<Position>,
) {
    loop {
        let mut attached_any = false;
        let mut unclaimed: Vec<Position> = region
            .iter()
            .copied()
            .filter(|c| !claimed.contains(c))
            .collect();
        unclaimed.sort_by_key(|c| (c.y, c.x));

        for cell in unclaimed {
            let mut best: Option<usize> = None;
            let mut best_weight = 0u8;
            for (index, (cells, weight, _bomb)) in groups.iter().enumerate() {
                let touches = cells.iter().any(|&g| is_orthogonal_neighbor(g, cell));
                if touches && *weight >= best_weight {
                    best = Some(index);
                    best_weight = *weight;
                }
            }
            if let Some(index) = best {
                groups[index].0.push(cell);
                let _ = claimed.insert(cell);
                attached_any = true;
            }
        }

        if !attached_any {
            break;
        }
    }
}

fn is_orthogonal_neighbor(a: Position, b: Position) -> bool {
    let dx = i64::from(a.x) - i64::from(b.x);
    let dy = i64::from(a.y) - i64::from(b.y);
    matches!((dx, dy), (1, 0) | (-1, 0) | (0, 1) | (0, -1))
}

fn enumerate_candidates(region: &[Position], set: &HashSet<Position>) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for run in horizontal_runs(region) {
        if let Some(candidate) = line_candidate(&run, true) {
            candidates.push(candidate);
        }
    }
    for run in vertical_runs(region) {
        if let Some(candidate) = line_candidate(&run, false) {
            candidates.push(candidate);
        }
    }

    let mut sorted_region = region.to_vec();
    sorted_region.sort_by_key(|c| (c.y, c.x));
    for &cell in &sorted_region {
        let h_run = horizontal_run_through(set, cell);
        let v_run = vertical_run_through(set, cell);
        if h_run.len() < 3 || v_run.len() < 3 {
            continue;
        }
        let h_window = window_through(&h_run, cell, 3);
        let v_window = window_through(&v_run, cell, 3);
        let mut cells = h_window;
        for c in v_window {
            if !cells.contains(&c) {
                cells.push(c);
            }
        }
        candidates.push(Candidate {
            cells,
            weight: WEIGHT_JUNCTION,
            bomb: BombKind::Square,
        });
    }

    candidates
}

fn line_candidate(run: &[Position], horizontal: bool) -> Option<Candidate> {
    let weight = match run.len() {
        0..=2 => return None,
        3 => WEIGHT_LINE3,
        4 => WEIGHT_LINE4,
        _ => WEIGHT_LINE5,
    };
    let bomb = match weight {
        WEIGHT_LINE3 => BombKind::None,
        WEIGHT_LINE4 if horizontal => BombKind::Horizontal,
        WEIGHT_LINE4 => BombKind::Vertical,
        _ => BombKind::ColorBomb,
    };
    Some(Candidate {
        cells: run.to_vec(),
        weight,
        bomb,
    })
}

fn horizontal_runs(region: &[Position]) -> Vec<Vec<Position>> {
    let mut rows: Vec<u32> = region.iter().map(|c| c.y).collect();
    rows.sort_unstable();
    rows.dedup();
    let mut runs = Vec::new();
    for y in rows {
        let mut xs: Vec<u32> = region.iter().filter(|c| c.y == y).map(|c| c.x).collect();
        xs.sort_unstable();
        for run in split_consecutive(&xs) {
            runs.push(run.into_iter().map(|x| Position::new(x, y)).collect());
        }
    }
    runs
}

fn vertical_runs(region: &[Position]) -> Vec<Vec<Position>> {
    let mut columns: Vec<u32> = region.iter().map(|c| c.x).collect();
    columns.sort_unstable();
    columns.dedup();
    let mut runs = Vec::new();
    for x in columns {
        let mut ys: Vec<u32> = region.iter().filter(|c| c.x == x).map(|c| c.y).collect();
        ys.sort_unstable();
        for run in split_consecutive(&ys) {
            runs.push(run.into_iter().map(|y| Position::new(x, y)).collect());
        }
    }
    runs
}

fn split_consecutive(sorted: &[u32]) -> Vec<Vec<u32>> {
    let mut runs = Vec::new();
    let mut current: Vec<u32> = Vec::new();
    for &value in sorted {
        if let Some(&last) = current.last() {
            if value != last + 1 {
                runs.push(std::mem::take(&mut current));
            }
        }
        current.push(value);
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn horizontal_run_through(set: &HashSet<Position>, cell: Position) -> Vec<Position> {
    let mut min_x = cell.x;
    while min_x > 0 && set.contains(&Position::new(min_x - 1, cell.y)) {
        min_x -= 1;
    }
    let mut max_x = cell.x;
    while set.contains(&Position::new(max_x + 1, cell.y)) {
        max_x += 1;
    }
    (min_x..=max_x).map(|x| Position::new(x, cell.y)).collect()
}

fn vertical_run_through(set: &HashSet<Position>, cell: Position) -> Vec<Position> {
    let mut min_y = cell.y;
    while min_y > 0 && set.contains(&Position::new(cell.x, min_y - 1)) {
        min_y -= 1;
    }
    let mut max_y = cell.y;
    while set.contains(&Position::new(cell.x, max_y + 1)) {
        max_y += 1;
    }
    (min_y..=max_y).map(|y| Position::new(cell.x, y)).collect()
}

/// Picks a contiguous window of `len` cells from `run` containing `through`,
/// centering it on `through` where the run is long enough to allow it.
fn window_through(run: &[Position], through: Position, len: usize) -> Vec<Position> {
    let index_of = run
        .iter()
        .position(|&c| c == through)
        .expect("through must be a member of run");
    if run.len() <= len {
        return run.to_vec();
    }
    let ideal = index_of as isize - (len / 2) as isize;
    let max_start = (run.len() - len) as isize;
    let start = ideal.clamp(0, max_start) as usize;
    run[start..start + len].to_vec()
}

/// Chooses where a bomb created from `cells` should be placed: a focus cell
/// inside the group if one exists, else the member closest to the geometric
/// centroid, breaking ties by `(y, x)`.
fn choose_origin(cells: &[Position], foci: &[Position]) -> Position {
    if let Some(focus) = cells
        .iter()
        .copied()
        .filter(|c| foci.contains(c))
        .min_by_key(|c| (c.y, c.x))
    {
        return focus;
    }

    let sum_x: u64 = cells.iter().map(|p| u64::from(p.x)).sum();
    let sum_y: u64 = cells.iter().map(|p| u64::from(p.y)).sum();
    let count = cells.len() as u64;
    let centroid_x = sum_x / count.max(1);
    let centroid_y = sum_y / count.max(1);

    cells
        .iter()
        .copied()
        .min_by_key(|cell| {
            let dx = i64::from(cell.x) - centroid_x as i64;
            let dy = i64::from(cell.y) - centroid_y as i64;
            (dx * dx + dy * dy, cell.y, cell.x)
        })
        .unwrap_or(cells[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(xs: impl IntoIterator<Item = u32>, y: u32) -> Vec<Position> {
        xs.into_iter().map(|x| Position::new(x, y)).collect()
    }

    #[test]
    fn a_plain_three_run_earns_no_bomb() {
        let region = line(0..3, 0);
        let groups = carve(&region, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bomb, BombKind::None);
        assert_eq!(groups[0].cells.len(), 3);
    }

    #[test]
    fn a_four_run_earns_a_line_bomb_oriented_to_match() {
        let region = line(0..4, 0);
        let groups = carve(&region, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bomb, BombKind::Horizontal);
    }

    #[test]
    fn a_five_run_earns_a_color_bomb() {
        let region = line(0..5, 2);
        let groups = carve(&region, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bomb, BombKind::ColorBomb);
    }

    #[test]
    fn a_t_junction_earns_a_square_bomb_at_the_junction_cell() {
        let mut region = line(1..4, 1);
        region.push(Position::new(2, 0));
        region.push(Position::new(2, 2));
        let groups = carve(&region, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bomb, BombKind::Square);
        assert_eq!(groups[0].origin, Position::new(2, 1));
        assert_eq!(groups[0].cells.len(), 5);
    }

    #[test]
    fn a_blob_of_three_with_no_straight_run_earns_no_bomb() {
        let region = vec![Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)];
        let groups = carve(&region, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bomb, BombKind::None);
        assert_eq!(groups[0].cells.len(), 3);
    }

    #[test]
    fn an_irregular_six_cell_region_carves_without_dropping_any_cell() {
        let mut region = line(0..3, 1);
        region.push(Position::new(1, 0));
        region.push(Position::new(1, 2));
        region.push(Position::new(2, 2));
        let groups = carve(&region, &[]);
        let total: usize = groups.iter().map(|g| g.cells.len()).sum();
        assert_eq!(total, region.len());
        assert!(groups.iter().any(|g| g.bomb == BombKind::Square));
    }

    #[test]
    fn a_focus_cell_inside_the_group_is_preferred_as_origin() {
        let region = line(0..5, 0);
        let focus = Position::new(3, 0);
        let groups = carve(&region, &[focus]);
        assert_eq!(groups[0].origin, focus);
    }

    #[test]
    fn a_six_long_run_is_carved_as_one_color_bomb_with_no_leftover() {
        let region = line(0..6, 0);
        let groups = carve(&region, &[]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bomb, BombKind::ColorBomb);
        assert_eq!(groups[0].cells.len(), 6);
    }
}
