//! Cluster detection - finding and popping matching bubbles, then dropping
//! whatever is left hanging.
//!
//! Matches use a depth-first flood fill over same-colored neighbors. Floating
//! bubbles are found with a breadth-first fill from every occupied ceiling
//! cell: anything the fill does not reach has lost its anchor.

use std::collections::{HashSet, VecDeque};

use super::{grid::BubbleGrid, hex::HexCoord};

/// Minimum cluster size to pop (match-3).
pub const MIN_CLUSTER_SIZE: usize = 3;

/// Find all bubbles connected to `start` through same-colored neighbors.
///
/// The start cell is included. An empty start yields an empty cluster.
pub fn find_cluster(grid: &BubbleGrid, start: HexCoord) -> Vec<HexCoord> {
    let Some(target_color) = grid.get(start) else {
        return Vec::new();
    };

    let mut cluster = Vec::new();
    let mut visited = HashSet::from([start]);
    let mut stack = vec![start];

    while let Some(coord) = stack.pop() {
        cluster.push(coord);

        for neighbor in grid.neighbors(coord) {
            if grid.get(neighbor) == Some(target_color) && visited.insert(neighbor) {
                stack.push(neighbor);
            }
        }
    }

    cluster
}

/// Remove the cluster at `start` if it is big enough to pop.
///
/// Returns the removed coordinates, or `None` when nothing popped.
pub fn pop_cluster(grid: &mut BubbleGrid, start: HexCoord) -> Option<Vec<HexCoord>> {
    let cluster = find_cluster(grid, start);
    if cluster.len() < MIN_CLUSTER_SIZE {
        return None;
    }

    for &coord in &cluster {
        grid.remove(coord);
    }
    Some(cluster)
}

/// Find all bubbles connected to the ceiling row using BFS.
pub fn find_anchored_bubbles(grid: &BubbleGrid) -> HashSet<HexCoord> {
    let mut anchored = HashSet::new();
    let mut queue = VecDeque::new();

    for coord in grid.top_row_coords() {
        anchored.insert(coord);
        queue.push_back(coord);
    }

    while let Some(coord) = queue.pop_front() {
        for neighbor in grid.neighbors(coord) {
            if grid.is_occupied(neighbor) && anchored.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    anchored
}

/// Remove every bubble with no path to the ceiling.
///
/// Returns the removed coordinates (empty when everything is anchored).
pub fn remove_floating(grid: &mut BubbleGrid) -> Vec<HexCoord> {
    let anchored = find_anchored_bubbles(grid);
    let floating: Vec<HexCoord> = grid.coords().filter(|c| !anchored.contains(c)).collect();

    for &coord in &floating {
        grid.remove(coord);
    }
    floating
}
