//! Pen-up travel optimizer.
//!
//! Builds each color group's drawing order with a cheapest-insertion
//! heuristic: every new path is inserted at the index (and in the
//! orientation) that adds the least pen-up travel to the current sequence.
//! One insertion is O(n), a whole layer O(n²).

use std::collections::HashMap;

use plotpass_core::{distance, Layer, Path, Point};
use serde::Serialize;

/// Direction a path is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// As generated
    Forward,
    /// End to start
    Reversed,
}

/// Where a registered path ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Index in the working sequence after insertion
    pub index: usize,
    pub orientation: Orientation,
    /// Added pen-up travel in mm (may be negative)
    pub cost: f64,
}

/// Working sequence for one color group.
#[derive(Debug, Clone, Default)]
pub struct TravelOptimizer {
    sequence: Vec<Path>,
}

impl TravelOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the cheapest (index, orientation) for `path` without inserting it.
    ///
    /// Indices are scanned left to right with strict `<`, forward before
    /// reversed at each index, so ties resolve to the lowest index.
    pub fn best_placement(&self, path: &Path) -> Placement {
        let (start, end) = (path.start(), path.end());
        let mut best = Placement {
            index: 0,
            orientation: Orientation::Forward,
            cost: f64::INFINITY,
        };

        for index in 0..=self.sequence.len() {
            let forward = self.insertion_cost(index, start, end);
            if forward < best.cost {
                best = Placement {
                    index,
                    orientation: Orientation::Forward,
                    cost: forward,
                };
            }
            let reversed = self.insertion_cost(index, end, start);
            if reversed < best.cost {
                best = Placement {
                    index,
                    orientation: Orientation::Reversed,
                    cost: reversed,
                };
            }
        }

        best
    }

    /// Inserts `path` at its cheapest position, reversing it when that wins.
    pub fn insert(&mut self, mut path: Path) -> Placement {
        let placement = self.best_placement(&path);
        if placement.orientation == Orientation::Reversed {
            path.reverse();
        }
        self.sequence.insert(placement.index, path);
        placement
    }

    fn insertion_cost(&self, index: usize, start: Point, end: Point) -> f64 {
        let prev_end = index
            .checked_sub(1)
            .and_then(|i| self.sequence.get(i))
            .map(Path::end);
        let next_start = self.sequence.get(index).map(Path::start);

        let added = prev_end.map_or(0.0, |p| distance(p, start))
            + next_start.map_or(0.0, |n| distance(end, n));
        let removed = match (prev_end, next_start) {
            (Some(p), Some(n)) => distance(p, n),
            _ => 0.0,
        };
        added - removed
    }

    pub fn paths(&self) -> &[Path] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Current pen-up travel of the working sequence in mm.
    pub fn pen_up_travel(&self) -> f64 {
        pen_up_travel(&self.sequence)
    }

    pub fn into_paths(self) -> Vec<Path> {
        self.sequence
    }
}

/// Per-render optimizer context, one working sequence per color.
///
/// Owned by the caller; never shared between renders.
#[derive(Debug, Clone, Default)]
pub struct OptimizerState {
    groups: Vec<(String, TravelOptimizer)>,
    index: HashMap<String, usize>,
}

impl OptimizerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the next generated path of `color`.
    pub fn register_path(&mut self, color: &str, path: Path) -> Placement {
        let slot = match self.index.get(color) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.groups.push((color.to_string(), TravelOptimizer::new()));
                self.index.insert(color.to_string(), slot);
                slot
            }
        };
        self.groups[slot].1.insert(path)
    }

    pub fn group(&self, color: &str) -> Option<&TravelOptimizer> {
        self.index.get(color).map(|&slot| &self.groups[slot].1)
    }

    /// Colors in first-registration order.
    pub fn colors(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(color, _)| color.as_str())
    }

    /// Removes and returns the ordered paths of `color`.
    pub fn take(&mut self, color: &str) -> Vec<Path> {
        match self.index.get(color) {
            Some(&slot) => std::mem::take(&mut self.groups[slot].1).into_paths(),
            None => Vec::new(),
        }
    }
}

/// Orders `paths` of one color group by registering them in generation order.
pub fn optimize_layer(color: &str, paths: Vec<Path>) -> Vec<Path> {
    let mut state = OptimizerState::new();
    for path in paths {
        state.register_path(color, path);
    }
    state.take(color)
}

/// Optimizer group key for the layer at input position `arrival`.
///
/// Layers that share a stroke and base order still get separate groups.
pub fn layer_key(layer: &Layer, arrival: usize) -> String {
    format!("{}#{}#{}", layer.stroke, layer.base_order, arrival)
}

/// Returns `layer` with its paths reordered for minimal pen-up travel.
///
/// `arrival` is the layer's position in the render input.
pub fn optimize_layer_paths(state: &mut OptimizerState, arrival: usize, layer: &Layer) -> Layer {
    let key = layer_key(layer, arrival);
    for path in &layer.paths {
        state.register_path(&key, path.clone());
    }
    let ordered = state.take(&key);
    tracing::trace!(
        layer = %layer.base_label,
        paths = ordered.len(),
        "Optimized layer order"
    );
    Layer {
        paths: ordered,
        ..layer.clone()
    }
}

/// Sum of the gaps between consecutive paths in mm.
pub fn pen_up_travel(paths: &[Path]) -> f64 {
    paths
        .windows(2)
        .map(|w| distance(w[0].end(), w[1].start()))
        .sum()
}
