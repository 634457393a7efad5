//! Budgeted pass building.
//!
//! Splits each layer's paths against the travel budget, buckets the
//! fragments greedily into passes, then labels and orders the passes
//! deterministically.

use plotpass_core::{pass_label, Layer, Path, Pass, TravelBudget, LENGTH_EPSILON_MM};
use serde::Serialize;

use crate::splitter::split_path_limited;

/// Result of [`build_passes`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassPlan {
    pub passes: Vec<Pass>,
    /// Budget in meters, `None` when no budget was active
    pub limit_meters: Option<f64>,
    /// Number of layers that produced more than one pass
    pub split_layers: usize,
    /// Number of emitted passes
    pub total_layers: usize,
}

/// Paths accumulated for one pass while scanning a layer.
#[derive(Debug, Default)]
struct Bucket {
    paths: Vec<Path>,
    total_length: f64,
}

impl Bucket {
    fn push(&mut self, path: Path, length: f64) {
        self.paths.push(path);
        self.total_length += length;
    }
}

/// Builds passes from layers, with the budget given in meters.
pub fn build_passes_meters(layers: &[Layer], budget_meters: Option<f64>) -> PassPlan {
    build_passes(layers, TravelBudget::from_meters(budget_meters))
}

/// Builds ordered, labeled passes from `layers`.
///
/// Without a budget every non-empty layer passes through unsplit as one
/// pass, but labels are still recomputed.
pub fn build_passes(layers: &[Layer], budget: Option<TravelBudget>) -> PassPlan {
    build_passes_capped(layers, budget, usize::MAX).0
}

/// Like [`build_passes`], but produces at most `max_fragments` fragments
/// across all layers.
///
/// Splitting stops as soon as the allowance is spent, so the work stays
/// bounded however small the budget. The flag is true when fragments
/// were left out. Labels count only the passes that were emitted.
pub fn build_passes_capped(
    layers: &[Layer],
    budget: Option<TravelBudget>,
    max_fragments: usize,
) -> (PassPlan, bool) {
    let mut remaining = max_fragments;
    let mut truncated = false;
    let mut order: Vec<usize> = (0..layers.len()).collect();
    order.sort_by_key(|&i| layers[i].base_order);

    // (base_order, arrival, pass_index, pass)
    let mut keyed: Vec<(usize, usize, usize, Pass)> = Vec::new();
    let mut split_layers = 0;

    for (arrival, &i) in order.iter().enumerate() {
        if truncated {
            break;
        }
        let layer = &layers[i];
        let (buckets, cut) = bucket_layer(layer, budget, &mut remaining);
        truncated = cut;
        if buckets.is_empty() {
            tracing::debug!(layer = %layer.base_label, "Dropping layer with no usable paths");
            continue;
        }

        let count = buckets.len();
        if count > 1 {
            split_layers += 1;
            tracing::debug!(
                layer = %layer.base_label,
                passes = count,
                "Layer split to respect travel budget"
            );
        }

        for (pass_index, bucket) in buckets.into_iter().enumerate() {
            keyed.push((
                layer.base_order,
                arrival,
                pass_index,
                Pass {
                    base_order: layer.base_order,
                    base_label: layer.base_label.clone(),
                    label: pass_label(&layer.base_label, pass_index + 1, count),
                    stroke: layer.stroke.clone(),
                    paths: bucket.paths,
                    travel_mm: bucket.total_length,
                },
            ));
        }
    }

    keyed.sort_by_key(|(base_order, arrival, pass_index, _)| (*base_order, *arrival, *pass_index));
    let passes: Vec<Pass> = keyed.into_iter().map(|(_, _, _, pass)| pass).collect();

    let plan = PassPlan {
        total_layers: passes.len(),
        passes,
        limit_meters: budget.map(|b| b.limit_meters()),
        split_layers,
    };
    (plan, truncated)
}

fn bucket_layer(
    layer: &Layer,
    budget: Option<TravelBudget>,
    remaining: &mut usize,
) -> (Vec<Bucket>, bool) {
    let Some(budget) = budget else {
        if layer.paths.is_empty() {
            return (Vec::new(), false);
        }
        let take = layer.paths.len().min(*remaining);
        *remaining -= take;
        let mut bucket = Bucket::default();
        for path in &layer.paths[..take] {
            bucket.push(path.clone(), path.length());
        }
        let buckets = if bucket.paths.is_empty() {
            Vec::new()
        } else {
            vec![bucket]
        };
        return (buckets, take < layer.paths.len());
    };

    let limit = budget.limit_mm();
    let mut buckets = Vec::new();
    let mut current = Bucket::default();
    let mut truncated = false;

    for path in &layer.paths {
        let (fragments, cut) = split_path_limited(path.points(), limit, *remaining);
        *remaining -= fragments.len();
        for points in fragments {
            let Ok(fragment) = Path::with_style(points, path.style().clone()) else {
                continue;
            };
            let length = fragment.length();
            if !current.paths.is_empty()
                && current.total_length + length > limit + LENGTH_EPSILON_MM
            {
                buckets.push(std::mem::take(&mut current));
            }
            current.push(fragment, length);
        }
        if cut {
            truncated = true;
            break;
        }
    }

    if !current.paths.is_empty() {
        buckets.push(current);
    }
    (buckets, truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotpass_core::Point;

    fn line(length: f64) -> Path {
        Path::new(vec![Point::new(0.0, 0.0), Point::new(length, 0.0)]).unwrap()
    }

    #[test]
    fn test_empty_layer_is_dropped() {
        let layers = vec![Layer::new(0, "Empty", "#000")];
        let plan = build_passes(&layers, TravelBudget::from_mm(10.0));
        assert!(plan.passes.is_empty());
        assert_eq!(plan.total_layers, 0);

        let plan = build_passes(&layers, None);
        assert!(plan.passes.is_empty());
    }

    #[test]
    fn test_greedy_bucketing() {
        // Buckets fill greedily; several short paths share one pass
        let layer = Layer::new(0, "Ink", "#000").with_paths(vec![line(4.0), line(4.0), line(4.0)]);
        let plan = build_passes(&[layer], TravelBudget::from_mm(10.0));
        assert_eq!(plan.passes.len(), 2);
        assert_eq!(plan.passes[0].paths.len(), 2);
        assert_eq!(plan.passes[0].travel_mm, 8.0);
        assert_eq!(plan.passes[1].paths.len(), 1);
    }

    #[test]
    fn test_capped_build_stops_splitting() {
        let layers = vec![
            Layer::new(0, "Ink", "#000").with_paths(vec![line(1000.0)]),
            Layer::new(1, "Later", "#111").with_paths(vec![line(5.0)]),
        ];
        let (plan, truncated) = build_passes_capped(&layers, TravelBudget::from_mm(1.0), 5);
        assert!(truncated);
        assert_eq!(plan.passes.len(), 5);
        assert!(plan.passes.iter().all(|p| p.base_label == "Ink"));
        assert_eq!(plan.passes[0].label, "Ink (pass 1/5)");
    }

    #[test]
    fn test_capped_build_without_budget() {
        let layers =
            vec![Layer::new(0, "Ink", "#000").with_paths(vec![line(4.0), line(4.0), line(4.0)])];
        let (plan, truncated) = build_passes_capped(&layers, None, 2);
        assert!(truncated);
        assert_eq!(plan.passes[0].paths.len(), 2);

        let (plan, truncated) = build_passes_capped(&layers, None, 3);
        assert!(!truncated);
        assert_eq!(plan, build_passes(&layers, None));
    }

    #[test]
    fn test_limit_meters_reported() {
        let layer = Layer::new(0, "Ink", "#000").with_paths(vec![line(1.0)]);
        assert_eq!(build_passes_meters(&[layer.clone()], Some(2.0)).limit_meters, Some(2.0));
        assert_eq!(build_passes_meters(&[layer], Some(-2.0)).limit_meters, None);
    }
}
