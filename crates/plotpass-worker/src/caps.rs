//! Resource caps for worker renders.
//!
//! Breaches never fail a render. Excess data is dropped and a warning is
//! recorded for the response summary.

use plotpass_core::{Layer, Path};
use serde::{Deserialize, Serialize};

use crate::protocol::LayerRecord;

/// Hard limits on a single render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCaps {
    pub max_paths_per_layer: usize,
    pub max_points_per_path: usize,
    pub max_total_fragments: usize,
}

impl Default for ResourceCaps {
    fn default() -> Self {
        Self {
            max_paths_per_layer: 20_000,
            max_points_per_path: 50_000,
            max_total_fragments: 250_000,
        }
    }
}

fn record_warning(warnings: &mut Vec<String>, message: String) {
    tracing::warn!("{}", message);
    warnings.push(message);
}

/// Converts wire records into validated layers, enforcing input caps.
///
/// Paths beyond the per-layer cap are dropped, points beyond the
/// per-path cap are truncated, and paths that fail validation are
/// skipped silently.
pub fn layers_from_records(
    records: Vec<LayerRecord>,
    caps: &ResourceCaps,
    warnings: &mut Vec<String>,
) -> Vec<Layer> {
    records
        .into_iter()
        .map(|record| {
            let mut paths = record.paths;
            if paths.len() > caps.max_paths_per_layer {
                record_warning(
                    warnings,
                    format!(
                        "Layer '{}' has {} paths; only the first {} were used",
                        record.base_label,
                        paths.len(),
                        caps.max_paths_per_layer
                    ),
                );
                paths.truncate(caps.max_paths_per_layer);
            }

            let mut truncated = 0;
            let mut layer = Layer::new(record.base_order, record.base_label, record.stroke);
            for mut path in paths {
                if path.points.len() > caps.max_points_per_path {
                    path.points.truncate(caps.max_points_per_path);
                    truncated += 1;
                }
                match Path::try_from(path) {
                    Ok(path) => layer.push_path(path),
                    Err(e) => tracing::debug!(layer = %layer.base_label, "Skipping path: {}", e),
                }
            }

            if truncated > 0 {
                record_warning(
                    warnings,
                    format!(
                        "Layer '{}' had {} paths truncated to {} points",
                        layer.base_label, truncated, caps.max_points_per_path
                    ),
                );
            }
            layer
        })
        .collect()
}

/// Records that a render ran out of fragment allowance.
pub fn fragment_cap_warning(max_total: usize, warnings: &mut Vec<String>) {
    record_warning(
        warnings,
        format!(
            "Render reached the cap of {} fragments; remaining geometry was dropped",
            max_total
        ),
    );
}
