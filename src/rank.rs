//! Top-N ranking by low-access population.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::model::{RankedTract, Tract};

/// Default size of the ranked table.
pub const DEFAULT_TOP_N: usize = 10;

/// Presentation order of the selected rows.
///
/// The order never changes which rows are selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankOrder {
    #[default]
    Descending,
    Ascending,
    /// The selected rows in their original table order.
    TableOrder,
}

/// Selects the `n` tracts with the largest low-access population.
///
/// Ties go to the row that appears first in `tracts`.
pub fn top_n(tracts: &[Tract], n: usize, order: RankOrder) -> Vec<RankedTract> {
    let mut selected: Vec<usize> = (0..tracts.len()).collect();
    selected.sort_by(|&a, &b| by_metric(&tracts[b], &tracts[a]));
    selected.truncate(n);

    match order {
        RankOrder::Descending => {}
        RankOrder::Ascending => {
            selected.sort_by(|&a, &b| by_metric(&tracts[a], &tracts[b]).then(a.cmp(&b)))
        }
        RankOrder::TableOrder => selected.sort_unstable(),
    }

    selected
        .into_iter()
        .map(|i| {
            let t = &tracts[i];
            RankedTract {
                tract_id: t.tract_id.clone(),
                county: t.county.clone(),
                low_access_population: t.low_access_population,
            }
        })
        .collect()
}

fn by_metric(a: &Tract, b: &Tract) -> Ordering {
    a.low_access_population
        .partial_cmp(&b.low_access_population)
        .unwrap_or(Ordering::Equal)
}
