pub mod disparity;
pub mod geography;
pub mod intensity;
pub mod scale;
pub mod trend;

pub use disparity::{GenderGap, compute_gender_gaps};
pub use geography::{GeoPoint, locate_countries};
pub use intensity::{IntensityEntry, rank_intensity};
pub use scale::{ScaleEntry, rank_by_count, rank_by_percentage};
pub use trend::{TrendSummary, aggregate_trends, largest_decreases, largest_increases};

use crate::dataset::Observation;
use std::cmp::Ordering;

/// Observations for a single focus year, in original dataset order.
///
/// All cross-sectional analyses (disparity, intensity, scale, geography)
/// operate on this slice. An absent year yields an empty slice, not an
/// error.
pub fn focus_year_slice(observations: &[Observation], year: i32) -> Vec<&Observation> {
    observations.iter().filter(|obs| obs.year == year).collect()
}

/// Stable descending sort by a metric; NaN compares equal and keeps its
/// original position. Returns at most `limit` items.
pub fn top_by_metric<T, F>(items: &[T], limit: usize, metric: F) -> Vec<&T>
where
    F: Fn(&T) -> f64,
{
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| {
        metric(b)
            .partial_cmp(&metric(a))
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(country: &str, year: i32, pct_total: f64) -> Observation {
        Observation {
            country: country.to_string(),
            year,
            pct_total,
            pct_male: f64::NAN,
            pct_female: f64::NAN,
            daily_cigarettes: f64::NAN,
            smokers_total: f64::NAN,
        }
    }

    #[test]
    fn focus_year_filters_and_preserves_order() {
        let observations = vec![
            observation("China", 1980, 30.0),
            observation("Afghanistan", 2012, 24.1),
            observation("China", 2012, 25.0),
        ];
        let slice = focus_year_slice(&observations, 2012);
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].country, "Afghanistan");
        assert_eq!(slice[1].country, "China");
    }

    #[test]
    fn absent_focus_year_is_empty() {
        let observations = vec![observation("China", 1980, 30.0)];
        assert!(focus_year_slice(&observations, 2012).is_empty());
    }

    #[test]
    fn top_by_metric_is_stable_for_ties() {
        let values = vec![("a", 1.0), ("b", 2.0), ("c", 2.0), ("d", 0.5)];
        let top = top_by_metric(&values, 3, |pair| pair.1);
        let names: Vec<&str> = top.iter().map(|pair| pair.0).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }
}
