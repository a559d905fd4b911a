use crate::dataset::Observation;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cmp::Ordering;

/// Per-country change in smoking percentage between the first and last
/// observed year.
#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub country: String,
    pub year_start: i32,
    pub year_end: i32,
    pub percentage_start: f64,
    pub percentage_end: f64,
    pub percentage_change: f64,
}

#[derive(Debug)]
struct TrendAccumulator {
    country: String,
    year_start: i32,
    year_end: i32,
    percentage_start: f64,
    percentage_end: f64,
}

/// Reduce the dataset to one summary per distinct country, in
/// first-arrival order.
///
/// Start/end years are the minimum and maximum year seen for the country.
/// Start/end percentages are the first and last `pct_total` encountered in
/// dataset order, which matches the years only when the source rows are
/// already sorted chronologically per country.
pub fn aggregate_trends(observations: &[Observation]) -> Vec<TrendSummary> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<TrendAccumulator> = Vec::new();

    for obs in observations {
        if let Some(&slot) = index.get(obs.country.as_str()) {
            let group = &mut groups[slot];
            group.year_start = group.year_start.min(obs.year);
            group.year_end = group.year_end.max(obs.year);
            group.percentage_end = obs.pct_total;
        } else {
            index.insert(obs.country.as_str(), groups.len());
            groups.push(TrendAccumulator {
                country: obs.country.clone(),
                year_start: obs.year,
                year_end: obs.year,
                percentage_start: obs.pct_total,
                percentage_end: obs.pct_total,
            });
        }
    }

    groups
        .into_iter()
        .map(|group| TrendSummary {
            country: group.country,
            year_start: group.year_start,
            year_end: group.year_end,
            percentage_start: group.percentage_start,
            percentage_end: group.percentage_end,
            percentage_change: group.percentage_end - group.percentage_start,
        })
        .collect()
}

/// The `limit` summaries with the algebraically largest change, ties kept
/// in grouping order.
pub fn largest_increases(summaries: &[TrendSummary], limit: usize) -> Vec<&TrendSummary> {
    ranked(summaries, limit, false)
}

/// The `limit` summaries with the algebraically smallest change.
pub fn largest_decreases(summaries: &[TrendSummary], limit: usize) -> Vec<&TrendSummary> {
    ranked(summaries, limit, true)
}

fn ranked(summaries: &[TrendSummary], limit: usize, ascending: bool) -> Vec<&TrendSummary> {
    let mut sorted: Vec<&TrendSummary> = summaries.iter().collect();
    sorted.sort_by(|a, b| {
        let mut ord = a
            .percentage_change
            .partial_cmp(&b.percentage_change)
            .unwrap_or(Ordering::Equal);
        if !ascending {
            ord = ord.reverse();
        }
        ord
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
    fn two_observations_span_first_to_last() {
        let observations = vec![
            observation("Norway", 1980, 20.0),
            observation("Norway", 2012, 15.0),
        ];
        let summaries = aggregate_trends(&observations);
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.year_start, 1980);
        assert_eq!(summary.year_end, 2012);
        assert!((summary.percentage_start - 20.0).abs() < f64::EPSILON);
        assert!((summary.percentage_end - 15.0).abs() < f64::EPSILON);
        assert!((summary.percentage_change - -5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_observation_yields_zero_change() {
        let observations = vec![observation("Malta", 2000, 10.0)];
        let summaries = aggregate_trends(&observations);
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.year_start, 2000);
        assert_eq!(summary.year_end, 2000);
        assert!((summary.percentage_change).abs() < f64::EPSILON);
    }

    #[test]
    fn one_summary_per_distinct_country() {
        let observations = vec![
            observation("A", 1980, 1.0),
            observation("B", 1980, 2.0),
            observation("A", 2012, 3.0),
            observation("C", 2012, 4.0),
        ];
        let summaries = aggregate_trends(&observations);
        assert_eq!(summaries.len(), 3);
        let countries: Vec<&str> = summaries.iter().map(|s| s.country.as_str()).collect();
        assert_eq!(countries, vec!["A", "B", "C"]);
    }

    #[test]
    fn start_and_end_follow_arrival_order_not_years() {
        // Rows deliberately unsorted within the country: the 2012 row
        // arrives first, so its percentage is the start value even though
        // year_start is 1980.
        let observations = vec![
            observation("Chile", 2012, 30.0),
            observation("Chile", 1980, 40.0),
        ];
        let summaries = aggregate_trends(&observations);
        let summary = &summaries[0];
        assert_eq!(summary.year_start, 1980);
        assert_eq!(summary.year_end, 2012);
        assert!((summary.percentage_start - 30.0).abs() < f64::EPSILON);
        assert!((summary.percentage_end - 40.0).abs() < f64::EPSILON);
        assert!((summary.percentage_change - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ranking_takes_largest_and_smallest_changes() {
        let observations = vec![
            observation("A", 1980, 10.0),
            observation("B", 1980, 10.0),
            observation("C", 1980, 10.0),
            observation("A", 2012, 13.0),
            observation("B", 2012, 8.0),
            observation("C", 2012, 13.0),
        ];
        let summaries = aggregate_trends(&observations);

        let increases = largest_increases(&summaries, 2);
        let names: Vec<&str> = increases.iter().map(|s| s.country.as_str()).collect();
        // A and C tie at +3.0; grouping order breaks the tie.
        assert_eq!(names, vec!["A", "C"]);

        let decreases = largest_decreases(&summaries, 1);
        assert_eq!(decreases[0].country, "B");
    }

    #[test]
    fn end_to_end_scenario() {
        let observations = vec![
            observation("Afghanistan", 1980, 8.5),
            observation("Afghanistan", 2012, 24.1),
            observation("China", 1980, 30.0),
            observation("China", 2012, 25.0),
        ];
        let summaries = aggregate_trends(&observations);
        assert_eq!(summaries.len(), 2);
        assert!((summaries[0].percentage_change - 15.6).abs() < 1e-9);
        assert!((summaries[1].percentage_change - -5.0).abs() < 1e-9);

        let top = largest_increases(&summaries, 1);
        assert_eq!(top[0].country, "Afghanistan");
    }

    #[test]
    fn empty_dataset_yields_no_summaries() {
        assert!(aggregate_trends(&[]).is_empty());
    }

    #[test]
    fn nan_percentages_propagate() {
        let observations = vec![
            observation("X", 1980, f64::NAN),
            observation("X", 2012, 12.0),
        ];
        let summaries = aggregate_trends(&observations);
        assert!(summaries[0].percentage_change.is_nan());
    }
}
