use crate::analysis::top_by_metric;
use crate::dataset::Observation;
use serde::Serialize;

/// Absolute and relative smoker counts for one country in the focus year.
///
/// The two rankings answer different questions: populous countries
/// dominate the absolute count while small heavy-smoking countries lead
/// the percentage ranking.
#[derive(Debug, Clone, Serialize)]
pub struct ScaleEntry {
    pub country: String,
    pub smokers_total: f64,
    pub pct_total: f64,
}

pub fn rank_by_count(focus_year: &[&Observation], limit: usize) -> Vec<ScaleEntry> {
    top_by_metric(&collect(focus_year), limit, |entry| entry.smokers_total)
        .into_iter()
        .cloned()
        .collect()
}

pub fn rank_by_percentage(focus_year: &[&Observation], limit: usize) -> Vec<ScaleEntry> {
    top_by_metric(&collect(focus_year), limit, |entry| entry.pct_total)
        .into_iter()
        .cloned()
        .collect()
}

fn collect(focus_year: &[&Observation]) -> Vec<ScaleEntry> {
    focus_year
        .iter()
        .map(|obs| ScaleEntry {
            country: obs.country.clone(),
            smokers_total: obs.smokers_total,
            pct_total: obs.pct_total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(country: &str, smokers_total: f64, pct_total: f64) -> Observation {
        Observation {
            country: country.to_string(),
            year: 2012,
            pct_total,
            pct_male: f64::NAN,
            pct_female: f64::NAN,
            daily_cigarettes: f64::NAN,
            smokers_total,
        }
    }

    #[test]
    fn absolute_and_relative_rankings_diverge() {
        let rows = vec![
            observation("China", 281_000_000.0, 25.0),
            observation("Kiribati", 30_000.0, 52.0),
            observation("India", 120_000_000.0, 13.0),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();

        let by_count = rank_by_count(&refs, 2);
        assert_eq!(by_count[0].country, "China");
        assert_eq!(by_count[1].country, "India");

        let by_pct = rank_by_percentage(&refs, 2);
        assert_eq!(by_pct[0].country, "Kiribati");
        assert_eq!(by_pct[1].country, "China");
    }
}
