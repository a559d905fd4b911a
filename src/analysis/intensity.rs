use crate::analysis::top_by_metric;
use crate::dataset::Observation;
use serde::Serialize;

/// Average daily cigarettes smoked per smoker in the focus year.
#[derive(Debug, Clone, Serialize)]
pub struct IntensityEntry {
    pub country: String,
    pub daily_cigarettes: f64,
}

pub fn rank_intensity(focus_year: &[&Observation], limit: usize) -> Vec<IntensityEntry> {
    let entries: Vec<IntensityEntry> = focus_year
        .iter()
        .map(|obs| IntensityEntry {
            country: obs.country.clone(),
            daily_cigarettes: obs.daily_cigarettes,
        })
        .collect();

    top_by_metric(&entries, limit, |entry| entry.daily_cigarettes)
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(country: &str, daily_cigarettes: f64) -> Observation {
        Observation {
            country: country.to_string(),
            year: 2012,
            pct_total: f64::NAN,
            pct_male: f64::NAN,
            pct_female: f64::NAN,
            daily_cigarettes,
            smokers_total: f64::NAN,
        }
    }

    #[test]
    fn heaviest_smokers_first() {
        let rows = vec![
            observation("France", 14.0),
            observation("Greece", 25.0),
            observation("Austria", 20.0),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();
        let ranked = rank_intensity(&refs, 2);
        assert_eq!(ranked[0].country, "Greece");
        assert_eq!(ranked[1].country, "Austria");
    }
}
