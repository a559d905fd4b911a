use crate::analysis::top_by_metric;
use crate::dataset::Observation;
use serde::Serialize;

/// Male minus female smoking percentage for one country in the focus year.
#[derive(Debug, Clone, Serialize)]
pub struct GenderGap {
    pub country: String,
    pub pct_male: f64,
    pub pct_female: f64,
    pub gap: f64,
}

pub fn compute_gender_gaps(focus_year: &[&Observation], limit: usize) -> Vec<GenderGap> {
    let gaps: Vec<GenderGap> = focus_year
        .iter()
        .map(|obs| GenderGap {
            country: obs.country.clone(),
            pct_male: obs.pct_male,
            pct_female: obs.pct_female,
            gap: obs.pct_male - obs.pct_female,
        })
        .collect();

    top_by_metric(&gaps, limit, |gap| gap.gap)
        .into_iter()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(country: &str, pct_male: f64, pct_female: f64) -> Observation {
        Observation {
            country: country.to_string(),
            year: 2012,
            pct_total: f64::NAN,
            pct_male,
            pct_female,
            daily_cigarettes: f64::NAN,
            smokers_total: f64::NAN,
        }
    }

    #[test]
    fn widest_gaps_first() {
        let rows = vec![
            observation("Sweden", 24.0, 22.0),
            observation("Indonesia", 57.0, 4.0),
            observation("Georgia", 55.0, 5.0),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();
        let gaps = compute_gender_gaps(&refs, 2);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].country, "Indonesia");
        assert!((gaps[0].gap - 53.0).abs() < f64::EPSILON);
        assert_eq!(gaps[1].country, "Georgia");
    }

    #[test]
    fn empty_slice_yields_no_gaps() {
        assert!(compute_gender_gaps(&[], 5).is_empty());
    }
}
