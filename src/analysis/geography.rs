use crate::dataset::Observation;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::OnceLock;

/// A focus-year observation joined with its country centroid.
#[derive(Debug, Clone, Serialize)]
pub struct GeoPoint {
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pct_total: f64,
}

/// Join focus-year observations against the static centroid table.
/// Countries without a known centroid are dropped from this analysis only.
pub fn locate_countries(focus_year: &[&Observation]) -> Vec<GeoPoint> {
    let coordinates = country_coordinates();
    focus_year
        .iter()
        .filter_map(|obs| {
            coordinates
                .get(obs.country.as_str())
                .map(|&(latitude, longitude)| GeoPoint {
                    country: obs.country.clone(),
                    latitude,
                    longitude,
                    pct_total: obs.pct_total,
                })
        })
        .collect()
}

fn country_coordinates() -> &'static FxHashMap<&'static str, (f64, f64)> {
    static COUNTRY_COORDINATES: OnceLock<FxHashMap<&'static str, (f64, f64)>> = OnceLock::new();
    COUNTRY_COORDINATES.get_or_init(|| {
        [
            ("Afghanistan", (33.93911, 67.709953)),
            ("Argentina", (-38.416097, -63.616672)),
            ("Australia", (-25.274398, 133.775136)),
            ("Bangladesh", (23.684994, 90.356331)),
            ("Brazil", (-14.235004, -51.92528)),
            ("China", (35.86166, 104.195397)),
            ("Egypt", (26.820553, 30.802498)),
            ("France", (46.227638, 2.213749)),
            ("Germany", (51.165691, 10.451526)),
            ("Greece", (39.074208, 21.824312)),
            ("India", (20.593684, 78.96288)),
            ("Indonesia", (-0.789275, 113.921327)),
            ("Japan", (36.204824, 138.252924)),
            ("Mexico", (23.634501, -102.552784)),
            ("Nigeria", (9.081999, 8.675277)),
            ("Pakistan", (30.375321, 69.345116)),
            ("Philippines", (12.879721, 121.774017)),
            ("Russia", (61.52401, 105.318756)),
            ("South Africa", (-30.559482, 22.937506)),
            ("Turkey", (38.963745, 35.243322)),
            ("United Kingdom", (55.378051, -3.435973)),
            ("United States", (37.09024, -95.712891)),
            ("Vietnam", (14.058324, 108.277199)),
        ]
        .into_iter()
        .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(country: &str, pct_total: f64) -> Observation {
        Observation {
            country: country.to_string(),
            year: 2012,
            pct_total,
            pct_male: f64::NAN,
            pct_female: f64::NAN,
            daily_cigarettes: f64::NAN,
            smokers_total: f64::NAN,
        }
    }

    #[test]
    fn known_countries_get_centroids() {
        let rows = vec![observation("China", 25.0)];
        let refs: Vec<&Observation> = rows.iter().collect();
        let points = locate_countries(&refs);
        assert_eq!(points.len(), 1);
        assert!((points[0].latitude - 35.86166).abs() < 1e-9);
        assert!((points[0].longitude - 104.195_397).abs() < 1e-9);
    }

    #[test]
    fn unknown_countries_are_dropped() {
        let rows = vec![observation("Atlantis", 25.0), observation("India", 13.0)];
        let refs: Vec<&Observation> = rows.iter().collect();
        let points = locate_countries(&refs);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].country, "India");
    }
}
