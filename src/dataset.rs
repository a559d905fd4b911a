use anyhow::{Context, Result, anyhow};
use std::io::Cursor;
use std::path::Path;
use tokio::fs;
use tokio::task;

pub const COL_COUNTRY: &str = "Country";
pub const COL_YEAR: &str = "Year";
pub const COL_PCT_TOTAL: &str = "Data.Percentage.Total";
pub const COL_PCT_MALE: &str = "Data.Percentage.Male";
pub const COL_PCT_FEMALE: &str = "Data.Percentage.Female";
pub const COL_DAILY_CIGARETTES: &str = "Data.Daily cigarettes";
pub const COL_SMOKERS_TOTAL: &str = "Data.Smokers.Total";

/// One (country, year) row of the input dataset.
///
/// Numeric cells that are blank or unparseable load as `f64::NAN` and
/// propagate through downstream arithmetic unchecked.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    pub year: i32,
    pub pct_total: f64,
    pub pct_male: f64,
    pub pct_female: f64,
    pub daily_cigarettes: f64,
    pub smokers_total: f64,
}

pub async fn load_observations(path: &Path) -> Result<Vec<Observation>> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let observations = task::spawn_blocking(move || parse_observations(&bytes))
        .await
        .context("failed to parse dataset")??;
    Ok(observations)
}

struct ColumnIndex {
    country: usize,
    year: usize,
    pct_total: usize,
    pct_male: usize,
    pct_female: usize,
    daily_cigarettes: usize,
    smokers_total: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| anyhow!("missing '{name}' column in dataset"))
        };
        Ok(Self {
            country: position(COL_COUNTRY)?,
            year: position(COL_YEAR)?,
            pct_total: position(COL_PCT_TOTAL)?,
            pct_male: position(COL_PCT_MALE)?,
            pct_female: position(COL_PCT_FEMALE)?,
            daily_cigarettes: position(COL_DAILY_CIGARETTES)?,
            smokers_total: position(COL_SMOKERS_TOTAL)?,
        })
    }
}

pub fn parse_observations(data: &[u8]) -> Result<Vec<Observation>> {
    let cursor = Cursor::new(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(cursor);

    let headers = reader
        .headers()
        .context("missing CSV headers in dataset")?
        .clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to read dataset record")?;
        let country = record.get(columns.country).unwrap_or("").trim();
        if country.is_empty() {
            continue;
        }
        let Ok(year) = record.get(columns.year).unwrap_or("").trim().parse::<i32>() else {
            continue;
        };
        observations.push(Observation {
            country: country.to_string(),
            year,
            pct_total: parse_float(record.get(columns.pct_total)),
            pct_male: parse_float(record.get(columns.pct_male)),
            pct_female: parse_float(record.get(columns.pct_female)),
            daily_cigarettes: parse_float(record.get(columns.daily_cigarettes)),
            smokers_total: parse_float(record.get(columns.smokers_total)),
        });
    }

    Ok(observations)
}

fn parse_float(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Country,Year,Data.Percentage.Total,Data.Percentage.Male,Data.Percentage.Female,Data.Daily cigarettes,Data.Smokers.Total
Afghanistan,1980,8.5,17.2,0.5,11.6,700000
Afghanistan,2012,24.1,46.3,2.1,12.4,2900000
China,2012,25.0,47.6,2.0,22.0,281000000
";

    #[test]
    fn parses_typed_rows() {
        let observations = parse_observations(SAMPLE.as_bytes()).unwrap();
        assert_eq!(observations.len(), 3);
        let first = &observations[0];
        assert_eq!(first.country, "Afghanistan");
        assert_eq!(first.year, 1980);
        assert!((first.pct_total - 8.5).abs() < f64::EPSILON);
        assert!((first.smokers_total - 700_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn blank_numeric_cells_become_nan() {
        let data = "\
Country,Year,Data.Percentage.Total,Data.Percentage.Male,Data.Percentage.Female,Data.Daily cigarettes,Data.Smokers.Total
Nauru,2012,,47.0,n/a,9.1,5000
";
        let observations = parse_observations(data.as_bytes()).unwrap();
        assert_eq!(observations.len(), 1);
        assert!(observations[0].pct_total.is_nan());
        assert!(observations[0].pct_female.is_nan());
        assert!((observations[0].pct_male - 47.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rows_without_country_or_year_are_skipped() {
        let data = "\
Country,Year,Data.Percentage.Total,Data.Percentage.Male,Data.Percentage.Female,Data.Daily cigarettes,Data.Smokers.Total
,2012,10.0,1.0,1.0,1.0,1.0
France,not-a-year,10.0,1.0,1.0,1.0,1.0
France,2012,10.0,1.0,1.0,1.0,1.0
";
        let observations = parse_observations(data.as_bytes()).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].country, "France");
    }

    #[test]
    fn missing_column_is_an_error() {
        let data = "Country,Year\nFrance,2012\n";
        let err = parse_observations(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Data.Percentage.Total"));
    }
}
