use crate::domain::model::{CountryGdp, RawCountryRow};
use crate::utils::error::{EtlError, Result};

/// Parses page text such as `"25,462,700"` into millions of USD.
pub fn parse_millions(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Rounds to two decimals, ties to even.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn millions_to_billions(millions: f64) -> f64 {
    round_to_cents(millions / 1000.0)
}

pub fn transform_rows(rows: Vec<RawCountryRow>) -> Result<Vec<CountryGdp>> {
    rows.into_iter()
        .map(|row| {
            let millions =
                parse_millions(&row.gdp_usd_millions).ok_or_else(|| EtlError::ProcessingError {
                    message: format!(
                        "cannot parse GDP value '{}' for {}",
                        row.gdp_usd_millions, row.country
                    ),
                })?;
            Ok(CountryGdp {
                country: row.country,
                gdp_usd_billions: millions_to_billions(millions),
            })
        })
        .collect()
}
