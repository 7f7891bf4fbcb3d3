use serde::{Deserialize, Serialize};
use std::fmt;

/// A row as scraped from the source table, GDP text untouched (e.g. `"25,462,700"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCountryRow {
    pub country: String,
    pub gdp_usd_millions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryGdp {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "GDP_USD_billions")]
    pub gdp_usd_billions: f64,
}

/// Result of an arbitrary SQL statement, decoded by SQLite storage class.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryOutput {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn render_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for QueryOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(render_cell).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        writeln!(f, "{}", header.join("  ").trim_end())?;

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("  "))?;

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())?;
        }

        write!(f, "({} rows)", self.rows.len())
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub extracted: usize,
    pub loaded: usize,
    pub csv_path: String,
    pub db_path: String,
    pub table_name: String,
    pub query: QueryOutput,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_output_renders_aligned_table() {
        let output = QueryOutput {
            columns: vec!["Country".to_string(), "GDP_USD_billions".to_string()],
            rows: vec![
                vec![json!("United States"), json!(26854.6)],
                vec![json!("India"), json!(3732.22)],
            ],
        };

        let rendered = output.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Country        GDP_USD_billions");
        assert_eq!(lines[1], "-------------  ----------------");
        assert_eq!(lines[2], "United States  26854.6");
        assert_eq!(lines[3], "India          3732.22");
        assert_eq!(lines[4], "(2 rows)");
    }

    #[test]
    fn test_query_output_renders_null() {
        let output = QueryOutput {
            columns: vec!["x".to_string()],
            rows: vec![vec![serde_json::Value::Null]],
        };
        assert!(output.to_string().contains("NULL"));
        assert_eq!(output.len(), 1);
        assert!(!output.is_empty());
    }
}
