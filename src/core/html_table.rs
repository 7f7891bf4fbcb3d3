use crate::domain::model::RawCountryRow;
use crate::utils::error::{EtlError, Result};
use scraper::{ElementRef, Html, Selector};

/// Marks a missing estimate in the GDP column.
pub const MISSING_MARKER: char = '—';

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::HtmlParseError {
        message: format!("invalid selector '{}': {:?}", css, e),
    })
}

/// First non-blank direct text child, trimmed; falls back to the element's full text.
fn leading_text(element: ElementRef<'_>) -> String {
    let direct = element
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
        .find(|t| !t.is_empty());

    direct.unwrap_or_else(|| element.text().collect::<String>().trim().to_string())
}

/// Number of `<tbody>` elements in the document.
pub fn count_tables(html: &str) -> Result<usize> {
    let document = Html::parse_document(html);
    let tbody = selector("tbody")?;
    Ok(document.select(&tbody).count())
}

/// Extracts country/GDP rows from the `table_index`-th `<tbody>` of the page.
///
/// A row is kept when its first cell links to the country page and its third
/// cell carries an estimate (no em dash). Header rows and short rows are skipped.
pub fn parse_gdp_rows(html: &str, table_index: usize) -> Result<Vec<RawCountryRow>> {
    let document = Html::parse_document(html);
    let tbody = selector("tbody")?;
    let tr = selector("tr")?;
    let td = selector("td")?;
    let link = selector("a")?;

    let bodies: Vec<ElementRef<'_>> = document.select(&tbody).collect();
    let body = bodies
        .get(table_index)
        .copied()
        .ok_or(EtlError::TableNotFoundError {
            index: table_index,
            found: bodies.len(),
        })?;

    let mut rows = Vec::new();
    for row in body.select(&tr) {
        let cells: Vec<ElementRef<'_>> = row.select(&td).collect();
        if cells.is_empty() {
            continue;
        }
        if cells.len() < 3 {
            tracing::debug!("Skipping row with {} cells", cells.len());
            continue;
        }

        let Some(anchor) = cells[0].select(&link).next() else {
            continue;
        };
        let gdp_cell = cells[2];
        if gdp_cell.text().any(|t| t.contains(MISSING_MARKER)) {
            tracing::debug!("Skipping {} (no estimate)", leading_text(anchor));
            continue;
        }

        rows.push(RawCountryRow {
            country: leading_text(anchor),
            gdp_usd_millions: leading_text(gdp_cell),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(tables: &[&str]) -> String {
        let mut html = String::from("<html><body>");
        for body in tables {
            html.push_str("<table><tbody>");
            html.push_str(body);
            html.push_str("</tbody></table>");
        }
        html.push_str("</body></html>");
        html
    }

    const GDP_TABLE: &str = r#"
        <tr><th>Country</th><th>Region</th><th>IMF</th></tr>
        <tr><td>World</td><td></td><td>105,568,776</td></tr>
        <tr><td><span class="flag"></span> <a href="/wiki/United_States">United States</a></td><td>Americas</td><td>26,854,599</td><td>2023</td></tr>
        <tr><td><a href="/wiki/Afghanistan">Afghanistan</a></td><td>Asia</td><td>—</td><td></td></tr>
        <tr><td><a href="/wiki/Tuvalu">Tuvalu</a></td><td>Oceania</td><td>63<sup>[n 1]</sup></td></tr>
        <tr><td><a href="/wiki/Nowhere">Nowhere</a></td></tr>
    "#;

    #[test]
    fn test_parse_selects_table_by_index() {
        let html = page(&["<tr><td>a</td></tr>", "<tr><td>b</td></tr>", GDP_TABLE]);
        let rows = parse_gdp_rows(&html, 2).unwrap();

        assert_eq!(
            rows,
            vec![
                RawCountryRow {
                    country: "United States".to_string(),
                    gdp_usd_millions: "26,854,599".to_string(),
                },
                RawCountryRow {
                    country: "Tuvalu".to_string(),
                    gdp_usd_millions: "63".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_skips_rows_without_link_or_estimate() {
        let html = page(&[GDP_TABLE]);
        let rows = parse_gdp_rows(&html, 0).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
        assert!(!names.contains(&"World"));
        assert!(!names.contains(&"Afghanistan"));
        assert!(!names.contains(&"Nowhere"));
    }

    #[test]
    fn test_parse_missing_table_reports_count() {
        let html = page(&[GDP_TABLE]);
        match parse_gdp_rows(&html, 2) {
            Err(EtlError::TableNotFoundError { index, found }) => {
                assert_eq!(index, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected TableNotFoundError, got {:?}", other),
        }
    }

    #[test]
    fn test_leading_text_falls_back_to_nested_text() {
        let html = page(&[
            r#"<tr><td><a href="/wiki/X"><b>Bold Land</b></a></td><td></td><td><span>1,000</span></td></tr>"#,
        ]);
        let rows = parse_gdp_rows(&html, 0).unwrap();
        assert_eq!(rows[0].country, "Bold Land");
        assert_eq!(rows[0].gdp_usd_millions, "1,000");
    }

    #[test]
    fn test_leading_text_skips_blank_direct_text() {
        let html = page(&[
            r#"<tr><td> <a href="/wiki/Y"> <i>flag</i> Yland</a></td><td></td><td> <b>x</b> 1,000</td></tr>"#,
        ]);
        let rows = parse_gdp_rows(&html, 0).unwrap();
        assert_eq!(rows[0].country, "Yland");
        assert_eq!(rows[0].gdp_usd_millions, "1,000");
    }

    #[test]
    fn test_count_tables() {
        let html = page(&[GDP_TABLE, GDP_TABLE]);
        assert_eq!(count_tables(&html).unwrap(), 2);
    }
}
