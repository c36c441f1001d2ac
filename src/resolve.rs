// src/resolve.rs
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::cache::TableCache;
use crate::config::Config;
use crate::error::{MetricError, Result};
use crate::extract::{find_row, parse_rows};
use crate::metrics::{as_of_label, cell_magnitude, Aggregation, Metric, MILLIONS, VALUE_COLUMN};

/// One served figure: the dollar value and the reporting period it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    #[serde(rename = "asOf")]
    pub as_of: String,
    pub value: f64,
}

/// Resolve a metric from the current release, going through the table
/// cache for the download.
#[instrument(skip(client, cache, config), fields(metric = metric.as_str()))]
pub async fn resolve_metric(
    client: &Client,
    cache: &TableCache,
    config: &Config,
    metric: Metric,
) -> Result<MetricValue> {
    let table_number = metric.spec().table_number;
    let text = cache.table_text(client, config, table_number).await?;
    let resolved = resolve_from_csv(metric, &text)?;
    info!(as_of = %resolved.as_of, value = resolved.value, "resolved metric");
    Ok(resolved)
}

/// Pull a metric out of already-extracted table text. Magnitudes are summed
/// in published units and scaled to dollars once at the end, so a
/// five-row sum is not scaled five times.
pub fn resolve_from_csv(metric: Metric, csv_text: &str) -> Result<MetricValue> {
    let spec = metric.spec();
    let rows = parse_rows(csv_text)?;
    let as_of = as_of_label(&rows, spec.table_number)?;

    let mut magnitude = 0.0;
    for pattern in metric.matchers() {
        let row = find_row(&rows, pattern).ok_or_else(|| MetricError::RowNotFound {
            table: spec.table_number,
            pattern: pattern.as_str().to_string(),
        })?;
        let cell = row.get(VALUE_COLUMN).map(String::as_str).unwrap_or("");
        magnitude += cell_magnitude(cell)?;
        if spec.aggregation == Aggregation::Single {
            break;
        }
    }

    Ok(MetricValue {
        as_of,
        value: magnitude * MILLIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE_1: &str = "\
Table 1,,
Fiscal Monitor,,
,,2025-Q1
\"Revenues\",x,\"28,000\"
\"Budgetary balance (deficit/surplus)\",x,\"-23,000\"
\"Public debt charges\",x,\"3,100\"
";

    const TABLE_4: &str = "\
Table 4,,
Budgetary expenses,,
,,April 2025
Transportation and communications,x,1
Rentals,x,2
Repair and maintenance,x,3
\"Utilities, materials and supplies\",x,4
Professional and special services,x,5
\"Personnel, excluding net actuarial losses\",x,\"12,000\"
";

    #[test]
    fn deficit_is_scaled_and_unsigned() {
        let value = resolve_from_csv(Metric::Deficit, TABLE_1).unwrap();
        assert_eq!(
            value,
            MetricValue {
                as_of: "2025-Q1".to_string(),
                value: 23_000_000_000.0,
            }
        );
    }

    #[test]
    fn interest_reads_its_own_row() {
        let value = resolve_from_csv(Metric::Interest, TABLE_1).unwrap();
        assert_eq!(value.value, 3_100_000_000.0);
    }

    #[test]
    fn procurement_sums_rows_then_scales_once() {
        let value = resolve_from_csv(Metric::Procurement, TABLE_4).unwrap();
        assert_eq!(value.as_of, "April 2025");
        assert_eq!(value.value, 15_000_000.0);
    }

    #[test]
    fn payroll_matches_the_quoted_label() {
        let value = resolve_from_csv(Metric::Payroll, TABLE_4).unwrap();
        assert_eq!(value.value, 12_000_000_000.0);
    }

    #[test]
    fn missing_row_names_table_and_pattern() {
        let err = resolve_from_csv(Metric::NationalDebt, TABLE_1).unwrap_err();
        match err {
            MetricError::RowNotFound { table, ref pattern } => {
                assert_eq!(table, 7);
                assert!(pattern.contains("Federal debt"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn figure_in_the_period_cell_is_rejected() {
        let text = TABLE_1.replace("2025-Q1", "23,512");
        let err = resolve_from_csv(Metric::Deficit, &text).unwrap_err();
        assert!(matches!(err, MetricError::ParseError(_)));
    }

    #[test]
    fn metric_value_serializes_with_the_wire_field_name() {
        let json = serde_json::to_string(&MetricValue {
            as_of: "2025-Q1".to_string(),
            value: 1.5e9,
        })
        .unwrap();
        assert_eq!(json, r#"{"asOf":"2025-Q1","value":1500000000.0}"#);
    }
}
