// src/fetch/release.rs
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{MetricError, Result};

/// Substring that marks the consolidated data-tables archive among the
/// package resources. The portal publishes it case-sensitively.
const DATA_TABLES: &str = "Data tables";

/// One downloadable resource inside a CKAN package.
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub created: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PackageResult {
    pub resources: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
pub struct PackageShow {
    pub result: PackageResult,
}

/// CKAN emits portal-local timestamps like `2025-04-28T14:51:22.433069`.
/// Unparseable values sort before anything parseable and so are never
/// preferred over a well-formed timestamp.
fn created_key(resource: &Resource) -> Option<NaiveDateTime> {
    let s = resource.created.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Pick the newest ZIP resource whose name mentions "Data tables".
/// Ties keep the first occurrence in resource order.
pub fn select_data_tables_zip(resources: &[Resource]) -> Option<&Resource> {
    let mut best: Option<(&Resource, Option<NaiveDateTime>)> = None;
    for resource in resources
        .iter()
        .filter(|r| r.format == "ZIP" && r.name.contains(DATA_TABLES))
    {
        let key = created_key(resource);
        match &best {
            Some((_, best_key)) if key <= *best_key => {}
            _ => best = Some((resource, key)),
        }
    }
    best.map(|(resource, _)| resource)
}

/// Resolve the newest "Data tables" ZIP resource for the configured dataset
/// via the portal's `package_show` API.
pub async fn latest_tables_zip(client: &Client, cfg: &Config) -> Result<Resource> {
    let url = cfg.package_show_url();
    debug!(%url, "fetching package metadata");

    let pkg: PackageShow = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    select_data_tables_zip(&pkg.result.resources)
        .cloned()
        .ok_or_else(|| {
            MetricError::UpstreamUnavailable(format!(
                "no \"Data tables\" ZIP resource in package {}",
                cfg.dataset
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str, format: &str, created: &str, url: &str) -> Resource {
        Resource {
            name: name.to_string(),
            format: format.to_string(),
            created: created.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn newest_data_tables_zip_wins() {
        let resources = vec![
            resource(
                "Fiscal Monitor - Data tables (April)",
                "ZIP",
                "2025-04-28T14:51:22.433069",
                "https://example.org/april.zip",
            ),
            resource(
                "Fiscal Monitor - Data tables (May)",
                "ZIP",
                "2025-05-30T09:12:00.000000",
                "https://example.org/may.zip",
            ),
        ];
        let picked = select_data_tables_zip(&resources).expect("a resource");
        assert_eq!(picked.url, "https://example.org/may.zip");
    }

    #[test]
    fn ignores_other_formats_and_names() {
        let resources = vec![
            resource("Data tables", "CSV", "2025-06-01T00:00:00", "https://example.org/a.csv"),
            resource("Fiscal Monitor report", "ZIP", "2025-06-01T00:00:00", "https://example.org/b.zip"),
            // lowercase "data tables" must not match: the filter is case-sensitive
            resource("data tables", "ZIP", "2025-06-01T00:00:00", "https://example.org/c.zip"),
            resource("Monthly Data tables", "ZIP", "2025-01-01T00:00:00", "https://example.org/d.zip"),
        ];
        let picked = select_data_tables_zip(&resources).expect("a resource");
        assert_eq!(picked.url, "https://example.org/d.zip");
    }

    #[test]
    fn malformed_created_sorts_earliest() {
        let resources = vec![
            resource("Data tables", "ZIP", "not a date", "https://example.org/bad.zip"),
            resource("Data tables", "ZIP", "2024-01-01T00:00:00", "https://example.org/good.zip"),
        ];
        let picked = select_data_tables_zip(&resources).expect("a resource");
        assert_eq!(picked.url, "https://example.org/good.zip");
    }

    #[test]
    fn equal_created_keeps_first_occurrence() {
        let resources = vec![
            resource("Data tables", "ZIP", "2025-02-02T08:00:00", "https://example.org/first.zip"),
            resource("Data tables", "ZIP", "2025-02-02T08:00:00", "https://example.org/second.zip"),
        ];
        let picked = select_data_tables_zip(&resources).expect("a resource");
        assert_eq!(picked.url, "https://example.org/first.zip");
    }

    #[test]
    fn no_match_yields_none() {
        assert!(select_data_tables_zip(&[]).is_none());
        let resources = vec![resource("Data tables", "PDF", "2025-01-01T00:00:00", "x")];
        assert!(select_data_tables_zip(&resources).is_none());
    }

    #[test]
    fn package_show_payload_parses() {
        let body = r#"{
            "success": true,
            "result": {
                "resources": [
                    {
                        "name": "Fiscal Monitor - Data tables",
                        "format": "ZIP",
                        "created": "2025-04-28T14:51:22.433069",
                        "url": "https://open.canada.ca/fm.zip",
                        "mimetype": "application/zip"
                    },
                    {
                        "name": "Fiscal Monitor (HTML)",
                        "format": "HTML",
                        "url": "https://open.canada.ca/fm.html"
                    }
                ]
            }
        }"#;
        let pkg: PackageShow = serde_json::from_str(body).expect("payload parses");
        assert_eq!(pkg.result.resources.len(), 2);
        let picked = select_data_tables_zip(&pkg.result.resources).expect("a resource");
        assert_eq!(picked.url, "https://open.canada.ca/fm.zip");
    }
}
