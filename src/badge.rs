// src/badge.rs
//
// Client side of the service: fetch the five figures, format them the way
// the badge shows them, and keep something sensible on screen when the
// API is down. Figures that cannot be fetched fall back to pinned values
// from the last known release.

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use tracing::warn;

use crate::metrics::Metric;
use crate::resolve::MetricValue;

/// Display order of the badge rows.
pub const METRIC_ORDER: [Metric; 5] = [
    Metric::Deficit,
    Metric::Payroll,
    Metric::NationalDebt,
    Metric::Interest,
    Metric::Procurement,
];

/// How often a long-running badge refreshes its figures.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Seed for the newest-period scan; any real label compares greater.
const AS_OF_SENTINEL: &str = "1900-01-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    En,
    Fr,
}

impl Lang {
    /// `"fr"` in any case selects French; everything else is English.
    pub fn parse(tag: &str) -> Lang {
        if tag.eq_ignore_ascii_case("fr") {
            Lang::Fr
        } else {
            Lang::En
        }
    }

    pub fn label(self, metric: Metric) -> &'static str {
        match (self, metric) {
            (Lang::En, Metric::NationalDebt) => "National Debt",
            (Lang::En, Metric::Deficit) => "Budgetary Deficit",
            (Lang::En, Metric::Interest) => "Interest on Debt",
            (Lang::En, Metric::Procurement) => "Procurement Spend",
            (Lang::En, Metric::Payroll) => "Federal Payroll",
            (Lang::Fr, Metric::NationalDebt) => "Dette nationale",
            (Lang::Fr, Metric::Deficit) => "Déficit budgétaire",
            (Lang::Fr, Metric::Interest) => "Intérêts de la dette",
            (Lang::Fr, Metric::Procurement) => "Dépenses d\u{2019}approvisionnement",
            (Lang::Fr, Metric::Payroll) => "Rémunération fédérale",
        }
    }

    fn billions_suffix(self) -> &'static str {
        match self {
            Lang::En => "B",
            Lang::Fr => " G$",
        }
    }

    fn millions_suffix(self) -> &'static str {
        match self {
            Lang::En => "M",
            Lang::Fr => " M$",
        }
    }

    pub fn as_of_prefix(self) -> &'static str {
        match self {
            Lang::En => "as of",
            Lang::Fr => "au",
        }
    }
}

/// Pinned figures shown when the API cannot be reached. The deficit is
/// kept signed here, so a fallback renders with its minus sign while a
/// served figure (already a magnitude) does not.
pub fn fallback(metric: Metric) -> MetricValue {
    let (as_of, value) = match metric {
        Metric::NationalDebt => ("2025-Q1", 1_287_000_000_000.0),
        Metric::Deficit => ("2025-03-01", -23_000_000_000.0),
        Metric::Interest => ("2025-03-31", 34_000_000_000.0),
        Metric::Procurement => ("2025-05-01", 4_700_000_000.0),
        Metric::Payroll => ("2025-03-31", 12_000_000_000.0),
    };
    MetricValue {
        as_of: as_of.to_string(),
        value,
    }
}

/// Compact money formatting: billions with one decimal, millions with
/// none. The scale is chosen on the magnitude but the sign is kept.
pub fn fmt_compact(value: f64, lang: Lang) -> String {
    if value.abs() >= 1e9 {
        format!("{:.1}{}", value / 1e9, lang.billions_suffix())
    } else {
        format!("{:.0}{}", value / 1e6, lang.millions_suffix())
    }
}

/// One rendered badge line.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeRow {
    pub label: &'static str,
    pub value: String,
}

/// A full refresh: every row plus the newest reporting period seen.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeSnapshot {
    pub rows: Vec<BadgeRow>,
    pub as_of: String,
}

async fn try_fetch(
    client: &Client,
    base: &str,
    metric: Metric,
) -> std::result::Result<MetricValue, reqwest::Error> {
    let url = format!("{}/{}", base.trim_end_matches('/'), metric.endpoint());
    client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json::<MetricValue>()
        .await
}

/// Fetch one figure, falling back to the pinned value on any failure.
/// A failure never takes the other rows down with it.
pub async fn fetch_metric(client: &Client, base: &str, metric: Metric) -> MetricValue {
    match try_fetch(client, base, metric).await {
        Ok(value) => value,
        Err(e) => {
            warn!(metric = metric.as_str(), error = %e, "using fallback figure");
            fallback(metric)
        }
    }
}

/// Fetch all five figures concurrently and render them. The badge footer
/// shows the lexicographically newest non-empty `asOf` across the rows.
pub async fn refresh(client: &Client, base: &str, lang: Lang) -> BadgeSnapshot {
    let results = join_all(
        METRIC_ORDER
            .iter()
            .map(|&metric| fetch_metric(client, base, metric)),
    )
    .await;

    let mut newest = AS_OF_SENTINEL.to_string();
    let mut rows = Vec::with_capacity(METRIC_ORDER.len());
    for (metric, value) in METRIC_ORDER.iter().zip(results) {
        if !value.as_of.is_empty() && value.as_of > newest {
            newest = value.as_of.clone();
        }
        rows.push(BadgeRow {
            label: lang.label(*metric),
            value: fmt_compact(value.value, lang),
        });
    }

    BadgeSnapshot {
        rows,
        as_of: newest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::build_client;
    use warp::Filter;

    #[test]
    fn compact_formatting_picks_scale_by_magnitude() {
        assert_eq!(fmt_compact(1_287_000_000_000.0, Lang::En), "1287.0B");
        assert_eq!(fmt_compact(4_700_000_000.0, Lang::En), "4.7B");
        assert_eq!(fmt_compact(950_000_000.0, Lang::En), "950M");
        assert_eq!(fmt_compact(-23_000_000_000.0, Lang::En), "-23.0B");
        assert_eq!(fmt_compact(34_000_000_000.0, Lang::Fr), "34.0 G$");
        assert_eq!(fmt_compact(950_000_000.0, Lang::Fr), "950 M$");
    }

    #[test]
    fn language_tags_parse_loosely() {
        assert_eq!(Lang::parse("fr"), Lang::Fr);
        assert_eq!(Lang::parse("FR"), Lang::Fr);
        assert_eq!(Lang::parse("en"), Lang::En);
        assert_eq!(Lang::parse(""), Lang::En);
        assert_eq!(Lang::parse("de"), Lang::En);
    }

    #[tokio::test]
    async fn dead_api_renders_every_fallback() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        drop(listener);

        let client = build_client(Duration::from_secs(2)).expect("client");
        let snapshot = refresh(&client, &base, Lang::En).await;

        let values: Vec<&str> = snapshot.rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, ["-23.0B", "12.0B", "1287.0B", "34.0B", "4.7B"]);
        assert_eq!(snapshot.rows[0].label, "Budgetary Deficit");
        assert_eq!(snapshot.as_of, "2025-Q1");
    }

    #[tokio::test]
    async fn live_rows_and_fallback_rows_mix() {
        let deficit = warp::path("deficit").map(|| {
            warp::reply::json(&serde_json::json!({"asOf": "2025-Q2", "value": 3.0e10}))
        });
        let (addr, server) = warp::serve(deficit).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let client = build_client(Duration::from_secs(2)).expect("client");
        let snapshot = refresh(&client, &format!("http://{}", addr), Lang::En).await;

        // Served deficit is a magnitude; only the fallback carries a sign.
        assert_eq!(snapshot.rows[0].value, "30.0B");
        assert_eq!(snapshot.rows[1].value, "12.0B");
        assert_eq!(snapshot.as_of, "2025-Q2");
    }

    #[tokio::test]
    async fn french_rows_use_french_labels_and_suffixes() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        drop(listener);

        let client = build_client(Duration::from_secs(2)).expect("client");
        let snapshot = refresh(&client, &base, Lang::Fr).await;

        assert_eq!(snapshot.rows[0].label, "Déficit budgétaire");
        assert_eq!(snapshot.rows[0].value, "-23.0 G$");
        assert_eq!(snapshot.rows[2].label, "Dette nationale");
        assert_eq!(snapshot.rows[2].value, "1287.0 G$");
    }
}
