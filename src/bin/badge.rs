use anyhow::Result;
use fiscalmon::badge::{self, Lang, REFRESH_INTERVAL};
use fiscalmon::fetch::build_client;
use std::env;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

/// Terminal rendition of the fiscal badge: prints the five figures and the
/// newest reporting period, then refreshes on an interval. `--once` prints
/// a single snapshot and exits.
#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let base =
        env::var("FISCALMON_API_BASE").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let lang = Lang::parse(&env::var("FISCALMON_LANG").unwrap_or_default());
    let interval = env::var("FISCALMON_REFRESH_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(REFRESH_INTERVAL);
    let once = env::args().any(|arg| arg == "--once");

    let client = build_client(Duration::from_secs(10))?;

    loop {
        let snapshot = badge::refresh(&client, &base, lang).await;
        for row in &snapshot.rows {
            println!("{:<32} {:>10}", row.label, row.value);
        }
        println!("{} {}", lang.as_of_prefix(), snapshot.as_of);

        if once {
            break;
        }
        println!();
        tokio::time::sleep(interval).await;
    }

    Ok(())
}
