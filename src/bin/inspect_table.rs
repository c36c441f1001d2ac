use anyhow::{Context, Result};
use fiscalmon::config::Config;
use fiscalmon::extract::{parse_rows, table_csv_text};
use fiscalmon::fetch::build_client;
use fiscalmon::fetch::release::latest_tables_zip;
use fiscalmon::fetch::zips::download_zip;
use std::{env, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

/// Dump one table of the current release with row indexes, for checking
/// where a figure or the period label actually sits.
#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <TABLE_NUMBER>", args[0]);
        exit(1);
    }
    let table_number: u32 = args[1]
        .parse()
        .with_context(|| format!("table number {:?} is not a number", args[1]))?;

    let config = Config::from_env();
    let client = build_client(config.request_timeout)?;

    let resource = latest_tables_zip(&client, &config).await?;
    println!("release:  {} (created {})", resource.name, resource.created);
    println!("url:      {}", resource.url);

    let bytes = download_zip(&client, &resource.url).await?;
    println!("archive:  {} bytes", bytes.len());

    let text = table_csv_text(&bytes, table_number)
        .with_context(|| format!("extracting Table_{}", table_number))?;
    let rows = parse_rows(&text)?;
    println!("rows:     {}", rows.len());
    println!();

    for (i, row) in rows.iter().enumerate() {
        println!("[{:>3}] {:?}", i, row);
    }

    Ok(())
}
