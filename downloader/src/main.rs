use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use ohlcv_downloader::prelude::{
    choose_preset, confirm, select_connection, BatchDownloader, Config, CsvStorage, DatePreset,
    DownloadSummary, ExchangeClient, RetryPolicy,
};
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Render the unix-seconds `BUILD_TIME` stamp, keeping the raw value if it
/// does not parse
fn build_time_label(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => "unknown".to_string(),
    }
}

fn banner() {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!(
        "OHLCV downloader v{} ({} @ {}, built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or("unknown"),
        option_env!("GIT_BRANCH").unwrap_or("unknown"),
        build_time_label(option_env!("BUILD_TIME")),
    );
    println!("{}", rule);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    banner();
    let config = Config::from_env().context("failed to load configuration")?;

    // one-shot: the chosen connection is used for the whole run
    let (client, profile) = select_connection(&config.connection_profiles(), &config.probe_symbol)
        .await
        .context("all connection profiles failed, check network or proxy settings")?;
    println!("Connected via {}\n", profile.label);

    println!("Symbols: {}", config.symbols.join(", "));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let preset = match &config.date_preset {
        Some(choice) => DatePreset::from_choice(choice),
        None => choose_preset(&mut input, &mut output)?,
    };
    let range = preset.range(Local::now().date_naive())?;

    println!("\nRange:     {}", range);
    println!("Timeframe: {}", config.timeframe);

    if !config.assume_yes && !confirm(&mut input, &mut output, "Start download?")? {
        println!("Cancelled");
        return Ok(());
    }
    output.flush()?;

    let storage = CsvStorage::new(&config.data_dir);
    storage
        .ensure_dir()
        .with_context(|| format!("cannot create {}", config.data_dir.display()))?;

    tracing::info!(exchange = client.name(), profile = %profile.label, "starting download");
    let started = Instant::now();
    let downloader = BatchDownloader::new(client, storage, RetryPolicy::default());
    let results = downloader.run(&config.symbols, &range, config.timeframe).await;

    println!("\n{}", DownloadSummary::new(&results));
    println!("Elapsed: {:.1}s", started.elapsed().as_secs_f64());
    println!("Data saved in: {}/", config.data_dir.display());

    Ok(())
}
