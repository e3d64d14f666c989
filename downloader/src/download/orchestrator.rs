//! Sequential multi-symbol download

use crate::data::{CsvStorage, SavedFile};
use crate::download::{DateRange, DownloadError, DownloadResult, DownloadSummary, RetryPolicy, SeriesFetcher};
use crate::exchange::{ExchangeClient, Timeframe};
use chrono::{Local, NaiveDate};
use tokio::time::sleep;
use tracing::{error, info};

/// `BTC/USDT`, 4h, Binance, 2024-02-15 -> `BTCUSDT_4H_Binance_20240215.csv`
pub fn output_filename(symbol: &str, timeframe: Timeframe, exchange: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}_{}.csv",
        symbol.replace('/', ""),
        timeframe.upper(),
        exchange,
        date.format("%Y%m%d")
    )
}

/// Downloads symbols one after another and saves each series as CSV
pub struct BatchDownloader<C: ExchangeClient> {
    client: C,
    storage: CsvStorage,
    policy: RetryPolicy,
}

impl<C: ExchangeClient> BatchDownloader<C> {
    pub fn new(client: C, storage: CsvStorage, policy: RetryPolicy) -> Self {
        Self {
            client,
            storage,
            policy,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn storage(&self) -> &CsvStorage {
        &self.storage
    }

    pub fn fetcher(&self) -> SeriesFetcher<'_, C> {
        SeriesFetcher::new(&self.client, &self.policy)
    }

    /// Fetch one symbol and write it under a filename stamped with `today`
    pub async fn download_and_save(
        &self,
        symbol: &str,
        range: &DateRange,
        timeframe: Timeframe,
        today: NaiveDate,
    ) -> Result<SavedFile, DownloadError> {
        let series = self
            .fetcher()
            .fetch_series(symbol, range, timeframe)
            .await?
            .ok_or_else(|| DownloadError::NoData(symbol.to_string()))?;

        let filename = output_filename(symbol, timeframe, self.client.name(), today);
        Ok(self.storage.save(&series, &filename)?)
    }

    /// Attempt every symbol exactly once, in order.
    ///
    /// A failing symbol is recorded and the run moves on; retries happen
    /// only inside the fetcher.
    pub async fn run(&self, symbols: &[String], range: &DateRange, timeframe: Timeframe) -> Vec<DownloadResult> {
        info!(symbols = symbols.len(), %range, %timeframe, "starting batch download");
        let mut results = Vec::with_capacity(symbols.len());

        for (i, symbol) in symbols.iter().enumerate() {
            info!("[{}/{}] processing {}", i + 1, symbols.len(), symbol);
            let today = Local::now().date_naive();

            let result = match self.download_and_save(symbol, range, timeframe, today).await {
                Ok(saved) => DownloadResult::success(symbol.as_str(), saved.path),
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "symbol failed");
                    DownloadResult::failed(symbol.as_str(), e.to_string())
                }
            };
            results.push(result);

            if i + 1 < symbols.len() {
                sleep(self.policy.symbol_pause).await;
            }
        }

        DownloadSummary::new(&results).log();
        results
    }
}
