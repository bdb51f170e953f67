//! Run orchestrator: one linear pass over every exchange and stock.
//!
//! Each file operation is attempted once. A fetch or store failure is logged,
//! recorded in the [`RunReport`] and counted as a skipped update; it never
//! stops the run. The summary entry is appended at the end regardless.
//!
//! The run totals cover the four files of each stock. Index and
//! listed-companies operations are tallied apart in
//! [`RunReport::exchange_files`].

use chrono::{DateTime, Local};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

use marketexport_core::data::{ExchangeRegistry, FetchError, MarketDataProvider};
use marketexport_core::domain::{collect_tickers, latest_point, ExchangeCode, PricePoint, SectionKind, Ticker};
use marketexport_core::pacing::{Batcher, PacingPolicy, Pause, ThreadSleep};
use marketexport_core::store::{
    append_price_point, append_price_points, layout, read_listed_companies, replace_section,
    AppendOutcome, DocumentStore, StoreError,
};

use crate::progress::{ExportProgress, SilentProgress};
use crate::summary::{update_rate, RunMode, SummaryEntry, SummaryLog};

/// Which file of an entity an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    IndexPrice,
    ListedCompanies,
    StockPrice,
    Section(SectionKind),
}

impl Stage {
    /// Index price and listed companies belong to the exchange, not a stock.
    pub fn is_exchange_file(self) -> bool {
        matches!(self, Stage::IndexPrice | Stage::ListedCompanies)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::IndexPrice => f.write_str("index price"),
            Stage::ListedCompanies => f.write_str("listed companies"),
            Stage::StockPrice => f.write_str("stock price"),
            Stage::Section(kind) => write!(f, "{kind}"),
        }
    }
}

/// Failure of a single file operation.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StageError {
    pub fn reason(&self) -> &'static str {
        match self {
            StageError::Fetch(e) => e.reason(),
            StageError::Store(_) => "io",
        }
    }
}

/// A skipped update, kept for the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFailure {
    /// `jse` for exchange files, `jse/NPN` for stock files.
    pub entity: String,
    pub stage: Stage,
    pub message: String,
}

/// File operations attempted, operations that changed a file, and failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub attempted: usize,
    pub updated: usize,
    pub failed: usize,
}

impl OpCounts {
    fn since(self, earlier: OpCounts) -> OpCounts {
        OpCounts {
            attempted: self.attempted - earlier.attempted,
            updated: self.updated - earlier.updated,
            failed: self.failed - earlier.failed,
        }
    }
}

/// Per-exchange totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExchangeOutcome {
    pub stocks: usize,
    /// Stock file operations of this exchange.
    pub counts: OpCounts,
    /// The exchange's own index and listed-companies operations.
    pub exchange_files: OpCounts,
}

/// Result of one run.
#[derive(Debug)]
pub struct RunReport {
    pub mode: RunMode,
    pub started: DateTime<Local>,
    pub duration: Duration,
    pub exchanges: Vec<ExchangeCode>,
    /// Exchanges processed, whatever happened to their files.
    pub exchanges_updated: usize,
    /// Stock files changed.
    pub total_updates: usize,
    /// Stock files attempted: four per listed stock.
    pub total_possible: usize,
    /// Index and listed-companies operations, outside the totals.
    pub exchange_files: OpCounts,
    pub failures: Vec<EntityFailure>,
    /// Set when the summary entry could not be written.
    pub summary_error: Option<StoreError>,
}

impl RunReport {
    pub fn update_rate_percent(&self) -> f64 {
        update_rate(self.total_updates, self.total_possible)
    }

    pub fn summary_entry(&self) -> SummaryEntry {
        SummaryEntry {
            timestamp: self.started,
            mode: self.mode,
            exchanges_updated: self.exchanges_updated,
            total_updates: self.total_updates,
            total_possible: self.total_possible,
            update_rate_percent: self.update_rate_percent(),
            duration_seconds: self.duration.as_secs_f64(),
            exchanges: self.exchanges.clone(),
        }
    }
}

/// Running tally of a pass.
#[derive(Default)]
struct Ledger {
    stock_files: OpCounts,
    exchange_files: OpCounts,
    failures: Vec<EntityFailure>,
}

impl Ledger {
    /// Count one file operation. `op` yields whether a file changed.
    fn attempt<T>(
        &mut self,
        entity: &str,
        stage: Stage,
        op: impl FnOnce() -> Result<(bool, T), StageError>,
    ) -> Option<T> {
        let result = op();
        let counts = if stage.is_exchange_file() {
            &mut self.exchange_files
        } else {
            &mut self.stock_files
        };
        counts.attempted += 1;
        match result {
            Ok((changed, value)) => {
                if changed {
                    counts.updated += 1;
                }
                Some(value)
            }
            Err(err) => {
                counts.failed += 1;
                self.note(entity, stage, err);
                None
            }
        }
    }

    /// Record a failure that is not itself a file operation.
    fn note(&mut self, entity: &str, stage: Stage, err: StageError) {
        tracing::warn!(entity, stage = %stage, reason = err.reason(), error = %err, "update skipped");
        self.failures.push(EntityFailure {
            entity: entity.to_string(),
            stage,
            message: err.to_string(),
        });
    }
}

/// Drives a full or incremental export over a registry of exchanges.
pub struct Exporter<'a> {
    provider: &'a dyn MarketDataProvider,
    store: &'a dyn DocumentStore,
    registry: &'a ExchangeRegistry,
    exchange_pacing: PacingPolicy,
    stock_pacing: PacingPolicy,
    pause: &'a dyn Pause,
    progress: &'a dyn ExportProgress,
}

impl<'a> Exporter<'a> {
    /// Default pacing, real sleeps, no progress output.
    pub fn new(
        provider: &'a dyn MarketDataProvider,
        store: &'a dyn DocumentStore,
        registry: &'a ExchangeRegistry,
    ) -> Self {
        Self {
            provider,
            store,
            registry,
            exchange_pacing: PacingPolicy::default(),
            stock_pacing: PacingPolicy::default(),
            pause: &ThreadSleep,
            progress: &SilentProgress,
        }
    }

    pub fn with_pacing(mut self, exchanges: PacingPolicy, stocks: PacingPolicy) -> Self {
        self.exchange_pacing = exchanges;
        self.stock_pacing = stocks;
        self
    }

    pub fn with_pause(mut self, pause: &'a dyn Pause) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ExportProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Run one pass and append its summary entry.
    pub fn run(&self, mode: RunMode) -> RunReport {
        let started = Local::now();
        let clock = Instant::now();
        let exchanges = self.registry.exchanges();

        tracing::info!(%mode, exchanges = exchanges.len(), provider = self.provider.name(), "export started");
        self.progress.on_run_start(mode, exchanges.len());

        let mut ledger = Ledger::default();
        let mut exchanges_updated = 0;

        Batcher::new(self.exchange_pacing, self.pause).run(exchanges, |pos, exchange| {
            self.progress.on_exchange_start(&exchange.code, pos.index, pos.total);
            let outcome = self.export_exchange(mode, &exchange.code, &mut ledger);
            exchanges_updated += 1;
            tracing::info!(
                exchange = %exchange.code,
                batch = pos.batch,
                stocks = outcome.stocks,
                updated = outcome.counts.updated,
                attempted = outcome.counts.attempted,
                failed = outcome.counts.failed,
                exchange_files_updated = outcome.exchange_files.updated,
                exchange_files_failed = outcome.exchange_files.failed,
                "exchange done"
            );
            self.progress.on_exchange_complete(&exchange.code, &outcome);
        });

        let mut report = RunReport {
            mode,
            started,
            duration: clock.elapsed(),
            exchanges: self.registry.codes(),
            exchanges_updated,
            total_updates: ledger.stock_files.updated,
            total_possible: ledger.stock_files.attempted,
            exchange_files: ledger.exchange_files,
            failures: ledger.failures,
            summary_error: None,
        };

        match SummaryLog::new(self.store).append_entry(&report.summary_entry()) {
            Ok(entries) => tracing::info!(
                %mode,
                total_updates = report.total_updates,
                total_possible = report.total_possible,
                update_rate_percent = report.update_rate_percent(),
                exchanges_updated = report.exchanges_updated,
                failures = report.failures.len(),
                duration_seconds = report.duration.as_secs_f64(),
                entries,
                "export finished"
            ),
            Err(err) => {
                tracing::error!(error = %err, "failed to append summary entry");
                report.summary_error = Some(err);
            }
        }

        self.progress.on_run_complete(&report);
        report
    }

    fn export_exchange(&self, mode: RunMode, code: &ExchangeCode, ledger: &mut Ledger) -> ExchangeOutcome {
        let (stocks_before, exchange_before) = (ledger.stock_files, ledger.exchange_files);
        let tickers = match mode {
            RunMode::Full => self.refresh_exchange(code, ledger),
            RunMode::Incremental => self.update_exchange(code, ledger),
        };

        Batcher::new(self.stock_pacing, self.pause).run(&tickers, |pos, ticker| {
            self.progress.on_stock_start(code, ticker, pos.index, pos.total);
            let counts = self.export_stock(mode, code, ticker, ledger);
            self.progress.on_stock_complete(code, ticker, &counts);
        });

        ExchangeOutcome {
            stocks: tickers.len(),
            counts: ledger.stock_files.since(stocks_before),
            exchange_files: ledger.exchange_files.since(exchange_before),
        }
    }

    /// Full mode: replace the listed companies, append the whole index
    /// history. Returns the freshly listed tickers.
    fn refresh_exchange(&self, code: &ExchangeCode, ledger: &mut Ledger) -> Vec<Ticker> {
        let entity = code.to_string();

        let companies = ledger.attempt(&entity, Stage::ListedCompanies, || {
            let companies = self.provider.listed_companies(code)?;
            replace_section(self.store, &layout::listed_companies(code), &companies)?;
            Ok((true, companies))
        });

        ledger.attempt(&entity, Stage::IndexPrice, || {
            let points = self.provider.index_prices(code)?;
            let added = append_price_points(self.store, &layout::index_price(code), &points)?;
            Ok((added > 0, ()))
        });

        companies.map(|c| collect_tickers(&c)).unwrap_or_default()
    }

    /// Incremental mode: append the latest index point. Returns the tickers
    /// of the stored listed-companies snapshot.
    fn update_exchange(&self, code: &ExchangeCode, ledger: &mut Ledger) -> Vec<Ticker> {
        let entity = code.to_string();

        ledger.attempt(&entity, Stage::IndexPrice, || {
            let latest = self.latest(self.provider.index_prices(code)?, &entity)?;
            let outcome = append_price_point(self.store, &layout::index_price(code), latest)?;
            Ok((outcome == AppendOutcome::Appended, ()))
        });

        match read_listed_companies(self.store, code) {
            Ok(companies) if companies.is_empty() => {
                tracing::warn!(exchange = %code, "no stored listed companies, run a full export first");
                Vec::new()
            }
            Ok(companies) => collect_tickers(&companies),
            Err(err) => {
                ledger.note(&entity, Stage::ListedCompanies, err.into());
                Vec::new()
            }
        }
    }

    fn export_stock(&self, mode: RunMode, code: &ExchangeCode, ticker: &Ticker, ledger: &mut Ledger) -> OpCounts {
        let before = ledger.stock_files;
        let entity = format!("{code}/{ticker}");
        let price_path = layout::stock_price(code, ticker);

        ledger.attempt(&entity, Stage::StockPrice, || {
            let points = self.provider.stock_prices(code, ticker)?;
            let changed = match mode {
                RunMode::Full => append_price_points(self.store, &price_path, &points)? > 0,
                RunMode::Incremental => {
                    let latest = self.latest(points, &entity)?;
                    append_price_point(self.store, &price_path, latest)? == AppendOutcome::Appended
                }
            };
            Ok((changed, ()))
        });

        for kind in SectionKind::ALL {
            ledger.attempt(&entity, Stage::Section(kind), || {
                let records = self.provider.stock_section(code, ticker, kind)?;
                replace_section(self.store, &layout::stock_section(code, ticker, kind), &records)?;
                Ok((true, ()))
            });
        }

        ledger.stock_files.since(before)
    }

    fn latest(&self, points: Vec<PricePoint>, entity: &str) -> Result<PricePoint, FetchError> {
        latest_point(&points).ok_or_else(|| FetchError::NoData {
            entity: entity.to_string(),
        })
    }
}
