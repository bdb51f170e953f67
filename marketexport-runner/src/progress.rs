//! Progress reporting for export runs.

use marketexport_core::domain::{ExchangeCode, Ticker};

use crate::orchestrator::{ExchangeOutcome, OpCounts, RunReport};
use crate::summary::RunMode;

/// Callback for reporting export progress.
pub trait ExportProgress: Send + Sync {
    /// Called once before the first exchange.
    fn on_run_start(&self, mode: RunMode, exchanges: usize);

    /// Called when an exchange's own files are about to be fetched.
    fn on_exchange_start(&self, exchange: &ExchangeCode, index: usize, total: usize);

    /// Called before a stock's files are fetched.
    fn on_stock_start(&self, exchange: &ExchangeCode, ticker: &Ticker, index: usize, total: usize);

    /// Called when every file of a stock has been attempted.
    fn on_stock_complete(&self, exchange: &ExchangeCode, ticker: &Ticker, outcome: &OpCounts);

    /// Called when an exchange and all of its stocks are done.
    fn on_exchange_complete(&self, exchange: &ExchangeCode, outcome: &ExchangeOutcome);

    /// Called once after the summary entry has been written (or failed to be).
    fn on_run_complete(&self, report: &RunReport);
}

/// Prints one line per event to stdout.
pub struct StdoutProgress;

impl ExportProgress for StdoutProgress {
    fn on_run_start(&self, mode: RunMode, exchanges: usize) {
        println!("Starting {mode} export of {exchanges} exchange(s)");
    }

    fn on_exchange_start(&self, exchange: &ExchangeCode, index: usize, total: usize) {
        println!("\n[{}/{}] Exchange {exchange}", index + 1, total);
    }

    fn on_stock_start(&self, _exchange: &ExchangeCode, ticker: &Ticker, index: usize, total: usize) {
        println!("  [{}/{}] {ticker}...", index + 1, total);
    }

    fn on_stock_complete(&self, _exchange: &ExchangeCode, ticker: &Ticker, outcome: &OpCounts) {
        if outcome.failed == 0 {
            println!("    OK: {ticker} ({}/{} updated)", outcome.updated, outcome.attempted);
        } else {
            println!(
                "    PARTIAL: {ticker} ({}/{} updated, {} failed)",
                outcome.updated, outcome.attempted, outcome.failed
            );
        }
    }

    fn on_exchange_complete(&self, exchange: &ExchangeCode, outcome: &ExchangeOutcome) {
        println!(
            "  {exchange}: {} stock(s), {}/{} stock updates, {}/{} exchange files",
            outcome.stocks,
            outcome.counts.updated,
            outcome.counts.attempted,
            outcome.exchange_files.updated,
            outcome.exchange_files.attempted
        );
    }

    fn on_run_complete(&self, report: &RunReport) {
        println!(
            "\nExport complete: {}/{} stock updates ({:.2}%), {} exchange(s) processed, {} failure(s), {:.1}s",
            report.total_updates,
            report.total_possible,
            report.update_rate_percent(),
            report.exchanges_updated,
            report.failures.len(),
            report.duration.as_secs_f64()
        );
        if let Some(err) = &report.summary_error {
            println!("WARNING: summary entry was not written: {err}");
        }
    }
}

/// Reports nothing.
pub struct SilentProgress;

impl ExportProgress for SilentProgress {
    fn on_run_start(&self, _mode: RunMode, _exchanges: usize) {}
    fn on_exchange_start(&self, _exchange: &ExchangeCode, _index: usize, _total: usize) {}
    fn on_stock_start(&self, _exchange: &ExchangeCode, _ticker: &Ticker, _index: usize, _total: usize) {}
    fn on_stock_complete(&self, _exchange: &ExchangeCode, _ticker: &Ticker, _outcome: &OpCounts) {}
    fn on_exchange_complete(&self, _exchange: &ExchangeCode, _outcome: &ExchangeOutcome) {}
    fn on_run_complete(&self, _report: &RunReport) {}
}
