use anyhow::Result;
use colored::Colorize;
use nse_decay_analyzer::analyzer::{self, AnalysisOutcome, AnalysisReport};
use nse_decay_analyzer::journal::{self, JournalEntry, LiquidityTuner, TradeJournal};
use nse_decay_analyzer::notify::{self, TelegramNotifier};
use nse_decay_analyzer::nse_client::NseClient;
use nse_decay_analyzer::scoring::ScoreParams;
use nse_decay_analyzer::{api_server_axum, config, logging};
use std::sync::Arc;
use std::time::Duration;

fn print_banner(title: &str) {
    println!("{}", "=".repeat(60).blue());
    println!("{}", title.green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();
}

fn print_report(report: &AnalysisReport) {
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Results".cyan().bold());
    println!("{}", "=".repeat(60).blue());
    println!("{} Symbol: {}", "✓".green(), report.symbol.yellow());
    println!("{} Expiry: {}", "✓".green(), report.expiry.yellow());
    println!("{} Timestamp: {}", "✓".green(), report.timestamp);
    println!("{} Spot: {:.2}", "✓".green(), report.spot);
    println!("{} ATM strike: {:.0}", "✓".green(), report.atm_strike);
    println!("{} Days to expiry: {}", "✓".green(), report.days_to_expiry);
    println!(
        "{} Aggregate bias: {}",
        "✓".green(),
        report.aggregate_bias.as_str().yellow()
    );
    println!("{} {}", "→".cyan(), report.recommendation.green().bold());
    println!();

    println!(
        "{:>8}  {:>4}  {:>10}  {:>10}  {:>10}  {:>10}  {:>14}",
        "Strike", "Side", "LTP", "Volume", "OI", "Conf", "Strategy"
    );
    for row in report.rows.iter().take(15) {
        println!(
            "{:>8.0}  {:>4}  {:>10.2}  {:>10.0}  {:>10.0}  {:>10.1}  {:>14}",
            row.strike,
            row.side.as_str(),
            row.last_price,
            row.volume,
            row.open_interest,
            row.confidence,
            row.strategy.as_str()
        );
    }
    println!();
}

fn print_outcome(outcome: &AnalysisOutcome) {
    match outcome {
        AnalysisOutcome::Report(report) => print_report(report),
        AnalysisOutcome::SpotOnly { symbol, spot } => {
            println!(
                "{} Option chain unavailable for {}; last close {:.2} (degraded mode)",
                "⚠".yellow(),
                symbol.yellow(),
                spot
            );
        }
        AnalysisOutcome::NoData { symbol } => {
            println!(
                "{} No usable option data for {} - try again later",
                "⚠".yellow(),
                symbol.yellow()
            );
        }
    }
}

/// Run one analysis pass and print it
async fn run_single(symbol: &str, expiry: &str) -> Result<()> {
    print_banner("NSE Decay-Bias Analyzer");

    let client = NseClient::new()?;
    let profile = config::profile_for(symbol);
    let params = ScoreParams::from(&profile);

    println!("{} Analyzing {}...", "→".cyan(), symbol.yellow());
    if !expiry.is_empty() {
        println!("{} Expiry: {}", "→".cyan(), expiry.yellow());
    }
    println!();

    let outcome = analyzer::analyze(&client, symbol, expiry, &params).await?;
    print_outcome(&outcome);

    Ok(())
}

/// Periodic refresh loop with last-good fallback, journal, threshold tuner,
/// and optional Telegram summaries.
async fn run_watch(symbol: &str, expiry: &str, refresh_secs: u64) -> Result<()> {
    print_banner("NSE Decay-Bias Watch");
    println!(
        "{} Refreshing {} every {}s (Ctrl-C to stop)",
        "ℹ".blue(),
        symbol.yellow(),
        refresh_secs
    );
    println!();

    let client = NseClient::new()?;
    let profile = config::profile_for(symbol);
    let notifier = Arc::new(TelegramNotifier::from_env());

    let mut journal = TradeJournal::new();
    let mut tuner = LiquidityTuner::new(profile.min_volume, profile.min_oi);
    let mut last_good: Option<AnalysisReport> = None;

    loop {
        let params = ScoreParams {
            min_volume: tuner.min_volume(),
            min_oi: tuner.min_oi(),
        };

        match analyzer::analyze(&client, symbol, expiry, &params).await {
            Ok(AnalysisOutcome::Report(report)) => {
                print_report(&report);

                let volumes: Vec<f64> = report.rows.iter().map(|r| r.volume).collect();
                let ois: Vec<f64> = report.rows.iter().map(|r| r.open_interest).collect();
                tuner.observe(journal::median(&volumes), journal::median(&ois));

                journal.record(JournalEntry {
                    recorded_at: chrono::Local::now(),
                    symbol: report.symbol.clone(),
                    expiry: report.expiry.clone(),
                    spot: report.spot,
                    bias: report.aggregate_bias,
                    recommendation: report.recommendation.clone(),
                    top_confidence: report.rows.first().map(|r| r.confidence).unwrap_or(0.0),
                });

                notify::send_detached(
                    Arc::clone(&notifier),
                    notify::summary_message(&report.symbol, &report.recommendation, &report.timestamp),
                );

                last_good = Some(report);
            }
            Ok(other) => {
                print_outcome(&other);
                if let Some(previous) = &last_good {
                    println!(
                        "{} Showing last good result from {}",
                        "ℹ".blue(),
                        previous.timestamp
                    );
                    print_report(previous);
                }
            }
            Err(e) => {
                // Abandon this cycle only; the loop itself never dies
                println!("{} Refresh failed: {}", "✗".red(), e);
                if let Some(previous) = &last_good {
                    println!(
                        "{} Showing last good result from {}",
                        "ℹ".blue(),
                        previous.timestamp
                    );
                }
            }
        }

        println!(
            "{} Cycles recorded: {}",
            "ℹ".blue(),
            journal.len()
        );
        tokio::time::sleep(Duration::from_secs(refresh_secs)).await;
    }
}

/// Run API server mode
async fn run_server(port: u16) -> Result<()> {
    print_banner("NSE Decay-Bias API Server");
    api_server_axum::start_server(port).await
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let mode = config::get_execution_mode();
    let symbol = config::get_symbol();
    if !config::NSE_INDICES.contains(&symbol.as_str()) {
        println!(
            "{} Unknown index '{}', scoring with default thresholds",
            "⚠".yellow(),
            symbol.yellow()
        );
    }
    let expiry = config::get_expiry();
    let port = config::get_port();
    let refresh_secs = config::get_refresh_secs();

    match mode.as_str() {
        "server" => run_server(port).await?,
        "single" => run_single(&symbol, &expiry).await?,
        "watch" => run_watch(&symbol, &expiry, refresh_secs).await?,
        _ => {
            eprintln!("Invalid mode '{}'. Use 'single', 'watch', or 'server'", mode);
            eprintln!("Set NSE_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  NSE_MODE=single NSE_SYMBOL=NIFTY cargo run");
            eprintln!("  NSE_MODE=single NSE_SYMBOL=BANKNIFTY NSE_EXPIRY=30-Dec-2025 cargo run");
            eprintln!("  NSE_MODE=watch NSE_SYMBOL=NIFTY NSE_REFRESH_SECS=60 cargo run");
            eprintln!("  NSE_MODE=server NSE_PORT=3001 cargo run");
            std::process::exit(1);
        }
    }

    Ok(())
}
