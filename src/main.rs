use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pixana_dashboard::config::{GlobalArgs, Settings};
use pixana_dashboard::models::MetricSet;
use pixana_dashboard::state::DashboardState;
use pixana_dashboard::{cache, chat, collector, report};

#[derive(Parser)]
#[command(name = "pixana-dashboard")]
#[command(about = "Sales dashboard for collected construction-materials deals", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scraper and merge new events into the cache
    Collect,
    /// Merge events from a CSV file into the cache
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Write the cached events as CSV
    Export {
        #[arg(long, default_value = "events.csv")]
        out: PathBuf,
    },
    /// Show the KPI set
    Metrics,
    /// Show events per day for one week
    Trend {
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        week_offset: i32,
    },
    /// List events, newest first
    Events {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        week_offset: i32,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print the chat request the assistant would send for a message
    ChatRequest {
        #[arg(long)]
        message: String,
        #[arg(long, default_value = chat::DEFAULT_MODEL)]
        model: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pixana_dashboard=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_state(settings: &Settings) -> anyhow::Result<DashboardState> {
    let cached = cache::load(&settings.cache_path)
        .with_context(|| format!("failed to load {}", settings.cache_path.display()))?;
    let mut state = DashboardState::new(settings.confidence_mode);
    state.load_snapshot(cached);
    Ok(state)
}

fn print_metrics(metrics: &MetricSet) {
    for metric in &metrics.metrics {
        println!(
            "- {} [{}]: {} ({:+.1}%)",
            metric.title,
            metric.key.as_str(),
            metric.value,
            metric.change
        );
    }
}

fn select_week(state: &mut DashboardState, week_offset: i32) -> anyhow::Result<()> {
    if week_offset > 0 {
        bail!("--week-offset must be 0 or negative; future weeks are not shown");
    }
    state.set_week_offset(week_offset);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let settings = Settings::from(cli.global);
    debug!(?settings, "resolved settings");

    let mut state = load_state(&settings)?;

    match cli.command {
        Commands::Collect => {
            let ticket = state.begin_collection();
            let collected = collector::collect(&settings.scraper)
                .await
                .context("collection run failed")?;
            let found = collected.len();

            state.apply_collected(ticket, collected);
            cache::save(&settings.cache_path, state.events())?;

            println!(
                "Collection finished: {found} new events, {} in total.",
                state.events().len()
            );
            print_metrics(state.metrics());
        }
        Commands::Import { csv } => {
            let imported = cache::import_csv(&csv)
                .with_context(|| format!("failed to import {}", csv.display()))?;
            let count = imported.len();
            state.merge_incoming(imported);
            cache::save(&settings.cache_path, state.events())?;
            println!("Imported {count} events from {}.", csv.display());
        }
        Commands::Export { out } => {
            let written = cache::export_csv(&out, state.events())?;
            println!("Exported {written} events to {}.", out.display());
        }
        Commands::Metrics => {
            print_metrics(state.metrics());
        }
        Commands::Trend { week_offset } => {
            select_week(&mut state, week_offset)?;
            println!("Demand trend, {}:", state.week_window().title());
            for bucket in state.trend() {
                println!("- {} {}: {}", bucket.label, bucket.date_key, bucket.count);
            }
        }
        Commands::Events { filter, limit } => {
            let events = match filter.as_deref() {
                Some(query) => state.filter_events(query),
                None => state.events().iter().collect(),
            };

            if events.is_empty() {
                println!("No events found.");
                return Ok(());
            }

            for event in events.iter().take(limit) {
                println!(
                    "- #{} {} for {} ({}), {} on {} [{} {}%]",
                    event.id,
                    event.product,
                    event.company,
                    event.region,
                    event.volume,
                    event.event_date,
                    event.status.label(),
                    event.confidence.unwrap_or(0)
                );
            }
        }
        Commands::Report { week_offset, out } => {
            select_week(&mut state, week_offset)?;
            let report = report::build_report(
                Local::now().date_naive(),
                &state.week_window(),
                state.metrics(),
                &state.trend(),
                state.events(),
                state.hot_events(),
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::ChatRequest { message, model } => {
            let mut conversation = chat::Conversation::new(state.events(), Local::now().date_naive())?;
            conversation.push_user(message);
            let body = serde_json::to_string_pretty(&conversation.request(&model))?;
            println!("{body}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixana_dashboard::scoring::ConfidenceMode;

    fn week_offset_of(args: &[&str]) -> i32 {
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Trend { week_offset } | Commands::Report { week_offset, .. } => week_offset,
            _ => panic!("expected a week-based command"),
        }
    }

    #[test]
    fn past_week_offsets_are_selected() {
        let offset = week_offset_of(&["pixana-dashboard", "trend", "--week-offset", "-2"]);
        assert_eq!(offset, -2);

        let mut state = DashboardState::new(ConfidenceMode::Seeded);
        select_week(&mut state, offset).unwrap();
        assert_eq!(state.week_offset(), -2);
    }

    #[test]
    fn future_week_offsets_are_rejected() {
        let offset = week_offset_of(&["pixana-dashboard", "report", "--week-offset", "1"]);
        assert_eq!(offset, 1);

        let mut state = DashboardState::new(ConfidenceMode::Seeded);
        let err = select_week(&mut state, offset).unwrap_err();
        assert!(err.to_string().contains("--week-offset"));
        assert_eq!(state.week_offset(), 0);
    }
}
