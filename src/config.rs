use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::scoring::ConfidenceMode;

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub command: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub cache_path: PathBuf,
    pub scraper: ScraperSettings,
    pub confidence_mode: ConfidenceMode,
}

/// Options shared by every subcommand; each falls back to an environment
/// variable.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Event cache written by the scraper
    #[arg(long, global = true, env = "PIXANA_CACHE_PATH", default_value = "events_cache.json")]
    pub cache: PathBuf,

    /// Command that runs the scraper and prints events as JSON on stdout
    #[arg(long, global = true, env = "PIXANA_SCRAPER_CMD", default_value = "python parser.py")]
    pub scraper_cmd: String,

    #[arg(long, global = true, env = "PIXANA_SCRAPER_TIMEOUT_SECS", default_value_t = 120)]
    pub scraper_timeout_secs: u64,

    /// `random` redraws confidence on every load, `seeded` keys it by event id
    #[arg(long, global = true, env = "PIXANA_CONFIDENCE_MODE", default_value = "random")]
    pub confidence_mode: ConfidenceMode,
}

impl From<GlobalArgs> for Settings {
    fn from(args: GlobalArgs) -> Self {
        Self {
            cache_path: args.cache,
            scraper: ScraperSettings {
                command: args.scraper_cmd,
                timeout: Duration::from_secs(args.scraper_timeout_secs.max(1)),
            },
            confidence_mode: args.confidence_mode,
        }
    }
}
