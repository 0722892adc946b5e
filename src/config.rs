use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::data::source::{DEFAULT_DATASET_URL, SourceSpec};

/// Command-line / environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "smartfin-lab", version, about = "Desktop stock screener")]
pub struct Config {
    /// Remote CSV with Symbol, Name, Sector, Market Cap, Price/Earnings and Dividend Yield columns.
    #[arg(long, env = "SMARTFIN_DATASET_URL", default_value = DEFAULT_DATASET_URL)]
    pub dataset_url: String,

    /// Local `.csv` or `.json` dataset; takes precedence over the URL.
    #[arg(long, env = "SMARTFIN_DATASET_FILE")]
    pub dataset_file: Option<PathBuf>,

    /// Use the embedded sample table instead of any other source.
    #[arg(long, env = "SMARTFIN_SAMPLE")]
    pub sample: bool,

    /// Maximum number of result rows shown.
    #[arg(long, default_value_t = 100)]
    pub display_limit: usize,

    /// Timeout for dataset and quote requests.
    #[arg(long, default_value_t = 20)]
    pub http_timeout_secs: u64,

    /// Days of closing prices shown for a looked-up ticker.
    #[arg(long, default_value_t = 182)]
    pub history_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            dataset_file: None,
            sample: false,
            display_limit: 100,
            http_timeout_secs: 20,
            history_days: 182,
        }
    }
}

impl Config {
    /// Embedded sample, then local file, then remote URL.
    pub fn source_spec(&self) -> SourceSpec {
        if self.sample {
            SourceSpec::Embedded
        } else if let Some(path) = &self.dataset_file {
            SourceSpec::File(path.clone())
        } else {
            SourceSpec::Remote(self.dataset_url.clone())
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_remote_dataset() {
        let config = Config::try_parse_from(["smartfin-lab"]).unwrap();
        assert_eq!(config.display_limit, 100);
        assert_eq!(config.history_days, 182);
        assert_eq!(config.http_timeout(), Duration::from_secs(20));
        // The env vars may be set on a developer machine; only assert when they are not.
        if std::env::var_os("SMARTFIN_SAMPLE").is_none()
            && std::env::var_os("SMARTFIN_DATASET_FILE").is_none()
            && std::env::var_os("SMARTFIN_DATASET_URL").is_none()
        {
            assert_eq!(
                config.source_spec(),
                SourceSpec::Remote(DEFAULT_DATASET_URL.to_string())
            );
        }
    }

    #[test]
    fn sample_wins_over_file_and_url() {
        let config = Config::try_parse_from([
            "smartfin-lab",
            "--sample",
            "--dataset-file",
            "companies.csv",
        ])
        .unwrap();
        assert_eq!(config.source_spec(), SourceSpec::Embedded);
    }

    #[test]
    fn file_wins_over_url() {
        let config = Config {
            dataset_file: Some(PathBuf::from("companies.json")),
            ..Config::default()
        };
        assert_eq!(
            config.source_spec(),
            SourceSpec::File(PathBuf::from("companies.json"))
        );
    }
}
