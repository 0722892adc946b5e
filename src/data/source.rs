//! Where the raw companies dataset comes from.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::{DataError, Result};

/// Default remote dataset: S&P 500 constituents with financials.
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/datasets/s-and-p-500-companies/master/data/constituents-financials.csv";

/// Sample table compiled into the binary.
pub const EMBEDDED_SAMPLE_CSV: &str = include_str!("../../assets/sample_companies.csv");

/// Encoding of a fetched dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Header row with the remote column names.
    Csv,
    /// Top-level array of objects keyed by the remote column names.
    Json,
}

impl SourceFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            other => Err(DataError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Undecoded dataset bytes plus their format.
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub format: SourceFormat,
    pub bytes: Vec<u8>,
}

/// Anything that can hand over a raw companies dataset.
pub trait DatasetSource {
    /// Human-readable origin, used in logs and the status bar.
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<RawDataset>;
}

impl<S: DatasetSource + ?Sized> DatasetSource for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch(&self) -> Result<RawDataset> {
        (**self).fetch()
    }
}

// ---------------------------------------------------------------------------
// Remote CSV
// ---------------------------------------------------------------------------

/// CSV downloaded over HTTP.
#[derive(Debug)]
pub struct RemoteCsv {
    url: String,
    client: reqwest::blocking::Client,
}

impl RemoteCsv {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("smartfin-lab/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl DatasetSource for RemoteCsv {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<RawDataset> {
        log::info!("Downloading companies dataset from {}", self.url);
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Http {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes()?.to_vec();
        log::debug!("Downloaded {} bytes", bytes.len());
        Ok(RawDataset {
            format: SourceFormat::Csv,
            bytes,
        })
    }
}

// ---------------------------------------------------------------------------
// Local file
// ---------------------------------------------------------------------------

/// CSV or JSON file on disk; format is picked by extension.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for LocalFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<RawDataset> {
        let format = SourceFormat::from_path(&self.path)?;
        let bytes = std::fs::read(&self.path)?;
        Ok(RawDataset { format, bytes })
    }
}

// ---------------------------------------------------------------------------
// Embedded sample
// ---------------------------------------------------------------------------

/// The compiled-in sample table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSample;

impl DatasetSource for EmbeddedSample {
    fn describe(&self) -> String {
        "embedded sample".to_string()
    }

    fn fetch(&self) -> Result<RawDataset> {
        Ok(RawDataset {
            format: SourceFormat::Csv,
            bytes: EMBEDDED_SAMPLE_CSV.as_bytes().to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// SourceSpec – configured choice of source
// ---------------------------------------------------------------------------

/// Which dataset source a session should read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Remote(String),
    File(PathBuf),
    Embedded,
}

impl SourceSpec {
    /// Build the concrete source.
    pub fn open(&self, timeout: Duration) -> Result<Box<dyn DatasetSource>> {
        Ok(match self {
            SourceSpec::Remote(url) => Box::new(RemoteCsv::new(url.clone(), timeout)?),
            SourceSpec::File(path) => Box::new(LocalFile::new(path.clone())),
            SourceSpec::Embedded => Box::new(EmbeddedSample),
        })
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Remote(url) => write!(f, "{url}"),
            SourceSpec::File(path) => write!(f, "{}", path.display()),
            SourceSpec::Embedded => write!(f, "embedded sample"),
        }
    }
}
