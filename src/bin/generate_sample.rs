use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use smartfin_lab::data::model::KNOWN_SECTORS;

/// Write a synthetic companies CSV in the remote dataset's schema.
#[derive(Debug, Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output path.
    #[arg(long, default_value = "sample_companies.csv")]
    output: PathBuf,

    /// Number of companies.
    #[arg(long, default_value_t = 1000)]
    count: usize,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// One row, with the remote column names.
#[derive(Debug, Serialize)]
struct SourceRow {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Sector")]
    sector: &'static str,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Price/Earnings")]
    pe_ratio: Option<f64>,
    #[serde(rename = "Dividend Yield")]
    dividend_yield: Option<f64>,
    #[serde(rename = "Market Cap")]
    market_cap: Option<f64>,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Two-decimal rounding, as the published dataset does.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Four-letter base-26 ticker: 0 → "AAAA", 1 → "AAAB", …
fn ticker(mut index: usize) -> String {
    let mut letters = [b'A'; 4];
    for slot in letters.iter_mut().rev() {
        *slot = b'A' + (index % 26) as u8;
        index /= 26;
    }
    letters.iter().map(|&b| char::from(b)).collect()
}

fn generate_row(i: usize, rng: &mut SimpleRng) -> SourceRow {
    let sector = KNOWN_SECTORS[(rng.next_u64() % KNOWN_SECTORS.len() as u64) as usize];

    // Log-uniform between 100M and 3T so every bracket is populated.
    let market_cap = 10f64.powf(rng.range(8.0, 12.5)).round();
    let pe_ratio = if rng.chance(0.1) {
        -rng.range(1.0, 60.0)
    } else {
        rng.range(3.0, 80.0)
    };
    let dividend_yield = if rng.chance(0.3) { 0.0 } else { rng.range(0.1, 8.0) };

    SourceRow {
        symbol: ticker(i),
        name: format!("{sector} Company {i}"),
        sector,
        price: round2(rng.range(2.0, 900.0)),
        // A few incomplete rows so the loader's dropping is exercised.
        pe_ratio: (!rng.chance(0.03)).then_some(round2(pe_ratio)),
        dividend_yield: (!rng.chance(0.02)).then_some(round2(dividend_yield)),
        market_cap: (!rng.chance(0.01)).then_some(market_cap),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for i in 0..args.count {
        writer
            .serialize(generate_row(i, &mut rng))
            .with_context(|| format!("writing row {i}"))?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {} companies to {}", args.count, args.output.display());
    Ok(())
}
