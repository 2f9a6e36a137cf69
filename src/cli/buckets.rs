use clap::builder::RangedU64ValueParser;
use clap::Args;

use super::{format::BucketsView, resolve_as_of, to_json};
use crate::config::{Config, MAX_WINDOW};
use crate::types::{Granularity, Result};

#[derive(Args, Debug)]
pub struct BucketsArgs {
    /// Bucket granularity: week, month, year
    #[arg(long, default_value = "month")]
    pub granularity: Granularity,

    /// Number of buckets (default from config)
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(0..=MAX_WINDOW as u64))]
    pub count: Option<usize>,

    /// Window end, e.g. 2025-02-20T00:00:00Z (default: now)
    #[arg(long, value_name = "TIMESTAMP")]
    pub as_of: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl BucketsArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let as_of = resolve_as_of(self.as_of.as_deref())?;
        let count = self
            .count
            .unwrap_or_else(|| config.window(self.granularity));
        let buckets = config.bucket_plan()?.buckets(self.granularity, count, as_of);

        if self.json {
            println!("{}", to_json(&buckets)?);
        } else {
            print!("{}", BucketsView(&buckets));
        }
        Ok(())
    }
}
