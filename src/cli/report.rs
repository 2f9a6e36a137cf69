use clap::builder::RangedU64ValueParser;
use clap::Args;

use super::{format::ReportView, resolve_as_of, to_json, SourceArgs};
use crate::config::{Config, MAX_WINDOW};
use crate::services::{DataLoaderService, ReportAssembler};
use crate::types::{Granularity, Result, Role};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Dashboard role: admin, evm-staff, dealer-manager, dealer-staff
    #[arg(long)]
    pub role: Role,

    /// Chart granularity: week, month, year
    #[arg(long, default_value = "month")]
    pub granularity: Granularity,

    /// Number of chart buckets (default from config)
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(0..=MAX_WINDOW as u64))]
    pub count: Option<usize>,

    /// Rows in ranking tables (default from config)
    #[arg(long)]
    pub top: Option<usize>,

    /// Report instant, e.g. 2025-02-20T00:00:00Z (default: now)
    #[arg(long, value_name = "TIMESTAMP")]
    pub as_of: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let as_of = resolve_as_of(self.as_of.as_deref())?;
        let loader = DataLoaderService::new(self.source.resolve(config)?);

        let mut assembler = ReportAssembler::from_config(config)?;
        if let Some(count) = self.count {
            assembler = assembler.with_window(self.granularity, count);
        }
        if let Some(top) = self.top {
            assembler = assembler.with_top_n(top);
        }

        let inputs = loader.load();
        let report = assembler.assemble(self.role, self.granularity, &inputs, as_of);

        if self.json {
            println!("{}", to_json(&report)?);
        } else {
            print!("{}", ReportView(&report));
        }
        Ok(())
    }
}
