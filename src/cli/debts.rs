use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use super::{format::DebtsView, resolve_as_of, to_json, SourceArgs};
use crate::config::Config;
use crate::services::{Aggregator, DataLoaderService};
use crate::types::{DebtOwner, DebtRecord, DebtSummary, Result};

#[derive(Args, Debug)]
pub struct DebtsArgs {
    /// Overdue cut-off, e.g. 2025-02-20T00:00:00Z (default: now)
    #[arg(long, value_name = "TIMESTAMP")]
    pub as_of: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Debt totals split by who owes them
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DebtOverview {
    pub as_of: DateTime<Utc>,
    pub all: DebtSummary,
    pub customers: DebtSummary,
    pub dealers: DebtSummary,
    pub unassigned: u64,
}

impl DebtOverview {
    pub fn build(debts: &[DebtRecord], as_of: DateTime<Utc>) -> Self {
        let (customers, rest): (Vec<DebtRecord>, Vec<DebtRecord>) = debts
            .iter()
            .cloned()
            .partition(|d| matches!(d.owner(), DebtOwner::Customer(_)));
        let (dealers, unassigned): (Vec<DebtRecord>, Vec<DebtRecord>) = rest
            .into_iter()
            .partition(|d| matches!(d.owner(), DebtOwner::Dealer(_)));

        Self {
            as_of,
            all: Aggregator::debt_summary(debts, as_of),
            customers: Aggregator::debt_summary(&customers, as_of),
            dealers: Aggregator::debt_summary(&dealers, as_of),
            unassigned: unassigned.len() as u64,
        }
    }
}

impl DebtsArgs {
    pub fn run(self, config: &Config) -> Result<()> {
        let as_of = resolve_as_of(self.as_of.as_deref())?;
        let loader = DataLoaderService::new(self.source.resolve(config)?);

        let debts = loader.load_debts().unwrap_or_else(|| {
            tracing::warn!("debts unavailable, showing empty totals");
            Vec::new()
        });
        let overview = DebtOverview::build(&debts, as_of);

        if self.json {
            println!("{}", to_json(&overview)?);
        } else {
            print!("{}", DebtsView(&overview));
        }
        Ok(())
    }
}
