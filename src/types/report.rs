//! Reporting types: time buckets and the dashboard view-model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{DealerSales, Staff};

/// Reporting granularity for time-bucketed charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Week,
    #[default]
    Month,
    Year,
}

impl Granularity {
    /// Number of buckets dashboards show by default
    pub fn default_count(&self) -> usize {
        match self {
            Self::Week | Self::Month => 12,
            Self::Year => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Week => "Weekly",
            Self::Month => "Monthly",
            Self::Year => "Yearly",
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            other => Err(format!(
                "unknown granularity '{}' (expected week, month or year)",
                other
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        })
    }
}

/// Half-open reporting interval `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Display-only label
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Bucket {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// Portal role a dashboard is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    EvmStaff,
    DealerManager,
    DealerStaff,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "admin" => Ok(Self::Admin),
            "evm-staff" | "evm" => Ok(Self::EvmStaff),
            "dealer-manager" | "manager" => Ok(Self::DealerManager),
            "dealer-staff" | "staff" => Ok(Self::DealerStaff),
            other => Err(format!(
                "unknown role '{}' (expected admin, evm-staff, dealer-manager or dealer-staff)",
                other
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::EvmStaff => "evm-staff",
            Self::DealerManager => "dealer-manager",
            Self::DealerStaff => "dealer-staff",
        })
    }
}

/// Debt totals over a set of records
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DebtSummary {
    pub total_due: f64,
    pub total_paid: f64,
    /// May be negative when records are overpaid
    pub total_remaining: f64,
    pub overdue_count: u64,
    pub overdue_remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Currency,
    Count,
    Percent,
}

/// One stats card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatEntry {
    pub label: String,
    pub value: f64,
    pub kind: StatKind,
}

impl StatEntry {
    pub fn currency(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
            kind: StatKind::Currency,
        }
    }

    pub fn count(label: &str, value: u64) -> Self {
        Self {
            label: label.to_string(),
            value: value as f64,
            kind: StatKind::Count,
        }
    }

    pub fn percent(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
            kind: StatKind::Percent,
        }
    }
}

/// Named chart series; `labels` and `values` have equal length
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Complete view-model for one role dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardReport {
    pub role: Role,
    pub granularity: Granularity,
    pub generated_at: DateTime<Utc>,
    pub stats: Vec<StatEntry>,
    pub charts: Vec<ChartSeries>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_dealers: Vec<DealerSales>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub top_staff: Vec<Staff>,
    /// Order status distribution (literal status → count)
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub status_counts: BTreeMap<String, u64>,
    /// Vehicle request status distribution
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub request_counts: BTreeMap<String, u64>,
}

impl DashboardReport {
    pub fn stat(&self, label: &str) -> Option<&StatEntry> {
        self.stats.iter().find(|s| s.label == label)
    }

    pub fn chart(&self, name: &str) -> Option<&ChartSeries> {
        self.charts.iter().find(|c| c.name == name)
    }
}
