//! Report assembly: turns fetched snapshots into a role dashboard view-model

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::aggregator::Aggregator;
use super::bucketer::BucketPlan;
use super::order_filter::eligible_for_report;
use crate::config::Config;
use crate::types::{
    or_empty, ChartSeries, DashboardReport, Dealer, DealerSales, DebtOwner, DebtRecord,
    Granularity, Order, Result, Role, Staff, StatEntry, VehicleRequest,
};

pub const STAT_TOTAL_REVENUE: &str = "Total revenue";
pub const STAT_ORDERS: &str = "Orders";
pub const STAT_DEALERS: &str = "Dealers";
pub const STAT_STAFF: &str = "Staff";
pub const STAT_OUTSTANDING_DEBT: &str = "Outstanding debt";
pub const STAT_DEALER_DEBT: &str = "Dealer debt";
pub const STAT_CUSTOMER_DEBT: &str = "Customer debt";
pub const STAT_OVERDUE_DEBTS: &str = "Overdue debts";
pub const STAT_PENDING_REQUESTS: &str = "Pending requests";
pub const STAT_COMPLETION_RATE: &str = "Completion rate";

pub const CHART_REVENUE: &str = "revenue";
pub const CHART_ORDERS: &str = "orders";

/// Snapshots a dashboard is built from. `None` means "not loaded (yet)".
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub orders: Option<Vec<Order>>,
    pub debts: Option<Vec<DebtRecord>>,
    pub dealers: Option<Vec<Dealer>>,
    pub staff: Option<Vec<Staff>>,
    pub requests: Option<Vec<VehicleRequest>>,
}

impl ReportInputs {
    /// Names of the collections that are still missing
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.orders.is_none() {
            missing.push("orders");
        }
        if self.debts.is_none() {
            missing.push("debts");
        }
        if self.dealers.is_none() {
            missing.push("dealers");
        }
        if self.staff.is_none() {
            missing.push("staff");
        }
        if self.requests.is_none() {
            missing.push("requests");
        }
        missing
    }
}

/// Builds dashboards for every role from the same aggregation pipeline
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    plan: BucketPlan,
    weekly_window: usize,
    monthly_window: usize,
    yearly_window: usize,
    top_n: usize,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(BucketPlan::default())
    }
}

impl ReportAssembler {
    pub fn new(plan: BucketPlan) -> Self {
        let defaults = Config::default();
        Self {
            plan,
            weekly_window: defaults.weekly_window,
            monthly_window: defaults.monthly_window,
            yearly_window: defaults.yearly_window,
            top_n: defaults.top_n,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            plan: config.bucket_plan()?,
            weekly_window: config.weekly_window,
            monthly_window: config.monthly_window,
            yearly_window: config.yearly_window,
            top_n: config.top_n,
        })
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_window(mut self, granularity: Granularity, count: usize) -> Self {
        match granularity {
            Granularity::Week => self.weekly_window = count,
            Granularity::Month => self.monthly_window = count,
            Granularity::Year => self.yearly_window = count,
        }
        self
    }

    pub fn window(&self, granularity: Granularity) -> usize {
        match granularity {
            Granularity::Week => self.weekly_window,
            Granularity::Month => self.monthly_window,
            Granularity::Year => self.yearly_window,
        }
    }

    pub fn plan(&self) -> &BucketPlan {
        &self.plan
    }

    /// Assemble the dashboard for `role`. Missing collections render as
    /// zero/empty slots instead of failing.
    pub fn assemble(
        &self,
        role: Role,
        granularity: Granularity,
        inputs: &ReportInputs,
        as_of: DateTime<Utc>,
    ) -> DashboardReport {
        // Filter once; every order-based slot below reads `orders`.
        let orders = eligible_for_report(or_empty(inputs.orders.as_ref()));
        let debts = or_empty(inputs.debts.as_ref());
        let dealers = or_empty(inputs.dealers.as_ref());
        let staff = or_empty(inputs.staff.as_ref());
        let requests = or_empty(inputs.requests.as_ref());

        let missing = inputs.missing();
        if !missing.is_empty() {
            tracing::warn!(%role, ?missing, "assembling report with partial data");
        }

        let buckets = self
            .plan
            .buckets(granularity, self.window(granularity), as_of);
        let labels: Vec<String> = buckets.iter().map(|b| b.label.clone()).collect();
        let revenue = Aggregator::revenue_by_bucket(&orders, &buckets);
        let counts = Aggregator::count_by_bucket(&orders, &buckets);

        let charts = vec![
            ChartSeries {
                name: CHART_REVENUE.to_string(),
                labels: labels.clone(),
                values: revenue,
            },
            ChartSeries {
                name: CHART_ORDERS.to_string(),
                labels,
                values: counts.into_iter().map(|c| c as f64).collect(),
            },
        ];

        let status = Aggregator::count_by_status(&orders);
        let status_counts: BTreeMap<String, u64> = status
            .iter()
            .map(|(s, n)| (s.to_string(), *n))
            .collect();

        let total_revenue =
            StatEntry::currency(STAT_TOTAL_REVENUE, Aggregator::total_revenue(&orders));
        let order_count = StatEntry::count(STAT_ORDERS, orders.len() as u64);

        let mut report = DashboardReport {
            role,
            granularity,
            generated_at: as_of,
            stats: Vec::new(),
            charts,
            top_dealers: Vec::new(),
            top_staff: Vec::new(),
            status_counts: BTreeMap::new(),
            request_counts: BTreeMap::new(),
        };

        match role {
            Role::Admin => {
                report.stats = vec![
                    total_revenue,
                    order_count,
                    StatEntry::count(STAT_DEALERS, dealers.len() as u64),
                    StatEntry::count(STAT_STAFF, staff.len() as u64),
                    StatEntry::currency(
                        STAT_OUTSTANDING_DEBT,
                        Aggregator::total_remaining(debts),
                    ),
                ];
                report.top_dealers = self.top_dealers(&orders, dealers);
                report.status_counts = status_counts;
            }
            Role::EvmStaff => {
                let request_counts = Aggregator::count_requests_by_status(requests);
                let pending: u64 = request_counts
                    .iter()
                    .filter(|(status, _)| status.eq_ignore_ascii_case("PENDING"))
                    .map(|(_, n)| *n)
                    .sum();
                report.stats = vec![
                    total_revenue,
                    order_count,
                    StatEntry::count(STAT_DEALERS, dealers.len() as u64),
                    StatEntry::currency(
                        STAT_DEALER_DEBT,
                        remaining_where(debts, |o| matches!(o, DebtOwner::Dealer(_))),
                    ),
                    StatEntry::count(STAT_PENDING_REQUESTS, pending),
                ];
                report.top_dealers = self.top_dealers(&orders, dealers);
                report.request_counts = request_counts;
            }
            Role::DealerManager => {
                let summary = Aggregator::debt_summary(debts, as_of);
                report.stats = vec![
                    total_revenue,
                    order_count,
                    StatEntry::count(STAT_STAFF, staff.len() as u64),
                    StatEntry::currency(
                        STAT_CUSTOMER_DEBT,
                        remaining_where(debts, |o| matches!(o, DebtOwner::Customer(_))),
                    ),
                    StatEntry::count(STAT_OVERDUE_DEBTS, summary.overdue_count),
                    StatEntry::percent(
                        STAT_COMPLETION_RATE,
                        Aggregator::completion_rate(&status),
                    ),
                ];
                report.top_staff = Aggregator::top_staff_by_revenue(staff, self.top_n);
                report.status_counts = status_counts;
            }
            Role::DealerStaff => {
                report.stats = vec![
                    total_revenue,
                    order_count,
                    StatEntry::percent(
                        STAT_COMPLETION_RATE,
                        Aggregator::completion_rate(&status),
                    ),
                ];
                report.status_counts = status_counts;
            }
        }

        tracing::debug!(
            %role,
            %granularity,
            orders = orders.len(),
            buckets = buckets.len(),
            "report assembled"
        );
        report
    }

    fn top_dealers(&self, orders: &[Order], dealers: &[Dealer]) -> Vec<DealerSales> {
        let sales = Aggregator::dealer_sales(orders, dealers);
        Aggregator::top_dealers_by_revenue(&sales, self.top_n)
    }
}

/// Remaining balance over debts whose owner matches
fn remaining_where(debts: &[DebtRecord], owner: impl Fn(DebtOwner) -> bool) -> f64 {
    debts
        .iter()
        .filter(|d| owner(d.owner()))
        .map(DebtRecord::remaining)
        .sum()
}
