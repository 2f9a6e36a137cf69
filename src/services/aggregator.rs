//! Aggregator service for computing sales and debt statistics

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use super::bucketer::locate;
use crate::types::{
    Bucket, Dealer, DealerSales, DebtRecord, DebtSummary, Order, OrderStatus, Staff,
    VehicleRequest,
};

/// Aggregator for computing sales statistics
pub struct Aggregator;

impl Aggregator {
    /// Sum of `total_price` per bucket. Always one value per bucket.
    pub fn revenue_by_bucket(orders: &[Order], buckets: &[Bucket]) -> Vec<f64> {
        let mut totals = vec![0.0; buckets.len()];
        for order in orders {
            if let Some(idx) = locate(buckets, order.created_at) {
                totals[idx] += order.total_price;
            }
        }
        totals
    }

    /// Order count per bucket. Always one value per bucket.
    pub fn count_by_bucket(orders: &[Order], buckets: &[Bucket]) -> Vec<u64> {
        let mut counts = vec![0u64; buckets.len()];
        for order in orders {
            if let Some(idx) = locate(buckets, order.created_at) {
                counts[idx] = counts[idx].saturating_add(1);
            }
        }
        counts
    }

    /// Order count per status (unknown statuses keep their literal)
    pub fn count_by_status(orders: &[Order]) -> BTreeMap<OrderStatus, u64> {
        let mut counts: BTreeMap<OrderStatus, u64> = BTreeMap::new();
        for order in orders {
            let count = counts.entry(order.status.clone()).or_default();
            *count = count.saturating_add(1);
        }
        counts
    }

    /// Share of completed orders, in percent (0 when nothing was counted)
    pub fn completion_rate(status_counts: &BTreeMap<OrderStatus, u64>) -> f64 {
        let total: u64 = status_counts.values().sum();
        if total == 0 {
            return 0.0;
        }
        let completed = status_counts
            .get(&OrderStatus::Completed)
            .copied()
            .unwrap_or(0);
        completed as f64 * 100.0 / total as f64
    }

    pub fn total_revenue(orders: &[Order]) -> f64 {
        orders.iter().map(|o| o.total_price).sum()
    }

    /// Revenue and order count per dealer, one row per dealer in dealer-list
    /// order. Orders for dealers not in the list are ignored.
    pub fn dealer_sales(orders: &[Order], dealers: &[Dealer]) -> Vec<DealerSales> {
        let mut rows: Vec<DealerSales> = dealers
            .iter()
            .map(|d| DealerSales {
                dealer_id: Some(d.id),
                name: d.name.clone(),
                revenue: 0.0,
                order_count: 0,
            })
            .collect();

        let index: HashMap<i64, usize> = dealers
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id, i))
            .collect();

        for order in orders {
            let Some(&i) = order.dealer_id.and_then(|id| index.get(&id)) else {
                continue;
            };
            rows[i].revenue += order.total_price;
            rows[i].order_count = rows[i].order_count.saturating_add(1);
        }

        rows
    }

    /// At most `n` dealers by revenue, highest first; ties keep input order
    pub fn top_dealers_by_revenue(records: &[DealerSales], n: usize) -> Vec<DealerSales> {
        top_n_by(records, n, |r| r.revenue)
    }

    /// At most `n` staff by revenue, highest first; ties keep input order
    pub fn top_staff_by_revenue(staff: &[Staff], n: usize) -> Vec<Staff> {
        top_n_by(staff, n, |s| s.revenue)
    }

    /// Sum of remaining balances. Overpaid (negative) balances are kept.
    pub fn total_remaining(debts: &[DebtRecord]) -> f64 {
        debts.iter().map(DebtRecord::remaining).sum()
    }

    pub fn debt_summary(debts: &[DebtRecord], as_of: DateTime<Utc>) -> DebtSummary {
        let mut summary = DebtSummary::default();
        for debt in debts {
            summary.total_due += debt.due_amount;
            summary.total_paid += debt.paid_amount;
            summary.total_remaining += debt.remaining();
            if debt.is_overdue(as_of) {
                summary.overdue_count = summary.overdue_count.saturating_add(1);
                summary.overdue_remaining += debt.remaining();
            }
        }
        summary
    }

    /// Vehicle request count per literal status
    pub fn count_requests_by_status(requests: &[VehicleRequest]) -> BTreeMap<String, u64> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for request in requests {
            let count = counts.entry(request.status.clone()).or_default();
            *count = count.saturating_add(1);
        }
        counts
    }
}

/// Stable descending top-N. `sort_by` is stable, so equal keys stay in
/// input order.
fn top_n_by<T: Clone>(items: &[T], n: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| key(b).total_cmp(&key(a)));
    ranked.into_iter().take(n).cloned().collect()
}
