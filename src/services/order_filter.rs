//! Selects orders that count toward customer-facing sales reports

use crate::types::Order;

/// Orders with a customer attached, in input order.
///
/// Orders without a customer are manufacturer-to-dealer transfers and never
/// count as sales. Run this once per report and feed the result to every
/// order-based aggregation so totals and chart series agree.
pub fn eligible_for_report(orders: &[Order]) -> Vec<Order> {
    orders.iter().filter(|o| o.has_customer()).cloned().collect()
}
