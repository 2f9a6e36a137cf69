//! Plain-text rendering for terminal output

use std::fmt;

use super::debts::DebtOverview;
use crate::services::report::CHART_ORDERS;
use crate::types::{Bucket, DashboardReport, DebtSummary, StatEntry, StatKind};

/// Format with comma thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in s.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch as char);
    }

    result
}

/// Money with two decimals and thousands separators
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, format_number(cents / 100), cents % 100)
}

fn format_stat(stat: &StatEntry) -> String {
    match stat.kind {
        StatKind::Currency => format_amount(stat.value),
        StatKind::Count => format_number(stat.value.max(0.0) as u64),
        StatKind::Percent => format!("{:.1}%", stat.value),
    }
}

pub struct ReportView<'a>(pub &'a DashboardReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(
            f,
            "{} dashboard ({}, as of {})",
            report.role,
            report.granularity.label(),
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(f)?;

        let width = report
            .stats
            .iter()
            .map(|s| s.label.len())
            .max()
            .unwrap_or(0);
        for stat in &report.stats {
            writeln!(f, "  {:<width$}  {:>16}", stat.label, format_stat(stat))?;
        }

        // Charts share bucket labels; show them as one table
        if let Some(first) = report.charts.first() {
            writeln!(f)?;
            write!(f, "  {:<10}", "period")?;
            for chart in &report.charts {
                write!(f, "  {:>16}", chart.name)?;
            }
            writeln!(f)?;
            for (i, label) in first.labels.iter().enumerate() {
                write!(f, "  {:<10}", label)?;
                for chart in &report.charts {
                    let value = chart.values.get(i).copied().unwrap_or(0.0);
                    let cell = if chart.name == CHART_ORDERS {
                        format_number(value.max(0.0) as u64)
                    } else {
                        format_amount(value)
                    };
                    write!(f, "  {:>16}", cell)?;
                }
                writeln!(f)?;
            }
        }

        if !report.top_dealers.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top dealers")?;
            for (rank, dealer) in report.top_dealers.iter().enumerate() {
                writeln!(
                    f,
                    "  {:>2}. {:<24} {:>16}  ({} orders)",
                    rank + 1,
                    dealer.name,
                    format_amount(dealer.revenue),
                    format_number(dealer.order_count)
                )?;
            }
        }

        if !report.top_staff.is_empty() {
            writeln!(f)?;
            writeln!(f, "Top staff")?;
            for (rank, staff) in report.top_staff.iter().enumerate() {
                writeln!(
                    f,
                    "  {:>2}. {:<24} {:>16}  ({} sales)",
                    rank + 1,
                    staff.name,
                    format_amount(staff.revenue),
                    format_number(staff.sales_count)
                )?;
            }
        }

        for (title, counts) in [
            ("Order status", &report.status_counts),
            ("Vehicle requests", &report.request_counts),
        ] {
            if counts.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{}", title)?;
            for (status, count) in counts {
                writeln!(f, "  {:<16} {:>8}", status, format_number(*count))?;
            }
        }

        Ok(())
    }
}

pub struct BucketsView<'a>(pub &'a [Bucket]);

impl fmt::Display for BucketsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bucket in self.0 {
            writeln!(
                f,
                "{:<12} {}  ->  {}",
                bucket.label,
                bucket.start.to_rfc3339(),
                bucket.end.to_rfc3339()
            )?;
        }
        Ok(())
    }
}

pub struct DebtsView<'a>(pub &'a DebtOverview);

fn write_summary(f: &mut fmt::Formatter<'_>, title: &str, s: &DebtSummary) -> fmt::Result {
    writeln!(f, "{}", title)?;
    writeln!(f, "  {:<18} {:>16}", "due", format_amount(s.total_due))?;
    writeln!(f, "  {:<18} {:>16}", "paid", format_amount(s.total_paid))?;
    writeln!(f, "  {:<18} {:>16}", "remaining", format_amount(s.total_remaining))?;
    writeln!(
        f,
        "  {:<18} {:>16}  ({} records)",
        "overdue",
        format_amount(s.overdue_remaining),
        format_number(s.overdue_count)
    )
}

impl fmt::Display for DebtsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overview = self.0;
        writeln!(
            f,
            "Debts as of {}",
            overview.as_of.format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(f)?;
        write_summary(f, "All", &overview.all)?;
        write_summary(f, "Customers", &overview.customers)?;
        write_summary(f, "Dealers", &overview.dealers)?;
        if overview.unassigned > 0 {
            writeln!(
                f,
                "\n{} record(s) have neither a customer nor a dealer",
                format_number(overview.unassigned)
            )?;
        }
        Ok(())
    }
}
