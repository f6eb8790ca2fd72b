//! Billing derivations.
//!
//! Money figures on a project are never stored. They are recomputed from
//! the contract tasks and invoice line items every time they are read, so
//! the stored data and the displayed totals cannot drift apart. These are
//! the committed rules, shared by the server (project summaries) and the
//! client (live invoice editing).

use serde::{Deserialize, Serialize};

/// Billing view of one contract task: its contracted amount and how much of
/// it has been invoiced and paid, as percentages in `[0, 100]`.
///
/// Out-of-range percentages are deliberately passed through unclamped —
/// validation is an input concern, not an arithmetic one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBilling {
    pub amount: f64,
    pub invoiced_percent: f64,
    pub paid_percent: f64,
}

/// Derived money totals for a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotals {
    /// Sum of task amounts (the contracted value).
    pub total_amount: f64,
    /// Portion of the contracted value that has been invoiced.
    pub total_invoiced: f64,
    /// Portion of the contracted value that has been paid.
    pub total_paid: f64,
    /// Contracted minus paid.
    pub outstanding: f64,
    /// Contracted minus invoiced.
    pub unbilled: f64,
}

/// Compute the project totals from its tasks. An empty task list yields all
/// zeroes.
pub fn project_totals(tasks: &[TaskBilling]) -> ProjectTotals {
    let total_amount: f64 = tasks.iter().map(|t| t.amount).sum();
    let total_invoiced: f64 = tasks.iter().map(|t| t.amount * t.invoiced_percent / 100.0).sum();
    let total_paid: f64 = tasks.iter().map(|t| t.amount * t.paid_percent / 100.0).sum();
    ProjectTotals {
        total_amount,
        total_invoiced,
        total_paid,
        outstanding: total_amount - total_paid,
        unbilled: total_amount - total_invoiced,
    }
}

/// The numeric fields of one invoice line item.
///
/// `quantity` is the cumulative billed fraction of the task for
/// percent-of-task invoices (0.375 = 37.5% complete to date) and a literal
/// count for list invoices (4 site visits). `previous_billing` is what
/// earlier invoices in the chain already billed against this line, so the
/// line's own amount is only the delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineAmounts {
    pub quantity: f64,
    pub unit_price: f64,
    pub previous_billing: f64,
}

/// Amount billed by this line on this invoice.
pub fn line_amount(line: LineAmounts) -> f64 {
    line.quantity * line.unit_price - line.previous_billing
}

/// Total due on an invoice: `Σ (quantity × unit_price) − Σ previous_billing`.
pub fn invoice_total(lines: &[LineAmounts]) -> f64 {
    lines.iter().copied().map(line_amount).sum()
}

/// Billed-to-date as a percentage of a task amount. Zero-amount tasks are
/// 0% billed rather than a division error.
pub fn billed_percent(billed: f64, amount: f64) -> f64 {
    if amount == 0.0 {
        0.0
    } else {
        billed / amount * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_project_is_all_zero() {
        assert_eq!(project_totals(&[]), ProjectTotals::default());
    }

    #[test]
    fn project_totals_follow_the_committed_formulas() {
        let tasks = [
            TaskBilling { amount: 2000.0, invoiced_percent: 100.0, paid_percent: 100.0 },
            TaskBilling { amount: 2200.0, invoiced_percent: 50.0, paid_percent: 0.0 },
            TaskBilling { amount: 400.0, invoiced_percent: 0.0, paid_percent: 0.0 },
        ];
        let totals = project_totals(&tasks);
        assert_eq!(totals.total_amount, 4600.0);
        assert_eq!(totals.total_invoiced, 3100.0);
        assert_eq!(totals.total_paid, 2000.0);
        assert_eq!(totals.outstanding, 2600.0);
        assert_eq!(totals.unbilled, 1500.0);
    }

    #[test]
    fn out_of_range_percentages_pass_through() {
        // Over-invoiced tasks happen in real data; the arithmetic must not
        // clamp them away.
        let tasks = [TaskBilling { amount: 1000.0, invoiced_percent: 150.0, paid_percent: -10.0 }];
        let totals = project_totals(&tasks);
        assert_eq!(totals.total_invoiced, 1500.0);
        assert_eq!(totals.total_paid, -100.0);
        assert_eq!(totals.unbilled, -500.0);
        assert_eq!(totals.outstanding, 1100.0);
    }

    #[test]
    fn invoice_total_subtracts_previous_billing() {
        // Second invoice of a chain: task is 50% complete, 25% was billed
        // before, plus two hourly site visits.
        let lines = [
            LineAmounts { quantity: 0.5, unit_price: 20_000.0, previous_billing: 5_000.0 },
            LineAmounts { quantity: 2.0, unit_price: 150.0, previous_billing: 0.0 },
        ];
        assert_eq!(line_amount(lines[0]), 5_000.0);
        assert_eq!(line_amount(lines[1]), 300.0);
        assert_eq!(invoice_total(&lines), 5_300.0);
    }

    #[test]
    fn empty_invoice_is_zero() {
        assert_eq!(invoice_total(&[]), 0.0);
    }

    #[test]
    fn billed_percent_handles_zero_amounts() {
        assert_eq!(billed_percent(7_500.0, 20_000.0), 37.5);
        assert_eq!(billed_percent(0.0, 0.0), 0.0);
        assert_eq!(billed_percent(100.0, 0.0), 0.0);
    }
}
