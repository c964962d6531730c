//! Projection arithmetic for each projection model.
//!
//! All functions here are pure and operate on the four numeric answers of a
//! tree in step order. Monetary results are rounded to cents.

use crate::domain::tree::ProjectionModel;

use super::types::Projections;

/// Payoff simulations stop after this many months (50 years).
pub const MAX_AMORTIZATION_MONTHS: u32 = 600;

/// Emergency funds target this many months of expenses.
pub const EMERGENCY_FUND_TARGET_MONTHS: f64 = 6.0;

/// Result of simulating a loan paid down month by month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amortization {
    pub months: u32,
    pub total_interest: f64,
}

/// Computes projections for a model, or `None` when it yields nothing.
pub fn project(model: ProjectionModel, values: &[f64]) -> Option<Projections> {
    let projections = match (model, values) {
        (ProjectionModel::None, _) => return None,
        (ProjectionModel::EmergencyFund, &[months_covered, expenses, savings, timeline]) => {
            let target = EMERGENCY_FUND_TARGET_MONTHS * expenses;
            gap_projection(target - months_covered * expenses, savings, timeline)
        }
        (ProjectionModel::SavingsGoal, &[goal, saved, contribution, timeline]) => {
            gap_projection(goal - saved, contribution, timeline)
        }
        (ProjectionModel::DebtPayoff, &[balance, apr, payment, extra]) => {
            debt_projection(balance, apr, payment, extra)
        }
        (ProjectionModel::Retirement, &[age, _savings, contribution, retirement_age]) => {
            let years = (retirement_age - age).max(0.0);
            Projections {
                time_to_goal_months: Some(clamp_months(years * 12.0)),
                monthly_savings: Some(round_cents(contribution.max(0.0))),
                total_interest_saved: None,
            }
        }
        _ => return None,
    };

    if projections.is_empty() {
        None
    } else {
        Some(projections)
    }
}

/// Months to close a gap at a monthly rate, and the rate a timeline needs.
fn gap_projection(gap: f64, monthly_rate: f64, timeline_months: f64) -> Projections {
    let gap = gap.max(0.0);
    let time_to_goal_months = if gap == 0.0 {
        Some(0)
    } else if monthly_rate > 0.0 {
        Some(clamp_months((gap / monthly_rate).ceil()))
    } else {
        None
    };
    let monthly_savings = if timeline_months > 0.0 {
        Some(round_cents(gap / timeline_months))
    } else {
        None
    };

    Projections {
        time_to_goal_months,
        monthly_savings,
        total_interest_saved: None,
    }
}

fn debt_projection(balance: f64, apr: f64, payment: f64, extra: f64) -> Projections {
    let baseline = amortize(balance, apr, payment);
    let accelerated = amortize(balance, apr, payment + extra.max(0.0));

    let total_interest_saved = match (baseline, accelerated) {
        (Some(base), Some(fast)) => Some(round_cents(
            (base.total_interest - fast.total_interest).max(0.0),
        )),
        _ => None,
    };

    Projections {
        time_to_goal_months: accelerated.map(|a| a.months),
        monthly_savings: None,
        total_interest_saved,
    }
}

/// Simulates paying a balance at a fixed monthly payment.
///
/// Returns `None` when the payment never covers the accruing interest or the
/// payoff takes longer than [`MAX_AMORTIZATION_MONTHS`].
pub fn amortize(balance: f64, apr_percent: f64, payment: f64) -> Option<Amortization> {
    if balance <= 0.0 {
        return Some(Amortization {
            months: 0,
            total_interest: 0.0,
        });
    }
    if payment <= 0.0 {
        return None;
    }

    let monthly_rate = apr_percent.max(0.0) / 100.0 / 12.0;
    let mut remaining = balance;
    let mut total_interest = 0.0;

    for month in 1..=MAX_AMORTIZATION_MONTHS {
        let interest = remaining * monthly_rate;
        if payment <= interest {
            return None;
        }
        total_interest += interest;
        remaining = remaining + interest - payment;
        if remaining <= 0.0 {
            return Some(Amortization {
                months: month,
                total_interest: round_cents(total_interest),
            });
        }
    }
    None
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn clamp_months(months: f64) -> u32 {
    if months <= 0.0 {
        0
    } else if months >= u32::MAX as f64 {
        u32::MAX
    } else {
        months as u32
    }
}
