//! Derived report totals.
//!
//! The seven figures below are always machine-computed from the line items
//! and the per-report offering percentage, never accepted from a caller.
//! Every mutation path (full create, full update, single add, single
//! remove) goes through [`ReportTotals::compute`], so the same item set
//! always yields the same totals regardless of how it was reached.

use crate::{EngineError, LineItem, MoneyCents, ResultEngine};

/// Fixed tithe rate: 10% of gross income, not configurable.
pub const TITHE_RATE: f64 = 0.10;

/// The seven derived fields of a report.
///
/// All values are integer cents; the only rounding steps are the two
/// fraction multiplications (tithe and offering), which round
/// half-away-from-zero. Sums of cents are exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub gross_income: MoneyCents,
    pub tithe: MoneyCents,
    pub offering: MoneyCents,
    pub church_total: MoneyCents,
    pub net_income: MoneyCents,
    pub total_expenses: MoneyCents,
    pub settlement: MoneyCents,
}

impl ReportTotals {
    /// Computes the derived totals for one report.
    ///
    /// Pure and side-effect free. `offering_percentage` is a plain
    /// fraction (`0.04` = 4%), applied to gross income.
    pub fn compute(
        incomes: &[LineItem],
        expenses: &[LineItem],
        offering_percentage: f64,
    ) -> ResultEngine<Self> {
        if !offering_percentage.is_finite() || offering_percentage < 0.0 {
            return Err(EngineError::InvalidAmount(
                "offering_percentage must be a non-negative fraction".to_string(),
            ));
        }

        let gross_income: MoneyCents = incomes.iter().map(|item| item.amount).sum();
        let total_expenses: MoneyCents = expenses.iter().map(|item| item.amount).sum();

        let tithe = gross_income.mul_frac(TITHE_RATE);
        let offering = gross_income.mul_frac(offering_percentage);
        let church_total = tithe + offering;
        let net_income = gross_income - church_total;
        let settlement = net_income - total_expenses;

        Ok(Self {
            gross_income,
            tithe,
            offering,
            church_total,
            net_income,
            total_expenses,
            settlement,
        })
    }
}
