//! Multi-report aggregation: annual summary and lifetime balance.
//!
//! Both entry points share one reduction: each of the seven derived
//! columns is summed independently over the reports in scope. Settlement
//! is the sum of per-report settlements, NOT recomputed from the other
//! summed figures — a report's settlement already reflects its own
//! rounding steps.

use sea_orm::{Statement, prelude::*};

use crate::{MoneyCents, ReportTotals, ResultEngine};

use super::Engine;

impl Engine {
    /// Sums the derived totals of every report a user owns in `year`.
    ///
    /// Zero reports in scope is not an error: the result is an explicit
    /// all-zero record.
    pub async fn annual_summary(&self, user_id: &str, year: i32) -> ResultEngine<ReportTotals> {
        self.summarize(user_id, Some(year)).await
    }

    /// Sums the derived totals of every report a user owns, lifetime.
    pub async fn general_balance(&self, user_id: &str) -> ResultEngine<ReportTotals> {
        self.summarize(user_id, None).await
    }

    async fn summarize(&self, user_id: &str, year: Option<i32>) -> ResultEngine<ReportTotals> {
        let backend = self.database.get_database_backend();
        let (year_cond, values) = match year {
            Some(year) => (" AND year = ?", vec![user_id.into(), year.into()]),
            None => ("", vec![user_id.into()]),
        };

        let stmt = Statement::from_sql_and_values(
            backend,
            format!(
                "SELECT COALESCE(SUM(gross_income_minor), 0) AS gross_income, \
                 COALESCE(SUM(tithe_minor), 0) AS tithe, \
                 COALESCE(SUM(offering_minor), 0) AS offering, \
                 COALESCE(SUM(church_total_minor), 0) AS church_total, \
                 COALESCE(SUM(net_income_minor), 0) AS net_income, \
                 COALESCE(SUM(total_expenses_minor), 0) AS total_expenses, \
                 COALESCE(SUM(settlement_minor), 0) AS settlement \
                 FROM reports \
                 WHERE user_id = ?{year_cond}"
            ),
            values,
        );

        let row = self.database.query_one(stmt).await?;
        // A missing row or column reduces to zero, never to an error.
        let get = |name: &str| -> MoneyCents {
            MoneyCents::new(
                row.as_ref()
                    .and_then(|r| r.try_get("", name).ok())
                    .unwrap_or(0),
            )
        };

        Ok(ReportTotals {
            gross_income: get("gross_income"),
            tithe: get("tithe"),
            offering: get("offering"),
            church_total: get("church_total"),
            net_income: get("net_income"),
            total_expenses: get("total_expenses"),
            settlement: get("settlement"),
        })
    }
}
