//! Summary API endpoints: annual aggregation and lifetime balance.

use api_types::summary::{AnnualSummary, SummaryTotals};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{ServerError, server::ServerState};

fn map_totals(totals: engine::ReportTotals) -> SummaryTotals {
    SummaryTotals {
        gross_income: totals.gross_income.to_major(),
        tithe: totals.tithe.to_major(),
        offering: totals.offering.to_major(),
        church_total: totals.church_total.to_major(),
        net_income: totals.net_income.to_major(),
        total_expenses: totals.total_expenses.to_major(),
        settlement: totals.settlement.to_major(),
    }
}

#[derive(Debug, Deserialize)]
pub struct AnnualQuery {
    pub year: Option<String>,
}

/// Sums every report the caller owns in the requested year.
///
/// `user_id` and `year` are echoed from the request context here; the
/// engine only ever returns the seven summed fields.
pub async fn annual(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Query(query): Query<AnnualQuery>,
) -> Result<Json<AnnualSummary>, ServerError> {
    let year: i32 = query
        .year
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| ServerError::Generic("year must be a valid number".to_string()))?;

    let totals = state
        .engine
        .annual_summary(&user.id.to_string(), year)
        .await?;

    Ok(Json(AnnualSummary {
        user_id: user.id.to_string(),
        year,
        totals: map_totals(totals),
    }))
}

/// Sums every report the caller owns, lifetime.
pub async fn general_balance(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<SummaryTotals>, ServerError> {
    let totals = state.engine.general_balance(&user.id.to_string()).await?;
    Ok(Json(map_totals(totals)))
}
