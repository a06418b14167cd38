//! Report API endpoints.

use api_types::report::{LineItemNew, LineItemView, ReportDraft, ReportView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};
use engine::MoneyCents;

fn map_item_new(item: LineItemNew) -> Result<engine::NewLineItem, ServerError> {
    Ok(engine::NewLineItem {
        id: item.id,
        concept: item.concept,
        amount: MoneyCents::from_major(item.amount)?,
    })
}

fn map_draft(payload: ReportDraft) -> Result<engine::ReportDraft, ServerError> {
    Ok(engine::ReportDraft {
        month: payload.month,
        year: payload.year,
        incomes: payload
            .incomes
            .into_iter()
            .map(map_item_new)
            .collect::<Result<_, _>>()?,
        expenses: payload
            .expenses
            .into_iter()
            .map(map_item_new)
            .collect::<Result<_, _>>()?,
        offering_percentage: payload.offering_percentage,
    })
}

fn map_item_view(item: engine::LineItem) -> LineItemView {
    LineItemView {
        id: item.id,
        concept: item.concept,
        amount: item.amount.to_major(),
    }
}

pub(crate) fn map_report(report: engine::Report) -> ReportView {
    ReportView {
        id: report.id,
        user_id: report.user_id,
        month: report.month,
        year: report.year,
        incomes: report.incomes.into_iter().map(map_item_view).collect(),
        expenses: report.expenses.into_iter().map(map_item_view).collect(),
        offering_percentage: report.offering_percentage,
        gross_income: report.totals.gross_income.to_major(),
        tithe: report.totals.tithe.to_major(),
        offering: report.totals.offering.to_major(),
        church_total: report.totals.church_total.to_major(),
        net_income: report.totals.net_income.to_major(),
        total_expenses: report.totals.total_expenses.to_major(),
        settlement: report.totals.settlement.to_major(),
        created_at: report.created_at,
        updated_at: report.updated_at,
    }
}

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<ReportDraft>,
) -> Result<(StatusCode, Json<ReportView>), ServerError> {
    let draft = map_draft(payload)?;
    let report = state
        .engine
        .create_report(&user.id.to_string(), draft)
        .await?;

    Ok((StatusCode::CREATED, Json(map_report(report))))
}

pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ReportView>>, ServerError> {
    let reports = state.engine.reports(&user.id.to_string()).await?;
    Ok(Json(reports.into_iter().map(map_report).collect()))
}

pub async fn get(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportView>, ServerError> {
    let report = state.engine.report(id, &user.id.to_string()).await?;
    Ok(Json(map_report(report)))
}

pub async fn list_by_month(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path((month, year)): Path<(String, i32)>,
) -> Result<Json<Vec<ReportView>>, ServerError> {
    let reports = state
        .engine
        .reports_by_month(&user.id.to_string(), &month, year)
        .await?;
    Ok(Json(reports.into_iter().map(map_report).collect()))
}

pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReportDraft>,
) -> Result<Json<ReportView>, ServerError> {
    let draft = map_draft(payload)?;
    let report = state
        .engine
        .update_report(id, &user.id.to_string(), draft)
        .await?;
    Ok(Json(map_report(report)))
}

pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_report(id, &user.id.to_string()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_income(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LineItemNew>,
) -> Result<(StatusCode, Json<ReportView>), ServerError> {
    let item = map_item_new(payload)?;
    let report = state
        .engine
        .add_income(id, &user.id.to_string(), item)
        .await?;
    Ok((StatusCode::CREATED, Json(map_report(report))))
}

pub async fn add_expense(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LineItemNew>,
) -> Result<(StatusCode, Json<ReportView>), ServerError> {
    let item = map_item_new(payload)?;
    let report = state
        .engine
        .add_expense(id, &user.id.to_string(), item)
        .await?;
    Ok((StatusCode::CREATED, Json(map_report(report))))
}

pub async fn remove_income(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ReportView>, ServerError> {
    let report = state
        .engine
        .remove_income(id, &user.id.to_string(), item_id)
        .await?;
    Ok(Json(map_report(report)))
}

pub async fn remove_expense(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ReportView>, ServerError> {
    let report = state
        .engine
        .remove_expense(id, &user.id.to_string(), item_id)
        .await?;
    Ok(Json(map_report(report)))
}
