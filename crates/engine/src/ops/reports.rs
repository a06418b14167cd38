//! Full-report operations: create, update, fetch, delete.
//!
//! Ownership is always enforced through the `(report_id, user_id)`
//! compound filter; a report that exists but belongs to another user is
//! indistinguishable from one that does not exist.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, LineItem, LineItemKind, NewLineItem, Report, ReportDraft, ReportTotals,
    ResultEngine, line_items, reports,
};

use super::{Engine, normalize_required_text, with_tx};

fn normalize_draft(draft: ReportDraft) -> ResultEngine<ReportDraft> {
    let month = normalize_required_text(&draft.month, "month")?;
    let normalize_items = |items: Vec<NewLineItem>| -> ResultEngine<Vec<NewLineItem>> {
        items
            .into_iter()
            .map(|item| {
                let concept = normalize_required_text(&item.concept, "concept")?;
                Ok(NewLineItem { concept, ..item })
            })
            .collect()
    };
    Ok(ReportDraft {
        month,
        year: draft.year,
        incomes: normalize_items(draft.incomes)?,
        expenses: normalize_items(draft.expenses)?,
        offering_percentage: draft.offering_percentage,
    })
}

/// Builds the partial row update carrying the recomputed totals and the
/// `updated_at` stamp. Everything else on the row is left untouched.
pub(super) fn totals_patch(report: &Report) -> reports::ActiveModel {
    reports::ActiveModel {
        id: ActiveValue::Set(report.id.to_string()),
        gross_income_minor: ActiveValue::Set(report.totals.gross_income.cents()),
        tithe_minor: ActiveValue::Set(report.totals.tithe.cents()),
        offering_minor: ActiveValue::Set(report.totals.offering.cents()),
        church_total_minor: ActiveValue::Set(report.totals.church_total.cents()),
        net_income_minor: ActiveValue::Set(report.totals.net_income.cents()),
        total_expenses_minor: ActiveValue::Set(report.totals.total_expenses.cents()),
        settlement_minor: ActiveValue::Set(report.totals.settlement.cents()),
        updated_at: ActiveValue::Set(report.updated_at),
        ..Default::default()
    }
}

async fn insert_items(db_tx: &DatabaseTransaction, report: &Report) -> ResultEngine<()> {
    for (position, item) in report.incomes.iter().enumerate() {
        item.active_model(report.id, LineItemKind::Income, position as i32)
            .insert(db_tx)
            .await?;
    }
    for (position, item) in report.expenses.iter().enumerate() {
        item.active_model(report.id, LineItemKind::Expense, position as i32)
            .insert(db_tx)
            .await?;
    }
    Ok(())
}

impl Engine {
    /// Finds a report row by `(report_id, user_id)`.
    pub(super) async fn require_report(
        &self,
        db: &DatabaseTransaction,
        report_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<reports::Model> {
        reports::Entity::find_by_id(report_id.to_string())
            .filter(reports::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("report not exists".to_string()))
    }

    /// Loads a full report (row + ordered item sequences) owned by `user_id`.
    pub(super) async fn load_report(
        &self,
        db: &DatabaseTransaction,
        report_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Report> {
        let model = self.require_report(db, report_id, user_id).await?;
        self.attach_items(db, model).await
    }

    async fn attach_items(
        &self,
        db: &DatabaseTransaction,
        model: reports::Model,
    ) -> ResultEngine<Report> {
        let item_models = line_items::Entity::find()
            .filter(line_items::Column::ReportId.eq(model.id.clone()))
            .order_by_asc(line_items::Column::Position)
            .all(db)
            .await?;

        let mut incomes = Vec::new();
        let mut expenses = Vec::new();
        for item_model in item_models {
            let kind = LineItemKind::try_from(item_model.kind.as_str())?;
            let item = LineItem::try_from(item_model)?;
            match kind {
                LineItemKind::Income => incomes.push(item),
                LineItemKind::Expense => expenses.push(item),
            }
        }

        Report::from_parts(model, incomes, expenses)
    }

    /// Creates a report with freshly generated line item ids.
    ///
    /// Caller-supplied item ids are ignored on create, so a replayed
    /// request can never collide with existing identifiers.
    pub async fn create_report(&self, user_id: &str, draft: ReportDraft) -> ResultEngine<Report> {
        let draft = normalize_draft(draft)?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let incomes: Vec<LineItem> = draft
                .incomes
                .into_iter()
                .map(NewLineItem::into_item_fresh_id)
                .collect();
            let expenses: Vec<LineItem> = draft
                .expenses
                .into_iter()
                .map(NewLineItem::into_item_fresh_id)
                .collect();
            let totals = ReportTotals::compute(&incomes, &expenses, draft.offering_percentage)?;

            let now = Utc::now();
            let report = Report {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                month: draft.month,
                year: draft.year,
                incomes,
                expenses,
                offering_percentage: draft.offering_percentage,
                totals,
                created_at: now,
                updated_at: now,
            };

            reports::ActiveModel::from(&report).insert(&db_tx).await?;
            insert_items(&db_tx, &report).await?;
            Ok(report)
        })
    }

    /// Replaces a report's month, year, item sequences, and percentage.
    ///
    /// Items that echo a non-empty id keep it; items without one get a
    /// fresh id. Totals are recomputed from the new sequences.
    pub async fn update_report(
        &self,
        report_id: Uuid,
        user_id: &str,
        draft: ReportDraft,
    ) -> ResultEngine<Report> {
        let draft = normalize_draft(draft)?;
        with_tx!(self, |db_tx| {
            let model = self.require_report(&db_tx, report_id, user_id).await?;

            let incomes: Vec<LineItem> = draft
                .incomes
                .into_iter()
                .map(NewLineItem::into_item)
                .collect();
            let expenses: Vec<LineItem> = draft
                .expenses
                .into_iter()
                .map(NewLineItem::into_item)
                .collect();
            let totals = ReportTotals::compute(&incomes, &expenses, draft.offering_percentage)?;

            let report = Report {
                id: report_id,
                user_id: user_id.to_string(),
                month: draft.month,
                year: draft.year,
                incomes,
                expenses,
                offering_percentage: draft.offering_percentage,
                totals,
                created_at: model.created_at,
                updated_at: Utc::now(),
            };

            reports::ActiveModel::from(&report).update(&db_tx).await?;
            line_items::Entity::delete_many()
                .filter(line_items::Column::ReportId.eq(report_id.to_string()))
                .exec(&db_tx)
                .await?;
            insert_items(&db_tx, &report).await?;
            Ok(report)
        })
    }

    /// Returns one report owned by `user_id`.
    pub async fn report(&self, report_id: Uuid, user_id: &str) -> ResultEngine<Report> {
        with_tx!(self, |db_tx| {
            self.load_report(&db_tx, report_id, user_id).await
        })
    }

    /// Returns all of a user's reports, newest first.
    pub async fn reports(&self, user_id: &str) -> ResultEngine<Vec<Report>> {
        with_tx!(self, |db_tx| {
            let models = reports::Entity::find()
                .filter(reports::Column::UserId.eq(user_id))
                .order_by_desc(reports::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(self.attach_items(&db_tx, model).await?);
            }
            Ok(out)
        })
    }

    /// Returns a user's reports for one `(month, year)` period.
    ///
    /// Multiple reports per period are structurally permitted, so this
    /// returns a sequence, possibly empty.
    pub async fn reports_by_month(
        &self,
        user_id: &str,
        month: &str,
        year: i32,
    ) -> ResultEngine<Vec<Report>> {
        let month = normalize_required_text(month, "month")?;
        with_tx!(self, |db_tx| {
            let models = reports::Entity::find()
                .filter(reports::Column::UserId.eq(user_id))
                .filter(reports::Column::Month.eq(month))
                .filter(reports::Column::Year.eq(year))
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(self.attach_items(&db_tx, model).await?);
            }
            Ok(out)
        })
    }

    /// Deletes one report (and its items) owned by `user_id`.
    pub async fn delete_report(&self, report_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_report(&db_tx, report_id, user_id).await?;
            line_items::Entity::delete_many()
                .filter(line_items::Column::ReportId.eq(report_id.to_string()))
                .exec(&db_tx)
                .await?;
            reports::Entity::delete_by_id(report_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
