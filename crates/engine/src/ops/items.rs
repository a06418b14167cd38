//! Single line item operations: append and remove.
//!
//! Both paths load the owning report, mutate one sequence, recompute all
//! seven totals from the full item set, and persist report and items in
//! one transaction — the same calculation full create/update runs, so the
//! mutation path taken to reach an item set never changes its totals.

use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, LineItemKind, NewLineItem, Report, ReportTotals, ResultEngine, line_items,
};

use super::{Engine, normalize_required_text, reports::totals_patch, with_tx};

async fn next_position(
    db: &DatabaseTransaction,
    report_id: Uuid,
    kind: LineItemKind,
) -> ResultEngine<i32> {
    let last = line_items::Entity::find()
        .filter(line_items::Column::ReportId.eq(report_id.to_string()))
        .filter(line_items::Column::Kind.eq(kind.as_str()))
        .order_by_desc(line_items::Column::Position)
        .one(db)
        .await?;
    Ok(last.map_or(0, |model| model.position + 1))
}

impl Engine {
    /// Appends an income to a report and returns the updated report.
    pub async fn add_income(
        &self,
        report_id: Uuid,
        user_id: &str,
        item: NewLineItem,
    ) -> ResultEngine<Report> {
        self.add_item(report_id, user_id, LineItemKind::Income, item)
            .await
    }

    /// Appends an expense to a report and returns the updated report.
    pub async fn add_expense(
        &self,
        report_id: Uuid,
        user_id: &str,
        item: NewLineItem,
    ) -> ResultEngine<Report> {
        self.add_item(report_id, user_id, LineItemKind::Expense, item)
            .await
    }

    /// Removes one income by id and returns the updated report.
    pub async fn remove_income(
        &self,
        report_id: Uuid,
        user_id: &str,
        item_id: Uuid,
    ) -> ResultEngine<Report> {
        self.remove_item(report_id, user_id, LineItemKind::Income, item_id)
            .await
    }

    /// Removes one expense by id and returns the updated report.
    pub async fn remove_expense(
        &self,
        report_id: Uuid,
        user_id: &str,
        item_id: Uuid,
    ) -> ResultEngine<Report> {
        self.remove_item(report_id, user_id, LineItemKind::Expense, item_id)
            .await
    }

    async fn add_item(
        &self,
        report_id: Uuid,
        user_id: &str,
        kind: LineItemKind,
        item: NewLineItem,
    ) -> ResultEngine<Report> {
        let concept = normalize_required_text(&item.concept, "concept")?;
        let item = NewLineItem { concept, ..item }.into_item();

        with_tx!(self, |db_tx| {
            let mut report = self.load_report(&db_tx, report_id, user_id).await?;

            // Append-only: the new item goes after every position ever
            // used for this kind (removals leave gaps, so len() would
            // collide).
            let position = next_position(&db_tx, report_id, kind).await?;
            item.active_model(report_id, kind, position)
                .insert(&db_tx)
                .await?;

            match kind {
                LineItemKind::Income => report.incomes.push(item),
                LineItemKind::Expense => report.expenses.push(item),
            }
            report.totals = ReportTotals::compute(
                &report.incomes,
                &report.expenses,
                report.offering_percentage,
            )?;
            report.updated_at = Utc::now();

            totals_patch(&report).update(&db_tx).await?;
            Ok(report)
        })
    }

    async fn remove_item(
        &self,
        report_id: Uuid,
        user_id: &str,
        kind: LineItemKind,
        item_id: Uuid,
    ) -> ResultEngine<Report> {
        with_tx!(self, |db_tx| {
            let mut report = self.load_report(&db_tx, report_id, user_id).await?;

            let sequence = match kind {
                LineItemKind::Income => &mut report.incomes,
                LineItemKind::Expense => &mut report.expenses,
            };
            let index = sequence
                .iter()
                .position(|item| item.id == item_id)
                .ok_or_else(|| {
                    EngineError::KeyNotFound(match kind {
                        LineItemKind::Income => "income not exists".to_string(),
                        LineItemKind::Expense => "expense not exists".to_string(),
                    })
                })?;
            sequence.remove(index);

            line_items::Entity::delete_by_id(item_id.to_string())
                .filter(line_items::Column::ReportId.eq(report_id.to_string()))
                .exec(&db_tx)
                .await?;

            report.totals = ReportTotals::compute(
                &report.incomes,
                &report.expenses,
                report.offering_percentage,
            )?;
            report.updated_at = Utc::now();

            totals_patch(&report).update(&db_tx).await?;
            Ok(report)
        })
    }
}
