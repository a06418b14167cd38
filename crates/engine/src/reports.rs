//! Report primitives.
//!
//! A `Report` is a per-period financial record owned by one user: ordered
//! income/expense line items, an offering percentage, and seven derived
//! totals. The totals columns are denormalized onto the row so annual and
//! lifetime summaries reduce over plain columns; they are recomputed
//! inside the same transaction as every item mutation and never accepted
//! from a caller.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, LineItem, MoneyCents, NewLineItem, ReportTotals};

#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub id: Uuid,
    pub user_id: String,
    pub month: String,
    pub year: i32,
    pub incomes: Vec<LineItem>,
    pub expenses: Vec<LineItem>,
    pub offering_percentage: f64,
    pub totals: ReportTotals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a full report create/update: month, year, the complete item
/// sequences, and the offering percentage. Totals are always derived.
#[derive(Clone, Debug)]
pub struct ReportDraft {
    pub month: String,
    pub year: i32,
    pub incomes: Vec<NewLineItem>,
    pub expenses: Vec<NewLineItem>,
    pub offering_percentage: f64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub month: String,
    pub year: i32,
    pub offering_percentage: f64,
    pub gross_income_minor: i64,
    pub tithe_minor: i64,
    pub offering_minor: i64,
    pub church_total_minor: i64,
    pub net_income_minor: i64,
    pub total_expenses_minor: i64,
    pub settlement_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::line_items::Entity")]
    LineItems,
}

impl Related<super::line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Report> for ActiveModel {
    fn from(report: &Report) -> Self {
        Self {
            id: ActiveValue::Set(report.id.to_string()),
            user_id: ActiveValue::Set(report.user_id.clone()),
            month: ActiveValue::Set(report.month.clone()),
            year: ActiveValue::Set(report.year),
            offering_percentage: ActiveValue::Set(report.offering_percentage),
            gross_income_minor: ActiveValue::Set(report.totals.gross_income.cents()),
            tithe_minor: ActiveValue::Set(report.totals.tithe.cents()),
            offering_minor: ActiveValue::Set(report.totals.offering.cents()),
            church_total_minor: ActiveValue::Set(report.totals.church_total.cents()),
            net_income_minor: ActiveValue::Set(report.totals.net_income.cents()),
            total_expenses_minor: ActiveValue::Set(report.totals.total_expenses.cents()),
            settlement_minor: ActiveValue::Set(report.totals.settlement.cents()),
            created_at: ActiveValue::Set(report.created_at),
            updated_at: ActiveValue::Set(report.updated_at),
        }
    }
}

impl Model {
    pub(crate) fn totals(&self) -> ReportTotals {
        ReportTotals {
            gross_income: MoneyCents::new(self.gross_income_minor),
            tithe: MoneyCents::new(self.tithe_minor),
            offering: MoneyCents::new(self.offering_minor),
            church_total: MoneyCents::new(self.church_total_minor),
            net_income: MoneyCents::new(self.net_income_minor),
            total_expenses: MoneyCents::new(self.total_expenses_minor),
            settlement: MoneyCents::new(self.settlement_minor),
        }
    }
}

impl Report {
    /// Rebuilds a report from its row and the already-ordered item
    /// sequences.
    pub(crate) fn from_parts(
        model: Model,
        incomes: Vec<LineItem>,
        expenses: Vec<LineItem>,
    ) -> Result<Self, EngineError> {
        let totals = model.totals();
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid report id".to_string()))?,
            user_id: model.user_id,
            month: model.month,
            year: model.year,
            incomes,
            expenses,
            offering_percentage: model.offering_percentage,
            totals,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
