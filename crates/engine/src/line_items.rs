//! Report line items.
//!
//! A [`LineItem`] is a single income or expense entry inside a report: an
//! opaque id, a concept label, and an amount in integer cents. Items are
//! append-only and keep their insertion order (the `position` column).
//!
//! Incomes and expenses share one table; the `kind` column tells them
//! apart.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    Income,
    Expense,
}

impl LineItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for LineItemKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid line item kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItem {
    pub id: Uuid,
    pub concept: String,
    pub amount: MoneyCents,
}

/// Input for a line item, before it has an identity.
///
/// A caller-supplied `id` is preserved on update/add so clients can edit
/// an amount without losing the item's identity; full create ignores it
/// and always generates a fresh one.
#[derive(Clone, Debug)]
pub struct NewLineItem {
    pub id: Option<Uuid>,
    pub concept: String,
    pub amount: MoneyCents,
}

impl NewLineItem {
    /// Materializes the item, keeping a caller-supplied id.
    pub(crate) fn into_item(self) -> LineItem {
        LineItem {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            concept: self.concept,
            amount: self.amount,
        }
    }

    /// Materializes the item with an unconditionally fresh id.
    pub(crate) fn into_item_fresh_id(self) -> LineItem {
        LineItem {
            id: Uuid::new_v4(),
            concept: self.concept,
            amount: self.amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub report_id: String,
    pub kind: String,
    pub concept: String,
    pub amount_minor: i64,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reports::Entity",
        from = "Column::ReportId",
        to = "super::reports::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Reports,
}

impl Related<super::reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl LineItem {
    /// Builds the row for this item at `position` inside `report_id`.
    pub(crate) fn active_model(
        &self,
        report_id: Uuid,
        kind: LineItemKind,
        position: i32,
    ) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::Set(self.id.to_string()),
            report_id: ActiveValue::Set(report_id.to_string()),
            kind: ActiveValue::Set(kind.as_str().to_string()),
            concept: ActiveValue::Set(self.concept.clone()),
            amount_minor: ActiveValue::Set(self.amount.cents()),
            position: ActiveValue::Set(position),
        }
    }
}

impl TryFrom<Model> for LineItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid line item id".to_string()))?,
            concept: model.concept,
            amount: MoneyCents::new(model.amount_minor),
        })
    }
}
