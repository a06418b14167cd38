use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod report {
    use super::*;

    /// A line item as supplied by a client.
    ///
    /// `id` is optional: full create ignores it, full update and single
    /// add preserve it when present so clients can keep item identity
    /// while editing amounts.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineItemNew {
        pub id: Option<Uuid>,
        pub concept: String,
        /// Decimal amount; rounded to two decimals on the way in.
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineItemView {
        pub id: Uuid,
        pub concept: String,
        pub amount: f64,
    }

    /// Request body for full report create/update.
    ///
    /// The seven derived totals are never part of the request; they are
    /// always recomputed server-side.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportDraft {
        pub month: String,
        pub year: i32,
        #[serde(default)]
        pub incomes: Vec<LineItemNew>,
        #[serde(default)]
        pub expenses: Vec<LineItemNew>,
        /// Fraction applied to gross income (e.g. `0.04`), not a percent.
        pub offering_percentage: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportView {
        pub id: Uuid,
        pub user_id: String,
        pub month: String,
        pub year: i32,
        pub incomes: Vec<LineItemView>,
        pub expenses: Vec<LineItemView>,
        pub offering_percentage: f64,
        pub gross_income: f64,
        pub tithe: f64,
        pub offering: f64,
        pub church_total: f64,
        pub net_income: f64,
        pub total_expenses: f64,
        pub settlement: f64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod summary {
    use super::*;

    /// The seven summed totals over a set of reports.
    ///
    /// Every field is present even when the scope holds zero reports —
    /// an all-zero record, never an absent result.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SummaryTotals {
        pub gross_income: f64,
        pub tithe: f64,
        pub offering: f64,
        pub church_total: f64,
        pub net_income: f64,
        pub total_expenses: f64,
        pub settlement: f64,
    }

    /// Annual summary response. `user_id`/`year` are echoed from the
    /// request context by the HTTP layer.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnnualSummary {
        pub user_id: String,
        pub year: i32,
        #[serde(flatten)]
        pub totals: SummaryTotals,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub email: String,
        pub username: String,
        pub fullname: String,
        pub password: String,
        pub confirm_password: String,
    }

    /// Partial profile update: absent fields stay unchanged. A password
    /// change must carry a matching `confirm_password`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub email: Option<String>,
        pub username: Option<String>,
        pub fullname: Option<String>,
        pub password: Option<String>,
        pub confirm_password: Option<String>,
    }

    /// A user as returned by the API. There is no password field here,
    /// hashed or otherwise.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub username: String,
        pub fullname: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}
