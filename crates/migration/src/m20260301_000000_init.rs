//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Decima:
//!
//! - `users`: accounts (unique email/username, argon2 password hash)
//! - `reports`: per-period financial reports with denormalized derived
//!   totals (integer cents columns)
//! - `line_items`: income/expense entries belonging to a report,
//!   discriminated by `kind`, ordered by `position`

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    Username,
    Fullname,
    Password,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Reports {
    Table,
    Id,
    UserId,
    Month,
    Year,
    OfferingPercentage,
    GrossIncomeMinor,
    TitheMinor,
    OfferingMinor,
    ChurchTotalMinor,
    NetIncomeMinor,
    TotalExpensesMinor,
    SettlementMinor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LineItems {
    Table,
    Id,
    ReportId,
    Kind,
    Concept,
    AmountMinor,
    Position,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::Fullname).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-username-unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Reports
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reports::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reports::UserId).string().not_null())
                    .col(ColumnDef::new(Reports::Month).string().not_null())
                    .col(ColumnDef::new(Reports::Year).integer().not_null())
                    .col(
                        ColumnDef::new(Reports::OfferingPercentage)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reports::GrossIncomeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reports::TitheMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Reports::OfferingMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reports::ChurchTotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reports::NetIncomeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reports::TotalExpensesMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reports::SettlementMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reports::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Reports::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reports-user_id")
                            .from(Reports::Table, Reports::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Multiple reports per (user, month, year) are permitted, so this
        // index is NOT unique.
        manager
            .create_index(
                Index::create()
                    .name("idx-reports-user_id-year")
                    .table(Reports::Table)
                    .col(Reports::UserId)
                    .col(Reports::Year)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reports-user_id-created_at")
                    .table(Reports::Table)
                    .col(Reports::UserId)
                    .col(Reports::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Line items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LineItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LineItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LineItems::ReportId).string().not_null())
                    .col(ColumnDef::new(LineItems::Kind).string().not_null())
                    .col(ColumnDef::new(LineItems::Concept).string().not_null())
                    .col(
                        ColumnDef::new(LineItems::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LineItems::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-line_items-report_id")
                            .from(LineItems::Table, LineItems::ReportId)
                            .to(Reports::Table, Reports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-line_items-report_id-position")
                    .table(LineItems::Table)
                    .col(LineItems::ReportId)
                    .col(LineItems::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(LineItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
