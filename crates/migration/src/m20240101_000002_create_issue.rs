//! Create `issue` table.
//! Issues are owned by a project and ordered by `position` within it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issue::Table)
                    .if_not_exists()
                    .col(uuid(Issue::Id).primary_key())
                    .col(uuid(Issue::ProjectId).not_null())
                    .col(big_integer(Issue::Position).not_null())
                    .col(text(Issue::IssueTitle).not_null())
                    .col(text(Issue::IssueText).not_null())
                    .col(text(Issue::CreatedBy).not_null())
                    .col(text(Issue::AssignedTo).not_null().default(""))
                    .col(text(Issue::StatusText).not_null().default(""))
                    .col(string_len(Issue::Open, 8).not_null().default("true"))
                    .col(timestamp_with_time_zone(Issue::CreatedOn).not_null())
                    .col(timestamp_with_time_zone(Issue::UpdatedOn).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_project")
                            .from(Issue::Table, Issue::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Issue::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Issue {
    Table,
    Id,
    ProjectId,
    Position,
    IssueTitle,
    IssueText,
    CreatedBy,
    AssignedTo,
    StatusText,
    Open,
    CreatedOn,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum Project { Table, Id }
