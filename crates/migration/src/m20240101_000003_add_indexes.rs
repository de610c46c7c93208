use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Issue listing: (project_id, position) drives ordered scans per project
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_issue_project_position")
                    .table(Issue::Table)
                    .col(Issue::ProjectId)
                    .col(Issue::Position)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_issue_project_position").table(Issue::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Issue { Table, ProjectId, Position }
