use sea_orm::{entity::prelude::*, sea_query::Expr, ConnectionTrait, QueryOrder, QuerySelect};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors, project};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub position: i64,
    #[sea_orm(column_type = "Text")]
    pub issue_title: String,
    #[sea_orm(column_type = "Text")]
    pub issue_text: String,
    #[sea_orm(column_type = "Text")]
    pub created_by: String,
    #[sea_orm(column_type = "Text")]
    pub assigned_to: String,
    #[sea_orm(column_type = "Text")]
    pub status_text: String,
    pub open: String,
    pub created_on: DateTimeWithTimeZone,
    pub updated_on: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Project }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Project => Entity::belongs_to(project::Entity)
                .from(Column::ProjectId)
                .to(project::Column::Id)
                .into(),
        }
    }
}

impl Related<project::Entity> for Entity {
    fn to() -> RelationDef { Relation::Project.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Position for the next issue appended to a project.
pub async fn next_position<C: ConnectionTrait>(db: &C, project_id: Uuid) -> Result<i64, errors::ModelError> {
    let max = Entity::find()
        .select_only()
        .column_as(Expr::col(Column::Position).max(), "max_position")
        .filter(Column::ProjectId.eq(project_id))
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?;
    Ok(max.flatten().map(|p| p + 1).unwrap_or(0))
}

/// Issues of a project in insertion order.
pub async fn list_for_project<C: ConnectionTrait>(db: &C, project_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    let rows = Entity::find()
        .filter(Column::ProjectId.eq(project_id))
        .order_by_asc(Column::Position)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn find_in_project<C: ConnectionTrait>(db: &C, project_id: Uuid, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    let found = Entity::find_by_id(id)
        .filter(Column::ProjectId.eq(project_id))
        .one(db)
        .await?;
    Ok(found)
}

/// Delete by id scoped to a project; returns true if a row was removed.
pub async fn delete_in_project<C: ConnectionTrait>(db: &C, project_id: Uuid, id: Uuid) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::ProjectId.eq(project_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected > 0)
}
