use sea_orm::{
    entity::prelude::*, sea_query::OnConflict, ConnectionTrait, QuerySelect, Set,
};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, issue};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text", unique)]
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Issue }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Issue => Entity::has_many(issue::Entity).into(),
        }
    }
}

impl Related<issue::Entity> for Entity {
    fn to() -> RelationDef { Relation::Issue.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> Result<Option<Model>, errors::ModelError> {
    let found = Entity::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await?;
    Ok(found)
}

/// Find by name and hold a row lock until the surrounding transaction ends.
pub async fn lock_by_name<C: ConnectionTrait>(db: &C, name: &str) -> Result<Option<Model>, errors::ModelError> {
    let found = Entity::find()
        .filter(Column::Name.eq(name))
        .lock_exclusive()
        .one(db)
        .await?;
    Ok(found)
}

/// Insert the project unless it already exists, then lock and return it.
/// Concurrent callers racing on the same name converge on a single row.
pub async fn ensure_locked<C: ConnectionTrait>(db: &C, name: &str) -> Result<Model, errors::ModelError> {
    if name.is_empty() {
        return Err(errors::ModelError::Validation("project name required".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now().into()),
    };
    Entity::insert(am)
        .on_conflict(OnConflict::column(Column::Name).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    lock_by_name(db, name)
        .await?
        .ok_or_else(|| errors::ModelError::Db(format!("project {name} vanished after insert")))
}
