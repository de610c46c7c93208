use super::{setup_test_db, skip_db_tests};
use crate::{issue, project};
use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

fn new_issue(project_id: Uuid, position: i64, title: &str) -> issue::ActiveModel {
    let now = Utc::now().into();
    issue::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project_id),
        position: Set(position),
        issue_title: Set(title.to_string()),
        issue_text: Set("text".to_string()),
        created_by: Set("tester".to_string()),
        assigned_to: Set(String::new()),
        status_text: Set(String::new()),
        open: Set("true".to_string()),
        created_on: Set(now),
        updated_on: Set(now),
    }
}

/// ensure_locked is idempotent and issues list in position order
#[tokio::test]
async fn test_project_issue_crud() -> Result<()> {
    if skip_db_tests() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    let name = format!("crud_project_{}", Uuid::new_v4());

    let txn = db.begin().await?;
    let p = project::ensure_locked(&txn, &name).await?;
    txn.commit().await?;

    let txn = db.begin().await?;
    let again = project::ensure_locked(&txn, &name).await?;
    txn.commit().await?;
    assert_eq!(p.id, again.id);

    assert_eq!(issue::next_position(&db, p.id).await?, 0);
    let first = new_issue(p.id, 0, "first").insert(&db).await?;
    assert_eq!(issue::next_position(&db, p.id).await?, 1);
    let second = new_issue(p.id, 1, "second").insert(&db).await?;

    let listed = issue::list_for_project(&db, p.id).await?;
    let titles: Vec<_> = listed.iter().map(|i| i.issue_title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second"]);

    assert!(issue::find_in_project(&db, p.id, first.id).await?.is_some());
    assert!(issue::find_in_project(&db, Uuid::new_v4(), first.id).await?.is_none());

    assert!(issue::delete_in_project(&db, p.id, second.id).await?);
    assert!(!issue::delete_in_project(&db, p.id, second.id).await?);
    assert_eq!(issue::list_for_project(&db, p.id).await?.len(), 1);

    // cascade removes remaining issues
    project::Entity::delete_by_id(p.id).exec(&db).await?;
    assert!(issue::Entity::find_by_id(first.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_find_by_name_missing() -> Result<()> {
    if skip_db_tests() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    let missing = project::find_by_name(&db, &format!("missing_{}", Uuid::new_v4())).await?;
    assert!(missing.is_none());
    assert!(project::ensure_locked(&db, "").await.is_err());
    Ok(())
}

/// Free-text columns take values of any length
#[tokio::test]
async fn test_long_free_text_values() -> Result<()> {
    if skip_db_tests() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    let name = format!("{}_{}", "n".repeat(400), Uuid::new_v4());

    let txn = db.begin().await?;
    let p = project::ensure_locked(&txn, &name).await?;
    txn.commit().await?;

    let mut am = new_issue(p.id, 0, "long");
    am.created_by = Set("c".repeat(1000));
    am.assigned_to = Set("a".repeat(1000));
    let row = am.insert(&db).await?;
    assert_eq!(row.created_by.len(), 1000);
    assert_eq!(project::find_by_name(&db, &name).await?.map(|m| m.id), Some(p.id));

    project::Entity::delete_by_id(p.id).exec(&db).await?;
    Ok(())
}
