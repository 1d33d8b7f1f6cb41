//! Active Record operations against an in-memory SQLite database.

use quarry_core::{params, Param, SqlValue};
use quarry_db::{Database, DatabaseOptions};
use quarry_derive::Record;
use quarry_record::{ActiveRecord, Db, RecordError};

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct User {
    id: Option<i64>,
    acronym: Option<String>,
    password: Option<String>,
    #[record(db)]
    db: Option<Db>,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
#[record(table = "Book", id = "idColumn")]
struct Book {
    #[record(name = "idColumn")]
    id_column: Option<i64>,
    title: Option<String>,
    #[record(db)]
    db: Option<Db>,
}

async fn setup() -> Db {
    let options = DatabaseOptions::new("sqlite::memory:").table_prefix("mos_");
    let db = Db::new(Database::new(options));

    {
        let mut database = db.lock().await;
        database.connect().await.unwrap();
        let user = database.builder().create_table(
            "User",
            [
                ("id", vec!["integer", "primary key", "auto_increment"]),
                ("acronym", vec!["varchar(20)"]),
                ("password", vec!["varchar(80)"]),
            ],
        );
        database.execute(user, vec![]).await.unwrap();
        let book = database.builder().create_table(
            "Book",
            [
                ("idColumn", vec!["integer", "primary key"]),
                ("title", vec!["varchar(80)"]),
            ],
        );
        database.execute(book, vec![]).await.unwrap();
    }

    db
}

fn user(db: &Db, acronym: &str) -> User {
    User {
        acronym: Some(acronym.to_string()),
        password: Some(format!("{acronym}-secret")),
        db: Some(db.clone()),
        ..User::default()
    }
}

fn empty_user(db: &Db) -> User {
    let mut user = User::default();
    user.set_db(db.clone());
    user
}

// =============================================================================
// Save and find
// =============================================================================

#[tokio::test]
async fn test_save_inserts_and_sets_id() {
    let db = setup().await;

    let mut first = user(&db, "doe");
    first.save().await.unwrap();
    let mut second = user(&db, "moe");
    second.save().await.unwrap();

    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(2));
}

#[tokio::test]
async fn test_save_then_find_by_id_yields_equal_record() {
    let db = setup().await;
    let mut saved = user(&db, "doe");
    saved.save().await.unwrap();

    let mut found = empty_user(&db);
    assert!(found.find_by_id(saved.id.map(SqlValue::Int)).await.unwrap());
    assert_eq!(found, saved);
}

#[tokio::test]
async fn test_find_by_id_uses_own_id() {
    let db = setup().await;
    user(&db, "doe").save().await.unwrap();

    let mut found = empty_user(&db);
    found.id = Some(1);
    assert!(found.find_by_id(None).await.unwrap());
    assert_eq!(found.acronym.as_deref(), Some("doe"));
}

#[tokio::test]
async fn test_find_by_column() {
    let db = setup().await;
    user(&db, "doe").save().await.unwrap();
    user(&db, "moe").save().await.unwrap();

    let mut found = empty_user(&db);
    assert!(found.find("acronym", "moe").await.unwrap());
    assert_eq!(found.id, Some(2));

    let mut missing = empty_user(&db);
    assert!(!missing.find("acronym", "nobody").await.unwrap());
    assert_eq!(missing.id, None);
}

#[tokio::test]
async fn test_find_where() {
    let db = setup().await;
    user(&db, "doe").save().await.unwrap();
    user(&db, "moe").save().await.unwrap();

    let mut found = empty_user(&db);
    assert!(found
        .find_where("acronym = ? AND id > ?", params!["moe", 1])
        .await
        .unwrap());
    assert_eq!(found.id, Some(2));
}

#[tokio::test]
async fn test_save_updates_existing_row() {
    let db = setup().await;
    let mut saved = user(&db, "doe");
    saved.save().await.unwrap();

    saved.acronym = Some(String::from("jane"));
    saved.save().await.unwrap();
    assert_eq!(saved.id, Some(1));

    let all = empty_user(&db).find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].acronym.as_deref(), Some("jane"));
}

#[tokio::test]
async fn test_find_all_injects_handle() {
    let db = setup().await;
    for acronym in ["a", "b", "c"] {
        user(&db, acronym).save().await.unwrap();
    }

    let all = empty_user(&db).find_all().await.unwrap();
    let acronyms: Vec<_> = all.iter().filter_map(|u| u.acronym.as_deref()).collect();
    assert_eq!(acronyms, vec!["a", "b", "c"]);
    assert!(all.iter().all(|u| u.db() == Some(&db)));
}

#[tokio::test]
async fn test_find_all_where_scalar_and_list() {
    let db = setup().await;
    for acronym in ["a", "b", "c"] {
        user(&db, acronym).save().await.unwrap();
    }

    let scalar = empty_user(&db)
        .find_all_where("id > ?", 1_i64)
        .await
        .unwrap();
    assert_eq!(scalar.len(), 2);

    let list = empty_user(&db)
        .find_all_where("acronym IN (?)", Param::list(["a", "c", "x"]))
        .await
        .unwrap();
    let ids: Vec<_> = list.iter().filter_map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

// =============================================================================
// Save where and delete
// =============================================================================

#[tokio::test]
async fn test_save_where_updates_matching_rows() {
    let db = setup().await;
    for acronym in ["a", "b", "c"] {
        user(&db, acronym).save().await.unwrap();
    }

    let mut update = user(&db, "same");
    update
        .save_where("id IN (?)", params![Param::list([1, 2])])
        .await
        .unwrap();

    let same = empty_user(&db)
        .find_all_where("acronym = ?", "same")
        .await
        .unwrap();
    let ids: Vec<_> = same.iter().filter_map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_delete_clears_id() {
    let db = setup().await;
    let mut saved = user(&db, "doe");
    saved.save().await.unwrap();
    let old_id = saved.id.map(SqlValue::Int);

    saved.delete(None).await.unwrap();
    assert_eq!(saved.id, None);

    let mut found = empty_user(&db);
    assert!(!found.find_by_id(old_id).await.unwrap());
}

#[tokio::test]
async fn test_delete_by_explicit_id() {
    let db = setup().await;
    user(&db, "a").save().await.unwrap();
    user(&db, "b").save().await.unwrap();

    empty_user(&db)
        .delete(Some(SqlValue::Int(1)))
        .await
        .unwrap();

    let remaining = empty_user(&db).find_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, Some(2));
}

#[tokio::test]
async fn test_delete_where() {
    let db = setup().await;
    for acronym in ["a", "b", "c"] {
        user(&db, acronym).save().await.unwrap();
    }

    empty_user(&db)
        .delete_where("acronym <> ?", params!["b"])
        .await
        .unwrap();

    let remaining = empty_user(&db).find_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].acronym.as_deref(), Some("b"));
}

// =============================================================================
// Custom id column
// =============================================================================

#[tokio::test]
async fn test_custom_id_column() {
    let db = setup().await;

    let mut book = Book {
        title: Some(String::from("Comet in Moominland")),
        db: Some(db.clone()),
        ..Book::default()
    };
    book.save().await.unwrap();
    assert_eq!(book.id_column, Some(1));

    book.title = Some(String::from("Finn Family Moomintroll"));
    book.save().await.unwrap();

    let mut found = Book::default();
    found.set_db(db.clone());
    assert!(found.find_by_id(Some(SqlValue::Int(1))).await.unwrap());
    assert_eq!(found.title.as_deref(), Some("Finn Family Moomintroll"));

    found.delete(None).await.unwrap();
    assert_eq!(found.id_column, None);
    assert!(found.find_all().await.unwrap().is_empty());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_operations_without_db_fail() {
    let mut user = User {
        acronym: Some(String::from("doe")),
        ..User::default()
    };

    assert!(matches!(
        user.save().await,
        Err(RecordError::Configuration)
    ));
    assert!(matches!(
        user.find_by_id(Some(SqlValue::Int(1))).await,
        Err(RecordError::Configuration)
    ));
    assert!(matches!(
        user.find_all().await,
        Err(RecordError::Configuration)
    ));
    assert!(matches!(
        user.delete(None).await,
        Err(RecordError::Configuration)
    ));
}

#[tokio::test]
async fn test_unknown_table_is_a_db_error() {
    let db = Db::new(Database::new(DatabaseOptions::new("sqlite::memory:")));
    let err = empty_user(&db).find_all().await.unwrap_err();
    assert!(matches!(err, RecordError::Db(_)));
}
