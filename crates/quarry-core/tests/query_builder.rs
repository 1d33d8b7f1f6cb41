//! Rendered SQL for every builder statement, with a `mos_` table prefix.

use quarry_core::{BuildError, Dialect, QueryBuilder, SqlValue, ToSqlValue};

fn query() -> QueryBuilder {
    QueryBuilder::new().set_table_prefix("mos_")
}

// =============================================================================
// Schema statements
// =============================================================================

#[test]
fn test_create_table() {
    let sql = query()
        .create_table(
            "test",
            [
                ("id", vec!["integer", "primary key", "not null"]),
                ("age", vec!["integer"]),
                ("text", vec!["varchar(20)"]),
                ("text2", vec!["varchar(20)"]),
            ],
        )
        .get_sql();

    assert_eq!(
        sql,
        "CREATE TABLE mos_test\n(\n\tid integer primary key not null,\n\tage integer,\n\ttext varchar(20),\n\ttext2 varchar(20)\n);\n"
    );
}

#[test]
fn test_create_table_strips_auto_increment_on_sqlite() {
    let columns = [
        ("id", vec!["integer", "primary key", "auto_increment"]),
        ("name", vec!["varchar(20)"]),
    ];

    let sqlite = query()
        .set_dialect(Dialect::Sqlite)
        .create_table("test", columns.clone())
        .get_sql();
    assert!(!sqlite.contains("auto_increment"));
    assert!(sqlite.contains("\tid integer primary key ,\n"));

    let mysql = query()
        .set_dialect(Dialect::MySql)
        .create_table("test", columns)
        .get_sql();
    assert!(mysql.contains("\tid integer primary key auto_increment,\n"));
}

#[test]
fn test_drop_table() {
    assert_eq!(query().drop_table("test").get_sql(), "DROP TABLE mos_test;\n");
}

#[test]
fn test_drop_table_if_exists() {
    assert_eq!(
        query().drop_table_if_exists("test").get_sql(),
        "DROP TABLE IF EXISTS mos_test;\n"
    );
}

// =============================================================================
// SELECT
// =============================================================================

#[test]
fn test_select_where_without_prefix() {
    let sql = QueryBuilder::new()
        .select("*")
        .from("user")
        .where_clause("id = 1")
        .get_sql();

    assert_eq!(sql, "SELECT\n\t*\nFROM user\nWHERE\n\t(id = 1)\n;");
}

#[test]
fn test_select_where_and_where() {
    let sql = query()
        .select("*")
        .from("test")
        .where_clause("id = 1")
        .and_where("name = mumin")
        .get_sql();

    assert_eq!(
        sql,
        "SELECT\n\t*\nFROM mos_test\nWHERE\n\t(id = 1)\n\tAND (name = mumin)\n;"
    );
}

#[test]
fn test_select_limit_offset() {
    let sql = query()
        .select("*")
        .from("test")
        .limit("1")
        .offset("2")
        .get_sql();

    assert_eq!(sql, "SELECT\n\t*\nFROM mos_test\nLIMIT \n\t1\nOFFSET \n\t2\n;");
}

#[test]
fn test_group_by() {
    let sql = query().select_all().from("test").group_by("test").get_sql();
    assert_eq!(sql, "SELECT\n\t*\nFROM mos_test\nGROUP BY test\n;");
}

#[test]
fn test_order_by() {
    let sql = query().select_all().from("test").order_by("test").get_sql();
    assert_eq!(sql, "SELECT\n\t*\nFROM mos_test\nORDER BY test\n;");
}

#[test]
fn test_inner_join() {
    let sql = query()
        .select("t1.*, t2.id AS id2, t3.id AS id3")
        .from("test AS t1")
        .join("test AS t2", "t1.id = t2.id")
        .join("test AS t3", "t1.id = t3.id")
        .get_sql();

    assert_eq!(
        sql,
        "SELECT\n\tt1.*, t2.id AS id2, t3.id AS id3\nFROM mos_test AS t1\nINNER JOIN mos_test AS t2\n\tON t1.id = t2.id\nINNER JOIN mos_test AS t3\n\tON t1.id = t3.id\n;"
    );
}

#[test]
fn test_left_join() {
    let sql = query()
        .select("t1.*, t2.id AS id2, t3.id AS id3")
        .from("test AS t1")
        .left_join("test AS t2", "t1.id = t2.id")
        .left_join("test AS t3", "t1.id = t3.id")
        .get_sql();

    assert_eq!(
        sql,
        "SELECT\n\tt1.*, t2.id AS id2, t3.id AS id3\nFROM mos_test AS t1\nLEFT OUTER JOIN mos_test AS t2\n\tON t1.id = t2.id\nLEFT OUTER JOIN mos_test AS t3\n\tON t1.id = t3.id\n;"
    );
}

#[test]
fn test_right_join() {
    let sql = query()
        .select("t1.*, t2.id AS id2, t3.id AS id3")
        .from("test AS t1")
        .right_join("test AS t2", "t1.id = t2.id")
        .and_then(|q| q.right_join("test AS t3", "t1.id = t3.id"))
        .unwrap()
        .get_sql();

    assert_eq!(
        sql,
        "SELECT\n\tt1.*, t2.id AS id2, t3.id AS id3\nFROM mos_test AS t1\nRIGHT OUTER JOIN mos_test AS t2\n\tON t1.id = t2.id\nRIGHT OUTER JOIN mos_test AS t3\n\tON t1.id = t3.id\n;"
    );
}

#[test]
fn test_right_join_fails_on_sqlite() {
    let result = query()
        .set_dialect(Dialect::Sqlite)
        .select("*")
        .from("test AS t1")
        .right_join("test AS t2", "t1.id = t2.id");

    assert!(matches!(result, Err(BuildError::Unsupported { .. })));
}

// =============================================================================
// INSERT / UPDATE / DELETE
// =============================================================================

#[test]
fn test_insert_single_row_pairs() {
    let sql = query()
        .insert(
            "test",
            [
                ("id", 2_i64.to_sql_value()),
                ("text", "Mumintrollet".to_sql_value()),
                ("text2", "Mumindalen".to_sql_value()),
            ],
            None,
        )
        .unwrap()
        .get_sql();

    assert_eq!(
        sql,
        "INSERT INTO mos_test\n\t(id, text, text2)\n\tVALUES\n\t(2, 'Mumintrollet', 'Mumindalen');\n"
    );
}

#[test]
fn test_insert_single_row_two_lists() {
    let sql = query()
        .insert(
            "test",
            ["id", "text", "text2"],
            Some(vec![
                2_i64.to_sql_value(),
                "Mumintrollet".to_sql_value(),
                "Mumindalen".to_sql_value(),
            ]),
        )
        .unwrap()
        .get_sql();

    assert_eq!(
        sql,
        "INSERT INTO mos_test\n\t(id, text, text2)\n\tVALUES\n\t(2, 'Mumintrollet', 'Mumindalen');\n"
    );
}

#[test]
fn test_insert_single_row_no_values() {
    let sql = query()
        .insert("test", ["id", "text", "text2"], None)
        .unwrap()
        .get_sql();

    assert_eq!(
        sql,
        "INSERT INTO mos_test\n\t(id, text, text2)\n\tVALUES\n\t(?, ?, ?);\n"
    );
}

#[test]
fn test_insert_mixes_placeholders_and_literals() {
    let sql = query()
        .insert(
            "test",
            ["id", "text"],
            Some(vec![SqlValue::placeholder(), "it's".to_sql_value()]),
        )
        .unwrap()
        .get_sql();

    assert_eq!(
        sql,
        "INSERT INTO mos_test\n\t(id, text)\n\tVALUES\n\t(?, 'it''s');\n"
    );
}

#[test]
fn test_insert_fails_on_count_mismatch() {
    let result = query().insert(
        "test",
        ["id", "text"],
        Some(vec![1_i64.to_sql_value(), 2_i64.to_sql_value(), 3_i64.to_sql_value()]),
    );

    assert_eq!(
        result.unwrap_err(),
        BuildError::ColumnCountMismatch {
            columns: 2,
            values: 3,
        }
    );
}

#[test]
fn test_update_two_lists() {
    let sql = query()
        .update(
            "test",
            ["age", "text", "text1"],
            Some(vec![
                22_i64.to_sql_value(),
                "Mumintrollet".to_sql_value(),
                "asd".to_sql_value(),
            ]),
        )
        .unwrap()
        .where_clause("id = ?")
        .get_sql();

    assert_eq!(
        sql,
        "UPDATE mos_test\nSET\n\tage = 22,\n\ttext = 'Mumintrollet',\n\ttext1 = 'asd'\nWHERE\n\t(id = ?)\n;"
    );
}

#[test]
fn test_update_fails_on_count_mismatch() {
    let result = query().update("test", ["age", "text"], Some(vec![22_i64.to_sql_value()]));
    assert!(matches!(
        result,
        Err(BuildError::ColumnCountMismatch {
            columns: 2,
            values: 1,
        })
    ));
}

#[test]
fn test_delete() {
    assert_eq!(
        query().delete_from("test", None).get_sql(),
        "DELETE\nFROM mos_test\n;"
    );
}

#[test]
fn test_delete_where() {
    assert_eq!(
        query().delete_from("test", Some("id = 2")).get_sql(),
        "DELETE\nFROM mos_test\nWHERE\n\t(id = 2)\n;"
    );
}
