use super::*;
use crate::client::ExecResult;
use crate::testing::{MemoryDatabase, registry_of};
use std::time::Duration;

struct Fixture {
    master: MemoryDatabase,
    slave: MemoryDatabase,
    dao: Dao,
}

fn fixture() -> Fixture {
    let master = MemoryDatabase::new("master")
        .with_rows(&["id", "name"], vec![vec![Value::Int(1), Value::Text("li".into())]])
        .with_exec(ExecResult::new(1, Some(42)));
    let slave = MemoryDatabase::new("slave").with_rows(
        &["id", "name", "avatar"],
        vec![vec![
            Value::Int(2),
            Value::Text("wang".into()),
            Value::bytes(b"png".to_vec()),
        ]],
    );
    let dao = Dao::new(TableBinding::new("student", "master").with_replica("slave"))
        .with_registry(registry_of(&[&master, &slave]));
    Fixture { master, slave, dao }
}

#[tokio::test]
async fn insert_returns_generated_id() {
    let f = fixture();
    let id = f
        .dao
        .insert(
            &ExecContext::new(),
            [("name", Value::from("a")), ("age", Value::from(30))],
        )
        .await
        .unwrap();
    assert_eq!(id, 42);

    let calls = f.master.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].sql, "insert into `student`(`name`, `age`) values (?, ?)");
    assert_eq!(calls[0].args, vec![Value::from("a"), Value::Int(30)]);
    assert!(f.slave.calls().is_empty());
}

#[tokio::test]
async fn insert_without_generated_id_fails() {
    let master = MemoryDatabase::new("master").with_exec(ExecResult::new(1, None));
    let dao = Dao::new(TableBinding::new("student", "master"))
        .with_registry(registry_of(&[&master]));
    let err = dao
        .insert(&ExecContext::new(), [("name", "a")])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Other(_)));
}

#[tokio::test]
async fn deferred_errors_stop_before_the_driver() {
    let f = fixture();
    let w = wrapper().where_op("age", "~=", 3).eq("id", 1);
    let err = f.dao.select_by_wrapper::<Row>(&ExecContext::new(), w).await.unwrap_err();
    assert!(matches!(err, DbError::Wrapper(ref msg) if msg.contains("~=")));
    assert!(f.master.calls().is_empty());
    assert!(f.slave.calls().is_empty());
}

#[tokio::test]
async fn invalid_binding_is_reported_first() {
    let f = fixture();
    let dao = Dao::new(TableBinding::new("student", "")).with_registry(registry_of(&[&f.master]));
    let w = wrapper().where_op("age", "~=", 3);
    let err = dao.count_by_wrapper(&ExecContext::new(), w).await.unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn reads_use_replica_unless_primary_requested() {
    let f = fixture();
    let ctx = ExecContext::new();

    let rows: Vec<Row> = f.dao.select_by_wrapper(&ctx, wrapper().eq("id", 2)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(f.slave.calls().len(), 1);
    assert!(f.master.calls().is_empty());

    f.dao
        .select_by_wrapper::<Row>(&ctx, wrapper().eq("id", 1).use_primary(true))
        .await
        .unwrap();
    assert_eq!(f.master.calls().len(), 1);
}

#[tokio::test]
async fn writes_always_use_primary() {
    let f = fixture();
    let ctx = ExecContext::new();
    f.dao
        .update_by_wrapper(&ctx, wrapper().set("name", "b").eq("id", 1))
        .await
        .unwrap();
    f.dao.delete_by_id(&ctx, "id", 1).await.unwrap();
    assert_eq!(f.master.calls().len(), 2);
    assert!(f.slave.calls().is_empty());
}

#[tokio::test]
async fn transaction_wins_over_routing() {
    let f = fixture();
    let tx = f.dao.registry.as_ref().unwrap().begin("master").await.unwrap();
    let ctx = ExecContext::new().with_transaction(&tx);

    f.dao
        .update_by_wrapper(&ctx, wrapper().set("name", "b").eq("id", 1))
        .await
        .unwrap();
    f.dao.select_by_wrapper::<Row>(&ctx, wrapper()).await.unwrap();
    f.dao.get_by_id::<Row>(&ctx, "id", 1).await.unwrap();
    tx.commit().await.unwrap();

    let labels: Vec<_> = f.master.calls().into_iter().map(|c| c.connection).collect();
    assert_eq!(labels, ["master:tx", "master:tx", "master:tx"]);
    assert!(f.slave.calls().is_empty());
    assert_eq!(f.master.finished(), ["master:tx commit"]);
}

#[tokio::test]
async fn update_by_id_skips_id_column() {
    let f = fixture();
    let affected = f
        .dao
        .update_by_id(
            &ExecContext::new(),
            [("id", Value::from(9)), ("name", Value::from("b"))],
            "id",
            9,
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let call = &f.master.calls()[0];
    assert_eq!(call.sql, "update student set `name` = ? where `id` = ?");
    assert_eq!(call.args, vec![Value::from("b"), Value::Int(9)]);
}

#[tokio::test]
async fn update_without_condition_is_rejected() {
    let f = fixture();
    let err = f
        .dao
        .update_by_wrapper(&ExecContext::new(), wrapper().set("name", "b"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_query());
    assert!(f.master.calls().is_empty());
}

#[tokio::test]
async fn select_map_converts_bytes_to_text() {
    let f = fixture();
    let rows = f
        .dao
        .select_map_by_wrapper(&ExecContext::new(), wrapper().eq("id", 2))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["avatar"], Value::Text("png".into()));
    assert_eq!(rows[0]["name"], Value::Text("wang".into()));
    assert_eq!(
        f.slave.calls()[0].sql,
        "select * from student where `id` = ? limit 0,1024"
    );
}

#[tokio::test]
async fn get_by_id_uses_single_row_select() {
    let f = fixture();
    let row: BTreeMap<String, Value> = f.dao.get_by_id(&ExecContext::new(), "id", 2).await.unwrap();
    assert_eq!(row["name"], Value::Text("wang".into()));
    assert_eq!(
        f.slave.calls()[0].sql,
        "select * from student where `id` = ? limit 0,1"
    );
}

#[tokio::test]
async fn get_by_id_without_rows_is_not_found() {
    let master = MemoryDatabase::new("master");
    let dao = Dao::new(TableBinding::new("student", "master"))
        .with_registry(registry_of(&[&master]));
    let err = dao
        .get_by_id::<Row>(&ExecContext::new(), "id", 7)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn count_reads_cn_column() {
    let slave = MemoryDatabase::new("slave").with_rows(&["cn"], vec![vec![Value::Int(12)]]);
    let master = MemoryDatabase::new("master");
    let dao = Dao::new(TableBinding::new("student", "master").with_replica("slave"))
        .with_registry(registry_of(&[&master, &slave]));

    let n = dao
        .count_by_wrapper(&ExecContext::new(), wrapper().gt("age", 18).page(3))
        .await
        .unwrap();
    assert_eq!(n, 12);
    assert_eq!(
        slave.calls()[0].sql,
        "select count(1) as cn from student where `age` > ? limit 0,1"
    );
}

#[tokio::test]
async fn table_override_is_honored() {
    let f = fixture();
    f.dao
        .delete_by_wrapper(
            &ExecContext::new(),
            wrapper().table_name("student_2024").eq("id", 1),
        )
        .await
        .unwrap();
    assert_eq!(
        f.master.calls()[0].sql,
        "delete from student_2024 where `id` = ?"
    );
}

#[tokio::test]
async fn unknown_connection_is_config_error() {
    let master = MemoryDatabase::new("master");
    let dao = Dao::new(TableBinding::new("student", "master").with_replica("missing"))
        .with_registry(registry_of(&[&master]));
    let err = dao
        .select_by_wrapper::<Row>(&ExecContext::new(), wrapper())
        .await
        .unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn timeout_abandons_statement() {
    let master = MemoryDatabase::new("master").with_delay(Duration::from_secs(60));
    let dao = Dao::new(TableBinding::new("student", "master"))
        .with_registry(registry_of(&[&master]));
    let ctx = ExecContext::new().with_timeout(Duration::from_millis(10));

    let err = dao
        .select_by_wrapper::<Row>(&ctx, wrapper())
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn timeout_bounds_row_stream() {
    let slave = MemoryDatabase::new("slave")
        .with_rows(&["id"], vec![vec![Value::Int(1)], vec![Value::Int(2)]])
        .with_row_delay(Duration::from_secs(60));
    let master = MemoryDatabase::new("master");
    let dao = Dao::new(TableBinding::new("student", "master").with_replica("slave"))
        .with_registry(registry_of(&[&master, &slave]));
    let ctx = ExecContext::new().with_timeout(Duration::from_millis(10));

    let err = dao
        .select_map_by_wrapper(&ctx, wrapper().eq("id", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Timeout(d) if d == Duration::from_millis(10)));
    assert_eq!(slave.calls().len(), 1);
}

#[tokio::test]
async fn failed_set_json_sends_nothing() {
    let f = fixture();
    let mut bad = BTreeMap::new();
    bad.insert((1, 2), "x");

    let w = wrapper().set("name", "b").set_json("extra", &bad);
    let err = f.dao.insert_by_wrapper(&ExecContext::new(), w).await.unwrap_err();
    assert!(matches!(err, DbError::Wrapper(ref msg) if msg.contains("extra")));

    let w = wrapper().set_json("extra", &bad).eq("id", 1);
    let err = f.dao.update_by_wrapper(&ExecContext::new(), w).await.unwrap_err();
    assert!(matches!(err, DbError::Wrapper(_)));

    assert!(f.master.calls().is_empty());
    assert!(f.slave.calls().is_empty());
}
