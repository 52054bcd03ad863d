use super::SeaOrmDatabase;
use crate::config::DatabaseConfig;
use crate::core::models::{ApiKeyRecord, AuditEntry, AuditQuery, NewManagedModel};
use chrono::{Duration, Utc};

async fn memory_db() -> SeaOrmDatabase {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        ..Default::default()
    };
    let db = SeaOrmDatabase::new(&config).await.unwrap();
    db.migrate().await.unwrap();
    db
}

fn key_record(id: &str, owner: Option<&str>) -> ApiKeyRecord {
    ApiKeyRecord {
        id: id.to_string(),
        name: format!("key {}", id),
        key_hash: "00$ff".to_string(),
        key_hint: "odgw_...abcd".to_string(),
        owner: owner.map(str::to_string),
        rate_limit_rpm: 60,
        is_active: true,
        created_at: Utc::now(),
        expires_at: None,
        last_used_at: None,
    }
}

fn audit_entry(operation: &str, api_key_id: Option<&str>, age: Duration) -> AuditEntry {
    AuditEntry {
        id: None,
        request_id: uuid::Uuid::new_v4().to_string(),
        operation: operation.to_string(),
        identity: api_key_id.unwrap_or("ip:127.0.0.1").to_string(),
        api_key_id: api_key_id.map(str::to_string),
        owner: None,
        source_ip: Some("127.0.0.1".to_string()),
        user_agent: None,
        request_payload: Some("{}".to_string()),
        response_status: 200,
        latency_ms: 10,
        error_message: None,
        created_at: Utc::now() - age,
    }
}

#[tokio::test]
async fn test_api_key_crud() {
    let db = memory_db().await;
    db.create_api_key(&key_record("a", Some("alice"))).await.unwrap();
    db.create_api_key(&key_record("b", None)).await.unwrap();

    let found = db.find_api_key("a").await.unwrap().unwrap();
    assert_eq!(found.owner.as_deref(), Some("alice"));
    assert_eq!(found.key_hash, "00$ff");

    assert_eq!(db.list_api_keys(None).await.unwrap().len(), 2);
    assert_eq!(db.list_api_keys(Some("alice")).await.unwrap().len(), 1);

    assert!(db.deactivate_api_key("a").await.unwrap());
    assert!(!db.deactivate_api_key("missing").await.unwrap());
    assert_eq!(db.list_active_api_keys().await.unwrap().len(), 1);

    assert!(db.delete_api_key("b").await.unwrap());
    assert!(!db.delete_api_key("b").await.unwrap());
}

#[tokio::test]
async fn test_touch_api_key() {
    let db = memory_db().await;
    db.create_api_key(&key_record("a", None)).await.unwrap();

    db.touch_api_key("a", Utc::now()).await.unwrap();
    let found = db.find_api_key("a").await.unwrap().unwrap();
    assert!(found.last_used_at.is_some());
}

#[tokio::test]
async fn test_key_deletion_keeps_audit_history() {
    let db = memory_db().await;
    db.create_api_key(&key_record("a", None)).await.unwrap();
    db.insert_request_log(&audit_entry("search_records", Some("a"), Duration::zero()))
        .await
        .unwrap();

    db.delete_api_key("a").await.unwrap();

    let (entries, total) = db
        .query_request_logs(&AuditQuery::default(), 10, 0)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(entries[0].identity, "a");
    assert!(entries[0].api_key_id.is_none());
}

#[tokio::test]
async fn test_query_request_logs_filters() {
    let db = memory_db().await;
    db.create_api_key(&key_record("a", None)).await.unwrap();
    db.insert_request_log(&audit_entry("search_records", Some("a"), Duration::hours(2)))
        .await
        .unwrap();
    db.insert_request_log(&audit_entry("create_record", Some("a"), Duration::hours(1)))
        .await
        .unwrap();
    db.insert_request_log(&audit_entry("search_records", None, Duration::zero()))
        .await
        .unwrap();

    let filters = AuditQuery {
        operation: Some("search".to_string()),
        ..Default::default()
    };
    let (entries, total) = db.query_request_logs(&filters, 10, 0).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(entries[0].identity, "ip:127.0.0.1");

    let filters = AuditQuery {
        api_key_id: Some("a".to_string()),
        ..Default::default()
    };
    let (entries, total) = db.query_request_logs(&filters, 1, 0).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].operation, "create_record");

    let filters = AuditQuery {
        start: Some(Utc::now() - Duration::minutes(90)),
        ..Default::default()
    };
    let (_, total) = db.query_request_logs(&filters, 10, 0).await.unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_delete_request_logs_before() {
    let db = memory_db().await;
    db.insert_request_log(&audit_entry("a", None, Duration::days(10)))
        .await
        .unwrap();
    db.insert_request_log(&audit_entry("b", None, Duration::days(1)))
        .await
        .unwrap();

    let removed = db
        .delete_request_logs_before(Utc::now() - Duration::days(5))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(db.request_log_summary().await.unwrap().0, 1);
}

#[tokio::test]
async fn test_request_log_aggregates() {
    let db = memory_db().await;
    assert_eq!(db.request_log_summary().await.unwrap(), (0, None));
    assert!(db.request_log_status_counts().await.unwrap().is_empty());

    for (status, latency) in [(200, 10), (200, 30), (401, 5), (502, 75)] {
        let mut entry = audit_entry("op", None, Duration::minutes(1));
        entry.response_status = status;
        entry.latency_ms = latency;
        db.insert_request_log(&entry).await.unwrap();
    }

    let (total, average) = db.request_log_summary().await.unwrap();
    assert_eq!(total, 4);
    assert_eq!(average, Some(30.0));

    let mut counts = db.request_log_status_counts().await.unwrap();
    counts.sort();
    assert_eq!(counts, vec![(200, 2), (401, 1), (502, 1)]);
}

#[tokio::test]
async fn test_managed_model_upsert() {
    let db = memory_db().await;
    let input = NewManagedModel {
        model: "res.partner".to_string(),
        name: "Partner".to_string(),
        description: None,
        enabled: true,
    };
    let first = db.upsert_managed_model(&input).await.unwrap();

    let updated = db
        .upsert_managed_model(&NewManagedModel {
            enabled: false,
            ..input
        })
        .await
        .unwrap();
    assert_eq!(first.id, updated.id);
    assert!(!updated.enabled);

    assert!(db.list_managed_models(true).await.unwrap().is_empty());
    assert_eq!(db.list_managed_models(false).await.unwrap().len(), 1);
    assert!(db.delete_managed_model("res.partner").await.unwrap());
    assert!(db.find_managed_model("res.partner").await.unwrap().is_none());
}
