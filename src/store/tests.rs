use super::*;
use crate::clock::FixedClock;
use crate::models::{DutyColor, DutyDraft};
use crate::remote::memory::{session_for, MemoryTable};
use crate::storage::{keys, FileStore, KeyValueStore, MemoryStore};
use chrono::Duration;
use pretty_assertions::assert_eq;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
}

fn date(s: &str) -> NaiveDate {
    crate::models::duty::parse_date(s).unwrap()
}

fn local_with(entries: &[(&str, &str)]) -> LocalPersistence {
    let mut store = MemoryStore::default();
    for (k, v) in entries {
        store.set(k, v).unwrap();
    }
    LocalPersistence::new(Box::new(store))
}

/// 本地模式，已有一个空列表（不会回退到示例数据）
fn local_store() -> DutyStore {
    let mut store = DutyStore::new(
        local_with(&[(keys::DUTIES, "[]")]),
        None,
        Box::new(FixedClock::on(today())),
    );
    store.load();
    store
}

/// 已登录的远端模式
fn remote_store(table: &MemoryTable) -> DutyStore {
    let mut local = local_with(&[]);
    crate::remote::save_session(&mut local, &session_for("alice")).unwrap();
    let mut store = DutyStore::new(
        local,
        Some(Box::new(table.clone())),
        Box::new(FixedClock::on(today())),
    );
    store.load();
    store
}

#[test]
fn test_load_falls_back_to_samples() {
    let mut store = DutyStore::new(local_with(&[]), None, Box::new(FixedClock::on(today())));
    store.load();

    assert_eq!(store.backend(), Backend::Local);
    assert_eq!(store.duties().len(), 2);
    assert!(store.duties().iter().all(|d| !d.completed_days.is_empty()));
    // 示例数据不会被主动写入
    assert!(store.local().load_duties(store.now()).is_none());
}

#[test]
fn test_malformed_local_data_falls_back() {
    let mut store = DutyStore::new(
        local_with(&[(keys::DUTIES, "[{\"broken\": "), (keys::ARCHIVED_DUTIES, "42")]),
        None,
        Box::new(FixedClock::on(today())),
    );
    store.load();

    assert_eq!(store.duties().len(), 2);
    assert!(store.archive().is_empty());
}

#[test]
fn test_create_then_toggle_meditate() {
    let mut store = local_store();

    let id = store.create(DutyDraft::named("Meditate")).unwrap();
    let created = store.find(id).unwrap();
    assert_eq!(created.duration, 66);
    assert!(created.completed_days.is_empty());

    assert_eq!(store.toggle_day(id, date("2024-01-15")), Some(true));

    let duty = store.find(id).unwrap();
    assert_eq!(duty.duration, 66);
    assert_eq!(crate::models::remote::format_days(&duty.completed_days), vec!["2024-01-15"]);

    // 每次修改都整体写回本地
    let persisted = store.local().load_duties(store.now()).unwrap();
    assert_eq!(persisted, store.duties().to_vec());
}

#[test]
fn test_create_rejects_blank_name() {
    let mut store = local_store();

    let err = store.create(DutyDraft::named("   ")).unwrap_err();
    assert!(matches!(err, StoreError::InvalidDraft(_)));

    let mut draft = DutyDraft::named("Too long");
    draft.duration = 400;
    assert!(store.create(draft).is_err());

    assert!(store.duties().is_empty());
}

#[test]
fn test_created_ids_are_unique() {
    let mut store = local_store();
    let a = store.create(DutyDraft::named("a")).unwrap();
    let b = store.create(DutyDraft::named("b")).unwrap();

    assert_ne!(a, b);
    assert_eq!(a, FixedClock::on(today()).now.timestamp_millis());
    assert_eq!(b, a + 1);
}

#[test]
fn test_toggle_unknown_duty_is_noop() {
    let mut store = local_store();
    store.create(DutyDraft::named("Walk")).unwrap();
    let before = store.duties().to_vec();

    assert_eq!(store.toggle_day(-1, today()), None);
    assert_eq!(store.duties(), before.as_slice());
}

#[test]
fn test_toggle_twice_restores() {
    let mut store = local_store();
    let id = store.create(DutyDraft::named("Walk")).unwrap();

    store.toggle_day(id, today());
    store.toggle_day(id, today());
    assert!(store.find(id).unwrap().completed_days.is_empty());

    store.toggle_day(id, today());
    store.toggle_day(id, today());
    store.toggle_day(id, today());
    assert!(store.find(id).unwrap().is_completed(today()));
}

#[test]
fn test_delete_archives_and_re_add_restores() {
    let mut store = local_store();
    let mut draft = DutyDraft::named("Journal");
    draft.description = "one line a day".to_string();
    draft.color = DutyColor::Teal;
    draft.icon = "🌱".to_string();
    draft.duration = 30;
    let id = store.create(draft).unwrap();
    store.toggle_day(id, date("2024-01-19"));
    let original = store.find(id).unwrap().clone();

    assert!(store.delete(id));
    assert!(store.find(id).is_none());
    assert_eq!(store.archive().len(), 1);
    assert_eq!(store.archive().get(id), Some(&original));
    assert!(store.local().load_duties(store.now()).unwrap().is_empty());
    assert_eq!(store.local().load_archive(store.now()), vec![original.clone()]);

    // 再删一次不会重复归档
    assert!(!store.delete(id));
    assert_eq!(store.archive().len(), 1);

    assert_eq!(store.re_add(id), Some(id));
    assert!(store.archive().is_empty());
    assert_eq!(store.find(id), Some(&original));
    assert!(store.local().load_archive(store.now()).is_empty());
    assert_eq!(store.local().load_duties(store.now()).unwrap(), vec![original]);
}

#[test]
fn test_delete_archived_is_permanent() {
    let mut store = local_store();
    let id = store.create(DutyDraft::named("Gone")).unwrap();
    store.delete(id);

    assert!(store.delete_archived(id));
    assert!(store.archive().is_empty());
    assert!(store.re_add(id).is_none());
    assert!(!store.delete_archived(id));
    assert!(store.local().load_archive(store.now()).is_empty());
}

#[test]
fn test_legacy_checklist_is_imported_once() {
    let legacy = r#"[
        {"id": 1, "goalId": "goal-1", "label": "Drink 2L of water", "completed": true, "active": true},
        {"id": 2, "goalId": "goal-2", "label": "Read 10 pages", "completed": false, "active": true}
    ]"#;
    let mut store = DutyStore::new(
        local_with(&[(keys::LEGACY_CHECKLIST, legacy)]),
        None,
        Box::new(FixedClock::on(today())),
    );
    store.load();

    let names: Vec<_> = store.duties().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Drink 2L of water", "Read 10 pages"]);
    assert!(store.duties()[0].is_completed(today()));
    assert_eq!(store.local().load_duties(store.now()).unwrap().len(), 2);
}

#[test]
fn test_file_backed_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        let mut store = DutyStore::new(
            LocalPersistence::new(Box::new(FileStore::new(dir.path()))),
            None,
            Box::new(FixedClock::on(today())),
        );
        store.load();
        store
    };

    let mut store = open();
    let sample_id = store.duties()[0].id;
    store.delete(sample_id);
    let id = store.create(DutyDraft::named("Stretch")).unwrap();
    store.toggle_day(id, today());
    drop(store);

    let store = open();
    assert_eq!(store.duties().len(), 2);
    assert!(store.find(id).unwrap().is_completed(today()));
    assert_eq!(store.archive().len(), 1);
    assert!(store.archive().get(sample_id).is_some());
}

#[test]
fn test_progress_uses_duration_not_elapsed_days() {
    let mut store = DutyStore::new(
        local_with(&[(keys::DUTIES, "[]")]),
        None,
        Box::new(FixedClock::on(today())),
    );
    store.load();
    let id = store.create(DutyDraft::named("Ten days ago")).unwrap();
    for offset in [1, 3, 5] {
        store.toggle_day(id, today() - Duration::days(offset));
    }

    let duty = store.find(id).unwrap();
    assert!((duty.progress() - 3.0 / 66.0).abs() < f64::EPSILON);
}

#[test]
fn test_remote_load_orders_by_creation() {
    let table = MemoryTable::new();
    let session = session_for("alice");
    let rows: Vec<DutyRow> = ["2024-01-10T00:00:00+00:00", "2024-01-02T00:00:00+00:00"]
        .iter()
        .enumerate()
        .map(|(i, created)| DutyRow {
            id: None,
            user_id: "alice".to_string(),
            name: format!("duty {}", i),
            description: None,
            icon: None,
            color: None,
            duration: None,
            completed_days: None,
            created_at: Some(created.to_string()),
        })
        .collect();
    table.insert(&session, &rows).unwrap();
    table.insert(&session_for("bob"), &rows[..1]).unwrap();

    let store = remote_store(&table);
    assert_eq!(store.backend(), Backend::Remote);
    let names: Vec<_> = store.duties().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["duty 1", "duty 0"]);
    assert_eq!(store.duties()[0].duration, 66);
}

#[test]
fn test_remote_create_reads_back_assigned_id() {
    let table = MemoryTable::new();
    let mut store = remote_store(&table);

    let id = store.create(DutyDraft::named("Meditate")).unwrap();
    assert_eq!(id, 100);
    assert_eq!(store.duties()[0].id, 100);
    assert_eq!(table.rows_for("alice").len(), 1);

    store.toggle_day(id, date("2024-01-15"));
    assert_eq!(
        table.rows_for("alice")[0].completed_days,
        Some(vec!["2024-01-15".to_string()])
    );

    // 远端模式不写本地列表
    assert!(store.local().load_duties(store.now()).is_none());
}

#[test]
fn test_remote_delete_failure_still_archives() {
    let table = MemoryTable::new();
    let mut store = remote_store(&table);
    let id = store.create(DutyDraft::named("Keep me")).unwrap();

    table.failing.set(true);
    assert!(store.delete(id));
    assert!(store.duties().is_empty());
    assert_eq!(store.archive().len(), 1);
    // 远端行还在（没有回滚，也没有重试）
    assert_eq!(table.rows_for("alice").len(), 1);
}

#[test]
fn test_remote_fetch_failure_yields_empty_list() {
    let table = MemoryTable::new();
    table.failing.set(true);
    let store = remote_store(&table);
    assert!(store.duties().is_empty());
}

#[test]
fn test_remote_re_add_inserts_row() {
    let table = MemoryTable::new();
    let mut store = remote_store(&table);
    let id = store.create(DutyDraft::named("Come back")).unwrap();
    store.toggle_day(id, today());
    store.delete(id);
    assert!(table.rows_for("alice").is_empty());

    let restored = store.re_add(id).unwrap();
    assert_ne!(restored, id);
    let rows = table.rows_for("alice");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, Some(restored));
    assert_eq!(rows[0].completed_days, Some(vec!["2024-01-20".to_string()]));
    assert!(store.find(restored).unwrap().is_completed(today()));
}

#[test]
fn test_remote_re_add_failure_keeps_archive_entry() {
    let table = MemoryTable::new();
    let mut store = remote_store(&table);
    let id = store.create(DutyDraft::named("Fragile")).unwrap();
    store.delete(id);

    table.failing.set(true);
    assert_eq!(store.re_add(id), None);
    assert!(store.duties().is_empty());
    assert_eq!(store.archive().len(), 1);

    // 重启后仍在归档里，可以再试
    table.failing.set(false);
    store.load();
    assert_eq!(store.archive().len(), 1);
    let restored = store.re_add(id).unwrap();
    assert!(store.archive().is_empty());
    assert_eq!(table.rows_for("alice")[0].id, Some(restored));
}

#[test]
fn test_partly_malformed_local_list_is_kept() {
    let blob = r#"[
        {"id": 5, "name": "Real duty", "duration": 30, "createdAt": "2024-01-01T00:00:00Z"},
        {"name": "Older record", "duration": "?"}
    ]"#;
    let mut store = DutyStore::new(
        local_with(&[(keys::DUTIES, blob)]),
        None,
        Box::new(FixedClock::on(today())),
    );
    store.load();

    let names: Vec<&str> = store.duties().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Real duty", "Older record"]);

    // 第一次修改后写回的仍是用户自己的数据，不是示例
    store.toggle_day(5, today());
    let persisted = store.local().load_duties(store.now()).unwrap();
    let names: Vec<&str> = persisted.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Real duty", "Older record"]);
    assert_eq!(persisted[1].duration, 66);
}

#[test]
fn test_sign_out_switches_back_to_local() {
    let table = MemoryTable::new();
    let mut store = remote_store(&table);
    store.create(DutyDraft::named("Remote only")).unwrap();

    store.set_session(None);
    assert_eq!(store.backend(), Backend::Local);
    assert!(crate::remote::current_session(store.local()).is_none());
    // 本地没有数据，回退到示例
    assert_eq!(store.duties().len(), 2);
    assert!(store.duties().iter().all(|d| d.name != "Remote only"));
}
