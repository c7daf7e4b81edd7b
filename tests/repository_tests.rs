use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use timesheets::fixtures::default_timesheets;
use timesheets::notify::{ChangeBus, ChangeNotifier};
use timesheets::repository::Repository;
use timesheets::storage::{load_timesheets, save_timesheets, KeyValueStore, MemoryStore, STORAGE_KEY};
use timesheets::validate::{Field, TaskInput};
use timesheets::{Hours, StorageError, Timesheet, TimesheetError, TimesheetStatus};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A store holding a single empty week 2024-01-01..2024-01-05 with id "w1".
fn store_with_empty_week() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let sheet = Timesheet::new("w1", 1, date("2024-01-01"), date("2024-01-05"));
    save_timesheets(store.as_ref(), &[sheet]).unwrap();
    store
}

fn open(store: Arc<MemoryStore>) -> Repository {
    Repository::open(store, Arc::new(ChangeBus::new())).unwrap()
}

/// Memory store whose writes can be switched off.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

#[test]
fn test_open_seeds_empty_store() {
    let store = Arc::new(MemoryStore::new());
    let repo = open(Arc::clone(&store));

    assert_eq!(repo.list_timesheets(), default_timesheets().as_slice());
    let stored = load_timesheets(store.as_ref()).unwrap().unwrap();
    assert_eq!(stored.len(), 5);

    let statuses: Vec<TimesheetStatus> = repo.list_timesheets().iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        vec![
            TimesheetStatus::Completed,
            TimesheetStatus::Completed,
            TimesheetStatus::Incomplete,
            TimesheetStatus::Completed,
            TimesheetStatus::Missing,
        ]
    );
    assert_eq!(repo.get_timesheet("2").unwrap().total_hours, Hours::whole(42));
}

#[test]
fn test_open_never_overwrites_existing_state() {
    let store = store_with_empty_week();
    let repo = open(Arc::clone(&store));
    assert_eq!(repo.list_timesheets().len(), 1);
    assert_eq!(repo.list_timesheets()[0].id, "w1");
}

#[test]
fn test_stale_derived_fields_are_recomputed_on_load() {
    let store = Arc::new(MemoryStore::new());
    let raw = r#"[{"id":"1","weekNumber":1,"date":"2024-01-01","startDate":"2024-01-01","endDate":"2024-01-05",
        "totalHours":99,"status":"COMPLETED",
        "tasks":[{"id":"1","date":"2024-01-01","description":"Planning","duration":3.5,"project":"Core"}]}]"#;
    store.set(STORAGE_KEY, raw).unwrap();

    let repo = open(store);
    let sheet = repo.get_timesheet("1").unwrap();
    assert_eq!(sheet.total_hours, Hours::from_millis(3500));
    assert_eq!(sheet.status, TimesheetStatus::Incomplete);
}

#[test]
fn test_add_task_to_empty_week() {
    let store = store_with_empty_week();
    let mut repo = open(Arc::clone(&store));

    let task = repo
        .add_task("w1", date("2024-01-01"), &TaskInput::new("Standup", "1", "Core"))
        .unwrap();

    let sheet = repo.get_timesheet("w1").unwrap();
    assert_eq!(sheet.total_hours, Hours::whole(1));
    assert_eq!(sheet.status, TimesheetStatus::Incomplete);

    let grouped = sheet.grouped_tasks();
    assert_eq!(grouped.len(), 5);
    assert_eq!(grouped[&date("2024-01-01")].len(), 1);
    assert_eq!(grouped[&date("2024-01-01")][0].id, task.id);
    assert!(grouped
        .iter()
        .filter(|(d, _)| **d != date("2024-01-01"))
        .all(|(_, tasks)| tasks.is_empty()));

    let stored = load_timesheets(store.as_ref()).unwrap().unwrap();
    assert_eq!(stored[0], *sheet);
}

#[test]
fn test_forty_hours_completes_the_week() {
    let mut repo = open(store_with_empty_week());
    for day in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"] {
        repo.add_task("w1", date(day), &TaskInput::new("Development", "8", "Core")).unwrap();
    }
    assert_eq!(repo.get_timesheet("w1").unwrap().status, TimesheetStatus::Incomplete);

    repo.add_task("w1", date("2024-01-05"), &TaskInput::new("Development", "7.5", "Core"))
        .unwrap();
    repo.add_task("w1", date("2024-01-05"), &TaskInput::new("Review", "0.5", "Core"))
        .unwrap();

    let sheet = repo.get_timesheet("w1").unwrap();
    assert_eq!(sheet.total_hours, Hours::whole(40));
    assert_eq!(sheet.status, TimesheetStatus::Completed);
}

#[test]
fn test_invalid_task_is_not_stored() {
    let store = store_with_empty_week();
    let mut repo = open(Arc::clone(&store));
    let before = store.get(STORAGE_KEY).unwrap();

    let err = repo
        .add_task("w1", date("2024-01-01"), &TaskInput::new("Standup", "0.2", "Core"))
        .unwrap_err();
    match err {
        TimesheetError::Validation(errors) => {
            assert_eq!(errors.get(Field::Duration), Some("Duration must be at least 0.5 hours"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    assert!(repo.get_timesheet("w1").unwrap().tasks.is_empty());
    assert_eq!(store.get(STORAGE_KEY).unwrap(), before);
}

#[test]
fn test_unknown_timesheet() {
    let mut repo = open(store_with_empty_week());
    let err = repo
        .add_task("nope", date("2024-01-01"), &TaskInput::new("Standup", "1", "Core"))
        .unwrap_err();
    assert!(matches!(err, TimesheetError::TimesheetNotFound(id) if id == "nope"));
    assert!(matches!(repo.get_timesheet("nope"), Err(TimesheetError::TimesheetNotFound(_))));
}

#[test]
fn test_date_outside_week_is_rejected() {
    let mut repo = open(store_with_empty_week());
    let err = repo
        .add_task("w1", date("2024-01-06"), &TaskInput::new("Standup", "1", "Core"))
        .unwrap_err();
    assert!(matches!(err, TimesheetError::DateOutOfRange { .. }));
    assert!(repo.get_timesheet("w1").unwrap().tasks.is_empty());
}

#[test]
fn test_edit_keeps_id_and_date() {
    let mut repo = open(store_with_empty_week());
    let added = repo
        .add_task("w1", date("2024-01-02"), &TaskInput::new("Standup", "1", "Core"))
        .unwrap();

    repo.edit_task("w1", &added.id, &TaskInput::new(" Planning ", "2.25", "Platform"))
        .unwrap();

    let task = repo.get_task("w1", &added.id).unwrap();
    assert_eq!(task.id, added.id);
    assert_eq!(task.date, date("2024-01-02"));
    assert_eq!(task.description, "Planning");
    assert_eq!(task.duration, Hours::from_millis(2250));
    assert_eq!(task.project, "Platform");
    assert_eq!(repo.get_timesheet("w1").unwrap().total_hours, Hours::from_millis(2250));
}

#[test]
fn test_edit_unknown_task() {
    let mut repo = open(store_with_empty_week());
    let err = repo
        .edit_task("w1", "missing", &TaskInput::new("Standup", "1", "Core"))
        .unwrap_err();
    assert!(matches!(err, TimesheetError::TaskNotFound { .. }));
}

#[test]
fn test_edit_with_invalid_fields_changes_nothing() {
    let mut repo = open(store_with_empty_week());
    let added = repo
        .add_task("w1", date("2024-01-02"), &TaskInput::new("Standup", "1", "Core"))
        .unwrap();

    let err = repo
        .edit_task("w1", &added.id, &TaskInput::new("Standup", "30", "Core"))
        .unwrap_err();
    assert!(matches!(err, TimesheetError::Validation(_)));
    assert_eq!(repo.get_task("w1", &added.id).unwrap().duration, Hours::whole(1));
}

#[test]
fn test_delete_twice_reports_not_found() {
    let store = store_with_empty_week();
    let mut repo = open(Arc::clone(&store));
    let keep = repo
        .add_task("w1", date("2024-01-01"), &TaskInput::new("Standup", "1", "Core"))
        .unwrap();
    let gone = repo
        .add_task("w1", date("2024-01-02"), &TaskInput::new("Review", "2", "Core"))
        .unwrap();

    let removed = repo.delete_task("w1", &gone.id).unwrap();
    assert_eq!(removed.id, gone.id);
    let after_first = repo.get_timesheet("w1").unwrap().clone();
    assert_eq!(after_first.tasks, vec![keep]);
    assert_eq!(after_first.total_hours, Hours::whole(1));

    for _ in 0..2 {
        let err = repo.delete_task("w1", &gone.id).unwrap_err();
        assert!(matches!(err, TimesheetError::TaskNotFound { .. }));
        assert_eq!(repo.get_timesheet("w1").unwrap(), &after_first);
    }
    assert_eq!(load_timesheets(store.as_ref()).unwrap().unwrap()[0], after_first);
}

#[test]
fn test_deleting_last_task_marks_week_missing() {
    let mut repo = open(store_with_empty_week());
    let added = repo
        .add_task("w1", date("2024-01-01"), &TaskInput::new("Standup", "1", "Core"))
        .unwrap();
    repo.delete_task("w1", &added.id).unwrap();

    let sheet = repo.get_timesheet("w1").unwrap();
    assert_eq!(sheet.total_hours, Hours::ZERO);
    assert_eq!(sheet.status, TimesheetStatus::Missing);
}

#[test]
fn test_persistence_failure_leaves_state_untouched() {
    let store = Arc::new(FlakyStore::default());
    let bus = ChangeBus::new();
    let listener = bus.subscribe();
    let mut repo = Repository::open(Arc::clone(&store) as Arc<dyn KeyValueStore>, Arc::new(bus)).unwrap();
    let before = repo.list_timesheets().to_vec();

    store.fail_writes.store(true, Ordering::SeqCst);
    let err = repo
        .add_task("5", date("2024-01-29"), &TaskInput::new("Standup", "1", "Core"))
        .unwrap_err();
    assert!(matches!(err, TimesheetError::Persistence(StorageError::Io(_))));
    assert_eq!(repo.list_timesheets(), before.as_slice());
    assert!(listener.try_recv().is_err());

    store.fail_writes.store(false, Ordering::SeqCst);
    repo.add_task("5", date("2024-01-29"), &TaskInput::new("Standup", "1", "Core"))
        .unwrap();
    assert_eq!(repo.get_timesheet("5").unwrap().status, TimesheetStatus::Incomplete);
}

#[test]
fn test_corrupt_store_is_a_persistence_error() {
    let store = Arc::new(MemoryStore::new());
    store.set(STORAGE_KEY, "{ not json").unwrap();
    let result = Repository::open(store, Arc::new(ChangeBus::new()));
    assert!(matches!(result, Err(TimesheetError::Persistence(StorageError::Json(_)))));
}
