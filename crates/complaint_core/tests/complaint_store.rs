use complaint_core::db::migrations::latest_version;
use complaint_core::db::open_db_in_memory;
use complaint_core::{
    Complaint, ComplaintStatus, ComplaintStore, RepoError, SqliteComplaintRepository,
    SqliteUserRepository, UserDirectory,
};
use rusqlite::Connection;
use std::collections::HashSet;
use uuid::Uuid;

fn complaint(title: &str, category: &str) -> Complaint {
    Complaint::new(
        title,
        "description",
        category,
        "Main Street",
        "reporter@example.com",
    )
}

#[test]
fn save_assigns_timestamps_and_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let mut draft = complaint("Broken Street Light", "electricity");
    draft.photo_url = Some("/uploads/light.jpg".to_string());
    let saved = repo.save(&draft).unwrap();
    assert!(saved.created_at > 0);
    assert_eq!(saved.updated_at, saved.created_at);

    let loaded = repo.find_by_id(saved.id).unwrap().unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn save_keeps_caller_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let mut draft = complaint("Water Leak", "water");
    draft.created_at = 1_000;
    draft.updated_at = 2_000;
    let saved = repo.save(&draft).unwrap();
    assert_eq!((saved.created_at, saved.updated_at), (1_000, 2_000));
}

#[test]
fn save_existing_id_overwrites_full_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let mut record = repo.save(&complaint("Pothole", "roads")).unwrap();
    record.title = "Large Pothole".to_string();
    record.status = ComplaintStatus::Rejected;
    record.photo_url = None;
    repo.save(&record).unwrap();

    let all = repo.find_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Large Pothole");
    assert_eq!(all[0].status, ComplaintStatus::Rejected);
}

#[test]
fn save_rejects_blank_fields_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let err = repo.save(&complaint("   ", "roads")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.find_all().unwrap().is_empty());
}

#[test]
fn find_by_id_miss_is_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();
    assert!(repo.find_by_id(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn secondary_filters_match_exactly() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let roads = repo.save(&complaint("Pothole", "roads")).unwrap();
    let mut water = complaint("Leak", "water");
    water.status = ComplaintStatus::Resolved;
    let water = repo.save(&water).unwrap();
    repo.save(&complaint("Trash", "waste")).unwrap();

    let by_category = repo.find_by_category("roads").unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, roads.id);
    assert!(repo.find_by_category("Roads").unwrap().is_empty());

    let resolved = repo.find_by_status(ComplaintStatus::Resolved).unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].id, water.id);
    assert_eq!(repo.find_by_status(ComplaintStatus::Pending).unwrap().len(), 2);
}

#[test]
fn find_by_owner_uses_owner_reference() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let jane = users.create_user("jane@example.com", "Jane").unwrap();
    let mut owned = complaint("Pothole", "roads");
    owned.owner_id = Some(jane.id);
    owned.owner_email = jane.email.clone();
    let owned = repo.save(&owned).unwrap();
    repo.save(&complaint("Leak", "water")).unwrap();

    let ids: HashSet<_> = repo
        .find_by_owner(jane.id)
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, HashSet::from([owned.id]));
}

#[test]
fn increment_upvotes_adds_exactly_one_per_call() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let saved = repo.save(&complaint("Pothole", "roads")).unwrap();
    for expected in 1..=5 {
        let updated = repo.increment_upvotes(saved.id, saved.updated_at + 10).unwrap();
        assert_eq!(updated.upvotes, expected);
        assert_eq!(updated.updated_at, saved.updated_at + 10);
    }
}

#[test]
fn increment_upvotes_on_missing_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = repo.increment_upvotes(missing, 1).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn increments_from_two_connections_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let conn_a = complaint_core::db::open_db(&path).unwrap();
    let conn_b = complaint_core::db::open_db(&path).unwrap();
    let repo_a = SqliteComplaintRepository::try_new(&conn_a).unwrap();
    let repo_b = SqliteComplaintRepository::try_new(&conn_b).unwrap();

    let saved = repo_a.save(&complaint("Pothole", "roads")).unwrap();
    // Both callers hold the same stale snapshot.
    let stale = repo_b.find_by_id(saved.id).unwrap().unwrap();
    assert_eq!(stale.upvotes, 0);

    repo_a.increment_upvotes(saved.id, 1).unwrap();
    repo_b.increment_upvotes(saved.id, 2).unwrap();

    assert_eq!(repo_a.find_by_id(saved.id).unwrap().unwrap().upvotes, 2);
}

#[test]
fn set_status_keeps_increments_from_other_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let conn_a = complaint_core::db::open_db(&path).unwrap();
    let conn_b = complaint_core::db::open_db(&path).unwrap();
    let repo_a = SqliteComplaintRepository::try_new(&conn_a).unwrap();
    let repo_b = SqliteComplaintRepository::try_new(&conn_b).unwrap();

    let saved = repo_a.save(&complaint("Pothole", "roads")).unwrap();
    let stale = repo_b.find_by_id(saved.id).unwrap().unwrap();
    assert_eq!(stale.upvotes, 0);

    repo_a.increment_upvotes(saved.id, 5).unwrap();
    let updated = repo_b
        .set_status(stale.id, ComplaintStatus::InProgress, 6)
        .unwrap();

    assert_eq!(updated.status, ComplaintStatus::InProgress);
    assert_eq!(updated.upvotes, 1);
    assert_eq!(updated.updated_at, 6);
    assert_eq!(updated.created_at, saved.created_at);
    assert_eq!(updated.title, saved.title);
}

#[test]
fn set_status_on_missing_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = repo
        .set_status(missing, ComplaintStatus::Resolved, 1)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn upvotes_beyond_u32_range_stay_readable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    let mut popular = complaint("Pothole", "roads");
    popular.upvotes = u64::from(u32::MAX);
    let saved = repo.save(&popular).unwrap();

    let updated = repo.increment_upvotes(saved.id, saved.updated_at).unwrap();
    assert_eq!(updated.upvotes, u64::from(u32::MAX) + 1);
    assert_eq!(repo.find_all().unwrap().len(), 1);
}

#[test]
fn count_by_status_reports_every_status() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();

    repo.save(&complaint("a", "roads")).unwrap();
    let mut in_progress = complaint("b", "roads");
    in_progress.status = ComplaintStatus::InProgress;
    repo.save(&in_progress).unwrap();

    let counts = repo.count_by_status().unwrap();
    assert_eq!(counts.len(), 4);
    assert_eq!(counts[&ComplaintStatus::Pending], 1);
    assert_eq!(counts[&ComplaintStatus::InProgress], 1);
    assert_eq!(counts[&ComplaintStatus::Resolved], 0);
    assert_eq!(counts[&ComplaintStatus::Rejected], 0);
}

#[test]
fn read_rejects_invalid_persisted_record() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteComplaintRepository::try_new(&conn).unwrap();
    let saved = repo.save(&complaint("Pothole", "roads")).unwrap();

    conn.execute(
        "UPDATE complaints SET title = '  ' WHERE id = ?1;",
        [saved.id.to_string()],
    )
    .unwrap();

    let err = repo.find_by_id(saved.id).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteComplaintRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE complaints (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            location TEXT NOT NULL,
            status TEXT NOT NULL,
            priority TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteComplaintRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "complaints",
            column: "upvotes"
        })
    ));
}

#[test]
fn repository_rejects_connection_without_complaints_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteComplaintRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("complaints"))
    ));
}
