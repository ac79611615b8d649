//! Integration tests for board operations.
//!
//! These run the listing and mutation paths against an in-memory database
//! and a temporary upload directory.

use std::sync::Arc;

use game_task_board::board::{Board, IncomingFile, UploadOutcome, UploadRejection};
use game_task_board::db::Database;
use game_task_board::error::ErrorCode;
use game_task_board::storage::UploadStore;
use game_task_board::types::{Category, NewTask, Priority, SortKey, TaskStatus};
use tempfile::TempDir;

/// Helper to create a board over a fresh in-memory database.
fn setup_board() -> (Board, TempDir) {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    let dir = TempDir::new().expect("Failed to create temp dir");
    let board = Board::new(Arc::new(db), UploadStore::new(dir.path()));
    (board, dir)
}

fn form(title: &str, category: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        category: Some(category.to_string()),
        ..Default::default()
    }
}

fn add(board: &Board, title: &str, category: &str) -> i64 {
    board
        .add_task(&form(title, category))
        .unwrap()
        .expect("task should be created")
        .id
}

fn file(name: &str) -> Option<IncomingFile> {
    Some(IncomingFile {
        filename: name.to_string(),
        contents: b"data".to_vec(),
    })
}

fn stored(board: &Board, name: &str) -> bool {
    board.store().path(name).is_file()
}

fn titles(board: &Board, category: &str, sort: Option<&str>) -> Vec<String> {
    board
        .listing(Some(category), sort)
        .unwrap()
        .rows
        .into_iter()
        .map(|row| row.task.title)
        .collect()
}

#[test]
fn unset_sort_uses_category_default() {
    let (board, _dir) = setup_board();

    for category in Category::ALL {
        let listing = board.listing(Some(category.as_str()), None).unwrap();
        assert_eq!(listing.category, category);
        assert_eq!(listing.sort, SortKey::default_for(category));
    }
}

#[test]
fn unknown_sort_key_falls_back_to_default() {
    let (board, _dir) = setup_board();
    add(&board, "First", "designer");
    add(&board, "Second", "designer");

    let listing = board.listing(Some("designer"), Some("due_date_asc")).unwrap();
    assert_eq!(listing.sort, SortKey::CreatedAtDesc);
    assert_eq!(titles(&board, "designer", Some("bogus")), vec!["Second", "First"]);
}

#[test]
fn unknown_category_selects_planner() {
    let (board, _dir) = setup_board();
    add(&board, "Brief", "planner");
    add(&board, "Shader", "programmer");

    let listing = board.listing(Some("sound"), None).unwrap();
    assert_eq!(listing.category, Category::Planner);
    assert_eq!(titles(&board, "sound", None), vec!["Brief"]);
    assert_eq!(board.listing(None, None).unwrap().category, Category::Planner);
}

#[test]
fn add_task_requires_title_and_known_category() {
    let (board, _dir) = setup_board();

    assert!(board.add_task(&form("   ", "designer")).unwrap().is_none());
    assert!(board.add_task(&form("Level 1", "sound")).unwrap().is_none());
    assert!(board.add_task(&NewTask {
        title: "No category".to_string(),
        ..Default::default()
    })
    .unwrap()
    .is_none());

    for category in Category::ALL {
        assert!(board.listing(Some(category.as_str()), None).unwrap().rows.is_empty());
    }
}

#[test]
fn add_task_applies_defaults_and_trims() {
    let (board, _dir) = setup_board();
    let task = board
        .add_task(&NewTask {
            title: "  Physics pass  ".to_string(),
            category: Some("programmer".to_string()),
            description: Some("   ".to_string()),
            priority: Some("urgent".to_string()),
            ..Default::default()
        })
        .unwrap()
        .unwrap();

    assert_eq!(task.title, "Physics pass");
    assert_eq!(task.description, None);
    assert_eq!(task.status, TaskStatus::NotStarted);
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.due_date, None);
    assert_eq!(task.assignee_id, None);
}

#[test]
fn malformed_due_date_fails_request() {
    let (board, _dir) = setup_board();
    let err = board
        .add_task(&NewTask {
            due_date: Some("12/31/2025".to_string()),
            ..form("Ship demo", "programmer")
        })
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidFieldValue);
    assert_eq!(err.field.as_deref(), Some("due_date"));
    assert!(board.listing(Some("programmer"), None).unwrap().rows.is_empty());
}

#[test]
fn new_assignee_name_is_created_once_and_reused() {
    let (board, _dir) = setup_board();
    let with_name = |title: &str| NewTask {
        new_assignee_name: Some("Aiko".to_string()),
        ..form(title, "designer")
    };

    let first = board.add_task(&with_name("Sprites")).unwrap().unwrap();
    let second = board.add_task(&with_name("Tiles")).unwrap().unwrap();

    let assignees = board.db().list_assignees().unwrap();
    assert_eq!(assignees.len(), 1);
    assert_eq!(assignees[0].name, "Aiko");
    assert_eq!(first.assignee_id, Some(assignees[0].id));
    assert_eq!(second.assignee_id, first.assignee_id);
}

#[test]
fn existing_assignee_id_wins_over_name() {
    let (board, _dir) = setup_board();
    board
        .add_task(&NewTask {
            new_assignee_name: Some("Ren".to_string()),
            ..form("Lobby", "programmer")
        })
        .unwrap();
    let ren = board.db().list_assignees().unwrap().remove(0);

    let task = board
        .add_task(&NewTask {
            assignee_id: Some(ren.id.to_string()),
            new_assignee_name: Some("Someone Else".to_string()),
            ..form("Netcode", "programmer")
        })
        .unwrap()
        .unwrap();

    assert_eq!(task.assignee_id, Some(ren.id));
    assert_eq!(board.db().list_assignees().unwrap().len(), 1);

    let listing = board.listing(Some("programmer"), None).unwrap();
    assert_eq!(listing.rows[0].assignee.as_deref(), Some("Ren"));
}

#[test]
fn disallowed_upload_writes_nothing() {
    let (board, dir) = setup_board();
    let task_id = add(&board, "Tutorial", "programmer");

    let outcome = board.upload_file(task_id, file("screenshot.png")).unwrap();
    match outcome {
        UploadOutcome::Rejected(UploadRejection::DisallowedType { filename, category }) => {
            assert_eq!(filename, "screenshot.png");
            assert_eq!(category, Category::Programmer);
        }
        other => panic!("expected rejection, got {:?}", other),
    }

    assert!(board.db().get_uploaded_files(task_id).unwrap().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn upload_without_file_or_name_is_rejected() {
    let (board, _dir) = setup_board();
    let task_id = add(&board, "Brief", "planner");

    assert!(matches!(
        board.upload_file(task_id, None).unwrap(),
        UploadOutcome::Rejected(UploadRejection::NoFile)
    ));
    assert!(matches!(
        board.upload_file(task_id, file("")).unwrap(),
        UploadOutcome::Rejected(UploadRejection::EmptyFilename)
    ));
    assert!(board.db().get_uploaded_files(task_id).unwrap().is_empty());
}

#[test]
fn upload_to_missing_task_is_not_found() {
    let (board, _dir) = setup_board();
    let err = board.upload_file(999, file("brief.pdf")).unwrap_err();
    assert_eq!(err.code, ErrorCode::TaskNotFound);
}

#[test]
fn stored_name_has_timestamp_prefix() {
    let (board, _dir) = setup_board();
    let task_id = add(&board, "Brief", "planner");

    let UploadOutcome::Stored(record) = board.upload_file(task_id, file("game design.pdf")).unwrap()
    else {
        panic!("upload should be stored");
    };

    let (prefix, rest) = record.filename.split_once('_').unwrap();
    assert!(prefix.parse::<i64>().is_ok());
    assert!(rest.ends_with("game_design.pdf"));
    assert!(stored(&board, &record.filename));
}

#[test]
fn same_name_uploads_do_not_overwrite() {
    let (board, _dir) = setup_board();
    let task_id = add(&board, "Brief", "planner");

    board.upload_file(task_id, file("brief.pdf")).unwrap();
    board.upload_file(task_id, file("brief.pdf")).unwrap();

    let files = board.db().get_uploaded_files(task_id).unwrap();
    assert_eq!(files.len(), 2);
    assert_ne!(files[0].filename, files[1].filename);
    assert!(files.iter().all(|f| stored(&board, &f.filename)));
}

#[test]
fn invalid_status_and_priority_leave_task_unchanged() {
    let (board, _dir) = setup_board();
    let task_id = add(&board, "AI", "programmer");

    assert!(!board.update_status(task_id, Some("finished")).unwrap());
    assert!(!board.update_status(task_id, None).unwrap());
    assert!(!board.update_priority(task_id, Some("critical")).unwrap());

    let task = board.require_task(task_id).unwrap();
    assert_eq!(task.status, TaskStatus::NotStarted);
    assert_eq!(task.priority, Priority::Medium);
}

#[test]
fn valid_status_and_priority_are_persisted() {
    let (board, _dir) = setup_board();
    let task_id = add(&board, "AI", "programmer");

    assert!(board.update_status(task_id, Some("in_progress")).unwrap());
    assert!(board.update_priority(task_id, Some("high")).unwrap());

    let task = board.require_task(task_id).unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.priority, Priority::High);
}

#[test]
fn mutations_on_missing_task_are_not_found() {
    let (board, _dir) = setup_board();

    for err in [
        board.update_status(42, Some("done")).unwrap_err(),
        board.update_priority(42, Some("low")).unwrap_err(),
        board.delete_task(42).unwrap_err(),
    ] {
        assert_eq!(err.code, ErrorCode::TaskNotFound);
    }
}

#[test]
fn delete_tolerates_missing_stored_file() {
    let (board, _dir) = setup_board();
    let task_id = add(&board, "Brief", "planner");
    let UploadOutcome::Stored(record) = board.upload_file(task_id, file("brief.pdf")).unwrap() else {
        panic!("upload should be stored");
    };
    std::fs::remove_file(board.store().path(&record.filename)).unwrap();

    board.delete_task(task_id).unwrap();
    assert!(board.db().get_task(task_id).unwrap().is_none());
}

#[test]
fn delete_removes_rows_even_when_a_stored_file_cannot_be_removed() {
    let (board, _dir) = setup_board();
    let task_id = add(&board, "Brief", "planner");
    let UploadOutcome::Stored(kept) = board.upload_file(task_id, file("brief.pdf")).unwrap() else {
        panic!("upload should be stored");
    };

    // A directory under a stored name makes removing that file fail.
    board.db().add_uploaded_file(task_id, "1_stuck.pdf").unwrap();
    std::fs::create_dir(board.store().path("1_stuck.pdf")).unwrap();

    board.delete_task(task_id).unwrap();

    assert!(board.db().get_task(task_id).unwrap().is_none());
    assert!(board.db().get_uploaded_files(task_id).unwrap().is_empty());
    assert!(!stored(&board, &kept.filename));
}

#[test]
fn planner_listing_orders_by_latest_upload() {
    let (board, _dir) = setup_board();
    let old = add(&board, "Old brief", "planner");
    let fresh = add(&board, "Fresh brief", "planner");
    add(&board, "No files", "planner");

    board.db().add_uploaded_file(old, "1_old.pdf").unwrap();
    board.db().add_uploaded_file(fresh, "2_fresh.pdf").unwrap();
    // Make the ordering independent of how fast the two inserts ran.
    board
        .db()
        .with_conn(|conn| {
            conn.execute(
                "UPDATE uploaded_files SET uploaded_at = CASE filename WHEN '1_old.pdf' THEN 1000 ELSE 2000 END",
                [],
            )?;
            Ok(())
        })
        .unwrap();

    assert_eq!(
        titles(&board, "planner", None),
        vec!["Fresh brief", "Old brief", "No files"]
    );
    assert_eq!(
        titles(&board, "planner", Some("upload_date_asc")),
        vec!["No files", "Old brief", "Fresh brief"]
    );

    let listing = board.listing(Some("planner"), None).unwrap();
    assert_eq!(listing.rows[0].latest_upload, Some(2000));
    assert_eq!(listing.rows[2].latest_upload, None);
}

#[test]
fn programmer_listing_puts_undated_tasks_last() {
    let (board, _dir) = setup_board();
    let dated = |title: &str, due: &str| NewTask {
        due_date: Some(due.to_string()),
        ..form(title, "programmer")
    };
    board.add_task(&form("Someday", "programmer")).unwrap();
    board.add_task(&dated("Late", "2026-03-01")).unwrap();
    board.add_task(&dated("Soon", "2026-01-15")).unwrap();

    assert_eq!(
        titles(&board, "programmer", None),
        vec!["Soon", "Late", "Someday"]
    );
    assert_eq!(
        titles(&board, "programmer", Some("due_date_desc")),
        vec!["Someday", "Late", "Soon"]
    );
}

#[test]
fn designer_scenario() {
    let (board, _dir) = setup_board();
    add(&board, "Older concept", "designer");
    let task_id = add(&board, "Design level 3", "designer");

    assert_eq!(
        titles(&board, "designer", None),
        vec!["Design level 3", "Older concept"]
    );

    let UploadOutcome::Stored(art) = board.upload_file(task_id, file("art.png")).unwrap() else {
        panic!("png should be accepted for designers");
    };
    let UploadOutcome::Stored(clip) = board.upload_file(task_id, file("clip.mp4")).unwrap() else {
        panic!("mp4 should be accepted for designers");
    };
    assert!(!game_task_board::policy::is_video(&art.filename));
    assert!(game_task_board::policy::is_video(&clip.filename));

    let outcome = board.upload_file(task_id, file("notes.pdf")).unwrap();
    assert!(matches!(outcome, UploadOutcome::Rejected(_)));

    let listing = board.listing(Some("designer"), None).unwrap();
    let row = listing.rows.iter().find(|r| r.task.id == task_id).unwrap();
    assert_eq!(row.files.len(), 2);

    board.delete_task(task_id).unwrap();

    assert_eq!(titles(&board, "designer", None), vec!["Older concept"]);
    assert!(!stored(&board, &art.filename));
    assert!(!stored(&board, &clip.filename));
    assert!(board.db().get_uploaded_files(task_id).unwrap().is_empty());
    assert_eq!(
        board.require_task(task_id).unwrap_err().code,
        ErrorCode::TaskNotFound
    );
}
