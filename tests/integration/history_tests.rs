use dupfind::history::{HistoryError, RecentFolders};
use dupfind::prompt_for_folder;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[test]
fn test_history_round_trip_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("recent_folders.json");

    let mut history = RecentFolders::load(&path, 3);
    assert!(history.is_empty());

    for folder in ["/a", "/b", "/c", "/b", "/d"] {
        history.record(Path::new(folder));
        history.save().unwrap();
    }

    let reloaded = RecentFolders::load(&path, 3);
    assert_eq!(
        reloaded.folders(),
        &[PathBuf::from("/d"), PathBuf::from("/b"), PathBuf::from("/c")]
    );
}

#[test]
fn test_corrupt_history_recovers_on_save() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("recent_folders.json");
    fs::write(&path, "[1, 2, 3").unwrap();

    assert!(matches!(
        RecentFolders::try_load(&path, 20),
        Err(HistoryError::Parse { .. })
    ));

    let mut history = RecentFolders::load(&path, 20);
    history.record(Path::new("/fresh"));
    history.save().unwrap();

    assert_eq!(
        RecentFolders::try_load(&path, 20).unwrap().folders(),
        &[PathBuf::from("/fresh")]
    );
}

#[test]
fn test_prompt_picks_from_saved_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("recent_folders.json");
    fs::write(&path, r#"["/photos","/music"]"#).unwrap();
    let history = RecentFolders::load(&path, 20);

    let mut output = Vec::new();
    let chosen = prompt_for_folder(&history, &mut Cursor::new("2\n"), &mut output).unwrap();
    assert_eq!(chosen, Some(PathBuf::from("/music")));

    let mut output = Vec::new();
    let chosen = prompt_for_folder(&history, &mut Cursor::new("music\n"), &mut output).unwrap();
    assert!(chosen.is_none());
    assert!(String::from_utf8(output).unwrap().contains("Invalid choice."));
}
