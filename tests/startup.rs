use std::fs;

use bookshelf::bootstrap::build_app;
use bookshelf::config::{Args, Config};
use bookshelf::logging;
use clap::Parser;
use crossterm::event::KeyCode;
use tempfile::tempdir;

#[test]
fn unusable_data_dir_falls_back_to_a_session_shelf() {
    let dir = tempdir().expect("tempdir");
    let not_a_dir = dir.path().join("shelf");
    fs::write(&not_a_dir, "occupied").expect("write blocker file");

    let data_dir = not_a_dir.to_str().expect("utf-8 temp path");
    let args = Args::parse_from(["bookshelf", "--data-dir", data_dir, "--offline"]);
    let config = Config::resolve(args).expect("config resolves");

    assert!(!logging::init(&config.log_path, None));

    let mut app = build_app(&config);
    let status = app.status_text().expect("footer warning");
    assert!(status.contains("Storage unavailable"), "status was {status:?}");

    app.handle_key(KeyCode::Char('+')).unwrap();
    for ch in "Dune".chars() {
        app.handle_key(KeyCode::Char(ch)).unwrap();
    }
    app.handle_key(KeyCode::Enter).unwrap();
    assert_eq!(app.store().len(), 1);
    assert_eq!(app.projection().incomplete_count(), 1);
}

#[test]
fn writable_data_dir_starts_without_a_warning() {
    let dir = tempdir().expect("tempdir");
    let data_dir = dir.path().to_str().expect("utf-8 temp path");
    let args = Args::parse_from(["bookshelf", "--data-dir", data_dir, "--offline"]);
    let config = Config::resolve(args).expect("config resolves");

    let app = build_app(&config);
    assert_eq!(app.status_text(), None);
    assert!(config.db_path.exists());
}
