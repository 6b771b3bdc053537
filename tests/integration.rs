use std::fs;
use std::path::Path;

use sandbox_fileops::protocol::{ActionRequest, Dispatcher, ResponseLimits, ResultData, parse_request};
use sandbox_fileops::storage::{FileOperations, StorageRoot};
use tempfile::TempDir;

// Helper to build a dispatcher over a fresh storage root
fn setup() -> (TempDir, Dispatcher) {
    let dir = TempDir::new().unwrap();
    let root = StorageRoot::open(dir.path().join("artifacts")).unwrap();
    let dispatcher = Dispatcher::new(FileOperations::new(root), ResponseLimits::default());
    (dir, dispatcher)
}

fn root_of(dispatcher: &Dispatcher) -> &Path {
    dispatcher.files().root().path()
}

#[test]
fn test_write_then_read_round_trip() {
    let (_dir, dispatcher) = setup();

    let result = dispatcher.handle_raw("write_file:a.txt,hello,true");
    assert!(result.success, "{}", result.message);

    let result = dispatcher.handle_raw("read_file:a.txt");
    assert!(result.success);
    assert_eq!(result.data, Some(ResultData::Text("hello".into())));
}

#[test]
fn test_write_without_overwrite_keeps_original() {
    let (_dir, dispatcher) = setup();
    dispatcher.handle_raw("write_file:a.txt,original");

    let result = dispatcher.handle_raw("write_file:a.txt,x,false");
    assert!(!result.success);
    assert_eq!(result.message, "Already exists: a.txt");
    assert_eq!(
        fs::read_to_string(root_of(&dispatcher).join("a.txt")).unwrap(),
        "original"
    );
}

#[test]
fn test_edit_replaces_every_occurrence() {
    let (_dir, dispatcher) = setup();
    dispatcher.handle_raw("write_file:a.txt,foo foo baz");

    assert!(dispatcher.handle_raw("edit_file:a.txt,foo,bar").success);
    let path = root_of(&dispatcher).join("a.txt");
    assert_eq!(fs::read_to_string(&path).unwrap(), "bar bar baz");

    let result = dispatcher.handle_raw("edit_file:a.txt,missing,zzz");
    assert!(result.success);
    assert_eq!(fs::read_to_string(&path).unwrap(), "bar bar baz");
}

#[test]
fn test_move_creates_destination_folders() {
    let (_dir, dispatcher) = setup();
    dispatcher.handle_raw("write_file:a.txt,payload");

    let result = dispatcher.handle_raw("move_file:a.txt,b/a.txt");
    assert!(result.success, "{}", result.message);
    assert_eq!(result.message, "Moved file from a.txt to b/a.txt");

    let root = root_of(&dispatcher);
    assert!(!root.join("a.txt").exists());
    assert_eq!(fs::read_to_string(root.join("b").join("a.txt")).unwrap(), "payload");
}

#[test]
fn test_copy_refuses_existing_destination() {
    let (_dir, dispatcher) = setup();
    dispatcher.handle_raw("write_file:a.txt,one");
    dispatcher.handle_raw("write_file:b.txt,two");

    let result = dispatcher.handle_raw("copy_file:a.txt,b.txt");
    assert!(!result.success);
    assert_eq!(
        fs::read_to_string(root_of(&dispatcher).join("b.txt")).unwrap(),
        "two"
    );
}

#[test]
fn test_search_is_recursive() {
    let (_dir, dispatcher) = setup();
    dispatcher.handle_raw("write_file:top.txt,a needle here");
    dispatcher.handle_raw("write_file:deep/down/nested.txt,another needle");
    dispatcher.handle_raw("write_file:deep/other.txt,nothing to see");

    let result = dispatcher.handle_raw("search_files:needle");
    assert!(result.success);
    assert_eq!(
        result.data,
        Some(ResultData::Entries(vec![
            "deep/down/nested.txt".into(),
            "top.txt".into()
        ]))
    );
}

#[test]
fn test_append_and_delete() {
    let (_dir, dispatcher) = setup();

    let result = dispatcher.handle_raw("append_to_file:log.txt,first,false");
    assert!(!result.success);
    assert_eq!(result.message, "Not found: log.txt");

    assert!(dispatcher.handle_raw("append_to_file:log.txt,first").success);
    assert!(dispatcher.handle_raw("append_to_file:log.txt,, second").success);
    assert_eq!(
        fs::read_to_string(root_of(&dispatcher).join("log.txt")).unwrap(),
        "first, second"
    );

    assert!(dispatcher.handle_raw("delete_file:log.txt").success);
    assert!(!dispatcher.handle_raw("delete_file:log.txt").success);
}

#[test]
fn test_directories() {
    let (_dir, dispatcher) = setup();

    assert!(dispatcher.handle_raw("create_directory:projects/2024").success);
    let again = dispatcher.handle_raw("create_directory:projects/2024");
    assert!(again.success);
    assert_eq!(again.message, "Directory projects/2024 already exists");

    let result = dispatcher.handle_raw("delete_file:projects");
    assert!(!result.success);

    let result = dispatcher.handle_raw("list_files:projects");
    assert_eq!(result.data, Some(ResultData::Entries(vec!["2024/".into()])));
}

#[test]
fn test_traversal_is_refused_for_every_operation() {
    let (dir, dispatcher) = setup();
    fs::write(dir.path().join("secret.txt"), "top secret").unwrap();

    for raw in [
        "read_file:../secret.txt",
        "write_file:../secret.txt,overwritten",
        "append_to_file:..\\secret.txt,more",
        "delete_file:docs/../../secret.txt",
        "copy_file:../secret.txt,stolen.txt",
        "move_file:../secret.txt,stolen.txt",
        "list_files:..",
        "search_files:secret,../",
        "create_directory:../escape",
        "file_info:../secret.txt",
    ] {
        let result = dispatcher.handle_raw(raw);
        assert!(!result.success, "{raw} should fail");
        assert!(result.message.starts_with("Access denied"), "{raw}: {}", result.message);
    }

    assert_eq!(
        fs::read_to_string(dir.path().join("secret.txt")).unwrap(),
        "top secret"
    );
    assert!(!dir.path().join("escape").exists());
}

#[test]
fn test_unknown_operation_never_escapes_the_dispatcher() {
    let (_dir, dispatcher) = setup();
    let request = ActionRequest::new("format_disk", vec!["c".into()]);
    let result = dispatcher.dispatch(&request);
    assert!(!result.success);
    assert_eq!(result.message, "Unknown operation: format_disk");
}

#[test]
fn test_greedy_content_argument() {
    let request = parse_request("write_file:notes.txt,Buy milk, eggs,true").unwrap();
    assert_eq!(request.args, vec!["notes.txt", "Buy milk, eggs", "true"]);
}

#[test]
fn test_unrecognized_trailing_word_in_raw_request_is_content() {
    let (_dir, dispatcher) = setup();
    dispatcher.handle_raw("write_file:a.txt,one");

    // "maybe" is not a boolean literal, so it stays in the greedy content
    // and the omitted overwrite flag defaults to true.
    let result = dispatcher.handle_raw("write_file:a.txt,x,maybe");
    assert!(result.success, "{}", result.message);
    assert_eq!(
        fs::read_to_string(root_of(&dispatcher).join("a.txt")).unwrap(),
        "x,maybe"
    );

    // An already split request coerces the same word to false and refuses.
    let request = ActionRequest::new("write_file", vec!["a.txt".into(), "y".into(), "maybe".into()]);
    let result = dispatcher.dispatch(&request);
    assert!(!result.success);
    assert_eq!(result.message, "Already exists: a.txt");
    assert_eq!(
        fs::read_to_string(root_of(&dispatcher).join("a.txt")).unwrap(),
        "x,maybe"
    );
}
