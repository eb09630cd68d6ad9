use flexpane_core::{TodoSource, TodoStore, TodoStoreError};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn messages(store: &TodoStore) -> Vec<(bool, String)> {
    store
        .list()
        .into_iter()
        .map(|todo| (todo.done, todo.message))
        .collect()
}

#[test]
fn add_then_reopen_reproduces_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("todos.json");

    let store = TodoStore::open(&path).unwrap();
    store.add("buy milk").unwrap();
    assert_eq!(messages(&store), vec![(false, "buy milk".to_string())]);

    let reopened = TodoStore::open(&path).unwrap();
    assert_eq!(reopened.list(), store.list());
}

#[test]
fn add_appends_in_call_order() {
    let dir = TempDir::new().unwrap();
    let store = TodoStore::open(dir.path().join("todos.json")).unwrap();
    let inputs = ["m1", "m2", "m3", "m4"];
    for message in inputs {
        store.add(message).unwrap();
    }
    let expected = inputs
        .iter()
        .map(|message| (false, message.to_string()))
        .collect::<Vec<_>>();
    assert_eq!(messages(&store), expected);
}

#[test]
fn toggle_twice_restores_state() {
    let dir = TempDir::new().unwrap();
    let store = TodoStore::open(dir.path().join("todos.json")).unwrap();
    store.add("a").unwrap();
    store.add("b").unwrap();
    let before = store.list();

    store.toggle(1).unwrap();
    store.toggle(1).unwrap();
    assert_eq!(store.list(), before);
}

#[test]
fn toggle_first_of_two() {
    let dir = TempDir::new().unwrap();
    let store = TodoStore::open(dir.path().join("todos.json")).unwrap();
    store.add("a").unwrap();
    store.add("b").unwrap();
    store.toggle(0).unwrap();
    assert_eq!(
        messages(&store),
        vec![(true, "a".to_string()), (false, "b".to_string())]
    );
}

#[test]
fn file_is_pretty_printed_json_array() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todos.json");
    let store = TodoStore::open(&path).unwrap();
    store.add("a").unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("[\n"));
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["message"], "a");
    assert_eq!(value[0]["done"], false);
    assert!(value[0]["id"].is_string());
}

#[test]
fn rejects_oversized_message() {
    let dir = TempDir::new().unwrap();
    let store = TodoStore::open(dir.path().join("todos.json")).unwrap();
    store.add(&"x".repeat(200)).unwrap();
    let err = store.add(&"x".repeat(201)).unwrap_err();
    assert!(matches!(
        err,
        TodoStoreError::MessageTooLong {
            chars: 201,
            max: 200
        }
    ));
    assert_eq!(store.len(), 1);
}

#[test]
fn concurrent_adds_are_all_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("todos.json");
    let store = Arc::new(TodoStore::open(&path).unwrap());

    let handles = (0..8)
        .map(|worker| {
            let store = store.clone();
            thread::spawn(move || {
                for item in 0..10 {
                    store.add(&format!("w{worker}-{item}")).unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 80);
    let reopened = TodoStore::open(&path).unwrap();
    assert_eq!(reopened.len(), 80);
}
