//! Property-based tests for the store and task views.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

use linecook::core::paths::DataPaths;
use linecook::core::store::{CasOutcome, DocumentStore};
use linecook::core::task::{in_progress, TaskForest};
use linecook::core::types::Revision;

/// Strategy for the `done` field: present or absent, any JSON type.
fn done_value() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Bool(true))),
        Just(Some(Value::Bool(false))),
        Just(Some(Value::Null)),
        Just(Some(json!("yes"))),
        Just(Some(json!(1))),
    ]
}

/// Strategy for a single task entry.
fn task_entry() -> impl Strategy<Value = Value> {
    (
        "[a-z]{1,3}",
        done_value(),
        any::<bool>(),
        proptest::option::of("[a-z]{1,3}"),
        -5i64..5,
    )
        .prop_map(|(id, done, collapsed, parent, order)| {
            let mut task = Map::new();
            task.insert("id".into(), Value::String(id));
            if let Some(done) = done {
                task.insert("done".into(), done);
            }
            task.insert("collapsed".into(), Value::Bool(collapsed));
            task.insert(
                "parentId".into(),
                parent.map(Value::String).unwrap_or(Value::Null),
            );
            task.insert("order".into(), json!(order));
            Value::Object(task)
        })
}

/// Strategy for a task list, with the occasional non-object entry mixed in.
fn task_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(
        prop_oneof![
            9 => task_entry(),
            1 => Just(json!("stray")),
        ],
        0..30,
    )
}

/// A write either chases the current revision or names one that is not current.
#[derive(Debug, Clone)]
enum Write {
    Fresh,
    Mismatched(u64),
}

fn write_op() -> impl Strategy<Value = Write> {
    prop_oneof![
        3 => Just(Write::Fresh),
        1 => (0u64..5).prop_map(Write::Mismatched),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn revision_advances_by_exactly_one(ops in prop::collection::vec(write_op(), 1..15)) {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::open(DataPaths::new(temp.path())).unwrap();
        let mut expected = Revision::INITIAL;

        for (i, op) in ops.iter().enumerate() {
            let current = store.load().unwrap().revision;
            prop_assert_eq!(current, expected);

            let base = match op {
                Write::Fresh => current,
                Write::Mismatched(ahead) => Revision::new(current.get() + 1 + ahead),
            };
            let mut payload = Map::new();
            payload.insert("step".into(), json!(i));

            match store.compare_and_swap(base, payload.clone()).unwrap() {
                CasOutcome::Committed(doc) => {
                    prop_assert!(matches!(op, Write::Fresh));
                    prop_assert_eq!(doc.revision.get(), expected.get() + 1);
                    prop_assert_eq!(doc.doc, payload);
                    expected = doc.revision;
                }
                CasOutcome::Conflict(doc) => {
                    prop_assert!(matches!(op, Write::Mismatched(_)));
                    prop_assert_eq!(doc.revision, expected);
                }
            }
        }
    }

    #[test]
    fn in_progress_keeps_exactly_the_unfinished(tasks in task_list()) {
        let kept = in_progress(&tasks);

        let expected: Vec<Value> = tasks
            .iter()
            .filter(|t| t.is_object() && t.get("done") != Some(&Value::Bool(true)))
            .cloned()
            .collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn in_progress_ignores_collapsed_and_parent(tasks in task_list()) {
        let mut scrambled = tasks.clone();
        for task in scrambled.iter_mut() {
            if let Some(obj) = task.as_object_mut() {
                obj.insert("collapsed".into(), Value::Bool(true));
                obj.insert("parentId".into(), json!("elsewhere"));
            }
        }

        prop_assert_eq!(in_progress(&tasks).len(), in_progress(&scrambled).len());
    }

    #[test]
    fn forest_places_every_task_once(tasks in task_list()) {
        let forest = TaskForest::build(&tasks);
        let objects = tasks.iter().filter(|t| t.is_object()).count();
        prop_assert_eq!(forest.len(), objects);
    }
}
