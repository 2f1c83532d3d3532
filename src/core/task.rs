//! core::task
//!
//! Task tree model carried inside the document payload.
//!
//! # Forest Contract
//!
//! `doc.tasks` is a flat list that forms a forest:
//! - a task with no `parentId` (absent or null) is a root
//! - `parentId` names the `id` of another task in the same list
//! - `order` ranks siblings; it is not unique and carries no global meaning
//!
//! Nothing here is enforced at write time. Duplicate ids, parents that do
//! not exist and parent cycles are all persisted as sent. The views below
//! tolerate them without rewriting the stored data:
//! - duplicate ids: the first occurrence is the one children attach to
//! - unknown parent: the task is shown as a root
//! - cycle: the first cycle member encountered is shown as a root, once
//!
//! # Example
//!
//! ```
//! use linecook::core::task::{TaskForest, in_progress};
//! use serde_json::json;
//!
//! let tasks = vec![
//!     json!({"id": "a", "title": "Plan", "done": false}),
//!     json!({"id": "b", "title": "Buy", "done": true, "parentId": "a"}),
//! ];
//!
//! assert_eq!(in_progress(&tasks).len(), 1);
//!
//! let forest = TaskForest::build(&tasks);
//! assert_eq!(forest.roots().len(), 1);
//! assert_eq!(forest.roots()[0].children().len(), 1);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single task as carried in `doc.tasks`.
///
/// Every field has a default so partially filled tasks still parse. A known
/// field holding the wrong JSON type reads as its default, so any object is
/// a task. Fields this model does not know about are kept in `extra` and
/// written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    /// Only `true` counts as done.
    #[serde(deserialize_with = "lenient::flag")]
    pub done: bool,
    /// UI hint: children are hidden in the outline.
    #[serde(deserialize_with = "lenient::flag")]
    pub collapsed: bool,
    #[serde(deserialize_with = "lenient::optional_string")]
    pub parent_id: Option<String>,
    #[serde(deserialize_with = "lenient::integer")]
    pub order: i64,
    pub start: Option<Value>,
    pub end: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Parse a raw task entry.
    ///
    /// Returns `None` for entries that are not JSON objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Whether this task has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Field readers that map mistyped values to defaults.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(matches!(Value::deserialize(d)?, Value::Bool(true)))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(optional_string(d)?.unwrap_or_default())
    }

    pub fn optional_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .unwrap_or(0))
    }
}

/// Whether a raw entry counts as not done.
///
/// Only JSON objects are tasks. `done` that is absent, null or `false`
/// counts as in progress.
fn is_in_progress(value: &Value) -> bool {
    match value.as_object() {
        Some(obj) => !matches!(obj.get("done"), Some(Value::Bool(true))),
        None => false,
    }
}

/// Select the tasks that are not done, in their original order.
///
/// Entries are returned exactly as stored; `collapsed` and `parentId` do
/// not affect selection.
pub fn in_progress(tasks: &[Value]) -> Vec<Value> {
    tasks.iter().filter(|t| is_in_progress(t)).cloned().collect()
}

/// A task in a [`TaskForest`], borrowed from it.
#[derive(Debug, Clone, Copy)]
pub struct TaskNode<'a> {
    forest: &'a TaskForest,
    index: usize,
}

impl<'a> TaskNode<'a> {
    pub fn task(&self) -> &'a Task {
        &self.forest.tasks[self.index]
    }

    /// Direct children in sibling order.
    pub fn children(&self) -> impl ExactSizeIterator<Item = TaskNode<'a>> + 'a {
        let forest = self.forest;
        forest.children[self.index]
            .iter()
            .map(move |&index| TaskNode { forest, index })
    }

    pub fn has_children(&self) -> bool {
        !self.forest.children[self.index].is_empty()
    }
}

/// The task list arranged as a forest.
///
/// Links are index lists into a flat task vector, so neither building,
/// walking nor dropping a forest recurses, however deep the nesting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForest {
    tasks: Vec<Task>,
    /// Children of each task, in sibling order. Every task appears in at
    /// most one list.
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl TaskForest {
    /// Arrange raw task entries into a forest.
    ///
    /// Entries that do not parse as [`Task`] are skipped. Siblings are
    /// sorted by `order`, ties keep their position in the list.
    pub fn build(raw: &[Value]) -> Self {
        let tasks: Vec<Task> = raw.iter().filter_map(Task::from_value).collect();

        // First occurrence of an id wins.
        let mut index_of: HashMap<&str, usize> = HashMap::new();
        for (i, task) in tasks.iter().enumerate() {
            index_of.entry(task.id.as_str()).or_insert(i);
        }

        let mut linked: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
        let mut roots: Vec<usize> = Vec::new();
        for (i, task) in tasks.iter().enumerate() {
            match task.parent_id.as_deref().and_then(|p| index_of.get(p)) {
                Some(&parent) if parent != i => linked[parent].push(i),
                _ => roots.push(i),
            }
        }

        let by_order = |list: &mut Vec<usize>| list.sort_by_key(|&i| (tasks[i].order, i));
        by_order(&mut roots);
        linked.iter_mut().for_each(by_order);

        let mut placed = vec![false; tasks.len()];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
        let mut stack: Vec<usize> = Vec::new();
        let mut place_subtree = |start: usize, placed: &mut Vec<bool>| {
            placed[start] = true;
            stack.push(start);
            while let Some(i) = stack.pop() {
                for &c in &linked[i] {
                    if !placed[c] {
                        placed[c] = true;
                        children[i].push(c);
                        stack.push(c);
                    }
                }
            }
        };

        for &root in &roots {
            place_subtree(root, &mut placed);
        }

        // Anything still unplaced hangs off a parent cycle. Promote the first
        // member of each cycle so every task shows up exactly once.
        for i in 0..tasks.len() {
            if !placed[i] {
                place_subtree(i, &mut placed);
                roots.push(i);
            }
        }

        Self {
            tasks,
            children,
            roots,
        }
    }

    /// Top-level tasks in sibling order.
    pub fn roots(&self) -> Vec<TaskNode<'_>> {
        self.roots
            .iter()
            .map(|&index| TaskNode {
                forest: self,
                index,
            })
            .collect()
    }

    /// Total number of tasks in the forest.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the forest has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Depth-first, pre-order visit of every task with its depth (roots
    /// are 0).
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(TaskNode<'a>, usize)) {
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&i| (i, 0)).collect();
        while let Some((index, depth)) = stack.pop() {
            visit(
                TaskNode {
                    forest: self,
                    index,
                },
                depth,
            );
            stack.extend(self.children[index].iter().rev().map(|&c| (c, depth + 1)));
        }
    }
}
