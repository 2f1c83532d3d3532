//! core::document
//!
//! The single persisted unit of state.
//!
//! # Wire Shape
//!
//! ```json
//! {
//!   "revision": 3,
//!   "updatedAt": "2025-12-16T09:30:00+00:00",
//!   "doc": { "tasks": [ ... ] }
//! }
//! ```
//!
//! The store treats `doc` as an opaque JSON object ([`Payload`]). Only the
//! gateway's derived views look at the tasks inside it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::types::{Revision, UtcTimestamp};

/// The document body. Any JSON object is accepted.
pub type Payload = Map<String, Value>;

/// Key under which the task list lives inside a [`Payload`].
pub const TASKS_KEY: &str = "tasks";

/// A revisioned, timestamped document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub revision: Revision,
    pub updated_at: UtcTimestamp,
    pub doc: Payload,
}

impl Document {
    /// The document every store starts from: revision 0 and two example
    /// tasks, the second nested under the first.
    pub fn seed() -> Self {
        Self {
            revision: Revision::INITIAL,
            updated_at: UtcTimestamp::now(),
            doc: seed_payload(),
        }
    }

    /// The raw task list, if the payload carries one.
    ///
    /// Returns `None` when `tasks` is missing or is not an array.
    pub fn tasks(&self) -> Option<&Vec<Value>> {
        self.doc.get(TASKS_KEY).and_then(Value::as_array)
    }
}

fn seed_payload() -> Payload {
    let mut payload = Payload::new();
    payload.insert(
        TASKS_KEY.to_string(),
        json!([
            {
                "id": "t1",
                "title": "Example task 2025-12-16 3d",
                "done": false,
                "collapsed": false,
                "parentId": null,
                "order": 0,
                "start": null,
                "end": null
            },
            {
                "id": "t2",
                "title": "Subtask 2025-12-18",
                "done": false,
                "collapsed": false,
                "parentId": "t1",
                "order": 0,
                "start": null,
                "end": null
            }
        ]),
    );
    payload
}
