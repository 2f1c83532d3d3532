//! gateway
//!
//! Request/response semantics over the document store.
//!
//! # Responsibilities
//!
//! - Validate proposed updates before they reach the store
//! - Run the read-then-conditionally-write protocol
//! - Derive read-only views (in-progress tasks, task forest)
//!
//! # Error Taxonomy
//!
//! - [`GatewayError::InvalidRequest`] - malformed input; the store is never touched
//! - [`GatewayError::StorageUnavailable`] - the store failed; fatal for the request
//! - A revision conflict is not an error. It is the
//!   [`ProposeOutcome::Conflict`] outcome.
//!
//! # Example
//!
//! ```no_run
//! use linecook::core::paths::DataPaths;
//! use linecook::core::store::DocumentStore;
//! use linecook::gateway::{Gateway, ProposeOutcome, UpdateRequest};
//!
//! let store = DocumentStore::open(DataPaths::new("data")).unwrap();
//! let gateway = Gateway::new(&store);
//!
//! let body = br#"{"baseRevision": 0, "doc": {"tasks": []}}"#;
//! let request = UpdateRequest::from_json(body).unwrap();
//!
//! match gateway.propose_update(request).unwrap() {
//!     ProposeOutcome::Committed(doc) => println!("saved as revision {}", doc.revision),
//!     ProposeOutcome::Conflict(current) => println!("reload revision {}", current.revision),
//! }
//! ```

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::document::{Document, Payload};
use crate::core::store::{CasOutcome, DocumentStore, StoreError};
use crate::core::task::{self, TaskForest};
use crate::core::types::Revision;

/// Errors surfaced at the gateway boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The proposed update is malformed.
    #[error("{0}")]
    InvalidRequest(String),

    /// The persisted state could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

/// A validated proposal to replace the document payload.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    /// The revision the caller's edit was based on.
    ///
    /// `None` when the caller sent an integer too large for any revision.
    /// Such a request can never be current, so it always conflicts.
    pub base_revision: Option<Revision>,
    /// The complete replacement payload.
    pub doc: Payload,
}

impl UpdateRequest {
    /// Parse and validate a raw request body.
    ///
    /// Expects `{"baseRevision": <integer ≥ 0>, "doc": <object>}`. Extra
    /// top-level fields are ignored.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidRequest`] when the body is empty, is not JSON,
    /// is not an object, or either field has the wrong type.
    pub fn from_json(body: &[u8]) -> Result<Self, GatewayError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(GatewayError::InvalidRequest("Missing request body".into()));
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| GatewayError::InvalidRequest("Invalid JSON".into()))?;
        Self::from_value(value)
    }

    /// Validate an already parsed request body.
    pub fn from_value(value: Value) -> Result<Self, GatewayError> {
        let Value::Object(mut body) = value else {
            return Err(GatewayError::InvalidRequest(
                "Request body must be an object".into(),
            ));
        };

        let base_revision = match body.get("baseRevision") {
            Some(Value::Number(n)) => match n.as_u64() {
                Some(rev) => Some(Revision::new(rev)),
                // serde_json reads integers past u64::MAX as floats.
                None if n.as_f64().is_some_and(|f| f >= U64_LIMIT && f.fract() == 0.0) => None,
                None => return Err(invalid_base_revision()),
            },
            _ => return Err(invalid_base_revision()),
        };

        let doc = match body.remove("doc") {
            Some(Value::Object(doc)) => doc,
            _ => return Err(GatewayError::InvalidRequest("doc must be an object".into())),
        };

        Ok(Self { base_revision, doc })
    }
}

/// 2^64, the smallest integer a `u64` cannot hold.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

fn invalid_base_revision() -> GatewayError {
    GatewayError::InvalidRequest("baseRevision must be an integer".into())
}

/// Result of a proposed update.
#[derive(Debug, Clone, PartialEq)]
pub enum ProposeOutcome {
    /// The edit landed; this is the new document.
    Committed(Document),
    /// Another edit landed first; this is the current document.
    Conflict(Document),
}

impl From<CasOutcome> for ProposeOutcome {
    fn from(outcome: CasOutcome) -> Self {
        match outcome {
            CasOutcome::Committed(doc) => Self::Committed(doc),
            CasOutcome::Conflict(doc) => Self::Conflict(doc),
        }
    }
}

/// Body returned to a caller that lost a revision race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictBody<'a> {
    pub error: &'static str,
    pub current: &'a Document,
}

impl<'a> ConflictBody<'a> {
    pub fn new(current: &'a Document) -> Self {
        Self {
            error: "conflict",
            current,
        }
    }
}

/// Protocol front for a borrowed [`DocumentStore`].
#[derive(Debug, Clone, Copy)]
pub struct Gateway<'a> {
    store: &'a DocumentStore,
}

impl<'a> Gateway<'a> {
    /// Create a gateway over `store`.
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch the current document.
    pub fn get_document(&self) -> Result<Document, GatewayError> {
        Ok(self.store.load()?)
    }

    /// Replace the payload if `request.base_revision` is still current.
    pub fn propose_update(&self, request: UpdateRequest) -> Result<ProposeOutcome, GatewayError> {
        let Some(base) = request.base_revision else {
            return Ok(ProposeOutcome::Conflict(self.store.load()?));
        };
        let outcome = self.store.compare_and_swap(base, request.doc)?;
        Ok(outcome.into())
    }

    /// Tasks not marked done, in stored order and exactly as stored.
    pub fn get_in_progress(&self) -> Result<Vec<Value>, GatewayError> {
        let doc = self.store.load()?;
        Ok(doc.tasks().map(|t| task::in_progress(t)).unwrap_or_default())
    }

    /// The task list arranged as a forest.
    pub fn get_task_forest(&self) -> Result<TaskForest, GatewayError> {
        let doc = self.store.load()?;
        Ok(doc
            .tasks()
            .map(|t| TaskForest::build(t))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::DataPaths;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, DocumentStore) {
        let temp = TempDir::new().expect("create temp dir");
        let store = DocumentStore::open(DataPaths::new(temp.path())).expect("open");
        (temp, store)
    }

    fn invalid_message(result: Result<UpdateRequest, GatewayError>) -> String {
        match result {
            Err(GatewayError::InvalidRequest(msg)) => msg,
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    mod update_request {
        use super::*;

        #[test]
        fn accepts_well_formed_body() {
            let req = UpdateRequest::from_json(br#"{"baseRevision": 3, "doc": {"tasks": []}}"#)
                .unwrap();
            assert_eq!(req.base_revision, Some(Revision::new(3)));
            assert_eq!(req.doc["tasks"], json!([]));
        }

        #[test]
        fn empty_body() {
            assert_eq!(
                invalid_message(UpdateRequest::from_json(b"")),
                "Missing request body"
            );
            assert_eq!(
                invalid_message(UpdateRequest::from_json(b"  \n")),
                "Missing request body"
            );
        }

        #[test]
        fn malformed_json() {
            assert_eq!(
                invalid_message(UpdateRequest::from_json(b"{baseRevision: 0")),
                "Invalid JSON"
            );
        }

        #[test]
        fn non_object_body() {
            assert_eq!(
                invalid_message(UpdateRequest::from_json(b"[1, 2]")),
                "Request body must be an object"
            );
        }

        #[test]
        fn base_revision_must_be_non_negative_integer() {
            for bad in [
                json!({"baseRevision": "zero", "doc": {}}),
                json!({"baseRevision": -1, "doc": {}}),
                json!({"baseRevision": 1.5, "doc": {}}),
                json!({"baseRevision": 1.8e19, "doc": {}}),
                json!({"baseRevision": true, "doc": {}}),
                json!({"baseRevision": null, "doc": {}}),
                json!({"doc": {}}),
            ] {
                assert_eq!(
                    invalid_message(UpdateRequest::from_value(bad)),
                    "baseRevision must be an integer"
                );
            }
        }

        #[test]
        fn doc_must_be_object() {
            for bad in [
                json!({"baseRevision": 0, "doc": []}),
                json!({"baseRevision": 0, "doc": "tasks"}),
                json!({"baseRevision": 0, "doc": null}),
                json!({"baseRevision": 0}),
            ] {
                assert_eq!(
                    invalid_message(UpdateRequest::from_value(bad)),
                    "doc must be an object"
                );
            }
        }

        #[test]
        fn extra_fields_ignored() {
            let req = UpdateRequest::from_value(json!({
                "baseRevision": 0, "doc": {}, "clientId": "abc"
            }))
            .unwrap();
            assert_eq!(req.base_revision, Some(Revision::INITIAL));
        }
    }

    #[test]
    fn get_document_seeds_on_first_call() {
        let (_temp, store) = create_test_store();
        let gateway = Gateway::new(&store);

        let doc = gateway.get_document().unwrap();
        assert_eq!(doc.revision, Revision::INITIAL);
        assert_eq!(gateway.get_document().unwrap(), doc);
    }

    #[test]
    fn propose_then_get_roundtrips() {
        let (_temp, store) = create_test_store();
        let gateway = Gateway::new(&store);

        let request = UpdateRequest::from_value(json!({
            "baseRevision": 0,
            "doc": {"tasks": [{"id": "n1", "title": "New", "done": false}]}
        }))
        .unwrap();
        let payload = request.doc.clone();

        let outcome = gateway.propose_update(request).unwrap();
        assert!(matches!(outcome, ProposeOutcome::Committed(ref d) if d.revision == Revision::new(1)));

        let fetched = gateway.get_document().unwrap();
        assert_eq!(fetched.revision, Revision::new(1));
        assert_eq!(fetched.doc, payload);
    }

    #[test]
    fn stale_base_is_a_conflict() {
        let (_temp, store) = create_test_store();
        let gateway = Gateway::new(&store);

        let first = UpdateRequest::from_value(json!({"baseRevision": 0, "doc": {"tasks": []}}));
        gateway.propose_update(first.unwrap()).unwrap();

        let stale = UpdateRequest::from_value(json!({"baseRevision": 0, "doc": {"x": 1}}));
        match gateway.propose_update(stale.unwrap()).unwrap() {
            ProposeOutcome::Conflict(current) => {
                assert_eq!(current, gateway.get_document().unwrap());
                assert_eq!(current.revision, Revision::new(1));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn base_beyond_u64_is_a_conflict() {
        let (_temp, store) = create_test_store();
        let gateway = Gateway::new(&store);

        let request =
            UpdateRequest::from_json(br#"{"baseRevision": 18446744073709551616, "doc": {}}"#)
                .unwrap();
        assert_eq!(request.base_revision, None);

        match gateway.propose_update(request).unwrap() {
            ProposeOutcome::Conflict(current) => assert_eq!(current.revision, Revision::INITIAL),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(gateway.get_document().unwrap().revision, Revision::INITIAL);
    }

    #[test]
    fn in_progress_filters_seed() {
        let (_temp, store) = create_test_store();
        let gateway = Gateway::new(&store);

        let tasks = gateway.get_in_progress().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0]["id"], "t1");
        assert_eq!(tasks[1]["id"], "t2");
    }

    #[test]
    fn in_progress_without_task_list_is_empty() {
        let (_temp, store) = create_test_store();
        let gateway = Gateway::new(&store);
        let request = UpdateRequest::from_value(json!({"baseRevision": 0, "doc": {"notes": "x"}}));
        gateway.propose_update(request.unwrap()).unwrap();

        assert!(gateway.get_in_progress().unwrap().is_empty());
        assert!(gateway.get_task_forest().unwrap().is_empty());
    }

    #[test]
    fn task_forest_of_seed() {
        let (_temp, store) = create_test_store();
        let forest = Gateway::new(&store).get_task_forest().unwrap();

        assert_eq!(forest.roots().len(), 1);
        let root = forest.roots()[0];
        assert_eq!(root.task().id, "t1");
        assert_eq!(root.children().next().unwrap().task().id, "t2");
    }

    #[test]
    fn conflict_body_shape() {
        let doc = Document::seed();
        let body = serde_json::to_value(ConflictBody::new(&doc)).unwrap();
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["current"]["revision"], 0);
    }

    #[test]
    fn storage_failure_maps_to_storage_unavailable() {
        let (_temp, store) = create_test_store();
        std::fs::write(store.paths().doc_path(), "garbage").unwrap();

        let err = Gateway::new(&store).get_document().unwrap_err();
        assert!(matches!(err, GatewayError::StorageUnavailable(_)));
    }
}
