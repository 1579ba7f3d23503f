//! Runs the Firestore REST client against a local server that mimics the
//! documents API for one collection.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value as JsonValue};

use userbook_core::{
    firestore::record_fields, FirestoreClient, Record, RecordStore, StoreError, SyncError,
    SyncLayer,
};

const API_KEY: &str = "test-key";
const PARENT: &str = "projects/demo/databases/(default)/documents/Users";

#[derive(Clone, Default)]
struct MockFirestore {
    docs: Arc<Mutex<Vec<(String, JsonValue)>>>,
    next_id: Arc<AtomicUsize>,
    last_patch_query: Arc<Mutex<Option<String>>>,
}

fn error_response(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(json!({
            "error": { "code": status.as_u16(), "message": message, "status": code }
        })),
    )
        .into_response()
}

fn key_ok(params: &HashMap<String, String>) -> bool {
    params.get("key").map(String::as_str) == Some(API_KEY)
}

fn forbidden() -> Response {
    error_response(
        StatusCode::FORBIDDEN,
        "API key not valid. Please pass a valid API key.",
        "PERMISSION_DENIED",
    )
}

fn document_json(id: &str, fields: &JsonValue) -> JsonValue {
    json!({
        "name": format!("{}/{}", PARENT, id),
        "fields": fields,
        "createTime": "2024-05-01T10:00:00.000000Z",
        "updateTime": "2024-05-01T10:00:00.000000Z"
    })
}

async fn list_documents(
    State(state): State<MockFirestore>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !key_ok(&params) {
        return forbidden();
    }
    let docs = state.docs.lock().unwrap();
    if docs.is_empty() {
        return Json(json!({})).into_response();
    }
    let documents: Vec<JsonValue> = docs
        .iter()
        .map(|(id, fields)| document_json(id, fields))
        .collect();
    Json(json!({ "documents": documents })).into_response()
}

async fn create_document(
    State(state): State<MockFirestore>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<JsonValue>,
) -> Response {
    if !key_ok(&params) {
        return forbidden();
    }
    let id = format!("auto{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    let fields = body["fields"].clone();
    state.docs.lock().unwrap().push((id.clone(), fields.clone()));
    Json(document_json(&id, &fields)).into_response()
}

async fn patch_document(
    State(state): State<MockFirestore>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
    Json(body): Json<JsonValue>,
) -> Response {
    let query = query.unwrap_or_default();
    if !query.contains(&format!("key={}", API_KEY)) {
        return forbidden();
    }
    let must_exist = query.contains("currentDocument.exists=true");
    *state.last_patch_query.lock().unwrap() = Some(query);

    let fields = body["fields"].clone();
    let mut docs = state.docs.lock().unwrap();
    match docs.iter().position(|(doc_id, _)| *doc_id == id) {
        Some(index) => {
            docs[index].1 = fields.clone();
            Json(document_json(&id, &fields)).into_response()
        }
        // Firestore upserts unless the request carries the precondition
        None if !must_exist => {
            docs.push((id.clone(), fields.clone()));
            Json(document_json(&id, &fields)).into_response()
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("No document to update: {}/{}", PARENT, id),
            "NOT_FOUND",
        ),
    }
}

async fn delete_document(
    State(state): State<MockFirestore>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !key_ok(&params) {
        return forbidden();
    }
    state.docs.lock().unwrap().retain(|(doc_id, _)| *doc_id != id);
    Json(json!({})).into_response()
}

async fn serve(state: MockFirestore) -> SocketAddr {
    let app = Router::new()
        .route(
            "/v1/documents/Users",
            get(list_documents).post(create_document),
        )
        .route(
            "/v1/documents/Users/{id}",
            patch(patch_document).delete(delete_document),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, key: &str) -> FirestoreClient {
    FirestoreClient::new(
        format!("http://{}/v1/documents/Users", addr),
        Some(key.to_string()),
    )
}

fn seed(state: &MockFirestore, id: &str, name: &str, email: &str, age: &str) {
    state.docs.lock().unwrap().push((
        id.to_string(),
        json!({
            "name": { "stringValue": name },
            "email": { "stringValue": email },
            "age": { "integerValue": age }
        }),
    ));
}

#[tokio::test]
async fn test_list_empty_collection() {
    let addr = serve(MockFirestore::default()).await;
    let docs = client(addr, API_KEY).list().await.unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn test_list_maps_documents_in_order() {
    let state = MockFirestore::default();
    seed(&state, "b2", "Bea", "bea@x.com", "22");
    seed(&state, "a1", "Ann", "a@x.com", "30");
    let addr = serve(state).await;

    let docs = client(addr, API_KEY).list().await.unwrap();
    let records: Vec<Record> = docs.iter().map(|d| d.to_record().unwrap()).collect();

    assert_eq!(
        records,
        vec![
            Record::new("b2", "Bea", "bea@x.com", 22),
            Record::new("a1", "Ann", "a@x.com", 30),
        ]
    );
}

#[tokio::test]
async fn test_create_sends_integer_as_string() {
    let state = MockFirestore::default();
    let addr = serve(state.clone()).await;

    let doc = client(addr, API_KEY)
        .create(&record_fields("Ann", "a@x.com", 30))
        .await
        .unwrap();

    assert_eq!(doc.id().unwrap(), "auto0");
    let stored = state.docs.lock().unwrap();
    assert_eq!(stored[0].1["age"], json!({ "integerValue": "30" }));
    assert_eq!(stored[0].1["name"], json!({ "stringValue": "Ann" }));
}

#[tokio::test]
async fn test_patch_sends_update_mask() {
    let state = MockFirestore::default();
    seed(&state, "a1", "Ann", "a@x.com", "30");
    let addr = serve(state.clone()).await;

    client(addr, API_KEY)
        .patch("a1", &record_fields("Ann", "ann@x.com", 31))
        .await
        .unwrap();

    let query = state.last_patch_query.lock().unwrap().clone().unwrap();
    for field in ["age", "email", "name"] {
        assert!(query.contains(&format!("updateMask.fieldPaths={}", field)));
    }
    assert!(query.contains("currentDocument.exists=true"));
    assert_eq!(
        state.docs.lock().unwrap()[0].1["email"],
        json!({ "stringValue": "ann@x.com" })
    );
}

#[tokio::test]
async fn test_patch_missing_document_is_status_error() {
    let state = MockFirestore::default();
    let addr = serve(state.clone()).await;

    let err = client(addr, API_KEY)
        .patch("ghost", &record_fields("A", "a@x.com", 1))
        .await
        .unwrap_err();

    match err {
        StoreError::Status { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("No document to update"));
            assert!(message.contains("NOT_FOUND"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(state.docs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_key_is_rejected() {
    let addr = serve(MockFirestore::default()).await;

    let err = client(addr, "wrong").list().await.unwrap_err();

    assert!(matches!(err, StoreError::Status { status: 403, .. }));
    assert!(err.to_string().contains("API key not valid"));
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    // Bind and drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, API_KEY).list().await.unwrap_err();
    assert!(matches!(err, StoreError::Http(_)));
}

#[tokio::test]
async fn test_sync_layer_round_trip() {
    let state = MockFirestore::default();
    seed(&state, "a1", "Ann", "a@x.com", "30");
    let addr = serve(state.clone()).await;

    let (mut layer, mut notices) = SyncLayer::new(client(addr, API_KEY));
    assert_eq!(layer.fetch_all().await.unwrap().len(), 1);

    let created = layer.create("Bob", "b@x.com", "25").await.unwrap();
    assert_eq!(created.id, "auto0");

    let target = layer.find("a1").unwrap().clone();
    layer.select_for_edit(&target);
    layer.update("a1", "Ann", "ann@x.com", "31").await.unwrap();

    assert!(layer.delete("auto0", |_: &Record| true).await.unwrap());

    assert_eq!(
        layer.records(),
        &[Record::new("a1", "Ann", "ann@x.com", 31)]
    );

    // Local state matches a fresh read of the store
    let local = layer.records().to_vec();
    layer.fetch_all().await.unwrap();
    assert_eq!(layer.records(), local.as_slice());

    let mut count = 0;
    while notices.try_recv().is_ok() {
        count += 1;
    }
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_sync_layer_remote_failure_keeps_state() {
    let state = MockFirestore::default();
    seed(&state, "a1", "Ann", "a@x.com", "30");
    let addr = serve(state.clone()).await;

    let (mut layer, _notices) = SyncLayer::new(client(addr, API_KEY));
    layer.fetch_all().await.unwrap();

    // Someone else removed the document; the patch now 404s
    state.docs.lock().unwrap().clear();
    let target = layer.find("a1").unwrap().clone();
    layer.select_for_edit(&target);
    let err = layer.update("a1", "Ann", "a@x.com", "40").await.unwrap_err();

    assert!(matches!(err, SyncError::Remote(StoreError::Status { status: 404, .. })));
    assert_eq!(layer.records(), &[target]);
    assert_eq!(layer.edit_selection(), Some("a1"));
    assert!(!layer.is_busy());
}
