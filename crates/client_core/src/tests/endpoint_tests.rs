use super::*;

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{CourseId, PageSize, SortDirection, SortField},
    protocol::PerformanceQuery,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    delay: Duration,
    body: Value,
    hits: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

struct TestServer {
    url: String,
    hits: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn performance_handler(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.queries.lock().await.push(query);
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, Json(state.body.clone()))
}

async fn spawn_server(status: StatusCode, delay: Duration, body: Value) -> Result<TestServer> {
    let hits = Arc::new(AtomicUsize::new(0));
    let queries = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        status,
        delay,
        body,
        hits: Arc::clone(&hits),
        queries: Arc::clone(&queries),
    };
    let app = Router::new()
        .route("/api/performance", get(performance_handler))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(TestServer {
        url: format!("http://{addr}/api/performance"),
        hits,
        queries,
    })
}

async fn spawn_healthy_server() -> Result<TestServer> {
    spawn_server(StatusCode::OK, Duration::ZERO, sample_body()).await
}

async fn unreachable_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/api/performance"))
}

fn sample_body() -> Value {
    json!({
        "data": [
            {
                "id": 1,
                "studentId": 1001,
                "studentName": "Ada Lovelace",
                "course_name": "Mathematics",
                "subject_name": "Calculus",
                "grade": 95,
                "submittedOn": "2024-03-05T10:00:00",
                "modifiedOn": "2024-03-06T12:30:00Z"
            },
            {
                "id": 2,
                "studentId": "1002",
                "studentName": "Alan Turing",
                "course": "Computing",
                "courseId": 7,
                "subject": "Logic",
                "grade": "A"
            }
        ],
        "pagination": { "totalItems": 2, "totalPages": 1, "currentPage": 1 }
    })
}

fn fast_options() -> ResolverOptions {
    ResolverOptions {
        probe_timeout: Duration::from_millis(300),
        request_timeout: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn selects_first_reachable_candidate_and_stops_probing() {
    let failing = spawn_server(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO, json!({}))
        .await
        .expect("spawn failing");
    let healthy = spawn_healthy_server().await.expect("spawn healthy");
    let never = spawn_healthy_server().await.expect("spawn third");

    let resolver = EndpointResolver::new(fast_options());
    let session = resolver
        .resolve(&[failing.url.clone(), healthy.url.clone(), never.url.clone()])
        .await
        .expect("resolve");

    assert_eq!(session.endpoint().as_str(), healthy.url);
    assert_eq!(failing.hits.load(Ordering::SeqCst), 1);
    assert_eq!(healthy.hits.load(Ordering::SeqCst), 1);
    assert_eq!(never.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn probe_requests_a_single_record() {
    let healthy = spawn_healthy_server().await.expect("spawn");

    EndpointResolver::new(fast_options())
        .resolve(&[healthy.url.as_str()])
        .await
        .expect("resolve");

    let queries = healthy.queries.lock().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("pageSize").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn exhausted_candidates_report_every_attempt() {
    let refused = unreachable_url().await.expect("port");
    let not_found = spawn_server(StatusCode::NOT_FOUND, Duration::ZERO, json!({}))
        .await
        .expect("spawn");
    let slow = spawn_server(StatusCode::OK, Duration::from_secs(3), sample_body())
        .await
        .expect("spawn slow");

    let err = EndpointResolver::new(fast_options())
        .resolve(&[
            "not a url".to_string(),
            refused.clone(),
            not_found.url.clone(),
            slow.url.clone(),
        ])
        .await
        .expect_err("must fail");

    assert_eq!(err.attempts.len(), 4);
    assert_eq!(
        err.attempts[0].failure,
        ProbeFailure::InvalidUrl("not a url".to_string())
    );
    assert!(matches!(err.attempts[1].failure, ProbeFailure::Transport(_)));
    assert_eq!(err.attempts[2].failure, ProbeFailure::Status(404));
    assert_eq!(
        err.attempts[3].failure,
        ProbeFailure::Timeout(Duration::from_millis(300))
    );
    assert!(err.to_string().contains(&refused));
}

#[tokio::test]
async fn empty_candidate_list_is_a_connectivity_error() {
    let candidates: [&str; 0] = [];
    let err = EndpointResolver::new(fast_options())
        .resolve(&candidates)
        .await
        .expect_err("must fail");
    assert!(err.attempts.is_empty());
    assert!(err.to_string().contains("no endpoints configured"));
}

#[test]
fn rejects_non_http_candidates() {
    assert!(parse_endpoint("ftp://example.com/api").is_err());
    assert!(parse_endpoint("/api/performance").is_err());
    assert!(parse_endpoint(" https://example.com/api/performance ").is_ok());
}

#[tokio::test]
async fn fetch_page_sends_query_and_normalizes_records() {
    let healthy = spawn_healthy_server().await.expect("spawn");
    let session = EndpointResolver::new(fast_options())
        .resolve(&[healthy.url.as_str()])
        .await
        .expect("resolve");

    let page = session
        .fetch_page(&PerformanceQuery {
            search: Some("ada".to_string()),
            course_id: Some(CourseId(3)),
            subject_id: None,
            page: 1,
            page_size: PageSize::default(),
            sort_by: SortField::Grade,
            sort_direction: SortDirection::Desc,
        })
        .await
        .expect("fetch");

    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[0].course_name, "Mathematics");
    assert_eq!(page.records[0].grade, "95");
    assert_eq!(page.records[1].course_name, "Computing");
    assert_eq!(page.records[1].course_id, Some(CourseId(7)));
    assert_eq!(page.pagination.total_items, 2);

    let queries = healthy.queries.lock().await;
    let sent = queries.last().expect("data query");
    assert_eq!(sent.get("search").map(String::as_str), Some("ada"));
    assert_eq!(sent.get("courseId").map(String::as_str), Some("3"));
    assert!(!sent.contains_key("subjectId"));
    assert_eq!(sent.get("page").map(String::as_str), Some("1"));
    assert_eq!(sent.get("pageSize").map(String::as_str), Some("10"));
    assert_eq!(sent.get("sortBy").map(String::as_str), Some("grade"));
    assert_eq!(sent.get("sortDirection").map(String::as_str), Some("desc"));
}

#[tokio::test]
async fn fetch_sample_uses_large_page_size() {
    let healthy = spawn_healthy_server().await.expect("spawn");
    let session = EndpointResolver::new(fast_options())
        .resolve(&[healthy.url.as_str()])
        .await
        .expect("resolve");

    let records = session.fetch_sample(100).await.expect("sample");

    assert_eq!(records.len(), 2);
    let queries = healthy.queries.lock().await;
    let sent = queries.last().expect("sample query");
    assert_eq!(sent.get("pageSize").map(String::as_str), Some("100"));
    assert_eq!(sent.len(), 1);
}

#[tokio::test]
async fn missing_pagination_is_a_fetch_error() {
    let server = spawn_server(StatusCode::OK, Duration::ZERO, json!({ "data": [] }))
        .await
        .expect("spawn");
    let session = ApiSession::new(
        Client::new(),
        parse_endpoint(&server.url).expect("url"),
        Duration::from_secs(2),
    );

    let err = session
        .fetch_page(&crate::QueryState::default().to_query())
        .await
        .expect_err("must fail");
    assert!(matches!(err, FetchError::MissingPagination { .. }));
}

#[tokio::test]
async fn error_status_is_a_fetch_error() {
    let server = spawn_server(StatusCode::SERVICE_UNAVAILABLE, Duration::ZERO, json!({}))
        .await
        .expect("spawn");
    let session = ApiSession::new(
        Client::new(),
        parse_endpoint(&server.url).expect("url"),
        Duration::from_secs(2),
    );

    let err = session.fetch_sample(100).await.expect_err("must fail");
    assert_eq!(
        err,
        FetchError::Status {
            url: server.url.clone(),
            status: 503
        }
    );
}
