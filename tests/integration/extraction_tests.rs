use crate::common::{extraction_client, extraction_config, API_KEY};
use price_scout::{FailureKind, RequestContext};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn ctx() -> RequestContext {
    RequestContext::with_id("test")
}

fn links() -> Vec<String> {
    vec![
        "https://shop-one.com/item/steel-kettle-1700".to_string(),
        "https://shop-two.com/p/12345".to_string(),
    ]
}

fn listings_payload() -> Value {
    json!({
        "success": true,
        "status": "completed",
        "data": { "ecommerce_links": [{
            "website_name": "Shop One",
            "price_combined": "$24.99",
            "price_string": "24.99",
            "currency_code": "USD",
            "website_url": "https://shop-one.com/item/steel-kettle-1700"
        }]}
    })
}

#[tokio::test]
async fn test_synchronous_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .and(header("authorization", format!("Bearer {}", API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "ecommerce_links": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = extraction_client(extraction_config(&server))
        .extract(&links(), &ctx())
        .await;

    assert!(result.is_success());
    assert_eq!(
        result.payload(),
        Some(&json!({ "success": true, "data": { "ecommerce_links": [] } }))
    );

    let requests = server.received_requests().await.expect("Request recording is on");
    let body: Value = serde_json::from_slice(&requests[0].body).expect("Body is JSON");
    assert_eq!(body["urls"], json!(links()));
    assert!(body["prompt"].as_str().is_some());
    assert!(body["schema"]["properties"]["ecommerce_links"].is_object());
    assert!(body.get("scrapeOptions").is_none());
}

#[tokio::test]
async fn test_asynchronous_job_is_polled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "id": "job-1" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/job-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "status": "processing" })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listings_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let config = extraction_config(&server);
    let minimum = Duration::from_millis(config.initial_poll_delay_ms + config.poll_interval_ms);

    let started = Instant::now();
    let result = extraction_client(config).extract(&links(), &ctx()).await;

    assert!(started.elapsed() >= minimum);
    assert!(result.is_success());

    let listings = result.listings();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].price_string, "24.99");
}

#[tokio::test]
async fn test_empty_links_never_call_the_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = extraction_client(extraction_config(&server))
        .extract(&[], &ctx())
        .await;

    assert_eq!(result.kind(), Some(FailureKind::NoValidUrls));
    assert_eq!(
        serde_json::to_value(&result).unwrap()["success"],
        json!(false)
    );
}

#[tokio::test]
async fn test_non_json_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let result = extraction_client(extraction_config(&server))
        .extract(&links(), &ctx())
        .await;

    assert_eq!(result.kind(), Some(FailureKind::InvalidResponse));
    assert!(result.error().unwrap_or_default().contains("502"));
}

#[tokio::test]
async fn test_unrecognized_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let result = extraction_client(extraction_config(&server))
        .extract(&links(), &ctx())
        .await;

    assert_eq!(result.kind(), Some(FailureKind::UnexpectedShape));
}

#[tokio::test]
async fn test_rejected_submission_reads_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "success": false, "error": "Unauthorized: invalid token" })),
        )
        .mount(&server)
        .await;

    let result = extraction_client(extraction_config(&server))
        .extract(&links(), &ctx())
        .await;

    assert_eq!(result.kind(), Some(FailureKind::Rejected));
    assert_eq!(result.error(), Some("Unauthorized: invalid token"));
}

#[tokio::test]
async fn test_failed_job() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "id": "job-2" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/job-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "status": "failed",
            "error": "Extraction timed out on provider side"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = extraction_client(extraction_config(&server))
        .extract(&links(), &ctx())
        .await;

    assert_eq!(result.kind(), Some(FailureKind::JobFailed));
    assert_eq!(result.error(), Some("Extraction timed out on provider side"));
}

#[tokio::test]
async fn test_poll_budget_runs_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "id": "job-3" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/extract/job-3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "status": "processing" })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let mut config = extraction_config(&server);
    config.max_poll_attempts = 3;

    let result = extraction_client(config).extract(&links(), &ctx()).await;

    assert_eq!(result.kind(), Some(FailureKind::PollTimeout));
    assert!(result.error().unwrap_or_default().contains("job-3"));
}

#[tokio::test]
async fn test_unreachable_service() {
    let server = MockServer::start().await;
    let mut config = extraction_config(&server);
    config.api_url = "http://127.0.0.1:1/v1/extract".to_string();

    let result = extraction_client(config).extract(&links(), &ctx()).await;

    assert_eq!(result.kind(), Some(FailureKind::Network));
}

/// Records when each submission arrives, then answers after a delay
struct SlowSubmission {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl Respond for SlowSubmission {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals
            .lock()
            .expect("Arrival log poisoned")
            .push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_json(json!({ "success": true, "data": { "ecommerce_links": [] } }))
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_concurrent_jobs_are_gated() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(300);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        .respond_with(SlowSubmission {
            arrivals: arrivals.clone(),
            delay,
        })
        .expect(3)
        .mount(&server)
        .await;

    let mut config = extraction_config(&server);
    config.max_concurrent_jobs = 2;
    let client = extraction_client(config);

    let started = Instant::now();
    let handles: Vec<_> = (0..3)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.extract(&links(), &ctx()).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.expect("Extraction task panicked");
        assert!(result.is_success());
    }

    // Two slots for three jobs means two rounds
    assert!(started.elapsed() >= delay * 2);

    let mut arrivals = arrivals.lock().expect("Arrival log poisoned").clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 3);
    assert!(arrivals[2].duration_since(arrivals[0]) >= delay);

    assert_eq!(client.available_slots(), 2);
}
