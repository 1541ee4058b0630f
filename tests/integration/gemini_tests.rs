use price_scout::config::IdentificationConfig;
use price_scout::discovery::{GeminiClient, ImageInput, LinkDiscoverer, ProductIdentifier};
use price_scout::ScoutError;
use reqwest::Client;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/models/test-model:generateContent";

fn client(server: &MockServer) -> GeminiClient {
    let config = IdentificationConfig {
        api_url: server.uri(),
        model: "test-model".to_string(),
        max_search_terms: 3,
        ..Default::default()
    };
    GeminiClient::with_client(Client::new(), config, "gemini-key")
}

fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
}

fn grounded_response(uris: &[&str]) -> Value {
    let chunks: Vec<Value> = uris
        .iter()
        .map(|uri| json!({ "web": { "uri": uri, "title": "result" } }))
        .collect();
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "Here are some pages." }] },
            "groundingMetadata": { "groundingChunks": chunks }
        }]
    })
}

#[tokio::test]
async fn test_identify_sends_images_inline() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "gemini-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
            "Acme Steel Kettle 1.7L.\nSearch terms: \"acme steel kettle\"",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let images = vec![
        ImageInput::from_bytes(b"front", "image/jpeg"),
        ImageInput::from_bytes(b"back", "image/png"),
    ];
    let description = client(&server).identify(&images).await.unwrap();
    assert!(description.starts_with("Acme Steel Kettle"));

    let requests = server.received_requests().await.expect("Request recording is on");
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[2]["inlineData"]["mimeType"], "image/png");
    assert_eq!(body["tools"], json!([{ "google_search": {} }]));
}

#[tokio::test]
async fn test_identify_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let images = vec![ImageInput::from_bytes(b"front", "image/jpeg")];
    let err = client(&server).identify(&images).await.unwrap_err();
    assert!(matches!(err, ScoutError::Api { status: 403, .. }));
}

#[tokio::test]
async fn test_discover_merges_terms_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains("for: acme kettle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grounded_response(&[
            "https://r.example/1",
            "https://r.example/2",
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains("for: steel kettle 1.7L"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grounded_response(&[
            "https://r.example/2",
            "https://r.example/3",
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let description = "A kettle.\nSearch terms:\n\"acme kettle\"\n\"steel kettle 1.7L\"";
    let links = client(&server).discover(description).await.unwrap();

    assert_eq!(
        links,
        vec![
            "https://r.example/1",
            "https://r.example/2",
            "https://r.example/3"
        ]
    );
}

#[tokio::test]
async fn test_discover_caps_terms() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(grounded_response(&[])))
        .expect(3)
        .mount(&server)
        .await;

    let description = "Search terms:\n- one\n- two\n- three\n- four\n- five";
    let links = client(&server).discover(description).await.unwrap();
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_discover_without_terms_uses_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains("for: Acme cordless drill"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grounded_response(&[
            "https://r.example/drill",
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let links = client(&server).discover("Acme cordless drill").await.unwrap();
    assert_eq!(links, vec!["https://r.example/drill"]);
}

#[tokio::test]
async fn test_discover_falls_back_to_markdown_links() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
            "Try [Shop](https://shop.com/item/1) or [Other](https://other.com/p/2).",
        )))
        .mount(&server)
        .await;

    let links = client(&server).discover("kettle").await.unwrap();
    assert_eq!(
        links,
        vec!["https://shop.com/item/1", "https://other.com/p/2"]
    );
}

#[tokio::test]
async fn test_discover_survives_one_failing_term() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_string_contains("for: good term"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(grounded_response(&["https://r.example/ok"])),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let description = "Search terms: \"good term\", \"bad term\"";
    let links = client(&server).discover(description).await.unwrap();
    assert_eq!(links, vec!["https://r.example/ok"]);
}

#[tokio::test]
async fn test_discover_fails_when_every_term_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = client(&server).discover("kettle").await.unwrap_err();
    assert!(matches!(err, ScoutError::Discovery(_)));
}
