use crate::common::{mount_page, mount_redirect, resolver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_follows_redirect_chain() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_redirect(&server, "/r/1", &format!("{}/item/steel-kettle-1700", base)).await;
    mount_page(&server, "/item/steel-kettle-1700").await;

    let resolved = resolver(2).resolve(&format!("{}/r/1", base)).await;
    assert_eq!(resolved, format!("{}/item/steel-kettle-1700", base));
}

#[tokio::test]
async fn test_hop_budget_is_respected() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_redirect(&server, "/a", &format!("{}/b", base)).await;
    mount_redirect(&server, "/b", &format!("{}/c", base)).await;

    // The third URL is reported but never requested
    Mock::given(method("HEAD"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let resolved = resolver(2).resolve(&format!("{}/a", base)).await;
    assert_eq!(resolved, format!("{}/c", base));
}

#[tokio::test]
async fn test_relative_location_is_joined() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_redirect(&server, "/go/42", "/item/42-blue-widget").await;
    mount_page(&server, "/item/42-blue-widget").await;

    let resolved = resolver(2).resolve(&format!("{}/go/42", base)).await;
    assert_eq!(resolved, format!("{}/item/42-blue-widget", base));
}

#[tokio::test]
async fn test_location_on_success_response_is_used() {
    let server = MockServer::start().await;
    let base = server.uri();

    let target = format!("{}/item/9", base);
    Mock::given(method("HEAD"))
        .and(path("/track"))
        .respond_with(ResponseTemplate::new(200).insert_header("location", target.as_str()))
        .mount(&server)
        .await;

    let resolved = resolver(2).resolve(&format!("{}/track", base)).await;
    assert_eq!(resolved, target);
}

#[tokio::test]
async fn test_resolution_is_idempotent_on_final_pages() {
    let server = MockServer::start().await;
    let url = format!("{}/item/final-page-0001", server.uri());

    mount_page(&server, "/item/final-page-0001").await;

    let r = resolver(2);
    let once = r.resolve(&url).await;
    let twice = r.resolve(&once).await;
    assert_eq!(once, url);
    assert_eq!(twice, once);
}

#[tokio::test]
async fn test_redirect_without_location_stops() {
    let server = MockServer::start().await;
    let url = format!("{}/odd", server.uri());

    Mock::given(method("HEAD"))
        .and(path("/odd"))
        .respond_with(ResponseTemplate::new(301))
        .mount(&server)
        .await;

    assert_eq!(resolver(2).resolve(&url).await, url);
}

#[tokio::test]
async fn test_network_failure_returns_original() {
    // Nothing listens on port 1
    let url = "http://127.0.0.1:1/r/unreachable";
    assert_eq!(resolver(2).resolve(url).await, url);
}

#[tokio::test]
async fn test_failure_mid_chain_returns_original() {
    let server = MockServer::start().await;
    let url = format!("{}/r/dead-end", server.uri());

    mount_redirect(&server, "/r/dead-end", "http://127.0.0.1:1/gone").await;

    assert_eq!(resolver(2).resolve(&url).await, url);
}
