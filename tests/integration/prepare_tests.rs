use crate::common::{mount_page, mount_redirect, preparer};
use price_scout::LinkDisposition;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_batch_is_capped_before_resolution() {
    let server = MockServer::start().await;
    let base = server.uri();

    for i in 0..5 {
        mount_redirect(
            &server,
            &format!("/r/{}", i),
            &format!("{}/item/widget-{}-deluxe", base, i),
        )
        .await;
    }
    for i in 5..8 {
        Mock::given(method("HEAD"))
            .and(path(format!("/r/{}", i)))
            .respond_with(ResponseTemplate::new(302))
            .expect(0)
            .mount(&server)
            .await;
    }
    Mock::given(method("HEAD"))
        .and(path_regex(r"^/item/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let raw: Vec<String> = (0..8).map(|i| format!("{}/r/{}", base, i)).collect();
    let prepared = preparer(5).prepare_detailed(&raw).await;

    let expected: Vec<String> = (0..5)
        .map(|i| format!("{}/item/widget-{}-deluxe", base, i))
        .collect();
    assert_eq!(prepared.links, expected);
    assert_eq!(prepared.stats.received, 8);
    assert_eq!(prepared.stats.truncated, 3);
    assert_eq!(prepared.stats.considered, 5);
    assert_eq!(prepared.stats.accepted, 5);
}

#[tokio::test]
async fn test_drops_unresolved_search_and_collection_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_redirect(&server, "/r/product", &format!("{}/item/steel-kettle-1700", base)).await;
    mount_redirect(&server, "/r/search", &format!("{}/search?q=kettle", base)).await;
    mount_redirect(&server, "/r/category", &format!("{}/category/kettles", base)).await;
    mount_redirect(&server, "/r/blocked", &format!("{}/blocked?from=r", base)).await;
    mount_page(&server, "/r/plain").await;
    mount_page(&server, "/item/steel-kettle-1700").await;
    mount_page(&server, "/search").await;
    mount_page(&server, "/category/kettles").await;
    mount_page(&server, "/blocked").await;

    let raw = vec![
        format!("{}/r/search", base),
        format!("{}/r/plain", base),
        format!("{}/r/product", base),
        format!("{}/r/category", base),
        format!("{}/r/blocked", base),
    ];
    let prepared = preparer(6).prepare_detailed(&raw).await;

    assert_eq!(
        prepared.links,
        vec![format!("{}/item/steel-kettle-1700", base)]
    );

    let dispositions: Vec<LinkDisposition> =
        prepared.outcomes.iter().map(|o| o.disposition).collect();
    assert_eq!(
        dispositions,
        vec![
            LinkDisposition::SearchPage,
            LinkDisposition::Unresolved,
            LinkDisposition::Accepted,
            LinkDisposition::CollectionPage,
            LinkDisposition::Invalid,
        ]
    );
    assert_eq!(prepared.stats.dropped(), 4);
}

#[tokio::test]
async fn test_same_destination_is_kept_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_redirect(
        &server,
        "/r/a",
        &format!("{}/item/blue-widget-0042?utm_source=ads", base),
    )
    .await;
    mount_redirect(&server, "/r/b", &format!("{}/item/blue-widget-0042", base)).await;
    mount_page(&server, "/item/blue-widget-0042").await;

    let raw = vec![format!("{}/r/a", base), format!("{}/r/b", base)];
    let prepared = preparer(6).prepare_detailed(&raw).await;

    assert_eq!(prepared.links.len(), 1);
    assert_eq!(prepared.outcomes[1].disposition, LinkDisposition::Duplicate);
}

#[tokio::test]
async fn test_repeated_inputs_resolve_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/r/once"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/item/only-once-0001", base).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/item/only-once-0001").await;

    let link = format!("{}/r/once", base);
    let prepared = preparer(6)
        .prepare_detailed(&[link.clone(), link.clone(), link])
        .await;

    assert_eq!(prepared.links.len(), 1);
    assert_eq!(prepared.stats.repeated_inputs, 2);
    assert_eq!(prepared.stats.considered, 1);
}

#[tokio::test]
async fn test_cap_counts_unique_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_redirect(&server, "/r/a", &format!("{}/item/widget-a-deluxe", base)).await;
    mount_redirect(&server, "/r/b", &format!("{}/item/widget-b-deluxe", base)).await;
    Mock::given(method("HEAD"))
        .and(path("/r/c"))
        .respond_with(ResponseTemplate::new(302))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path_regex(r"^/item/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let a = format!("{}/r/a", base);
    let raw = vec![
        a.clone(),
        a,
        format!("{}/r/b", base),
        format!("{}/r/c", base),
    ];
    let prepared = preparer(2).prepare_detailed(&raw).await;

    assert_eq!(prepared.stats.considered, 2);
    assert_eq!(prepared.links.len(), 2);
    assert!(prepared.links[1].ends_with("/item/widget-b-deluxe"));
}

#[tokio::test]
async fn test_nothing_survives_is_empty_not_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/r/plain").await;

    let links = preparer(6).prepare(&[format!("{}/r/plain", base)]).await;
    assert!(links.is_empty());
}
