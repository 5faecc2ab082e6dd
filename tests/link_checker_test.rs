use luminous_backend::models::Resource;
use luminous_backend::services::LinkChecker;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resource(url: String) -> Resource {
    Resource {
        unit_title: "UNIT 1: Links".to_string(),
        text: url.clone(),
        url,
    }
}

#[tokio::test]
async fn head_success_is_live() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let checker = LinkChecker::new().expect("checker");
    assert!(checker.is_live(&format!("{}/ok", server.uri())).await);
}

#[tokio::test]
async fn rejected_head_falls_back_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let checker = LinkChecker::new().expect("checker");
    assert!(checker.is_live(&format!("{}/no-head", server.uri())).await);
}

#[tokio::test]
async fn missing_page_is_dead() {
    let server = MockServer::start().await;
    Mock::given(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let checker = LinkChecker::new().expect("checker");
    assert!(!checker.is_live(&format!("{}/gone", server.uri())).await);
}

#[tokio::test]
async fn retain_live_keeps_order() {
    let server = MockServer::start().await;
    for live in ["/a", "/c"] {
        Mock::given(path(live))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
    }
    Mock::given(path("/b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let resources = ["/a", "/b", "/c"]
        .iter()
        .map(|p| resource(format!("{}{}", server.uri(), p)))
        .collect();
    let checker = LinkChecker::new().expect("checker");
    let kept = checker.retain_live(resources).await;

    let urls: Vec<_> = kept.iter().map(|r| r.url.trim_start_matches(&server.uri()).to_string()).collect();
    assert_eq!(urls, vec!["/a", "/c"]);
}
