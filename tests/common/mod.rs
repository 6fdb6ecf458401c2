use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use tagwatch::server::{router, AppState};
use tagwatch::Config;

pub const TOKEN: &str = "test-app-token";

pub const NGINX_PUSH: &str = r#"{
    "action": "push",
    "repository": { "name": "nginx", "repo_name": "library/nginx" },
    "target": { "tag": "1.25.3-alpine", "date": "2023-12-01T14:30:00Z" }
}"#;

/// Build a validated config pointing at `gotify_url` and watching `images`.
#[allow(dead_code)]
pub fn test_config(gotify_url: &str, images: &[&str]) -> Config {
    let mut config = Config::default();
    config.gotify.url = gotify_url.to_string();
    config.gotify.token = Some(TOKEN.to_string());
    config.gotify.timeout_seconds = 5;
    config.watch.images = images.iter().map(|s| s.to_string()).collect();
    config.validate().expect("test config should be valid");
    config
}

/// Build the application router for a config.
#[allow(dead_code)]
pub fn test_app(config: &Config) -> Router {
    router(AppState::from_config(config).expect("app state"))
}

/// POST a webhook body and return status plus body text.
#[allow(dead_code)]
pub async fn post_webhook(app: Router, body: &str) -> (u16, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/docker-webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    read_response(response).await
}

/// Collect a response into status plus body text.
#[allow(dead_code)]
pub async fn read_response(response: Response<Body>) -> (u16, String) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, String::from_utf8_lossy(&bytes).to_string())
}

/// A base URL on which nothing is listening.
#[allow(dead_code)]
pub fn unreachable_url() -> String {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind")
        .local_addr()
        .expect("addr");
    format!("http://{}", addr)
}
