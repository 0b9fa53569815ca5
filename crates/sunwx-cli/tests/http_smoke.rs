use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use sunwx_config::AppConfig;
use tower::ServiceExt;

#[tokio::test]
async fn health_ready_metrics_endpoints() {
    let dashboard = sunwx_cli::Dashboard::from_config(&AppConfig::default()).unwrap();
    let (app, state) = sunwx_cli::build_app(dashboard).unwrap();

    // /healthz returns 200 and increments a counter
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // /readyz initially 503
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    sunwx_cli::set_ready(&state, true);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // /metrics returns prometheus text and contains our counter
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ct = res.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/plain"));
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("sunwx_requests_total"));
}

#[tokio::test]
async fn unconfigured_snapshot_has_null_parts() {
    let dashboard = sunwx_cli::Dashboard::from_config(&AppConfig::default()).unwrap();
    let (app, _state) = sunwx_cli::build_app(dashboard).unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/snapshot")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["solar"].is_null());
    assert!(json["weather"].is_null());
    assert!(json["lastUpdated"].is_string());
}
