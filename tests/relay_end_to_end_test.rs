use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use matrix_relay::core::Credentials;
use matrix_relay::{
    create_router, create_statistics_router, AppState, AuthState, DownstreamTokenCache,
    MatrixPipeline, RelayClient, StatisticsState, TokenService,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

fn account(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

/// 在隨機埠啟動統計服務，回傳其 base URL
async fn spawn_statistics_service(secret: &str, login: Credentials) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_statistics_router(StatisticsState {
        auth: AuthState::new(secret, login),
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{}", addr))
}

async fn rotate(app: axum::Router, token: &str, data: Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri("/api/rotate")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(json!({ "data": data }).to_string()))?;

    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn relay_and_statistics_service_cooperate() -> Result<()> {
    let downstream =
        spawn_statistics_service("downstream-secret", account("relay", "relay-pass")).await?;

    let relay = RelayClient::new(downstream, Duration::from_secs(5))?;
    let pipeline = MatrixPipeline::new(relay, account("relay", "relay-pass"));
    let state = AppState::new(
        AuthState::new("front-secret", account("admin", "password")),
        pipeline,
    );
    let token = TokenService::new(b"front-secret").issue("admin")?;

    let (status, body) = rotate(create_router(state), &token, json!([[1, 0], [0, 1]])).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rotatedMatrix"], json!([[0, 1], [1, 0]]));

    let stats = &body["statistics"];
    assert_eq!(stats["rotatedMatrix"], json!([[0, 1], [1, 0]]));
    assert_eq!(stats["processedBy"], "statistics-service");
    assert_eq!(stats["user"], "relay");
    assert_eq!(stats["statistics"]["isDiagonal"], true);
    assert_eq!(stats["statistics"]["maxValue"], 1);
    assert_eq!(stats["statistics"]["minValue"], 0);
    assert_eq!(stats["statistics"]["totalSum"], 2);
    assert_eq!(stats["statistics"]["elementCount"], 4);
    assert_eq!(
        stats["statistics"]["dimensions"],
        json!({ "rows": 2, "columns": 2 })
    );

    Ok(())
}

#[tokio::test]
async fn wrong_service_account_fails_the_rotation() -> Result<()> {
    let downstream =
        spawn_statistics_service("downstream-secret", account("relay", "relay-pass")).await?;

    let relay = RelayClient::new(downstream, Duration::from_secs(5))?;
    let pipeline = MatrixPipeline::new(relay, account("relay", "wrong"));
    let state = AppState::new(
        AuthState::new("front-secret", account("admin", "password")),
        pipeline,
    );
    let token = TokenService::new(b"front-secret").issue("admin")?;

    let (status, body) = rotate(create_router(state), &token, json!([[5]])).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error processing matrix");

    Ok(())
}

#[tokio::test]
async fn cached_downstream_token_serves_repeated_rotations() -> Result<()> {
    let downstream =
        spawn_statistics_service("downstream-secret", account("relay", "relay-pass")).await?;

    let relay = RelayClient::new(downstream, Duration::from_secs(5))?;
    let pipeline = MatrixPipeline::new(relay, account("relay", "relay-pass"))
        .with_token_cache(DownstreamTokenCache::new(Duration::from_secs(60)));
    let app = create_router(AppState::new(
        AuthState::new("front-secret", account("admin", "password")),
        pipeline,
    ));
    let token = TokenService::new(b"front-secret").issue("admin")?;

    for data in [json!([[1, 2, 3]]), json!([[4], [5]])] {
        let (status, _) = rotate(app.clone(), &token, data).await?;
        assert_eq!(status, StatusCode::OK);
    }

    Ok(())
}
