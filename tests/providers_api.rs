use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tastebud::{
    app,
    auth::repo::MemoryUserStore,
    config::{AppConfig, JwtConfig, ProviderConfig},
    state::AppState,
};

/// A canned stand-in for both upstream providers.
async fn spawn_stub() -> String {
    let stub = Router::new()
        .route(
            "/recipes/complexSearch",
            get(|| async { Json(json!({ "results": [{ "id": 716429, "title": "Pasta" }], "totalResults": 1 })) }),
        )
        .route(
            "/recipes/402/information",
            get(|| async {
                (
                    StatusCode::PAYMENT_REQUIRED,
                    Json(json!({ "status": "failure", "message": "quota exhausted" })),
                )
            }),
        )
        .route(
            "/api/json/v1/1/search.php",
            get(|| async { Json(json!({ "drinks": [{ "idDrink": "11007", "strDrink": "Margarita" }] })) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, stub).await.expect("serve stub");
    });
    format!("http://{addr}")
}

async fn spawn_app_against(stub_base: &str) -> String {
    let config = Arc::new(AppConfig {
        database_url: "postgres://unused".into(),
        db_acquire_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            ttl_days: 7,
        },
        providers: ProviderConfig {
            spoonacular_api_key: "test-key".into(),
            spoonacular_base_url: stub_base.to_string(),
            cocktaildb_api_key: "1".into(),
            cocktaildb_base_url: stub_base.to_string(),
            http_timeout_secs: 2,
        },
    });
    let state = AppState::from_parts(config, Arc::new(MemoryUserStore::default()))
        .expect("state wiring");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind app listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app::build_app(state))
            .await
            .expect("serve app");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn recipe_search_passes_the_upstream_body_through() {
    let stub = spawn_stub().await;
    let base = spawn_app_against(&stub).await;

    let resp = reqwest::get(format!("{base}/api/recipes/search?query=pasta"))
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["results"][0]["title"], json!("Pasta"));
    assert_eq!(body["totalResults"], json!(1));
}

#[tokio::test]
async fn upstream_failure_is_classified_by_status() {
    let stub = spawn_stub().await;
    let base = spawn_app_against(&stub).await;

    let resp = reqwest::get(format!("{base}/api/recipes/402"))
        .await
        .expect("request");
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"]["code"], json!("SPOONACULAR_402"));
    assert_eq!(body["error"]["status"], json!(402));
    assert_eq!(body["error"]["message"], json!("quota exhausted"));
}

#[tokio::test]
async fn cocktail_search_passes_the_upstream_body_through() {
    let stub = spawn_stub().await;
    let base = spawn_app_against(&stub).await;

    let resp = reqwest::get(format!("{base}/api/cocktails/search?name=margarita"))
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["drinks"][0]["strDrink"], json!("Margarita"));
}

#[tokio::test]
async fn unreachable_upstream_is_a_bad_gateway_not_a_crash() {
    // Nothing listens on this base URL.
    let base = spawn_app_against("http://127.0.0.1:9").await;

    let resp = reqwest::get(format!("{base}/api/recipes/search?query=pasta"))
        .await
        .expect("request");
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["error"], json!("Upstream provider unavailable"));
}
