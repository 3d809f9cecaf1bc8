use snippetbox::{
    AppConfig, AppState, MockRepository, SnippetState, UserState, create_router,
    repository::SnippetRepository,
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;

pub struct TestApp {
    pub address: String,
    pub repo: Arc<MockRepository>,
}

/// Serves the full router on an ephemeral port, backed by in-memory stores.
async fn spawn_app() -> TestApp {
    let repo = Arc::new(MockRepository::new());
    let config = AppConfig {
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("ui/static"),
        ..AppConfig::default()
    };

    let state = AppState {
        snippets: repo.clone() as SnippetState,
        users: repo.clone() as UserState,
        config,
    };
    let router = create_router(state, MemoryStore::default());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp { address, repo }
}

#[tokio::test]
async fn test_ping() {
    let app = spawn_app().await;
    let response = reqwest::get(format!("{}/ping", app.address))
        .await
        .expect("req fail");

    assert!(response.status().is_success());
    assert_eq!(response.headers()["x-frame-options"], "deny");
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_static_files_are_served() {
    let app = spawn_app().await;
    let response = reqwest::get(format!("{}/static/css/main.css", app.address))
        .await
        .expect("req fail");

    assert_eq!(response.status(), 200);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/css")
    );
}

#[tokio::test]
async fn test_missing_static_file_is_not_found() {
    let app = spawn_app().await;
    let response = reqwest::get(format!("{}/static/nope.js", app.address))
        .await
        .expect("req fail");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_home_page_over_http() {
    let app = spawn_app().await;
    app.repo
        .insert("Served over the wire", "content", 365)
        .await
        .unwrap();

    let response = reqwest::get(format!("{}/", app.address))
        .await
        .expect("req fail");

    assert_eq!(response.status(), 200);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(response.headers().contains_key("set-cookie"));
    let body = response.text().await.unwrap();
    assert!(body.contains("Served over the wire"));
}

#[tokio::test]
async fn test_linked_static_assets_exist() {
    let app = spawn_app().await;
    let body = reqwest::get(format!("{}/", app.address))
        .await
        .expect("req fail")
        .text()
        .await
        .unwrap();

    let assets: Vec<&str> = body
        .split("href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter(|href| href.starts_with("/static/"))
        .collect();
    assert!(!assets.is_empty());

    for asset in assets {
        let response = reqwest::get(format!("{}{}", app.address, asset))
            .await
            .expect("req fail");
        assert_eq!(response.status(), 200, "{asset} is linked but not served");
    }
}
