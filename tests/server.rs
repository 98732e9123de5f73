//! Serving over a real socket, with graceful shutdown.

use std::time::Duration;

use tokio::net::TcpListener;

use edge_gateway::{HttpServer, Shutdown};

mod common;
use common::*;

#[tokio::test]
async fn test_serves_and_shuts_down() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(test_config(), test_registry());
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .expect("Gateway unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let res = client
        .post(format!("http://{addr}/functions/v1/hello-world"))
        .bearer_auth(valid_token())
        .json(&serde_json::json!({ "name": "Linus" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Hello, Linus! This is an Edge Function.");

    let res = client
        .get(format!("http://{addr}/functions/v1/hello-world"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}
