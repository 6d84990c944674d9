//! Client/server round trip over a real TCP socket.

use std::sync::Arc;
use std::time::Duration;

use docster_core::http::{ClientError, DocsterClient};
use docster_core::{Daemon, LogCollector};
use docster_test_utils::{TestConfigBuilder, TestProject};
use tokio::net::TcpListener;

#[tokio::test]
async fn test_client_server_round_trip() {
    docster_test_utils::tracing_setup::init_test_tracing();

    let project = TestProject::new()
        .file("src/api.ts", "export async function fetchItems() {\n  return [];\n}\n")
        .file("src/view.ts", "fetchItems().then(render);\n");
    let config = TestConfigBuilder::new()
        .listen_addr("localhost")
        .log_level("debug")
        .build();

    let collector = LogCollector::new(50);
    let daemon = Arc::new(Daemon::new(config, project.path(), collector.reader()));
    daemon.initial_crawl().await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = {
        let daemon = Arc::clone(&daemon);
        tokio::spawn(async move { daemon.serve(listener).await })
    };

    let client = DocsterClient::new(format!("http://{addr}"));

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");

    let all = client.all_content().await.unwrap();
    assert_eq!(all.file_count, 2);
    assert!(all.content.contains("// src/api.ts\n```ts\n"));

    let found = client.search("fetchItems").await.unwrap();
    assert_eq!(found.match_count, 2);
    assert!(found.content.contains("(Code block for 'fetchItems')"));
    assert_eq!(found.timestamp, all.timestamp);

    let missing = client.search("").await;
    assert!(matches!(
        missing,
        Err(ClientError::Server { status: 400, .. })
    ));

    let project = project.file("src/extra.ts", "let extra;\n");
    let rerun = client.rerun().await.unwrap();
    assert_eq!(rerun.file_count, 3);

    let remote_config = client.config().await.unwrap();
    assert_eq!(remote_config.logging.level, "debug");
    assert_eq!(remote_config.server.listen_addr, "localhost");

    let logs = client.logs(None).await.unwrap();
    assert_eq!(logs.total, logs.entries.len());

    let newest = client.logs(Some(1)).await.unwrap();
    assert!(newest.entries.len() <= 1);
    assert!(newest.total >= newest.entries.len());

    let stop = client.stop().await.unwrap();
    assert!(stop.acknowledged);

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after /stop")
        .unwrap();
    assert!(result.is_ok());
    drop(project);
}
