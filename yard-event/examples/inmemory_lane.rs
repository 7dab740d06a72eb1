//! 内存传输上的完整事件流转示例
//!
//! 路由器在后台线程中周期服务；工作端发布事件并派生作业错误事件，
//! 控制端通过异步事件流消费。
//!
//! 运行：`RUST_LOG=debug cargo run -p yard-event --example inmemory_lane`
use anyhow::Result;
use futures_util::StreamExt;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use yard_event::transport::InMemoryLane;
use yard_event::{EventClient, EventConfig, EventRouter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let lane = InMemoryLane::new();
    let sock_dir = std::env::temp_dir().join("yard-event-demo");
    let config = |node: &str| {
        EventConfig::builder()
            .node(node)
            .sock_dir(sock_dir.clone())
            .default_wait_ms(200)
            .build()
            .with_sub_event_funs(["state.sls"])
    };

    let mut router = EventRouter::open(&lane, &sock_dir)?;
    let stop = Arc::new(AtomicBool::new(false));
    let router_stop = stop.clone();
    let router_task = std::thread::spawn(move || {
        while !router_stop.load(Ordering::Relaxed) {
            if let Err(e) = router.service() {
                tracing::warn!(error = %e, "router service failed");
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    });

    let controller = EventClient::connect(&lane, config("master"))?;
    let mut worker = EventClient::connect(&lane, config("minion"))?;

    let token = CancellationToken::new();
    let mut events = controller.into_stream("", true, token.clone());

    tokio::time::sleep(Duration::from_millis(50)).await;
    worker.fire_event(json!({"id": "web1", "status": "up"}), "minion/start")?;
    let outcome = worker.fire_ret_load(&json!({
        "retcode": 1,
        "fun": "state.sls",
        "jid": yard_event::jid::gen_jid(),
        "id": "web1",
        "user": "root",
        "return": {
            "file_|-motd_|-/etc/motd_|-managed": {"result": false, "comment": "permission denied"}
        }
    }));
    tracing::info!(?outcome, "return load processed");

    for _ in 0..3 {
        match tokio::time::timeout(Duration::from_secs(2), events.next()).await {
            Ok(Some(event)) => println!("{}  {}", event["tag"], event["data"]),
            Ok(None) | Err(_) => break,
        }
    }

    token.cancel();
    stop.store(true, Ordering::Relaxed);
    let _ = router_task.join();
    Ok(())
}
