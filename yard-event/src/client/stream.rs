//! 异步事件流（EventStream）
//!
//! 将同步的 `EventClient` 移交给 tokio 阻塞线程驱动 `iter_events`，
//! 经有界 mpsc 通道转为 `'static` 生命周期的事件流，便于在 `tokio::spawn` 中消费：
//! - 令牌取消时后台循环在下一轮阻塞接收结束后退出，事件流随之结束；
//! - 丢弃事件流会通过 `DropGuard` 取消令牌，后台线程随之退出；
//! - 配置的等待时长为零时，后台每轮改用 `IDLE_ROUND_WAIT`，保证取消总能被观察到。
//!
//! 注意：须在 tokio 运行时内调用。
use super::EventClient;
use crate::transport::Transport;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// 等待时长配置为零（一直阻塞）时，后台线程每轮接收的等待时长
pub const IDLE_ROUND_WAIT: Duration = Duration::from_millis(100);

/// 事件流
pub type EventStream = BoxStream<'static, Value>;

impl<T> EventClient<T>
where
    T: Transport + Send + 'static,
{
    /// 转为异步事件流，参数含义与 `iter_events` 相同
    pub fn into_stream(
        self,
        tag: impl Into<String>,
        full: bool,
        token: CancellationToken,
    ) -> EventStream {
        let (tx, rx) = mpsc::channel(self.config().stream_capacity());
        let tag = tag.into();
        let worker_token = token.clone();
        let wait = match self.config().default_wait() {
            wait if wait.is_zero() => IDLE_ROUND_WAIT,
            wait => wait,
        };

        tokio::task::spawn_blocking(move || {
            let mut client = self;
            for event in client
                .iter_events(&tag, full)
                .with_wait(wait)
                .with_cancellation(worker_token)
            {
                if tx.blocking_send(event).is_err() {
                    break;
                }
            }
            tracing::debug!(yard = %client.yard(), %tag, "event stream worker stopped");
        });

        let guard = token.drop_guard();
        ReceiverStream::new(rx)
            .map(move |event| {
                let _guard = &guard;
                event
            })
            .boxed()
    }
}
