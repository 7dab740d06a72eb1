use super::EventClient;
use crate::transport::Transport;
use serde_json::Value;
use std::iter::FusedIterator;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// 持续监听事件的惰性迭代器
///
/// 反复调用 `EventClient::get_event` 并跳过超时的空结果，因此不会自行结束；
/// 调用方停止迭代（如 `take(n)`）即可结束监听。
/// 附加 `CancellationToken` 后，令牌取消时迭代结束（在两次阻塞接收之间检查）。
pub struct EventIter<'a, T>
where
    T: Transport,
{
    client: &'a mut EventClient<T>,
    tag: String,
    full: bool,
    wait: Duration,
    cancel: Option<CancellationToken>,
}

impl<'a, T> EventIter<'a, T>
where
    T: Transport,
{
    pub(crate) fn new(client: &'a mut EventClient<T>, tag: &str, full: bool, wait: Duration) -> Self {
        Self {
            client,
            tag: tag.to_string(),
            full,
            wait,
            cancel: None,
        }
    }

    /// 附加取消令牌
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 调整每轮阻塞接收的等待时长（零表示一直阻塞，此时取消只在收到事件后生效）
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl<T> Iterator for EventIter<'_, T>
where
    T: Transport,
{
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        while !self.is_cancelled() {
            if let Some(event) = self.client.get_event(self.wait, &self.tag, self.full) {
                return Some(event);
            }
        }
        None
    }
}

impl<T> FusedIterator for EventIter<'_, T> where T: Transport {}
