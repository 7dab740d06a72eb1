//! 事件客户端（client）
//!
//! - `EventClient`：握手登记、发布与三种接收方式（阻塞、非阻塞、迭代）；
//! - `EventIter`：基于阻塞接收的惰性无限迭代器，可附加取消令牌；
//! - `EventStream`（`stream` 特性）：移交阻塞线程驱动的异步事件流。
//!
mod event_client;
mod iter;
#[cfg(feature = "stream")]
mod stream;

pub use event_client::EventClient;
pub use iter::EventIter;
#[cfg(feature = "stream")]
pub use stream::EventStream;
