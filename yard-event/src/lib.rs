//! 事件总线客户端（yard-event）
//!
//! 在配置管理系统中，控制进程与大量工作进程之间通过本地进程间传输
//! 发布/消费带标签的状态与结果事件。本 crate 提供：
//! - 传输协议（`transport`）：端点标识、路由、最小能力接口与内存实现；
//! - 事件客户端（`client`）：握手登记、发布、阻塞/非阻塞/迭代接收与异步事件流；
//! - 作业返回派生事件（`ret_load`）：将失败子单元转为兼容事件与结构化错误事件；
//! - 事件路由器（`router`）：登记订阅者并转发发布的事件。
//!
//! 语义为尽力而为：不保证跨发布者顺序、不持久化、不提供恰好一次投递。
//!
//! 典型用法：
//! 1. 构造 `EventConfig`，选择一个 `Connector`（如 `InMemoryLane`）；
//! 2. 在同一目录下打开 `EventRouter`，并周期调用 `service`；
//! 3. `EventClient::connect` 后通过 `fire_event` 发布、`get_event`/`iter_events` 接收；
//! 4. 作业完成时调用 `fire_ret_load` 派生错误事件。
//!
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod jid;
pub mod ret_load;
pub mod router;
pub mod tag;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{EventClient, EventIter};
#[cfg(feature = "stream")]
pub use client::EventStream;
pub use config::EventConfig;
pub use error::{EventError, EventResult};
pub use ret_load::RetLoadOutcome;
pub use router::EventRouter;
