//! 传输子系统（transport）
//!
//! 提供端点标识、路由与传输协议，不绑定具体的套接字实现：
//! - `Yard`：目录作用域内的命名端点；
//! - `Route` / `RouteHop`：附着在消息上的源/目的地址与信箱；
//! - `Transport` / `Connector`：事件客户端依赖的最小能力接口；
//! - `InMemoryLane`：同进程内存实现，用于测试与示例。
//!
mod inmemory;
mod route;
mod stack;
mod yard;

pub use inmemory::{InMemoryLane, InMemoryStack};
pub use route::{EVENT_FIRE, EVENT_REQ, Route, RouteHop};
pub use stack::{Connector, Transport};
pub use yard::{ROUTER_PREFIX, ROUTER_YID, Yard};
