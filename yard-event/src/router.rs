//! 事件路由器（EventRouter）
//!
//! 目录作用域内的固定端点（`master.0`），负责：
//! - 接收 `event_req` 登记，记录订阅端点；
//! - 接收 `event_fire` 发布，以 `{route, event: {tag, data}}` 形态转发给所有订阅者；
//! - 转发失败（端点已关闭）的订阅者被移出订阅表。
//!
//! 与客户端相同，路由器也是单线程的：调用方周期性调用 `service` 驱动收发。
//!
use crate::envelope::{Delivery, Event, EventMessage};
use crate::error::EventResult as Result;
use crate::transport::{
    Connector, EVENT_FIRE, EVENT_REQ, ROUTER_PREFIX, ROUTER_YID, Route, RouteHop, Transport, Yard,
};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

pub struct EventRouter<T>
where
    T: Transport,
{
    stack: T,
    subscribers: BTreeSet<String>,
}

impl<T> EventRouter<T>
where
    T: Transport,
{
    /// 在指定目录下打开路由器端点
    pub fn open<C>(connector: &C, sock_dir: impl AsRef<Path>) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        let stack = connector.open(ROUTER_YID, ROUTER_PREFIX, sock_dir.as_ref())?;
        tracing::debug!(yard = %stack.yard(), "event router opened");
        Ok(Self {
            stack,
            subscribers: BTreeSet::new(),
        })
    }

    pub fn yard(&self) -> &Yard {
        self.stack.yard()
    }

    /// 已登记的订阅端点名称（有序）
    pub fn subscribers(&self) -> impl Iterator<Item = &str> {
        self.subscribers.iter().map(String::as_str)
    }

    /// 处理一轮收发，返回本轮成功投递给订阅者的消息数
    pub fn service(&mut self) -> Result<usize> {
        let stale = self.stack.service_all()?;
        self.prune(&stale);

        let mut relayed = 0;
        while let Some(msg) = self.stack.rx_msgs().pop_front() {
            let Some(route) = Route::of(&msg) else {
                tracing::trace!(yard = %self.stack.yard(), "message without route dropped");
                continue;
            };
            match route.dst.mailbox.as_deref() {
                Some(EVENT_REQ) => self.register(route.src.yard),
                Some(EVENT_FIRE) => relayed += self.relay(msg)?,
                other => {
                    tracing::trace!(mailbox = ?other, src = %route.src.yard, "unknown mailbox, message dropped");
                }
            }
        }

        let undelivered = self.stack.service_all()?;
        self.prune(&undelivered);
        Ok(relayed.saturating_sub(undelivered.len()))
    }

    fn prune(&mut self, gone: &[String]) {
        for name in gone {
            if self.subscribers.remove(name) {
                tracing::debug!(router = %self.stack.yard(), subscriber = %name, "event subscriber gone, removed");
            }
        }
    }

    fn register(&mut self, name: String) {
        let yard = Yard::with_name(name.clone(), self.stack.yard().dirpath());
        self.stack.add_remote(yard);
        if self.subscribers.insert(name) {
            tracing::debug!(router = %self.stack.yard(), subscribers = self.subscribers.len(), "event subscriber registered");
        }
    }

    fn relay(&mut self, msg: Value) -> Result<usize> {
        let fired: EventMessage = match serde_json::from_value(msg) {
            Ok(fired) => fired,
            Err(e) => {
                tracing::trace!(error = %e, "malformed fire message dropped");
                return Ok(0);
            }
        };

        let event = Event {
            tag: fired.tag,
            data: fired.data,
        };
        let src = RouteHop::new(self.stack.yard().name(), None);
        let mut relayed = 0;
        for subscriber in &self.subscribers {
            let delivery = Delivery {
                route: Route::new(RouteHop::new(subscriber.as_str(), None), src.clone()),
                event: event.clone(),
            };
            self.stack
                .transmit(serde_json::to_value(&delivery)?, Some(subscriber.as_str()))?;
            relayed += 1;
        }
        Ok(relayed)
    }
}
