use super::EventIter;
use crate::config::EventConfig;
use crate::envelope::{EventMessage, EventView, RegisterLoad, RegisterMessage};
use crate::error::{EventError, EventResult as Result};
use crate::jid::gen_jid;
use crate::transport::{Connector, EVENT_FIRE, EVENT_REQ, Route, RouteHop, Transport, Yard};
use serde_json::Value;
use std::time::{Duration, Instant};

/// 事件客户端：持有一个传输端点，并以路由器端点为中转发布/接收事件
///
/// 单实例单线程使用（所有操作均需 `&mut self`）；同一进程可以有多个实例，
/// 各自拥有独立的端点与待处理队列。
pub struct EventClient<T>
where
    T: Transport,
{
    config: EventConfig,
    stack: T,
    router_yard: Yard,
    yid: String,
}

impl<T> EventClient<T>
where
    T: Transport,
{
    /// 创建端点并向路由器登记
    ///
    /// 登记是“发出即忘”的：路由器不可达时不会报错，之后的接收只是永远等不到事件。
    pub fn connect<C>(connector: &C, config: EventConfig) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        config.validate()?;
        let yid = gen_jid();
        let stack = connector.open(&yid, config.node(), config.sock_dir())?;
        let router_yard = Yard::router(config.sock_dir());

        let mut client = Self {
            config,
            stack,
            router_yard,
            yid,
        };
        client.stack.add_remote(client.router_yard.clone());
        match client.register() {
            Ok(()) => tracing::debug!(yard = %client.stack.yard(), "event registration sent"),
            Err(e) => tracing::debug!(yard = %client.stack.yard(), error = %e, "event registration not sent"),
        }
        Ok(client)
    }

    fn register(&mut self) -> Result<()> {
        let msg = RegisterMessage {
            route: Route::new(
                RouteHop::new(self.router_yard.name(), Some(EVENT_REQ)),
                RouteHop::new(self.stack.yard().name(), None),
            ),
            load: RegisterLoad {
                yid: self.yid.clone(),
                dirpath: self.config.sock_dir().to_path_buf(),
            },
        };
        let msg = serde_json::to_value(&msg)?;
        self.stack.transmit(msg, Some(self.router_yard.name()))?;
        self.stack.service_all()?;
        Ok(())
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    /// 会话标识
    pub fn yid(&self) -> &str {
        &self.yid
    }

    pub fn yard(&self) -> &Yard {
        self.stack.yard()
    }

    pub fn router_yard(&self) -> &Yard {
        &self.router_yard
    }

    pub fn transport(&self) -> &T {
        &self.stack
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.stack
    }

    fn service(&mut self) {
        if let Err(e) = self.stack.service_all() {
            tracing::debug!(yard = %self.stack.yard(), error = %e, "transport service failed");
        }
    }

    /// 获取一条标签以 `tag` 开头的事件
    ///
    /// 队列为空时最多等待 `wait`，超时返回 `None`；`wait` 为零表示一直阻塞。
    /// `full` 为真时返回完整的 `{tag, data}`，否则只返回 `data`。
    ///
    /// 出队即丢弃：畸形事件与标签不匹配的事件都会被直接扔掉，不会放回队列。
    pub fn get_event(&mut self, wait: Duration, tag: &str, full: bool) -> Option<Value> {
        let start = Instant::now();
        loop {
            self.service();
            match self.stack.rx_msgs().pop_front() {
                Some(msg) => {
                    let view = EventView::nested(&msg);
                    if view.is_malformed() {
                        tracing::trace!(yard = %self.stack.yard(), "malformed event discarded");
                    } else if !view.tag().starts_with(tag) {
                        tracing::trace!(event_tag = view.tag(), wanted = tag, "non-matching event discarded");
                    } else if full {
                        return Some(view.to_value());
                    } else {
                        return Some(view.data());
                    }
                }
                None => std::thread::yield_now(),
            }

            if !wait.is_zero() && start.elapsed() > wait {
                return None;
            }
        }
    }

    /// 非阻塞地取出一条原始消息（包含路由，不展开为 `data`）
    ///
    /// 只服务一次传输并出队一次：队列为空或消息畸形时返回 `None`。
    /// 与 `get_event` 的返回形态不同，这是为兼容旧调用方而保留的。
    pub fn get_event_noblock(&mut self) -> Option<Value> {
        self.service();
        let msg = self.stack.rx_msgs().pop_front()?;
        if EventView::nested_or_flat(&msg).is_malformed() {
            tracing::trace!(yard = %self.stack.yard(), "malformed event discarded");
            return None;
        }
        Some(msg)
    }

    /// 持续监听事件的惰性迭代器，每轮使用配置中的默认等待时长
    pub fn iter_events(&mut self, tag: &str, full: bool) -> EventIter<'_, T> {
        let wait = self.config.default_wait();
        EventIter::new(self, tag, full, wait)
    }

    /// 发布一条事件，`data` 必须是映射（JSON 对象），`tag` 不可为空
    ///
    /// 旧接口中的 `timeout` 参数从未生效，这里不再提供；发布只排队并服务一次传输，不等待投递确认。
    pub fn fire_event(&mut self, data: Value, tag: &str) -> Result<()> {
        if tag.is_empty() {
            return Err(EventError::invalid_argument("empty tag"));
        }
        if !data.is_object() {
            return Err(EventError::invalid_argument(format!(
                "mapping expected, not {data}"
            )));
        }

        let msg = EventMessage {
            route: Route::new(
                RouteHop::new(self.router_yard.name(), Some(EVENT_FIRE)),
                RouteHop::new(self.stack.yard().name(), None),
            ),
            tag: tag.to_string(),
            data,
        };
        self.stack.transmit(serde_json::to_value(&msg)?, None)?;
        self.stack.service_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeConnector, config, delivered};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn connect_registers_with_router() {
        let fake = FakeConnector::default();
        let client = EventClient::connect(&fake, config()).unwrap();

        let sent = fake.sent();
        assert_eq!(sent.len(), 1);
        let (msg, dst) = &sent[0];
        assert_eq!(dst.as_deref(), Some("master.0"));
        assert_eq!(msg["route"]["dst"]["mailbox"], "event_req");
        assert_eq!(msg["route"]["src"]["yard"], client.yard().name());
        assert_eq!(msg["load"]["yid"], client.yid());
        assert_eq!(msg["load"]["dirpath"], "/tmp/yard-test");
        assert_eq!(fake.services(), 1);
        assert_eq!(client.transport().remotes, vec![Yard::router("/tmp/yard-test")]);
    }

    #[test]
    fn fire_event_rejects_empty_tag() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();

        for data in [json!({}), json!({"k": 1}), json!([1]), json!(null)] {
            let err = client.fire_event(data, "").unwrap_err();
            assert!(err.is_invalid_argument());
        }
        assert_eq!(fake.sent().len(), 1);
    }

    #[test]
    fn fire_event_rejects_non_mapping_data() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();

        for data in [json!([1, 2]), json!("text"), json!(3), json!(true), json!(null)] {
            let err = client.fire_event(data, "foo.bar").unwrap_err();
            assert!(err.is_invalid_argument());
        }
        assert_eq!(fake.sent().len(), 1);
    }

    #[test]
    fn fire_event_routes_to_event_fire() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();

        client.fire_event(json!({"k": 1}), "foo.bar").unwrap();

        let sent = fake.sent();
        let (msg, dst) = sent.last().unwrap();
        assert_eq!(*dst, None);
        assert_eq!(msg["route"]["dst"], json!({"yard": "master.0", "mailbox": "event_fire"}));
        assert_eq!(msg["tag"], "foo.bar");
        assert_eq!(msg["data"], json!({"k": 1}));
        assert_eq!(fake.services(), 2);
    }

    #[test]
    fn get_event_filters_by_prefix_in_arrival_order() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();
        fake.push_inbound(delivered("foo.bar", json!({"n": 1})));
        fake.push_inbound(delivered("other", json!({"n": 2})));
        fake.push_inbound(delivered("foo.baz", json!({"n": 3})));

        let wait = Duration::from_millis(50);
        assert_eq!(client.get_event(wait, "foo", false), Some(json!({"n": 1})));
        assert_eq!(client.get_event(wait, "foo", false), Some(json!({"n": 3})));
        assert_eq!(client.get_event(wait, "foo", false), None);
    }

    #[test]
    fn get_event_full_returns_tag_and_data() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();
        fake.push_inbound(delivered("foo.bar", json!({"n": 1})));

        let event = client.get_event(Duration::from_millis(50), "", true).unwrap();
        assert_eq!(event, json!({"tag": "foo.bar", "data": {"n": 1}}));
    }

    #[test]
    fn get_event_discards_malformed() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();
        fake.push_inbound(json!({"route": {}}));
        fake.push_inbound(json!({"event": {}}));
        fake.push_inbound(json!("garbage"));
        fake.push_inbound(delivered("foo", json!({"ok": true})));

        let got = client.get_event(Duration::from_millis(50), "", false);
        assert_eq!(got, Some(json!({"ok": true})));
        assert!(client.transport_mut().rx_msgs().is_empty());
    }

    #[test]
    fn get_event_times_out_on_empty_queue() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();

        let wait = Duration::from_millis(100);
        let start = Instant::now();
        assert_eq!(client.get_event(wait, "", false), None);
        let elapsed = start.elapsed();
        assert!(elapsed >= wait);
        assert!(elapsed < wait + Duration::from_secs(2));
    }

    #[test]
    fn get_event_with_zero_wait_blocks_until_an_event_arrives() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();

        let feeder = fake.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            feeder.push_inbound(delivered("late.event", json!({"n": 1})));
        });

        let start = Instant::now();
        let got = client.get_event(Duration::ZERO, "late", false);
        assert_eq!(got, Some(json!({"n": 1})));
        assert!(start.elapsed() >= Duration::from_millis(300));
        handle.join().unwrap();
    }

    #[test]
    fn get_event_deadline_holds_under_continuous_discards() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();

        let stop = Arc::new(AtomicBool::new(false));
        let feeder = fake.clone();
        let feeder_stop = stop.clone();
        let handle = std::thread::spawn(move || {
            while !feeder_stop.load(Ordering::Relaxed) {
                feeder.push_inbound(delivered("noise", json!({})));
                std::thread::sleep(Duration::from_millis(1));
            }
        });

        let wait = Duration::from_millis(100);
        let start = Instant::now();
        let got = client.get_event(wait, "wanted", false);
        let elapsed = start.elapsed();
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();

        assert_eq!(got, None);
        assert!(elapsed >= wait);
        assert!(elapsed < wait + Duration::from_secs(1));
    }

    #[test]
    fn get_event_noblock_returns_raw_message() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();

        let start = Instant::now();
        assert_eq!(client.get_event_noblock(), None);
        assert!(start.elapsed() < Duration::from_millis(50));

        let msg = delivered("foo.bar", json!({"n": 1}));
        fake.push_inbound(msg.clone());
        assert_eq!(client.get_event_noblock(), Some(msg));

        fake.push_inbound(json!({"route": {}}));
        fake.push_inbound(delivered("foo.baz", json!({})));
        assert_eq!(client.get_event_noblock(), None);
        assert!(client.get_event_noblock().is_some());
    }

    #[test]
    fn iter_events_stops_when_caller_stops() {
        let fake = FakeConnector::default();
        let mut client = EventClient::connect(&fake, config()).unwrap();
        for n in 0..5 {
            fake.push_inbound(delivered("job.ret", json!({ "n": n })));
        }

        let taken: Vec<Value> = client.iter_events("job", false).take(3).collect();
        assert_eq!(taken, vec![json!({"n": 0}), json!({"n": 1}), json!({"n": 2})]);
        assert_eq!(client.transport_mut().rx_msgs().len(), 2);
    }
}
