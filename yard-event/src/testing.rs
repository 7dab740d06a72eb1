//! 单元测试共用的假传输与夹具
//!
use crate::config::EventConfig;
use crate::error::EventResult as Result;
use crate::transport::{Connector, Transport, Yard};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub(crate) struct Wire {
    sent: Vec<(Value, Option<String>)>,
    inbound: VecDeque<Value>,
    services: usize,
}

/// 记录发送、按需注入入站消息的假传输
#[derive(Clone, Default)]
pub(crate) struct FakeConnector {
    wire: Arc<Mutex<Wire>>,
}

impl FakeConnector {
    pub(crate) fn push_inbound(&self, msg: Value) {
        self.wire.lock().unwrap().inbound.push_back(msg);
    }

    pub(crate) fn sent(&self) -> Vec<(Value, Option<String>)> {
        self.wire.lock().unwrap().sent.clone()
    }

    /// 已发送消息中的 `(tag, data)`，跳过握手消息
    pub(crate) fn fired(&self) -> Vec<(String, Value)> {
        self.sent()
            .into_iter()
            .filter_map(|(msg, _)| {
                let tag = msg.get("tag")?.as_str()?.to_string();
                Some((tag, msg.get("data")?.clone()))
            })
            .collect()
    }

    pub(crate) fn services(&self) -> usize {
        self.wire.lock().unwrap().services
    }
}

pub(crate) struct FakeStack {
    yard: Yard,
    wire: Arc<Mutex<Wire>>,
    pub(crate) remotes: Vec<Yard>,
    rx_msgs: VecDeque<Value>,
}

impl Connector for FakeConnector {
    type Transport = FakeStack;

    fn open(&self, yid: &str, lanename: &str, dirpath: &Path) -> Result<FakeStack> {
        Ok(FakeStack {
            yard: Yard::new(lanename, yid, dirpath),
            wire: self.wire.clone(),
            remotes: Vec::new(),
            rx_msgs: VecDeque::new(),
        })
    }
}

impl Transport for FakeStack {
    fn yard(&self) -> &Yard {
        &self.yard
    }

    fn add_remote(&mut self, yard: Yard) {
        self.remotes.push(yard);
    }

    fn transmit(&mut self, msg: Value, dst: Option<&str>) -> Result<()> {
        self.wire
            .lock()
            .unwrap()
            .sent
            .push((msg, dst.map(str::to_string)));
        Ok(())
    }

    fn service_all(&mut self) -> Result<Vec<String>> {
        let mut wire = self.wire.lock().unwrap();
        wire.services += 1;
        self.rx_msgs.extend(wire.inbound.drain(..));
        Ok(Vec::new())
    }

    fn rx_msgs(&mut self) -> &mut VecDeque<Value> {
        &mut self.rx_msgs
    }
}

pub(crate) fn config() -> EventConfig {
    EventConfig::builder()
        .node("minion")
        .sock_dir("/tmp/yard-test")
        .default_wait_ms(50)
        .build()
        .with_sub_event_funs(["state.sls"])
}

/// 路由器转发形态的入站消息
pub(crate) fn delivered(tag: &str, data: Value) -> Value {
    json!({
        "route": {"dst": {"yard": "minion.x"}, "src": {"yard": "master.0"}},
        "event": {"tag": tag, "data": data},
    })
}
