//! 事件信封（Envelope）
//!
//! 定义在传输上流动的几种消息形态：
//! - `EventMessage`：客户端发布到路由器的 `{route, tag, data}`；
//! - `RegisterMessage`：握手时向路由器登记的 `{route, load: {yid, dirpath}}`；
//! - `Delivery`：路由器转发给订阅者的 `{route, event: {tag, data}}`。
//!
//! 入站消息以 `serde_json::Value` 保存在待处理队列中，以便容纳任意（包括畸形的）载荷。
//!
use crate::transport::Route;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// 订阅者收到的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub tag: String,
    pub data: Value,
}

/// 发布消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub route: Route,
    pub tag: String,
    pub data: Value,
}

/// 握手登记载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterLoad {
    pub yid: String,
    pub dirpath: PathBuf,
}

/// 握手登记消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMessage {
    pub route: Route,
    pub load: RegisterLoad,
}

/// 路由器转发给订阅者的消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub route: Route,
    pub event: Event,
}

/// 入站消息中的事件视图（`tag` / `data` 所在的映射）
pub(crate) struct EventView<'a> {
    inner: Option<&'a Map<String, Value>>,
}

impl<'a> EventView<'a> {
    /// 阻塞接收使用：只看 `event` 字段
    pub(crate) fn nested(msg: &'a Value) -> Self {
        Self {
            inner: msg.get("event").and_then(Value::as_object),
        }
    }

    /// 非阻塞接收使用：有 `event` 字段时看 `event`，否则看消息本身
    pub(crate) fn nested_or_flat(msg: &'a Value) -> Self {
        match msg.get("event") {
            Some(event) => Self {
                inner: event.as_object(),
            },
            None => Self {
                inner: msg.as_object(),
            },
        }
    }

    /// 既无 `tag` 也无 `data` 的消息视为畸形
    pub(crate) fn is_malformed(&self) -> bool {
        match self.inner {
            Some(map) => !map.contains_key("tag") && !map.contains_key("data"),
            None => true,
        }
    }

    /// 事件标签，缺失或非字符串时视为空串
    pub(crate) fn tag(&self) -> &'a str {
        self.inner
            .and_then(|map| map.get("tag"))
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub(crate) fn data(&self) -> Value {
        self.inner
            .and_then(|map| map.get("data"))
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub(crate) fn to_value(&self) -> Value {
        self.inner
            .map(|map| Value::Object(map.clone()))
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RouteHop;
    use serde_json::json;

    #[test]
    fn delivery_serializes_to_nested_event() {
        let delivery = Delivery {
            route: Route::new(RouteHop::new("minion.1", None), RouteHop::new("master.0", None)),
            event: Event {
                tag: "foo.bar".into(),
                data: json!({"k": 1}),
            },
        };
        let value = serde_json::to_value(&delivery).unwrap();
        assert_eq!(value["event"], json!({"tag": "foo.bar", "data": {"k": 1}}));
        assert_eq!(value["route"]["dst"]["yard"], "minion.1");
    }

    #[test]
    fn nested_view_requires_event_field() {
        let msg = json!({"tag": "foo", "data": {}});
        assert!(EventView::nested(&msg).is_malformed());
        assert!(!EventView::nested_or_flat(&msg).is_malformed());

        let msg = json!({"event": {"data": {"k": 1}}});
        let view = EventView::nested(&msg);
        assert!(!view.is_malformed());
        assert_eq!(view.tag(), "");
        assert_eq!(view.data(), json!({"k": 1}));

        let msg = json!({"event": {"tag": "foo"}});
        assert_eq!(EventView::nested(&msg).data(), Value::Null);
    }

    #[test]
    fn non_object_messages_are_malformed() {
        assert!(EventView::nested(&json!("text")).is_malformed());
        assert!(EventView::nested_or_flat(&json!([1, 2])).is_malformed());
        assert!(EventView::nested_or_flat(&json!({"event": 3})).is_malformed());
    }
}
