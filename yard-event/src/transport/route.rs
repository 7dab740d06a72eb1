use serde::{Deserialize, Serialize};

/// 事件请求（注册订阅）信箱
pub const EVENT_REQ: &str = "event_req";
/// 事件发布信箱
pub const EVENT_FIRE: &str = "event_fire";

/// 路由中的一跳：端点名称 + 信箱（逻辑处理器）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHop {
    pub yard: String,
    #[serde(default)]
    pub mailbox: Option<String>,
}

impl RouteHop {
    pub fn new(yard: impl Into<String>, mailbox: Option<&str>) -> Self {
        Self {
            yard: yard.into(),
            mailbox: mailbox.map(str::to_string),
        }
    }
}

/// 附着在每条消息上的源/目的地址
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub dst: RouteHop,
    pub src: RouteHop,
}

impl Route {
    pub fn new(dst: RouteHop, src: RouteHop) -> Self {
        Self { dst, src }
    }

    /// 从原始消息中解析路由，缺失或形态不符时返回 `None`
    pub fn of(msg: &serde_json::Value) -> Option<Route> {
        msg.get("route")
            .and_then(|r| serde_json::from_value(r.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn route_is_read_back_from_message() {
        let msg = json!({
            "route": {
                "dst": {"yard": "master.0", "mailbox": "event_fire"},
                "src": {"yard": "minion.1"}
            },
            "tag": "foo",
        });
        let route = Route::of(&msg).unwrap();
        assert_eq!(route.dst, RouteHop::new("master.0", Some(EVENT_FIRE)));
        assert_eq!(route.src.mailbox, None);
    }

    #[test]
    fn missing_route_is_none() {
        assert!(Route::of(&json!({"tag": "foo"})).is_none());
        assert!(Route::of(&json!({"route": "nowhere"})).is_none());
    }
}
