//! 传输端点（Transport）协议
//!
//! 定义事件客户端所需的最小传输能力：发送、统一服务（收发排空）与待处理队列。
//! 具体的分帧、寻址与可靠性由实现方负责。
//!
use super::Yard;
use crate::error::EventResult as Result;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::Path;

/// 传输端点：负责发送消息与将入站流量排入待处理队列
pub trait Transport {
    /// 本端点标识
    fn yard(&self) -> &Yard;

    /// 登记一个可达的远端端点
    fn add_remote(&mut self, yard: Yard);

    /// 将消息排入发送队列；`dst` 为空时使用消息内嵌路由的目的端点
    fn transmit(&mut self, msg: Value, dst: Option<&str>) -> Result<()>;

    /// 处理所有就绪的收发流量：发送排队消息，并将入站消息追加到待处理队列
    ///
    /// 返回本轮因目的端点不存在而被丢弃的消息的目的名称（每条消息一项）。
    fn service_all(&mut self) -> Result<Vec<String>>;

    /// 按到达顺序排列的待处理队列（仅由端点自身写入）
    fn rx_msgs(&mut self) -> &mut VecDeque<Value>;
}

/// 端点工厂：按 `(yid, lanename, dirpath)` 创建传输端点
pub trait Connector {
    type Transport: Transport;

    fn open(&self, yid: &str, lanename: &str, dirpath: &Path) -> Result<Self::Transport>;
}
