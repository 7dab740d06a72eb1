//! 内存版传输（InMemoryLane / InMemoryStack）
//!
//! 基于共享信箱表实现的轻量传输，满足 `Connector` / `Transport` 协议：
//! - 信箱按 `(目录, 端点名称)` 索引，不同目录的端点互不可达；
//! - `transmit` 仅排队，`service_all` 时才真正投递并收取本端信箱；
//! - 典型用途：测试环境、示例与同进程内的多端点联调。
//!
//! 注意：投递到不存在的端点时消息会被丢弃（尽力而为语义），
//! 被丢弃消息的目的名称由 `service_all` 返回。

use super::{Connector, Route, Transport, Yard};
use crate::error::{EventError, EventResult as Result};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

type Mailboxes = HashMap<PathBuf, HashMap<String, VecDeque<Value>>>;

/// 同进程共享的信箱表，可克隆后分发给多个端点
#[derive(Clone, Default)]
pub struct InMemoryLane {
    mailboxes: Arc<Mutex<Mailboxes>>,
}

impl InMemoryLane {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Mailboxes> {
        self.mailboxes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 指定目录下当前打开的端点名称（有序）
    pub fn yards(&self, dirpath: &Path) -> Vec<String> {
        let boxes = self.lock();
        let mut names: Vec<String> = boxes
            .get(dirpath)
            .map(|scope| scope.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    fn close(&self, yard: &Yard) {
        let mut boxes = self.lock();
        if let Some(scope) = boxes.get_mut(yard.dirpath()) {
            scope.remove(yard.name());
            if scope.is_empty() {
                boxes.remove(yard.dirpath());
            }
        }
    }
}

impl Connector for InMemoryLane {
    type Transport = InMemoryStack;

    fn open(&self, yid: &str, lanename: &str, dirpath: &Path) -> Result<InMemoryStack> {
        let yard = Yard::new(lanename, yid, dirpath);
        {
            let mut boxes = self.lock();
            let scope = boxes.entry(dirpath.to_path_buf()).or_default();
            if scope.contains_key(yard.name()) {
                return Err(EventError::transport(format!("yard already open: {yard}")));
            }
            scope.insert(yard.name().to_string(), VecDeque::new());
        }
        tracing::trace!(yard = %yard, "in-memory yard opened");

        Ok(InMemoryStack {
            lane: self.clone(),
            yard,
            remotes: BTreeSet::new(),
            tx_msgs: VecDeque::new(),
            rx_msgs: VecDeque::new(),
        })
    }
}

/// 内存版传输端点，析构时关闭自身信箱
pub struct InMemoryStack {
    lane: InMemoryLane,
    yard: Yard,
    remotes: BTreeSet<String>,
    tx_msgs: VecDeque<(String, Value)>,
    rx_msgs: VecDeque<Value>,
}

impl InMemoryStack {
    /// 已登记的远端端点名称
    pub fn remotes(&self) -> impl Iterator<Item = &str> {
        self.remotes.iter().map(String::as_str)
    }

    /// 尚未投递的发送队列长度
    pub fn pending_tx(&self) -> usize {
        self.tx_msgs.len()
    }
}

impl Transport for InMemoryStack {
    fn yard(&self) -> &Yard {
        &self.yard
    }

    fn add_remote(&mut self, yard: Yard) {
        if !yard.shares_scope(&self.yard) {
            tracing::debug!(local = %self.yard, remote = %yard, "remote yard outside local scope");
        }
        self.remotes.insert(yard.name().to_string());
    }

    fn transmit(&mut self, msg: Value, dst: Option<&str>) -> Result<()> {
        let dst = match dst {
            Some(name) => name.to_string(),
            None => Route::of(&msg)
                .map(|route| route.dst.yard)
                .ok_or_else(|| EventError::transport("message has no destination"))?,
        };
        self.tx_msgs.push_back((dst, msg));
        Ok(())
    }

    fn service_all(&mut self) -> Result<Vec<String>> {
        let mut boxes = self.lane.lock();
        let scope = boxes
            .get_mut(self.yard.dirpath())
            .ok_or_else(|| EventError::transport(format!("yard closed: {}", self.yard)))?;

        let mut undelivered = Vec::new();
        while let Some((dst, msg)) = self.tx_msgs.pop_front() {
            match scope.get_mut(&dst) {
                Some(inbox) => inbox.push_back(msg),
                None => {
                    tracing::trace!(src = %self.yard, %dst, "destination yard not found, message dropped");
                    undelivered.push(dst);
                }
            }
        }

        let inbox = scope
            .get_mut(self.yard.name())
            .ok_or_else(|| EventError::transport(format!("yard closed: {}", self.yard)))?;
        self.rx_msgs.extend(inbox.drain(..));
        Ok(undelivered)
    }

    fn rx_msgs(&mut self) -> &mut VecDeque<Value> {
        &mut self.rx_msgs
    }
}

impl Drop for InMemoryStack {
    fn drop(&mut self) {
        self.lane.close(&self.yard);
    }
}
