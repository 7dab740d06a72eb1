//! 事件客户端配置（EventConfig）
//!
//! 取代进程级的全局选项：命名空间、套接字目录、复合键分隔符与
//! “带子事件”的函数集合均在构造客户端时显式传入。
//!
use crate::error::{EventError, EventResult};
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 复合键默认分隔符
pub const DEFAULT_TAG_DELIMITER: &str = "_|-";
/// 阻塞接收默认等待时长（毫秒）
pub const DEFAULT_WAIT_MS: u64 = 5_000;
/// 异步事件流的默认缓冲容量
pub const DEFAULT_STREAM_CAPACITY: usize = 64;

/// 事件客户端配置
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    /// 逻辑命名空间（lane 名称），如 `minion`、`master`
    #[builder(into)]
    node: String,
    /// 端点所在目录，同目录下的端点才可互通
    #[builder(into)]
    sock_dir: PathBuf,
    /// 复合键分隔符
    #[builder(into, default = DEFAULT_TAG_DELIMITER.to_string())]
    #[serde(default = "default_tag_delimiter")]
    tag_delimiter: String,
    /// 会派生子事件的函数名集合
    #[builder(default)]
    #[serde(default)]
    sub_event_funs: BTreeSet<String>,
    /// `iter_events` 每轮调用阻塞接收时使用的等待时长（毫秒）
    #[builder(default = DEFAULT_WAIT_MS)]
    #[serde(default = "default_wait_ms")]
    default_wait_ms: u64,
    /// 异步事件流的通道容量
    #[builder(default = DEFAULT_STREAM_CAPACITY)]
    #[serde(default = "default_stream_capacity")]
    stream_capacity: usize,
}

fn default_tag_delimiter() -> String {
    DEFAULT_TAG_DELIMITER.to_string()
}

fn default_wait_ms() -> u64 {
    DEFAULT_WAIT_MS
}

fn default_stream_capacity() -> usize {
    DEFAULT_STREAM_CAPACITY
}

impl EventConfig {
    /// 从 JSON 文本加载配置并校验
    pub fn from_json_str(raw: &str) -> EventResult<Self> {
        let config: EventConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 替换“带子事件”的函数集合
    pub fn with_sub_event_funs<I, S>(mut self, funs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_event_funs = funs.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> EventResult<()> {
        if self.node.is_empty() {
            return Err(EventError::config("node must not be empty"));
        }
        if self.tag_delimiter.is_empty() {
            return Err(EventError::config("tag_delimiter must not be empty"));
        }
        if self.stream_capacity == 0 {
            return Err(EventError::config("stream_capacity must be positive"));
        }
        Ok(())
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn sock_dir(&self) -> &Path {
        &self.sock_dir
    }

    pub fn tag_delimiter(&self) -> &str {
        &self.tag_delimiter
    }

    pub fn sub_event_funs(&self) -> &BTreeSet<String> {
        &self.sub_event_funs
    }

    /// 判断函数是否会派生子事件
    pub fn is_sub_event_fun(&self, fun: &str) -> bool {
        self.sub_event_funs.contains(fun)
    }

    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_wait_ms)
    }

    pub fn stream_capacity(&self) -> usize {
        self.stream_capacity
    }
}
