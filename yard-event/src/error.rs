//! 事件客户端统一错误定义
//!
//! 聚焦参数校验、载荷形态、传输与序列化等最小必要集合，
//! 便于在各实现层统一转换为 `EventError`。
//!
use thiserror::Error;

/// 统一错误类型（事件客户端最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 发布参数 ---
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    // --- 作业返回载荷 ---
    #[error("malformed return load: {reason}")]
    MalformedLoad { reason: String },

    // --- 传输 ---
    #[error("transport error: {reason}")]
    Transport { reason: String },

    // --- 配置 ---
    #[error("config error: {reason}")]
    Config { reason: String },
}

impl EventError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        EventError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub fn malformed_load(reason: impl Into<String>) -> Self {
        EventError::MalformedLoad {
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        EventError::Transport {
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        EventError::Config {
            reason: reason.into(),
        }
    }

    /// 是否为发布参数错误（调用方需修正输入后再重试）
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, EventError::InvalidArgument { .. })
    }
}

/// 统一 Result 类型别名
pub type EventResult<T> = Result<T, EventError>;
