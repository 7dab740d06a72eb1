use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 路由器端点的固定前缀
pub const ROUTER_PREFIX: &str = "master";
/// 路由器端点的固定 id
pub const ROUTER_YID: &str = "0";

/// 端点标识：名称 + 所在目录，同目录下的端点才可互通
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Yard {
    name: String,
    dirpath: PathBuf,
}

impl Yard {
    /// 由前缀与 id 构造端点，名称形如 `{prefix}.{yid}`
    pub fn new(prefix: &str, yid: &str, dirpath: impl Into<PathBuf>) -> Self {
        Self {
            name: format!("{prefix}.{yid}"),
            dirpath: dirpath.into(),
        }
    }

    /// 按完整名称构造端点
    pub fn with_name(name: impl Into<String>, dirpath: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dirpath: dirpath.into(),
        }
    }

    /// 指定目录下的路由器端点
    pub fn router(dirpath: impl Into<PathBuf>) -> Self {
        Self::new(ROUTER_PREFIX, ROUTER_YID, dirpath)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dirpath(&self) -> &Path {
        &self.dirpath
    }

    /// 两个端点是否处于同一目录作用域
    pub fn shares_scope(&self, other: &Yard) -> bool {
        self.dirpath == other.dirpath
    }
}

impl fmt::Display for Yard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.dirpath.display())
    }
}
