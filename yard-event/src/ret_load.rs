//! 作业返回派生事件（fire_ret_load）
//!
//! 作业返回载荷 `retcode` 非零且函数属于“带子事件”集合时，为每个 `result` 严格为
//! `false` 的子单元各发布两条事件：
//! - 兼容旧消费者的短标签事件 `{first}.{last}`，数据附带 `retcode`；
//! - 结构化错误事件 `job/{jid}/sub/{id}/error/{fun}`，数据补充作业信息与错误描述。
//!
//! 尽力而为：单个载荷的任何异常都不会抛给调用方，而是记录在 `RetLoadOutcome` 中。
//!
use crate::client::EventClient;
use crate::error::{EventError, EventResult as Result};
use crate::tag::{job_error_tag, short_tag, split_compound_key};
use crate::transport::Transport;
use serde_json::{Map, Value};

/// 单个作业返回载荷的派生结果
#[derive(Debug)]
pub enum RetLoadOutcome {
    /// 未满足派生条件（retcode 为零、缺少 fun 或 fun 不在集合中）
    Skipped,
    /// 已发布的事件数（可能为零）
    Fired { events: usize },
    /// 派生中途失败；失败前已发布的事件不会撤回
    Failed { fired: usize, cause: EventError },
}

impl RetLoadOutcome {
    /// 已发布的事件数
    pub fn fired(&self) -> usize {
        match self {
            RetLoadOutcome::Skipped => 0,
            RetLoadOutcome::Fired { events } => *events,
            RetLoadOutcome::Failed { fired, .. } => *fired,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RetLoadOutcome::Failed { .. })
    }
}

impl<T> EventClient<T>
where
    T: Transport,
{
    /// 根据作业返回载荷派生并发布错误事件
    ///
    /// 不会修改调用方的载荷；子单元按键的字典序处理。
    pub fn fire_ret_load(&mut self, load: &Value) -> RetLoadOutcome {
        let retcode = load.get("retcode").filter(|v| is_truthy(v));
        let fun = load.get("fun").filter(|v| is_truthy(v));
        let (Some(retcode), Some(fun)) = (retcode, fun) else {
            return RetLoadOutcome::Skipped;
        };
        let Some(fun) = fun.as_str().filter(|f| self.config().is_sub_event_fun(f)) else {
            return RetLoadOutcome::Skipped;
        };

        let mut fired = 0;
        match self.fire_sub_events(load, retcode, fun, &mut fired) {
            Ok(()) => RetLoadOutcome::Fired { events: fired },
            Err(cause) => {
                tracing::debug!(%fun, fired, error = %cause, "return load derivation failed");
                RetLoadOutcome::Failed { fired, cause }
            }
        }
    }

    fn fire_sub_events(
        &mut self,
        load: &Value,
        retcode: &Value,
        fun: &str,
        fired: &mut usize,
    ) -> Result<()> {
        let returns = match load.get("return") {
            None => return Ok(()),
            Some(Value::Object(returns)) => returns,
            Some(other) => {
                return Err(EventError::malformed_load(format!(
                    "return is not a mapping: {other}"
                )));
            }
        };

        for (compound_key, result) in returns {
            let Value::Object(result) = result else {
                return Err(EventError::malformed_load(format!(
                    "result of {compound_key} is not a mapping"
                )));
            };
            if result.get("result") != Some(&Value::Bool(false)) {
                continue;
            }

            let segments = split_compound_key(compound_key, self.config().tag_delimiter());
            let short = short_tag(&segments);

            let mut data: Map<String, Value> = result.clone();
            data.insert("retcode".into(), retcode.clone());
            self.fire_event(Value::Object(data.clone()), &short)?;
            *fired += 1;

            let jid = required(load, "jid")?;
            let id = required(load, "id")?;
            let user = required(load, "user")?;
            data.insert("jid".into(), jid.clone());
            data.insert("id".into(), id.clone());
            data.insert("success".into(), Value::Bool(false));
            data.insert("return".into(), Value::String(format!("Error: {short}")));
            data.insert("fun".into(), Value::String(fun.to_string()));
            data.insert("user".into(), user.clone());

            let tag = job_error_tag(&tag_part(jid), &tag_part(id), fun);
            self.fire_event(Value::Object(data), &tag)?;
            *fired += 1;
        }
        Ok(())
    }
}

fn required<'a>(load: &'a Value, key: &str) -> Result<&'a Value> {
    load.get(key)
        .ok_or_else(|| EventError::malformed_load(format!("missing {key}")))
}

fn tag_part(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 载荷字段的“真值”判断：null、false、0、空串与空集合为假
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
