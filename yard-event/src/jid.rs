//! 作业/会话标识（jid）
//!
//! 形如 `20260118093015123456`（本地时间精确到微秒）的数字串。
//! 同一进程内保证严格递增：若时钟未前进则在上一个值基础上加一。
//!
use chrono::{Local, NaiveDateTime};
use std::sync::Mutex;

static LAST_JID: Mutex<u128> = Mutex::new(0);

/// 生成进程内唯一的 jid
pub fn gen_jid() -> String {
    next_after(Local::now().naive_local()).to_string()
}

fn next_after(now: NaiveDateTime) -> u128 {
    let candidate = now
        .format("%Y%m%d%H%M%S%6f")
        .to_string()
        .parse::<u128>()
        .unwrap_or_default();

    let mut last = LAST_JID.lock().unwrap_or_else(|e| e.into_inner());
    let jid = if candidate > *last { candidate } else { *last + 1 };
    *last = jid;
    jid
}
