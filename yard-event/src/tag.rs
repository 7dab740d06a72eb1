//! 事件标签（tag）工具
//!
//! 标签是以 `.` 或 `/` 分层的主题字符串，用于订阅过滤。
//!

/// 分层标签的分隔符
pub const TAG_PARTS_SEP: char = '/';

/// 将若干段拼接为分层标签
///
/// ```
/// use yard_event::tag::tagify;
///
/// assert_eq!(tagify(["job", "42", "sub", "web1", "error", "state.sls"]), "job/42/sub/web1/error/state.sls");
/// ```
pub fn tagify<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tag = String::new();
    for part in parts {
        if !tag.is_empty() {
            tag.push(TAG_PARTS_SEP);
        }
        tag.push_str(part.as_ref());
    }
    tag
}

/// 作业子单元错误事件标签：`job/{jid}/sub/{id}/error/{fun}`
pub fn job_error_tag(jid: &str, id: &str, fun: &str) -> String {
    tagify(["job", jid, "sub", id, "error", fun])
}

/// 按分隔符拆分复合键，结果至少包含一段
pub fn split_compound_key<'a>(key: &'a str, delimiter: &str) -> Vec<&'a str> {
    key.split(delimiter).collect()
}

/// 由复合键首尾两段构造短标签 `first.last`
pub fn short_tag(segments: &[&str]) -> String {
    let first = segments.first().copied().unwrap_or_default();
    let last = segments.last().copied().unwrap_or_default();
    format!("{first}.{last}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_key_short_tag() {
        let segments = split_compound_key("state_|-nametest_|-run_|-apply", "_|-");
        assert_eq!(segments, vec!["state", "nametest", "run", "apply"]);
        assert_eq!(short_tag(&segments), "state.apply");
    }

    #[test]
    fn key_without_delimiter_repeats_itself() {
        let segments = split_compound_key("plain", "_|-");
        assert_eq!(segments, vec!["plain"]);
        assert_eq!(short_tag(&segments), "plain.plain");
    }

    #[test]
    fn job_error_tag_layout() {
        assert_eq!(
            job_error_tag("20260101000000000001", "web1", "state.sls"),
            "job/20260101000000000001/sub/web1/error/state.sls"
        );
    }
}
