use serde::Deserialize;
use serde_json::Value;

use crate::envelope::text_field_or;
use crate::report::{ReportRequest, ReportSource, UsageHint};

const DISPLAY_CAP: usize = 10;

/// One trending entry. Heat is left untyped because the upstream sends it
/// as a string on some days and a number on others.
#[derive(Debug, Deserialize)]
struct HotSearchItem {
    index: u32,
    title: String,
}

/// Weibo trending-topics ranking.
pub struct HotSearchSource;

impl ReportSource for HotSearchSource {
    fn name(&self) -> &str {
        "HotSearchResponder"
    }

    fn command(&self) -> &str {
        "微博热搜"
    }

    fn path(&self) -> &str {
        "api/weibohot/"
    }

    fn display_cap(&self) -> usize {
        DISPLAY_CAP
    }

    fn progress_notice(&self) -> &str {
        "正在获取微博热搜，请稍候…"
    }

    fn empty_notice(&self) -> &str {
        "当前没有热搜数据"
    }

    fn prepare(&self, _args: &[&str]) -> Result<ReportRequest, UsageHint> {
        Ok(ReportRequest::bare("🔥【微博热搜榜】"))
    }

    fn render_item(&self, item: &Value) -> Option<String> {
        let record: HotSearchItem = serde_json::from_value(item.clone()).ok()?;
        let hot = text_field_or(item, "hot", "-");
        Some(format!("{}. {}  热度:{}", record.index, record.title, hot))
    }
}
