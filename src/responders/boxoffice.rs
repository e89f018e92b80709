use serde_json::Value;

use crate::envelope::{text_field, text_field_or};
use crate::render::normalize_amount;
use crate::report::{ReportRequest, ReportSource, UsageHint};

/// Top movies rendered per report.
const DISPLAY_CAP: usize = 5;

/// Real-time Maoyan box-office ranking.
pub struct BoxOfficeSource;

impl ReportSource for BoxOfficeSource {
    fn name(&self) -> &str {
        "BoxOfficeResponder"
    }

    fn command(&self) -> &str {
        "实时票房"
    }

    fn path(&self) -> &str {
        "api/maoyan/"
    }

    fn display_cap(&self) -> usize {
        DISPLAY_CAP
    }

    fn progress_notice(&self) -> &str {
        "正在获取实时票房数据，请稍候…"
    }

    fn prepare(&self, _args: &[&str]) -> Result<ReportRequest, UsageHint> {
        // Takes no arguments; anything extra is ignored.
        Ok(ReportRequest::bare("📊【猫眼电影实时票房排行】"))
    }

    fn render_item(&self, item: &Value) -> Option<String> {
        let top = text_field(item, "top")?;
        let movie_name = text_field(item, "movieName")?;
        let sum_box = text_field(item, "sumBoxDesc")?;
        let box_rate = text_field(item, "boxRate")?;
        let show_count = text_field(item, "showCount")?;

        Some(format!(
            "🏆【{top}】{movie_name}\n\
             上映信息: {release_info}\n\
             总票房: {sum_box}\n\
             票房占比: {box_rate}\n\
             排场次数: {show_count}次\n\
             排片占比: {show_count_rate}\n\
             场均人次: {avg_show_view}\n\
             上座率: {avg_seat_view}",
            sum_box = normalize_amount(&sum_box),
            release_info = text_field_or(item, "releaseInfo", "-"),
            show_count_rate = text_field_or(item, "showCountRate", "-"),
            avg_show_view = text_field_or(item, "avgShowView", "-"),
            avg_seat_view = text_field_or(item, "avgSeatView", "-"),
        ))
    }
}
