use serde::Deserialize;
use serde_json::Value;

use crate::report::{ReportRequest, ReportSource, UsageHint};

const DISPLAY_CAP: usize = 5;

/// Upstream data source used when the user does not pick one.
const DEFAULT_PROVIDER: &str = "baidu";

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: String,
    weather: String,
    temperature: String,
    wind: String,
}

/// Multi-day weather forecast for a user-supplied city.
pub struct WeatherSource;

impl ReportSource for WeatherSource {
    fn name(&self) -> &str {
        "WeatherResponder"
    }

    fn command(&self) -> &str {
        "天气"
    }

    fn path(&self) -> &str {
        "api/weather/"
    }

    fn display_cap(&self) -> usize {
        DISPLAY_CAP
    }

    fn progress_notice(&self) -> &str {
        "正在查询天气数据，请稍候…"
    }

    fn empty_notice(&self) -> &str {
        "暂无该城市的天气数据"
    }

    fn prepare(&self, args: &[&str]) -> Result<ReportRequest, UsageHint> {
        let city = args.first().ok_or_else(|| {
            UsageHint("用法：`天气 <城市> [数据源]`，例如 `天气 北京`".to_string())
        })?;
        let provider = args.get(1).copied().unwrap_or(DEFAULT_PROVIDER);

        Ok(ReportRequest {
            query: vec![
                ("city".to_string(), (*city).to_string()),
                ("type".to_string(), provider.to_string()),
            ],
            header: format!("🌤【{city} 天气预报】"),
        })
    }

    fn render_item(&self, item: &Value) -> Option<String> {
        let day: ForecastDay = serde_json::from_value(item.clone()).ok()?;
        Some(format!(
            "{} {}\n气温: {}\n风力: {}",
            day.date, day.weather, day.temperature, day.wind
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn city_is_required() {
        assert!(WeatherSource.prepare(&[]).is_err());
    }

    #[test]
    fn provider_defaults_when_absent() {
        let request = WeatherSource.prepare(&["北京"]).unwrap();
        assert!(request
            .query
            .contains(&("type".to_string(), DEFAULT_PROVIDER.to_string())));
        assert!(request.query.contains(&("city".to_string(), "北京".to_string())));
        assert_eq!(request.header, "🌤【北京 天气预报】");
    }

    #[test]
    fn explicit_provider_is_passed_through() {
        let request = WeatherSource.prepare(&["上海", "moji"]).unwrap();
        assert!(request
            .query
            .contains(&("type".to_string(), "moji".to_string())));
    }

    #[test]
    fn renders_a_forecast_day() {
        let item = json!({
            "date": "05月01日",
            "weather": "多云",
            "temperature": "18℃~27℃",
            "wind": "东南风3级"
        });
        let block = WeatherSource.render_item(&item).unwrap();
        assert!(block.starts_with("05月01日 多云"));
        assert!(block.contains("气温: 18℃~27℃"));
    }

    #[test]
    fn incomplete_day_is_skipped() {
        let item = json!({"date": "05月01日", "weather": "多云"});
        assert!(WeatherSource.render_item(&item).is_none());
    }
}
