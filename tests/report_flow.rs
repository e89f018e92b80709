//! End-to-end tests of the report flow: a real responder driven against a
//! mock HTTP transport, with every outbound message recorded.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use httpmock::prelude::*;
use serde_json::{json, Value};

use ranklist_bot::fetch::ReportClient;
use ranklist_bot::report::{ReportResponder, ReportSource};
use ranklist_bot::responder::{
    OutboundMessage, OutboundSink, RenderMode, Responder, ResponderContext, ResponderResult,
};
use ranklist_bot::responders::boxoffice::BoxOfficeSource;
use ranklist_bot::responders::hotsearch::HotSearchSource;
use ranklist_bot::responders::weather::WeatherSource;

/// Sink that records every message instead of delivering it.
#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<OutboundMessage>>,
}

#[async_trait]
impl OutboundSink for RecordingSink {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

/// Run one command through a responder and collect all outbound messages,
/// in delivery order (mid-invocation notices first, final reply last).
async fn run_command<S: ReportSource + 'static>(
    source: S,
    base_url: &str,
    message_body: &str,
) -> Vec<OutboundMessage> {
    let client = Arc::new(ReportClient::new(base_url, Duration::from_secs(2)).unwrap());
    let responder = ReportResponder::new(source, client);

    let sink = Arc::new(RecordingSink::default());
    let context = ResponderContext {
        sender: "@tester:example.org".to_string(),
        message_body: message_body.to_string(),
        outbound: sink.clone(),
    };

    assert!(responder.should_handle(&context).await);
    let result = responder.handle(&context).await.unwrap();

    let mut messages = sink.messages.lock().unwrap().clone();
    match result {
        ResponderResult::Handled(Some(reply)) => messages.push(reply),
        ResponderResult::Handled(None) => {}
        ResponderResult::NotHandled => panic!("responder refused a matching command"),
    }
    messages
}

fn movie(top: u32, name: &str) -> Value {
    json!({
        "top": top,
        "movieName": name,
        "releaseInfo": "上映首日",
        "sumBoxDesc": "12000万",
        "boxRate": "35.2%",
        "showCount": 10000,
        "showCountRate": "28.1%",
        "avgShowView": "23",
        "avgSeatView": "15.4%"
    })
}

#[tokio::test]
async fn upstream_failure_yields_one_error_with_server_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/maoyan/");
            then.status(200)
                .json_body(json!({"code": 500, "msg": "维护中", "data": []}));
        })
        .await;

    let messages = run_command(BoxOfficeSource, &server.base_url(), "实时票房").await;

    // Progress notice plus exactly one error message, no item blocks.
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].body, "获取失败: 维护中");
    assert!(!messages[1].body.contains("🏆"));
    mock.assert_async().await;
}

#[tokio::test]
async fn empty_payload_yields_friendly_no_data_notice() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/maoyan/");
            then.status(200)
                .json_body(json!({"code": 200, "msg": "获取成功", "data": []}));
        })
        .await;

    let messages = run_command(BoxOfficeSource, &server.base_url(), "实时票房").await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].body, "今日暂无数据");
    assert!(!messages[1].body.contains("失败"));
}

#[tokio::test]
async fn rendering_respects_cap_and_skips_incomplete_items() {
    // Seven movies; the third is missing its name. Cap is five, so five are
    // considered and four survive rendering.
    let mut items: Vec<Value> = (1..=7).map(|i| movie(i, &format!("电影{i}"))).collect();
    items[2].as_object_mut().unwrap().remove("movieName");

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/maoyan/");
            then.status(200)
                .json_body(json!({"code": 200, "msg": "获取成功", "data": items}));
        })
        .await;

    let messages = run_command(BoxOfficeSource, &server.base_url(), "实时票房").await;
    let report = &messages[1].body;

    assert_eq!(report.matches("🏆【").count(), 4);
    assert!(report.contains("电影1"));
    assert!(report.contains("电影5"));
    assert!(!report.contains("电影6"));
    // The ten-thousand amounts were normalized on the way through.
    assert!(report.contains("总票房: 1.20亿"));
}

#[tokio::test]
async fn malformed_json_body_yields_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/maoyan/");
            then.status(200).body("certainly not json");
        })
        .await;

    let messages = run_command(BoxOfficeSource, &server.base_url(), "实时票房").await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].body, "数据解析失败，接口返回了无法识别的内容");
}

#[tokio::test]
async fn http_error_status_yields_connectivity_error_without_parsing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/maoyan/");
            // A perfectly valid envelope under a 500: it must never be parsed.
            then.status(500)
                .json_body(json!({"code": 200, "msg": "ok", "data": [movie(1, "幽灵电影")]}));
        })
        .await;

    let messages = run_command(BoxOfficeSource, &server.base_url(), "实时票房").await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].body, "请求失败，无法连接数据接口，请稍后再试");
    assert!(!messages[1].body.contains("幽灵电影"));
}

#[tokio::test]
async fn missing_required_argument_sends_usage_hint_without_fetching() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/weather/");
            then.status(200)
                .json_body(json!({"code": 200, "msg": "ok", "data": []}));
        })
        .await;

    let messages = run_command(WeatherSource, &server.base_url(), "天气").await;

    // One usage message, no progress notice, zero transport calls.
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].render, RenderMode::Markdown);
    assert!(messages[0].body.contains("天气 <城市>"));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn missing_payload_key_is_reported_as_schema_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/maoyan/");
            then.status(200).json_body(json!({"code": 200, "msg": "ok"}));
        })
        .await;

    let messages = run_command(BoxOfficeSource, &server.base_url(), "实时票房").await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].body, "接口数据格式异常，请稍后再试");
    // Distinct wording from the upstream-reported-failure path.
    assert!(!messages[1].body.starts_with("获取失败"));
}

#[tokio::test]
async fn string_encoded_payload_is_decoded_and_capped() {
    let items: Vec<Value> = (1..=12)
        .map(|i| json!({"index": i, "title": format!("话题{i}"), "hot": 1000 - i}))
        .collect();
    let encoded = serde_json::to_string(&items).unwrap();

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/weibohot/");
            then.status(200)
                .json_body(json!({"code": 200, "msg": "获取成功", "data": encoded}));
        })
        .await;

    let messages = run_command(HotSearchSource, &server.base_url(), "微博热搜").await;
    let report = &messages[1].body;

    assert!(report.contains("🔥【微博热搜榜】"));
    assert!(report.contains("1. 话题1"));
    assert!(report.contains("10. 话题10"));
    assert!(!report.contains("话题11"));
}

#[tokio::test]
async fn progress_notice_precedes_the_report() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/maoyan/");
            then.status(200).json_body(json!({
                "code": 200,
                "msg": "获取成功",
                "data": [movie(1, "流浪地球")],
                "updateTime": "2024-05-01 12:30:45.123456"
            }));
        })
        .await;

    let messages = run_command(BoxOfficeSource, &server.base_url(), "实时票房").await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].body, "正在获取实时票房数据，请稍候…");
    assert_eq!(messages[0].render, RenderMode::Plain);
    assert!(messages[1].body.contains("📊【猫眼电影实时票房排行】"));
    assert_eq!(messages[1].render, RenderMode::Plain);
    // Trailer carries the update time with sub-seconds stripped.
    assert!(messages[1].body.ends_with("数据更新时间: 2024-05-01 12:30:45"));
}

#[tokio::test]
async fn weather_arguments_become_query_parameters() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/weather/")
                .query_param("city", "北京")
                .query_param("type", "baidu");
            then.status(200).json_body(json!({
                "code": 200,
                "msg": "获取成功",
                "data": [{
                    "date": "05月01日",
                    "weather": "多云",
                    "temperature": "18℃~27℃",
                    "wind": "东南风3级"
                }]
            }));
        })
        .await;

    let messages = run_command(WeatherSource, &server.base_url(), "天气 北京").await;

    mock.assert_async().await;
    let report = &messages[1].body;
    assert!(report.contains("🌤【北京 天气预报】"));
    assert!(report.contains("05月01日 多云"));
}

#[tokio::test]
async fn transport_failure_yields_connectivity_error() {
    // Nothing is listening on this port.
    let client = Arc::new(
        ReportClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap(),
    );
    let responder = ReportResponder::new(BoxOfficeSource, client);

    let sink = Arc::new(RecordingSink::default());
    let context = ResponderContext {
        sender: "@tester:example.org".to_string(),
        message_body: "实时票房".to_string(),
        outbound: sink.clone(),
    };

    let result = responder.handle(&context).await.unwrap();
    let ResponderResult::Handled(Some(reply)) = result else {
        panic!("expected a handled reply");
    };
    assert_eq!(reply.body, "请求失败，无法连接数据接口，请稍后再试");
}
