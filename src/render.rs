use tracing::warn;

/// Divider drawn between rendered item blocks.
pub const DIVIDER: &str = "────────────────";

/// Unit marker for ten-thousands in upstream monetary strings.
const WAN: &str = "万";
/// Unit marker for hundred-millions.
const YI: &str = "亿";

/// Normalize an upstream monetary string to hundred-million units.
///
/// `"12000万"` becomes `"1.20亿"`; values below the threshold and strings
/// already in `亿` pass through unchanged. Strings in neither unit pass
/// through with a `（格式未识别）` annotation. A numeric parse failure never
/// fails the item, only falls back to the original string.
pub fn normalize_amount(raw: &str) -> String {
    if let Some(number) = raw.strip_suffix(WAN) {
        match number.trim().parse::<f64>() {
            Ok(value) if value >= 10_000.0 => format!("{:.2}{YI}", value / 10_000.0),
            Ok(_) => raw.to_string(),
            Err(e) => {
                warn!(raw, error = %e, "Unparseable monetary amount, leaving as-is");
                raw.to_string()
            }
        }
    } else if raw.ends_with(YI) {
        raw.to_string()
    } else {
        format!("{raw}（格式未识别）")
    }
}

/// Display form of the server update timestamp: everything before the first
/// sub-second separator, or a placeholder when the source sent none.
pub fn update_time_display(raw: Option<&str>) -> String {
    match raw {
        Some(t) => t.split('.').next().unwrap_or(t).to_string(),
        None => "未知".to_string(),
    }
}

/// Join header, item blocks and the update-time trailer into one message.
pub fn assemble_report(header: &str, blocks: &[String], update_time: Option<&str>) -> String {
    let mut out = String::from(header);
    for block in blocks {
        out.push('\n');
        out.push_str(DIVIDER);
        out.push('\n');
        out.push_str(block);
    }
    out.push('\n');
    out.push_str(DIVIDER);
    out.push('\n');
    out.push_str(&format!("数据更新时间: {}", update_time_display(update_time)));
    out
}
