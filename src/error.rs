use thiserror::Error;

/// Failure classes of one report fetch.
///
/// Every variant is caught at the responder boundary, logged with its detail,
/// and converted into exactly one short user-facing message. Nothing here
/// propagates past an invocation.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure or a non-2xx HTTP status.
    #[error("request failed (status: {status:?}): {reason}")]
    Network {
        /// HTTP status code, if the request got far enough to have one.
        status: Option<u16>,
        reason: String,
    },

    /// Response body was not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    /// A required top-level key is missing from the response envelope.
    #[error("response is missing required field `{0}`")]
    MissingField(&'static str),

    /// The payload field is present but not an item list (or a JSON-encoded
    /// string containing one).
    #[error("payload has unexpected shape: {0}")]
    Payload(String),

    /// Well-formed response whose status field reports an upstream failure.
    #[error("upstream reported failure: {0}")]
    Upstream(String),
}

impl FetchError {
    /// The single message shown to the user for this failure class.
    ///
    /// Wording is deliberately distinct per class so connectivity problems,
    /// garbage bodies, schema drift and upstream-reported failures can be
    /// told apart from the chat transcript alone.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => "请求失败，无法连接数据接口，请稍后再试".to_string(),
            Self::Decode(_) => "数据解析失败，接口返回了无法识别的内容".to_string(),
            Self::MissingField(_) => "接口数据格式异常，请稍后再试".to_string(),
            Self::Payload(_) => "数据列表解析失败，请稍后再试".to_string(),
            Self::Upstream(msg) => format!("获取失败: {msg}"),
        }
    }
}
