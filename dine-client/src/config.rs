//! Client configuration

use shared::LocationId;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Client configuration for connecting to the dine-in backend
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DINE_API_URL | http://localhost:8080 | 后端地址 |
/// | DINE_API_TOKEN | - | Bearer token |
/// | DINE_LOCATION_ID | default | 门店 ID |
/// | DINE_REQUEST_TIMEOUT_SECS | 15 | 请求超时(秒) |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Location the tables belong to (sent with ensure-session)
    pub location_id: LocationId,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            location_id: LocationId::new("default"),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("DINE_API_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
        );
        config.token = std::env::var("DINE_API_TOKEN").ok().filter(|t| !t.is_empty());
        if let Ok(location) = std::env::var("DINE_LOCATION_ID") {
            config.location_id = LocationId::new(location);
        }
        config.timeout = std::env::var("DINE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        config
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_location(mut self, location_id: impl Into<LocationId>) -> Self {
        self.location_id = location_id.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
