use std::time::Duration;

/// Default kitchen-delay poll interval (seconds)
const DEFAULT_DELAY_POLL_SECS: u64 = 30;

/// 引擎配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DELAY_POLL_SECS | 30 | 厨房延迟轮询间隔(秒)，0 表示关闭 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | - | 日志目录（按天滚动） |
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Kitchen-delay poll interval; `None` disables the watcher
    pub delay_poll_interval: Option<Duration>,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl EngineConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let poll_secs = std::env::var("DELAY_POLL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DELAY_POLL_SECS);
        Self {
            delay_poll_interval: (poll_secs > 0).then(|| Duration::from_secs(poll_secs)),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// No background polling (one-shot tools, tests)
    pub fn without_delay_watch(mut self) -> Self {
        self.delay_poll_interval = None;
        self
    }

    pub fn with_delay_poll_interval(mut self, interval: Duration) -> Self {
        self.delay_poll_interval = Some(interval);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delay_poll_interval: Some(Duration::from_secs(DEFAULT_DELAY_POLL_SECS)),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
        }
    }
}
