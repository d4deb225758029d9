use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Origin of the Moneypex POS web application, without a trailing slash.
    pub moneypex_base_url: String,
    /// Raw `Cookie` header value of an authenticated Moneypex session.
    pub moneypex_session_cookie: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    /// Six-field cron expression (seconds first) driving `watch`.
    pub poll_schedule: String,
    pub updates_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("moneypex_base_url", &self.moneypex_base_url)
            .field("moneypex_session_cookie", &"[redacted]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("poll_schedule", &self.poll_schedule)
            .field("updates_path", &self.updates_path)
            .finish()
    }
}
