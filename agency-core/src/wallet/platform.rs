use std::sync::LazyLock;

use regex::Regex;

static MOBILE_AGENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini").ok()
});

/// Host environment the wallet connector runs in.
pub trait Platform: Send + Sync {
    fn user_agent(&self) -> String;

    /// Replace the current view with `url`.
    fn navigate(&self, url: &str);

    /// Open `url` alongside the current view.
    fn open_new_context(&self, url: &str);

    fn alert(&self, message: &str);
}

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    MOBILE_AGENT
        .as_ref()
        .is_some_and(|re| re.is_match(user_agent))
}

/// User agent reported by terminal front-ends, e.g. `agency/0.1.0 (linux)`.
pub fn default_user_agent(app: &str) -> String {
    let os = match std::env::consts::OS {
        "android" => "Android",
        "ios" => "iPhone",
        other => other,
    };
    format!("{}/{} ({})", app, env!("CARGO_PKG_VERSION"), os)
}
