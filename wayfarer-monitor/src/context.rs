//! The page environment a monitor runs in

use parking_lot::Mutex;

/// What the monitor needs from the page: identity of the visitor's browser
/// and page, plus somewhere to surface notices
pub trait BrowserContext: Send + Sync {
    fn user_agent(&self) -> String;

    fn current_url(&self) -> String;

    /// Show a notice to the visitor
    fn notify_user(&self, message: &str);
}

/// Fixed context that collects notices instead of displaying them
#[derive(Debug, Default)]
pub struct StaticContext {
    user_agent: String,
    url: String,
    notices: Mutex<Vec<String>>,
}

impl StaticContext {
    pub fn new(user_agent: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            url: url.into(),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().clone()
    }
}

impl BrowserContext for StaticContext {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn notify_user(&self, message: &str) {
        self.notices.lock().push(message.to_string());
    }
}
