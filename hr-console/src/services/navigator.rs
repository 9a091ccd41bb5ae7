use std::sync::Mutex;

/// Client-side navigation hook, invoked when the session is invalidated.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator for the terminal: there is no page to move to, so the user is
/// told how to sign in again.
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route, "Redirecting to login");
        eprintln!("Session expired. Run `hr-console login` to sign in again.");
    }
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}
