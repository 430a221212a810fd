use std::time::{Duration, Instant};

/// Spinner shown while datasets are being fetched and turned into overlays.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadingIndicator {
    visible: bool,
}

impl LoadingIndicator {
    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Last failure message, active for `ttl` after it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    message: String,
    raised_at: Instant,
    ttl: Duration,
}

impl ErrorBanner {
    pub fn new(message: String, raised_at: Instant, ttl: Duration) -> Self {
        Self {
            message,
            raised_at,
            ttl,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_active(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) < self.ttl
    }

    /// Time left before the banner goes away.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.ttl
            .saturating_sub(now.saturating_duration_since(self.raised_at))
    }
}

/// Introductory panel. Dismissing it only hides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashPanel {
    visible: bool,
}

impl Default for SplashPanel {
    fn default() -> Self {
        Self { visible: true }
    }
}

impl SplashPanel {
    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
