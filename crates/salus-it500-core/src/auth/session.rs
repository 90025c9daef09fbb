use chrono::{DateTime, Duration, Utc};

/// In-memory session state for one device.
///
/// The portal never tells us when a token expires. A token is kept until
/// a data or set call fails, at which point it is cleared and a fresh one
/// is scraped before the next attempt.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    obtained_at: Option<DateTime<Utc>>,
    failures: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly scraped token
    pub fn update(&mut self, token: String) {
        self.token = Some(token);
        self.obtained_at = Some(Utc::now());
    }

    /// Drop the token so the next call logs in again
    pub fn clear(&mut self) {
        self.token = None;
        self.obtained_at = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Age of the current token, if any
    pub fn token_age(&self) -> Option<Duration> {
        self.obtained_at.map(|at| Utc::now() - at)
    }

    /// Count a failed attempt and return the new consecutive total
    pub fn record_failure(&mut self) -> u32 {
        self.failures = self.failures.saturating_add(1);
        self.failures
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failed attempts since the last success
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(!session.has_token());
        assert!(session.token_age().is_none());
        assert_eq!(session.failures(), 0);
    }

    #[test]
    fn test_update_and_clear() {
        let mut session = Session::new();
        session.update("abc123".to_string());
        assert_eq!(session.token(), Some("abc123"));
        assert!(session.token_age().is_some_and(|age| age.num_seconds() >= 0));

        session.clear();
        assert_eq!(session.token(), None);
        assert!(session.token_age().is_none());
    }

    #[test]
    fn test_failure_counter_resets_on_success() {
        let mut session = Session::new();
        assert_eq!(session.record_failure(), 1);
        assert_eq!(session.record_failure(), 2);
        session.record_success();
        assert_eq!(session.failures(), 0);
    }
}
