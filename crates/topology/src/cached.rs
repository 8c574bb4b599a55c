//! Liveness bookkeeping for registered announcements.
use crate::announcement::Announcement;
use crate::config::Config;
use crate::time::Timestamp;

/// An announcement accepted by the registry, with the time of its first and
/// latest heartbeat.
#[derive(Debug, Clone)]
pub struct CachedAnnouncement {
    announcement: Announcement,
    first_ping: Timestamp,
    last_ping: Timestamp,
    /// Backoff granted to, or dictated by, the peer. `None` until computed.
    backoff_interval: Option<u64>,
}

impl CachedAnnouncement {
    pub fn new(announcement: Announcement, now: Timestamp) -> Self {
        Self {
            announcement,
            first_ping: now,
            last_ping: now,
            backoff_interval: None,
        }
    }

    pub fn announcement(&self) -> &Announcement {
        &self.announcement
    }

    pub fn into_announcement(self) -> Announcement {
        self.announcement
    }

    pub fn first_ping(&self) -> Timestamp {
        self.first_ping
    }

    pub fn last_ping(&self) -> Timestamp {
        self.last_ping
    }

    pub fn backoff_interval(&self) -> Option<u64> {
        self.backoff_interval
    }

    /// Heartbeat timeout in seconds, extended by the current backoff.
    ///
    /// A peer that was granted a backoff pings less often, so it keeps the
    /// same slack between its expected ping and expiry as a peer that pings
    /// at the regular interval.
    pub fn effective_heartbeat_timeout(&self, config: &Config) -> u64 {
        let timeout = config.connector_ping_timeout;

        match self.backoff_interval {
            Some(backoff) => timeout.max(backoff.saturating_add(config.grace())),
            None => timeout,
        }
    }

    pub fn has_expired(&self, config: &Config, now: Timestamp) -> bool {
        let timeout = self.effective_heartbeat_timeout(config).saturating_mul(1000);
        now.elapsed_since(self.last_ping) >= timeout
    }

    /// Seconds left until this announcement expires. Negative once it has.
    pub fn seconds_until_timeout(&self, config: &Config, now: Timestamp) -> i64 {
        let timeout = i128::from(self.effective_heartbeat_timeout(config)) * 1000;
        let elapsed = i128::from(now.as_millis()) - i128::from(self.last_ping.as_millis());
        let remaining = (timeout - elapsed) / 1000;

        i64::try_from(remaining).unwrap_or(if remaining < 0 { i64::MIN } else { i64::MAX })
    }

    /// Register a heartbeat carrying `incoming`, returning the backoff, in
    /// seconds, to report back to the peer.
    pub fn register_ping(&mut self, incoming: &Announcement, config: &Config, now: Timestamp) -> u64 {
        self.last_ping = now;
        self.announcement.register_ping(incoming);

        if incoming.is_inherited() {
            // We're the client: the server decides on the backoff.
            self.backoff_interval = incoming.backoff_interval();
            return 0;
        }
        if incoming.reset_backoff() {
            self.first_ping = self.last_ping;
            self.backoff_interval = None;
            return 0;
        }
        let stable_since = self.last_ping.elapsed_since(self.first_ping);
        let timeout = config.connector_ping_timeout.saturating_mul(1000).max(1);
        let stable_timeouts = stable_since / timeout;
        let factor = stable_timeouts.min(config.backoff_stable_factor);
        let backoff = factor.saturating_mul(config.connector_ping_interval);

        self.backoff_interval = Some(backoff);

        backoff
    }
}
