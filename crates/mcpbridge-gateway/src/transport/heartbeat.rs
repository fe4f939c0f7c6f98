use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};

use crate::config::GatewaySection;

/// Ping schedule plus idle tracking for one socket.
pub struct Heartbeat {
    ping: Interval,
    idle_timeout: Duration,
    last_activity: Instant,
}

impl Heartbeat {
    pub fn new(gw: &GatewaySection) -> Self {
        let mut ping = time::interval(Duration::from_millis(gw.ping_interval_ms));
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ping,
            idle_timeout: Duration::from_millis(gw.idle_timeout_ms),
            last_activity: Instant::now(),
        }
    }

    /// Any inbound frame counts as activity.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub async fn ping_due(&mut self) {
        self.ping.tick().await;
    }

    pub fn idle_expired(&self) -> bool {
        self.last_activity.elapsed() >= self.idle_timeout
    }
}

/// How often the session loops re-check idleness.
pub const IDLE_CHECK: Duration = Duration::from_millis(250);
