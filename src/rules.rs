use std::time::Duration;

/// Seconds a task stays on screen before it counts as a wrong attempt
pub const MAX_ATTEMPT_TIME: u32 = 5;
/// Wrong attempts that end the session
pub const MAX_WRONG_ATTEMPTS: u32 = 3;
/// Highest task index reachable in one session
pub const MAX_ATTEMPTS: usize = 15;
/// Share of generated tasks that show the true translation
pub const CORRECT_FRACTION: f64 = 0.25;
/// Pause between closing the app and wiping the session
pub const CLOSE_DELAY_MS: u64 = 200;
/// Interval of one timer tick
pub const TICK_INTERVAL_MS: u64 = 1000;

/// Fixed game rules. Only tests build anything but the default.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub max_attempt_time: u32,
    pub max_wrong_attempts: u32,
    pub max_attempts: usize,
    pub correct_fraction: f64,
    pub close_delay: Duration,
    pub tick_interval: Duration,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_attempt_time: MAX_ATTEMPT_TIME,
            max_wrong_attempts: MAX_WRONG_ATTEMPTS,
            max_attempts: MAX_ATTEMPTS,
            correct_fraction: CORRECT_FRACTION,
            close_delay: Duration::from_millis(CLOSE_DELAY_MS),
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
        }
    }
}

impl Rules {
    pub fn timed_out(&self, timer_ticks: u32) -> bool {
        timer_ticks >= self.max_attempt_time
    }

    pub fn wrong_limit_reached(&self, wrong_count: u32) -> bool {
        wrong_count >= self.max_wrong_attempts
    }
}
