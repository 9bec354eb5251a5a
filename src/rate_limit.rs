use std::sync::{Arc, LazyLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Default number of requests allowed per one-second window.
pub const DEFAULT_MAX_PER_SECOND: u32 = 4;

const WINDOW: Duration = Duration::from_secs(1);

static SHARED: LazyLock<Arc<RateLimiter>> =
    LazyLock::new(|| Arc::new(RateLimiter::new(DEFAULT_MAX_PER_SECOND)));

#[derive(Debug, Default)]
struct Window {
    started: Option<Instant>,
    count: u32,
}

/// Counts calls in a rolling one-second window and makes callers wait for the next window
/// once the limit is reached.
///
/// One limiter is shared by every client in the process (see [`RateLimiter::shared`]);
/// clients only get their own when configured to.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_second: u32,
    window: Mutex<Window>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_per_second: u32) -> Self {
        Self {
            max_per_second: max_per_second.max(1),
            window: Mutex::new(Window::default()),
        }
    }

    /// The process-wide limiter, allowing [`DEFAULT_MAX_PER_SECOND`] requests per second.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    #[must_use]
    pub fn max_per_second(&self) -> u32 {
        self.max_per_second
    }

    /// Waits until one more request fits in the current window, then counts it.
    ///
    /// The lock is held while sleeping so that concurrent callers queue up behind the one
    /// that hit the limit.
    pub async fn acquire(&self) {
        let mut window = self.window.lock().await;
        let now = Instant::now();

        match window.started {
            Some(started) if now.duration_since(started) < WINDOW => {
                if window.count >= self.max_per_second {
                    let remaining = WINDOW - now.duration_since(started);
                    debug!(?remaining, "sending requests too fast, sleeping");
                    sleep(remaining).await;
                    window.started = Some(Instant::now());
                    window.count = 0;
                }
            }
            _ => {
                window.started = Some(now);
                window.count = 0;
            }
        }

        window.count += 1;
    }
}
