use std::time::{Duration, Instant};

/// How long the pointer stays visible after it last moved.
pub const CURSOR_HIDE_DELAY: Duration = Duration::from_secs(2);

/// Shows the pointer on motion and hides it again after a quiet period.
#[derive(Debug, Clone)]
pub struct CursorAutoHide {
    delay: Duration,
    visible: bool,
    hide_at: Option<Instant>,
}

impl Default for CursorAutoHide {
    fn default() -> Self {
        Self::new(CURSOR_HIDE_DELAY)
    }
}

impl CursorAutoHide {
    /// Starts hidden.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            visible: false,
            hide_at: None,
        }
    }

    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    /// Pointer moved. Returns `true` when the cursor has to be shown.
    pub fn on_motion(&mut self, now: Instant) -> bool {
        self.hide_at = Some(now + self.delay);
        let was_hidden = !self.visible;
        self.visible = true;
        was_hidden
    }

    /// Returns `true` when the cursor has to be hidden now.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(at) if now >= at => {
                self.hide_at = None;
                self.visible = false;
                true
            }
            _ => false,
        }
    }
}
