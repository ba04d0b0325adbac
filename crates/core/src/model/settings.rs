use std::time::Duration;

/// Timing and presentation knobs for one assessment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentSettings {
    tick_period: Duration,
    saved_indicator: Duration,
    auto_submit_delay: Duration,
    shuffle_questions: bool,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            saved_indicator: Duration::from_secs(2),
            auto_submit_delay: Duration::from_millis(1500),
            shuffle_questions: true,
        }
    }
}

impl AssessmentSettings {
    /// Countdown tick period.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// How long the "answer saved" indicator stays up after the last selection.
    #[must_use]
    pub fn saved_indicator(&self) -> Duration {
        self.saved_indicator
    }

    /// Pause between the time-up prompt appearing and the automatic submission.
    #[must_use]
    pub fn auto_submit_delay(&self) -> Duration {
        self.auto_submit_delay
    }

    #[must_use]
    pub fn shuffle_questions(&self) -> bool {
        self.shuffle_questions
    }

    #[must_use]
    pub fn with_auto_submit_delay(mut self, delay: Duration) -> Self {
        self.auto_submit_delay = delay;
        self
    }

    #[must_use]
    pub fn with_saved_indicator(mut self, window: Duration) -> Self {
        self.saved_indicator = window;
        self
    }

    #[must_use]
    pub fn with_shuffle_questions(mut self, shuffle: bool) -> Self {
        self.shuffle_questions = shuffle;
        self
    }
}
