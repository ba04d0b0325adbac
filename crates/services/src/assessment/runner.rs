use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep};

use learn_core::assessment::{AssessmentSession, Effect, Event, Phase};
use learn_core::model::{AssessmentSettings, QuizResult, ResultSummary};
use storage::repository::ResultRepository;

use crate::Clock;
use crate::error::AssessmentError;

//
// ─── TASK SLOT ─────────────────────────────────────────────────────────────────
//

/// Holds at most one scheduled task; replacing, cancelling or dropping aborts it.
#[derive(Default)]
struct TaskSlot(Option<JoinHandle<()>>);

impl TaskSlot {
    fn replace(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.0 = Some(handle);
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }

    fn is_active(&self) -> bool {
        self.0.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// What the screen should show after an event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerOutcome {
    Continue,
    /// Persisting the result failed; the attempt waits for a user retry.
    SubmissionFailed { message: String },
    Completed(ResultSummary),
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Drives one [`AssessmentSession`]: owns its timers and performs its persistence.
///
/// Timer tasks feed their events back through a channel drained by
/// [`AssessmentRunner::pump`]. Every task is aborted when the runner is
/// dropped, so an unmounted screen cannot receive a late auto-submit.
pub struct AssessmentRunner {
    session: AssessmentSession,
    clock: Clock,
    settings: AssessmentSettings,
    results: Arc<dyn ResultRepository>,
    timer_tx: mpsc::UnboundedSender<Event>,
    timer_rx: mpsc::UnboundedReceiver<Event>,
    tick: TaskSlot,
    saved_indicator: TaskSlot,
    auto_submit: TaskSlot,
    result_id: Option<i64>,
}

impl AssessmentRunner {
    pub(crate) fn start(
        session: AssessmentSession,
        clock: Clock,
        settings: AssessmentSettings,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let mut runner = Self {
            session,
            clock,
            settings,
            results,
            timer_tx,
            timer_rx,
            tick: TaskSlot::default(),
            saved_indicator: TaskSlot::default(),
            auto_submit: TaskSlot::default(),
            result_id: None,
        };
        for effect in runner.session.initial_effects() {
            runner.schedule(&effect);
        }
        runner
    }

    #[must_use]
    pub fn session(&self) -> &AssessmentSession {
        &self.session
    }

    /// Row id of the persisted result, once the submission went through.
    #[must_use]
    pub fn result_id(&self) -> Option<i64> {
        self.result_id
    }

    /// True while any timer task is still scheduled.
    #[must_use]
    pub fn has_active_timers(&self) -> bool {
        self.tick.is_active() || self.saved_indicator.is_active() || self.auto_submit.is_active()
    }

    /// Apply a user event and carry out everything it triggers.
    ///
    /// Persistence is awaited inline, so a submit returns either
    /// `Completed` or `SubmissionFailed`.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Transition` if the event is not valid right now.
    pub async fn dispatch(&mut self, event: Event) -> Result<RunnerOutcome, AssessmentError> {
        tracing::debug!("assessment event: {}", event.name());
        let effects = self.session.apply(event, self.clock.now())?;
        self.run(effects).await
    }

    /// Wait for the next timer event without applying it.
    ///
    /// Returns `None` without waiting when no timer is scheduled and none has
    /// fired unobserved. Cancel-safe: dropping the future loses no event, so
    /// it can sit in a `tokio::select!` next to user input.
    pub async fn next_timer_event(&mut self) -> Option<Event> {
        // Sample before draining: a task that finishes afterwards has already queued its event.
        let active = self.has_active_timers();
        match self.timer_rx.try_recv() {
            Ok(event) => Some(event),
            Err(_) if !active => None,
            Err(_) => self.timer_rx.recv().await,
        }
    }

    /// Wait for the next timer event and dispatch it.
    ///
    /// Returns `Ok(None)` once no timer is left to wait for.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`AssessmentRunner::dispatch`].
    pub async fn pump(&mut self) -> Result<Option<RunnerOutcome>, AssessmentError> {
        match self.next_timer_event().await {
            Some(event) => self.dispatch(event).await.map(Some),
            None => Ok(None),
        }
    }

    /// Leave the attempt without submitting. Cancels every timer.
    pub fn abandon(&mut self) {
        if let Ok(effects) = self.session.apply(Event::Abandon, self.clock.now()) {
            for effect in &effects {
                self.schedule(effect);
            }
        }
        tracing::info!("Abandoned quiz {}", self.session.quiz().id);
    }

    async fn run(&mut self, effects: Vec<Effect>) -> Result<RunnerOutcome, AssessmentError> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut outcome = RunnerOutcome::Continue;

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Persist(result) => {
                    let follow_up = self.persist(&result).await?;
                    if let Phase::SubmissionFailed { message } = self.session.phase() {
                        outcome = RunnerOutcome::SubmissionFailed {
                            message: message.clone(),
                        };
                    }
                    queue.extend(follow_up);
                }
                Effect::Finished(summary) => {
                    outcome = RunnerOutcome::Completed(summary);
                }
                other => self.schedule(&other),
            }
        }

        Ok(outcome)
    }

    async fn persist(&mut self, result: &QuizResult) -> Result<Vec<Effect>, AssessmentError> {
        let attempt = self.session.submit_attempts();
        match self.results.insert_result(result).await {
            Ok(id) => {
                tracing::info!(
                    "Saved result {id} for quiz {}: score {} (attempt {attempt})",
                    result.quiz_id,
                    result.score.value()
                );
                self.result_id = Some(id);
                Ok(self
                    .session
                    .apply(Event::SubmissionSucceeded, self.clock.now())?)
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to save result for quiz {} (attempt {attempt}): {err}",
                    result.quiz_id
                );
                Ok(self.session.apply(
                    Event::SubmissionFailed {
                        message: err.to_string(),
                    },
                    self.clock.now(),
                )?)
            }
        }
    }

    fn schedule(&mut self, effect: &Effect) {
        match effect {
            Effect::StartTimer => {
                let period = self.settings.tick_period();
                let tx = self.timer_tx.clone();
                self.tick.replace(tokio::spawn(async move {
                    let mut ticks = interval_at(Instant::now() + period, period);
                    loop {
                        ticks.tick().await;
                        if tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                }));
            }
            Effect::StopTimer => self.tick.cancel(),
            Effect::ScheduleSavedIndicator { generation } => {
                let event = Event::SavedIndicatorElapsed {
                    generation: *generation,
                };
                let handle = self.fire_after(self.settings.saved_indicator(), event);
                self.saved_indicator.replace(handle);
            }
            Effect::CancelSavedIndicator => self.saved_indicator.cancel(),
            Effect::ScheduleAutoSubmit => {
                let handle =
                    self.fire_after(self.settings.auto_submit_delay(), Event::AutoSubmitElapsed);
                self.auto_submit.replace(handle);
            }
            Effect::CancelAutoSubmit => self.auto_submit.cancel(),
            Effect::Persist(_) | Effect::Finished(_) => {}
        }
    }

    fn fire_after(&self, delay: Duration, event: Event) -> JoinHandle<()> {
        let tx = self.timer_tx.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(event);
        })
    }
}
