//! The quiz session state machine.
//!
//! All game state lives in [`SessionState`]. [`SessionMachine`] consumes it together with one
//! [`Input`] and hands back the next state plus the [`Effect`]s the owner of the session loop
//! has to carry out (timers, task generation, closing the app, delayed follow-ups).

use std::time::Duration;

use strum_macros::Display;

use crate::{error::QuizError, rules::Rules, task_generator::AttemptTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Phase {
    #[default]
    Idle,
    Playing,
    Ended,
}

/// Choices offered by the end-of-game alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AlertAction {
    #[strum(to_string = "Close App")]
    CloseApp,
    #[strum(to_string = "Try Again")]
    Restart,
}

/// End-of-game summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub correct: u32,
    pub wrong: u32,
    pub actions: [AlertAction; 2],
}

impl Alert {
    pub const TITLE: &'static str = "Game over";

    pub fn new(correct: u32, wrong: u32) -> Self {
        Self {
            correct,
            wrong,
            actions: [AlertAction::CloseApp, AlertAction::Restart],
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Want to try again? Your current result: {} correct, {} wrong.",
            self.correct, self.wrong
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub tasks: Vec<AttemptTask>,
    pub current_index: usize,
    pub current_source: String,
    pub current_translation: String,
    pub correct_count: u32,
    pub wrong_count: u32,
    /// Whole seconds since the current task was shown
    pub timer_ticks: u32,
    pub phase: Phase,
    pub pending_alert: Option<Alert>,
    /// Set between choosing Close App and the deferred reset landing
    pub reset_pending: bool,
    /// Set between closing the app and the next time it becomes active
    pub awaiting_restart_signal: bool,
}

impl SessionState {
    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn current_task(&self) -> Option<&AttemptTask> {
        self.tasks.get(self.current_index)
    }

    fn install_tasks(&mut self, tasks: Vec<AttemptTask>) -> Result<(), QuizError> {
        if tasks.is_empty() {
            return Err(QuizError::EmptyTaskSet);
        }
        self.tasks = tasks;
        self.current_index = 0;
        self.sync_display();
        Ok(())
    }

    // Scores survive, the display does not.
    fn drop_tasks(&mut self) {
        self.tasks.clear();
        self.current_index = 0;
        self.current_source.clear();
        self.current_translation.clear();
        self.timer_ticks = 0;
    }

    fn sync_display(&mut self) {
        if let Some(task) = self.tasks.get(self.current_index) {
            self.current_source = task.source.clone();
            self.current_translation = task.translation.clone();
        }
    }
}

/// Everything the session reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    StartSession,
    TasksReady(Vec<AttemptTask>),
    /// `true` when the user claims the shown translation is right
    Answer(bool),
    TimerTick,
    EndSession,
    Alert(AlertAction),
    AlertDismiss,
    /// Follow-up of closing the app: wipe the session and wait to become active again
    PrepareRestart,
    BecameActive,
}

/// Work the session asks its owner to do
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Cancel any running timer, then start ticking once per interval
    StartTimer,
    StopTimer,
    /// Generate a fresh task list and feed it back as `Input::TasksReady`
    FetchTasks,
    CloseApp,
    /// Feed `input` back after `delay`. Cannot be cancelled.
    Deferred { delay: Duration, input: Input },
}

pub type Transition = (SessionState, Vec<Effect>);

#[derive(Debug, Clone, Default)]
pub struct SessionMachine {
    rules: Rules,
}

impl SessionMachine {
    pub fn new(rules: Rules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn reduce(&self, state: SessionState, input: Input) -> Transition {
        match input {
            Input::StartSession => self.start_session(),
            Input::TasksReady(tasks) => self.tasks_ready(state, tasks),
            Input::Answer(user_says_correct) => self.answer(state, user_says_correct),
            Input::TimerTick => self.timer_tick(state),
            Input::EndSession => self.end_session(state),
            Input::Alert(action) => self.alert_action(state, action),
            Input::AlertDismiss => self.alert_dismiss(state),
            Input::PrepareRestart => self.prepare_restart(state),
            Input::BecameActive => self.became_active(state),
        }
    }

    /// Throws away whatever was in flight and starts over.
    pub fn start_session(&self) -> Transition {
        log::info!("starting a new session");
        let state = SessionState {
            phase: Phase::Playing,
            ..SessionState::default()
        };
        (state, vec![Effect::StartTimer, Effect::FetchTasks])
    }

    pub fn tasks_ready(&self, mut state: SessionState, tasks: Vec<AttemptTask>) -> Transition {
        match state.install_tasks(tasks) {
            Ok(()) => (state, vec![]),
            Err(err) => {
                log::error!("{err}, session stays idle");
                state.phase = Phase::Idle;
                state.drop_tasks();
                (state, vec![Effect::StopTimer])
            }
        }
    }

    pub fn answer(&self, mut state: SessionState, user_says_correct: bool) -> Transition {
        let expected = match state.current_task() {
            Some(task) if state.is_playing() => task.is_correct,
            _ => {
                log::debug!("ignoring answer while {}", state.phase);
                return (state, vec![]);
            }
        };

        if expected == user_says_correct {
            state.correct_count += 1;
            self.advance(state)
        } else {
            self.wrong_attempt(state)
        }
    }

    pub fn timer_tick(&self, mut state: SessionState) -> Transition {
        if !state.is_playing() || state.tasks.is_empty() {
            log::debug!("ignoring timer tick while {}", state.phase);
            return (state, vec![]);
        }

        state.timer_ticks += 1;
        if self.rules.timed_out(state.timer_ticks) {
            log::debug!("task {} timed out", state.current_index);
            state.timer_ticks = 0;
            return self.wrong_attempt(state);
        }
        (state, vec![])
    }

    pub fn end_session(&self, mut state: SessionState) -> Transition {
        log::info!(
            "session over: {} correct, {} wrong",
            state.correct_count,
            state.wrong_count
        );
        state.phase = Phase::Ended;
        state.pending_alert = Some(Alert::new(state.correct_count, state.wrong_count));
        (state, vec![Effect::StopTimer])
    }

    pub fn alert_action(&self, mut state: SessionState, action: AlertAction) -> Transition {
        match action {
            AlertAction::Restart => self.start_session(),
            AlertAction::CloseApp => {
                state.pending_alert = None;
                state.reset_pending = true;
                let reset = Effect::Deferred {
                    delay: self.rules.close_delay,
                    input: Input::PrepareRestart,
                };
                (state, vec![Effect::CloseApp, reset])
            }
        }
    }

    pub fn alert_dismiss(&self, mut state: SessionState) -> Transition {
        state.pending_alert = None;
        (state, vec![])
    }

    pub fn prepare_restart(&self, state: SessionState) -> Transition {
        // a newer session was started before the delay ran out
        if !state.reset_pending {
            log::debug!("session replaced since close, dropping deferred reset");
            return (state, vec![]);
        }

        let state = SessionState {
            awaiting_restart_signal: true,
            ..SessionState::default()
        };
        (state, vec![])
    }

    pub fn became_active(&self, state: SessionState) -> Transition {
        if state.awaiting_restart_signal {
            self.start_session()
        } else {
            (state, vec![])
        }
    }

    fn wrong_attempt(&self, mut state: SessionState) -> Transition {
        state.wrong_count += 1;
        if self.rules.wrong_limit_reached(state.wrong_count) {
            self.end_session(state)
        } else {
            self.advance(state)
        }
    }

    fn advance(&self, mut state: SessionState) -> Transition {
        state.timer_ticks = 0;
        state.current_index += 1;

        // Out of tasks: start over on a fresh shuffle without ending the session
        if state.current_index >= state.tasks.len() {
            state.current_index = 0;
            return (state, vec![Effect::FetchTasks]);
        }

        if state.current_index >= self.rules.max_attempts {
            return self.end_session(state);
        }

        state.sync_display();
        (state, vec![])
    }
}
