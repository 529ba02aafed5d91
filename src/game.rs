use std::collections::VecDeque;
use std::sync::mpsc::Sender;

use crate::{
    runtime::QuizEvent,
    session::{Effect, Input, SessionMachine, SessionState},
    task_generator::TaskGenerator,
    timer::{self, TimerSlot},
};

/// Platform hook that sends the app away. Fire-and-forget.
pub trait AppCloser {
    fn close(&mut self);
}

/// Closer that does nothing, for hosts without a way to close
pub struct NoopCloser;

impl AppCloser for NoopCloser {
    fn close(&mut self) {}
}

/// Owner of the session loop: feeds inputs through the state machine one at a time and carries
/// out the effects it asks for.
pub struct Game {
    state: SessionState,
    machine: SessionMachine,
    generator: TaskGenerator,
    closer: Box<dyn AppCloser>,
    timer: TimerSlot,
    events: Sender<QuizEvent>,
}

impl Game {
    pub fn new(
        machine: SessionMachine,
        generator: TaskGenerator,
        closer: Box<dyn AppCloser>,
        events: Sender<QuizEvent>,
    ) -> Self {
        let timer = TimerSlot::new(machine.rules().tick_interval);
        Self {
            state: SessionState::default(),
            machine,
            generator,
            closer,
            timer,
            events,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Apply `input` and everything it triggers before returning.
    pub fn dispatch(&mut self, input: Input) {
        let mut queue = VecDeque::from([input]);

        while let Some(input) = queue.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (next, effects) = self.machine.reduce(state, input);
            self.state = next;

            for effect in effects {
                self.run_effect(effect, &mut queue);
            }
        }
    }

    /// Timer ticks only count when they come from the timer that is armed right now.
    pub fn on_tick(&mut self, epoch: u64) {
        if self.timer.accepts(epoch) {
            self.dispatch(Input::TimerTick);
        } else {
            log::debug!("dropping stale tick from timer epoch {epoch}");
        }
    }

    /// Route timer and delayed events. Returns false for events that belong to the shell.
    pub fn handle_event(&mut self, event: &QuizEvent) -> bool {
        match event {
            QuizEvent::Tick(epoch) => {
                self.on_tick(*epoch);
                true
            }
            QuizEvent::Deferred(input) => {
                self.dispatch(input.clone());
                true
            }
            _ => false,
        }
    }

    fn run_effect(&mut self, effect: Effect, queue: &mut VecDeque<Input>) {
        match effect {
            Effect::StartTimer => self.timer.start(self.events.clone()),
            Effect::StopTimer => self.timer.stop(),
            Effect::FetchTasks => queue.push_back(Input::TasksReady(self.generator.fetch())),
            Effect::CloseApp => {
                log::info!("closing app");
                self.closer.close();
            }
            Effect::Deferred { delay, input } => {
                timer::schedule_once(self.events.clone(), delay, input)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::DataUnavailable,
        rules::Rules,
        session::{AlertAction, Phase},
        words::{WordPair, WordSource},
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc, Arc,
    };
    use std::time::Duration;

    struct CountingCloser(Arc<AtomicUsize>);

    impl AppCloser for CountingCloser {
        fn close(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct BrokenSource;

    impl WordSource for BrokenSource {
        fn load(&self) -> Result<Vec<WordPair>, DataUnavailable> {
            Err(DataUnavailable::MissingBundled("gone.json".into()))
        }
    }

    /// Loads fine once, then the file is gone
    struct VanishingSource {
        loads: AtomicUsize,
        pairs: Vec<WordPair>,
    }

    impl WordSource for VanishingSource {
        fn load(&self) -> Result<Vec<WordPair>, DataUnavailable> {
            if self.loads.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(self.pairs.clone())
            } else {
                Err(DataUnavailable::MissingBundled("words.json".into()))
            }
        }
    }

    fn pairs() -> Vec<WordPair> {
        (0..8)
            .map(|i| WordPair::new(format!("word{i}"), format!("palabra{i}")))
            .collect()
    }

    fn slow_rules() -> Rules {
        Rules {
            tick_interval: Duration::from_secs(60),
            close_delay: Duration::from_millis(5),
            ..Rules::default()
        }
    }

    fn game_with(source: Box<dyn WordSource>) -> (Game, mpsc::Receiver<QuizEvent>) {
        let (tx, rx) = mpsc::channel();
        let game = Game::new(
            SessionMachine::new(slow_rules()),
            TaskGenerator::with_seed(source, 0.25, 17),
            Box::new(NoopCloser),
            tx,
        );
        (game, rx)
    }

    #[test]
    fn start_installs_tasks_and_arms_timer() {
        let (mut game, _rx) = game_with(Box::new(pairs()));
        game.dispatch(Input::StartSession);

        let state = game.state();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.tasks.len(), 8);
        assert_eq!(state.current_source, state.tasks[0].source);
        assert!(game.timer_running());
    }

    #[test]
    fn unreadable_words_leave_game_idle() {
        let (mut game, _rx) = game_with(Box::new(BrokenSource));
        game.dispatch(Input::StartSession);

        assert_eq!(game.state().phase, Phase::Idle);
        assert!(game.state().tasks.is_empty());
        assert!(!game.timer_running());
    }

    #[test]
    fn wraparound_refetches_in_the_same_dispatch() {
        let (mut game, _rx) = game_with(Box::new(pairs()));
        game.dispatch(Input::StartSession);
        let first_list = game.state().tasks.clone();

        for _ in 0..8 {
            let answer = game.state().current_task().unwrap().is_correct;
            game.dispatch(Input::Answer(answer));
        }

        let state = game.state();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.correct_count, 8);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.tasks.len(), 8);
        assert_ne!(state.tasks, first_list);
        assert_eq!(state.current_source, state.tasks[0].source);
    }

    #[test]
    fn failed_reshuffle_shows_nothing() {
        let source = VanishingSource {
            loads: AtomicUsize::new(0),
            pairs: pairs().into_iter().take(4).collect(),
        };
        let (mut game, _rx) = game_with(Box::new(source));
        game.dispatch(Input::StartSession);
        assert_eq!(game.state().tasks.len(), 4);

        for _ in 0..4 {
            let answer = game.state().current_task().unwrap().is_correct;
            game.dispatch(Input::Answer(answer));
        }

        let state = game.state();
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.correct_count, 4);
        assert!(state.tasks.is_empty());
        assert!(state.current_task().is_none());
        assert!(state.current_source.is_empty());
        assert!(state.current_translation.is_empty());
        assert!(!game.timer_running());
    }

    #[test]
    fn ending_stops_the_timer() {
        let (mut game, _rx) = game_with(Box::new(pairs()));
        game.dispatch(Input::StartSession);
        for _ in 0..3 {
            let answer = game.state().current_task().unwrap().is_correct;
            game.dispatch(Input::Answer(!answer));
        }

        assert_eq!(game.state().phase, Phase::Ended);
        assert!(!game.timer_running());
    }

    #[test]
    fn stale_ticks_are_dropped() {
        let (mut game, _rx) = game_with(Box::new(pairs()));
        game.dispatch(Input::StartSession);
        game.dispatch(Input::StartSession);

        game.on_tick(1);
        assert_eq!(game.state().timer_ticks, 0);

        game.on_tick(2);
        assert_eq!(game.state().timer_ticks, 1);
    }

    #[test]
    fn close_app_calls_closer_and_defers_reset() {
        let closed = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();
        let mut game = Game::new(
            SessionMachine::new(slow_rules()),
            TaskGenerator::with_seed(Box::new(pairs()), 0.25, 17),
            Box::new(CountingCloser(closed.clone())),
            tx,
        );
        game.dispatch(Input::StartSession);
        game.dispatch(Input::EndSession);
        game.dispatch(Input::Alert(AlertAction::CloseApp));

        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert!(!game.state().awaiting_restart_signal);

        let event = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(game.handle_event(&event));
        assert!(game.state().awaiting_restart_signal);
        assert_eq!(game.state().phase, Phase::Idle);

        game.dispatch(Input::BecameActive);
        assert_eq!(game.state().phase, Phase::Playing);
        assert!(!game.state().awaiting_restart_signal);
        assert!(game.timer_running());
    }

    #[test]
    fn shell_events_are_not_consumed() {
        let (mut game, _rx) = game_with(Box::new(pairs()));
        assert!(!game.handle_event(&QuizEvent::Resize));
        assert!(!game.handle_event(&QuizEvent::Redraw));
    }
}
