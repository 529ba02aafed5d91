use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use wordquiz::{
    game::{AppCloser, Game},
    rules::Rules,
    runtime::{FixedTicker, QuizEvent, Runner, TestEventSource},
    session::{AlertAction, Input, Phase, SessionMachine},
    task_generator::TaskGenerator,
    words::{BundledWords, WordPair},
};

// Headless integration: the real timer and deferred workers feed a Runner, no TTY involved.

struct FlagCloser(Rc<Cell<bool>>);

impl AppCloser for FlagCloser {
    fn close(&mut self) {
        self.0.set(true);
    }
}

fn fast_rules() -> Rules {
    Rules {
        max_attempt_time: 2,
        tick_interval: Duration::from_millis(5),
        close_delay: Duration::from_millis(10),
        ..Rules::default()
    }
}

fn pairs(n: usize) -> Vec<WordPair> {
    (0..n)
        .map(|i| WordPair::new(format!("word{i}"), format!("palabra{i}")))
        .collect()
}

fn runner() -> Runner<TestEventSource, FixedTicker> {
    Runner::new(
        TestEventSource::new(),
        FixedTicker::new(Duration::from_millis(5)),
    )
}

/// Step the loop until `done` holds or the step budget runs out.
fn drive<F>(game: &mut Game, runner: &Runner<TestEventSource, FixedTicker>, done: F) -> bool
where
    F: Fn(&Game) -> bool,
{
    for _ in 0..2_000u32 {
        if done(&*game) {
            return true;
        }
        let event = runner.step();
        game.handle_event(&event);
    }
    done(&*game)
}

#[test]
fn headless_timeouts_end_the_session() {
    let runner = runner();
    let mut game = Game::new(
        SessionMachine::new(fast_rules()),
        TaskGenerator::with_seed(Box::new(pairs(10)), 0.25, 1),
        Box::new(wordquiz::game::NoopCloser),
        runner.sender(),
    );

    game.dispatch(Input::StartSession);
    assert!(game.timer_running());

    let ended = drive(&mut game, &runner, |g| g.state().phase == Phase::Ended);

    assert!(ended, "three timeouts should end the session");
    let state = game.state();
    assert_eq!(state.wrong_count, 3);
    assert_eq!(state.correct_count, 0);
    assert_eq!(state.current_index, 2);
    assert!(!game.timer_running());
    let alert = state.pending_alert.as_ref().unwrap();
    assert_eq!((alert.correct, alert.wrong), (0, 3));
}

#[test]
fn headless_perfect_answers_hit_the_attempt_cap() {
    let runner = runner();
    let mut game = Game::new(
        SessionMachine::new(Rules {
            tick_interval: Duration::from_secs(60),
            ..Rules::default()
        }),
        TaskGenerator::with_seed(Box::new(BundledWords::default()), 0.25, 4),
        Box::new(wordquiz::game::NoopCloser),
        runner.sender(),
    );

    game.dispatch(Input::StartSession);
    while game.state().phase == Phase::Playing {
        let truth = game.state().current_task().unwrap().is_correct;
        game.dispatch(Input::Answer(truth));
    }

    let state = game.state();
    assert_eq!(state.phase, Phase::Ended);
    assert_eq!(state.correct_count, 15);
    assert_eq!(state.wrong_count, 0);
}

#[test]
fn headless_close_and_come_back() {
    let runner = runner();
    let closed = Rc::new(Cell::new(false));
    let mut game = Game::new(
        SessionMachine::new(fast_rules()),
        TaskGenerator::with_seed(Box::new(pairs(10)), 0.25, 2),
        Box::new(FlagCloser(closed.clone())),
        runner.sender(),
    );

    game.dispatch(Input::StartSession);
    for _ in 0..3 {
        let truth = game.state().current_task().unwrap().is_correct;
        game.dispatch(Input::Answer(!truth));
    }
    assert_eq!(game.state().phase, Phase::Ended);

    game.dispatch(Input::Alert(AlertAction::CloseApp));
    assert!(closed.get());
    assert!(game.state().pending_alert.is_none());

    let reset = drive(&mut game, &runner, |g| g.state().awaiting_restart_signal);
    assert!(reset, "deferred reset should arrive");
    assert_eq!(game.state().phase, Phase::Idle);
    assert_eq!(game.state().wrong_count, 0);

    game.dispatch(Input::BecameActive);
    assert_eq!(game.state().phase, Phase::Playing);
    assert!(!game.state().awaiting_restart_signal);
    assert_eq!(game.state().tasks.len(), 10);
}

#[test]
fn headless_restart_ignores_ticks_from_old_timer() {
    let runner = runner();
    let mut game = Game::new(
        SessionMachine::new(fast_rules()),
        TaskGenerator::with_seed(Box::new(pairs(10)), 0.25, 3),
        Box::new(wordquiz::game::NoopCloser),
        runner.sender(),
    );

    game.dispatch(Input::StartSession);
    runner.sender().send(QuizEvent::Tick(1)).unwrap();
    game.dispatch(Input::StartSession);

    // the first queued event is the forged tick from the first timer
    let event = runner.step();
    assert!(matches!(event, QuizEvent::Tick(_)));
    game.handle_event(&event);
    assert_eq!(game.state().timer_ticks, 0);
    assert_eq!(game.state().wrong_count, 0);
}
