use std::{
    cell::Cell,
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    rc::Rc,
    time::Duration,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use wordquiz::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    game::{AppCloser, Game},
    logging,
    rules::Rules,
    runtime::{CrosstermEventSource, FixedTicker, QuizEvent, Runner},
    session::{AlertAction, Input, SessionMachine, SessionState},
    task_generator::TaskGenerator,
    ui::{action_for_key, QuizView},
};

const REDRAW_INTERVAL_MS: u64 = 250;

/// timed vocabulary flashcard quiz
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed vocabulary quiz: a word and a candidate translation appear, and you decide whether the translation is right before time runs out. Three wrong answers end the game."
)]
pub struct Cli {
    /// JSON word list to use instead of the bundled English-Spanish one
    #[clap(short = 'w', long = "words")]
    words_file: Option<PathBuf>,

    /// log filter for the log file (RUST_LOG takes precedence)
    #[clap(long)]
    log_level: Option<String>,

    /// remember --words and --log-level for future runs
    #[clap(long)]
    save_config: bool,
}

/// "Closes" the quiz by leaving the alternate screen until the user comes back
struct SuspendCloser {
    suspended: Rc<Cell<bool>>,
}

impl AppCloser for SuspendCloser {
    fn close(&mut self) {
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, LeaveAlternateScreen) {
            log::warn!("could not leave alternate screen: {err}");
        }
        if let Err(err) = write_close_notice(&mut stdout) {
            log::warn!("could not print close notice: {err}");
        }
        self.suspended.set(true);
    }
}

fn write_close_notice<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "wordquiz is closed. Press any key to come back.\r\n")?;
    out.flush()
}

/// Wake-up signals (keys, focus) seen while the quiz is closed.
///
/// The session only listens for them once the deferred reset has landed, so an early signal is
/// held back and replayed when it does.
#[derive(Debug, Default)]
struct PendingWake {
    requested: bool,
}

impl PendingWake {
    /// Returns true when the quiz should come back right away.
    fn signal(&mut self, state: &SessionState) -> bool {
        self.requested = !state.awaiting_restart_signal;
        state.awaiting_restart_signal
    }

    /// Returns true when an earlier signal can now be honoured.
    fn poll(&mut self, state: &SessionState) -> bool {
        if self.requested && state.awaiting_restart_signal {
            self.requested = false;
            return true;
        }
        false
    }
}

#[derive(Debug, PartialEq)]
enum KeyAction {
    Dispatch(Input),
    Quit,
    Ignore,
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

fn map_key(key: &KeyEvent, state: &SessionState) -> KeyAction {
    if is_ctrl_c(key) {
        return KeyAction::Quit;
    }

    if state.pending_alert.is_some() {
        return match key.code {
            KeyCode::Esc => KeyAction::Dispatch(Input::AlertDismiss),
            KeyCode::Enter => KeyAction::Dispatch(Input::Alert(AlertAction::Restart)),
            KeyCode::Char(c) => action_for_key(c)
                .map(|action| KeyAction::Dispatch(Input::Alert(action)))
                .unwrap_or(KeyAction::Ignore),
            _ => KeyAction::Ignore,
        };
    }

    if state.awaiting_restart_signal {
        return KeyAction::Dispatch(Input::BecameActive);
    }

    match key.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Left | KeyCode::Char('y') => KeyAction::Dispatch(Input::Answer(true)),
        KeyCode::Right | KeyCode::Char('n') => KeyAction::Dispatch(Input::Answer(false)),
        KeyCode::Char('s') => KeyAction::Dispatch(Input::StartSession),
        _ => KeyAction::Ignore,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = store
        .load()
        .with_overrides(cli.words_file.clone(), cli.log_level.clone());
    if cli.save_config {
        store.save(&config)?;
    }

    if let Some(log_path) = AppDirs::log_path() {
        if let Err(err) = logging::init_file_logger(&log_path, &config.log_level) {
            eprintln!("logging disabled: {err}");
        }
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(REDRAW_INTERVAL_MS)),
    );

    let rules = Rules::default();
    let suspended = Rc::new(Cell::new(false));
    let generator = TaskGenerator::new(config.word_source(), rules.correct_fraction);
    let closer = SuspendCloser {
        suspended: suspended.clone(),
    };
    let mut game = Game::new(
        SessionMachine::new(rules),
        generator,
        Box::new(closer),
        runner.sender(),
    );

    game.dispatch(Input::StartSession);
    let mut wake = PendingWake::default();

    loop {
        if !suspended.get() {
            terminal.draw(|f| {
                f.render_widget(
                    QuizView::new(game.state(), game.machine().rules()),
                    f.area(),
                )
            })?;
        }

        let event = runner.step();
        if game.handle_event(&event) {
            if suspended.get() && wake.poll(game.state()) {
                resume(terminal, &suspended)?;
                game.dispatch(Input::BecameActive);
            }
            continue;
        }

        match event {
            QuizEvent::FocusGained => {
                if !suspended.get() {
                    game.dispatch(Input::BecameActive);
                } else if wake.signal(game.state()) {
                    resume(terminal, &suspended)?;
                    game.dispatch(Input::BecameActive);
                }
            }
            QuizEvent::Key(key) => {
                if suspended.get() && !is_ctrl_c(&key) {
                    if wake.signal(game.state()) {
                        resume(terminal, &suspended)?;
                        game.dispatch(Input::BecameActive);
                    }
                    continue;
                }

                match map_key(&key, game.state()) {
                    KeyAction::Dispatch(input) => game.dispatch(input),
                    KeyAction::Quit => break,
                    KeyAction::Ignore => {}
                }
            }
            QuizEvent::Resize | QuizEvent::Redraw => {}
            QuizEvent::Tick(_) | QuizEvent::Deferred(_) => {}
        }
    }

    Ok(())
}

fn resume<B: Backend>(terminal: &mut Terminal<B>, suspended: &Cell<bool>) -> io::Result<()> {
    execute!(io::stdout(), EnterAlternateScreen)?;
    terminal.clear()?;
    suspended.set(false);
    Ok(())
}
