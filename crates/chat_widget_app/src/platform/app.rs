use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chat_widget_core::{update, Key, Msg, SessionId, WidgetState};
use chat_widget_engine::{load_or_create_session, EngineHandle, SharedSelection};
use widget_logging::{widget_info, widget_warn};

use super::config::{AppConfig, CONFIG_FILENAME};
use super::effects::EffectRunner;
use super::logging::{self, LogDestination, LOG_FILENAME};
use super::now_ms;
use super::persistence::RonFileStore;
use super::ui::constants::HELP_TEXT;
use super::ui::input::{parse_line, Command};
use super::ui::render::Renderer;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

pub(crate) enum ShellEvent {
    Msg(Msg),
    Input(Command),
    InputClosed,
}

pub fn run_app() -> Result<()> {
    let config = AppConfig::load(Path::new(CONFIG_FILENAME))?;
    let destination = if config.log_to_terminal {
        LogDestination::Both
    } else {
        LogDestination::File
    };
    logging::initialize(destination, Path::new(LOG_FILENAME));

    let store = RonFileStore::new(config.state_dir.clone());
    let session = load_or_create_session(&store, now_ms()).context("loading session id")?;
    widget_info!("Starting chat widget, endpoint={} session={}", config.base_url, session);

    let engine = EngineHandle::new(config.client_settings()).context("starting chat engine")?;
    let selection = SharedSelection::new();
    let (tx, rx) = mpsc::channel::<ShellEvent>();
    let effects = EffectRunner::new(
        engine,
        Arc::new(selection.clone()),
        config.base_url.clone(),
        tx.clone(),
    );
    spawn_input_reader(tx);

    let mut shell = Shell {
        state: WidgetState::new(SessionId::new(session)),
        renderer: Renderer::default(),
        effects,
        selection,
    };
    print_lines(&[HELP_TEXT.to_string()]);
    shell.dispatch(Msg::Mounted);

    loop {
        let event = match rx.recv_timeout(TICK_INTERVAL) {
            Ok(event) => event,
            Err(mpsc::RecvTimeoutError::Timeout) => ShellEvent::Msg(Msg::Tick),
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };
        match event {
            ShellEvent::Msg(msg) => shell.dispatch(msg),
            ShellEvent::Input(Command::Quit) | ShellEvent::InputClosed => break,
            ShellEvent::Input(command) => shell.handle_command(command),
        }
    }

    shell.dispatch(Msg::Unmounted);
    shell.effects.shutdown();
    widget_info!("Chat widget stopped");
    Ok(())
}

struct Shell {
    state: WidgetState,
    renderer: Renderer,
    effects: EffectRunner,
    selection: SharedSelection,
}

impl Shell {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = was_dirty.then(|| state.view());
        self.state = state;

        self.effects.run(effects);
        if let Some(view) = view {
            let lines = self.renderer.render(&view);
            print_lines(&lines);
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Toggle => self.dispatch(Msg::ToggleClicked),
            Command::Close => self.dispatch(Msg::CloseClicked),
            Command::Backdrop => self.dispatch(Msg::BackdropClicked),
            Command::Escape => self.dispatch(Msg::KeyPressed {
                key: Key::Escape,
                at: now_ms(),
            }),
            // Selection changes flow back through the subscription.
            Command::Select(text) => self.selection.select(text),
            Command::Unselect => self.selection.clear(),
            Command::Help => print_lines(&[HELP_TEXT.to_string()]),
            Command::Submit(text) => {
                self.type_text(&text);
                self.dispatch(Msg::KeyPressed {
                    key: Key::Enter { shift: false },
                    at: now_ms(),
                });
            }
            Command::Continue(text) => {
                self.type_text(&format!("{text}\n"));
                self.dispatch(Msg::KeyPressed {
                    key: Key::Enter { shift: true },
                    at: now_ms(),
                });
            }
            Command::Quit => {}
        }
    }

    /// Typing needs the message box, which only exists while the window is open.
    fn type_text(&mut self, text: &str) {
        if !self.state.is_open() {
            self.dispatch(Msg::ToggleClicked);
        }
        let draft = format!("{}{}", self.state.input_text(), text);
        self.dispatch(Msg::InputChanged(draft));
    }
}

fn spawn_input_reader(tx: mpsc::Sender<ShellEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    widget_warn!("stdin read failed: {}", err);
                    break;
                }
            };
            if tx.send(ShellEvent::Input(parse_line(&line))).is_err() {
                return;
            }
        }
        let _ = tx.send(ShellEvent::InputClosed);
    });
}

fn print_lines(lines: &[String]) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    let _ = out.flush();
}
