use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use docqa_core::{update, AppState, Msg};
use docqa_logging::{docqa_info, docqa_warn, LogDestination};
use log::LevelFilter;

use super::effects::EffectRunner;
use super::ui::constants::HELP_TEXT;
use super::ui::input::{parse_line, InputCommand};
use super::ui::render::{Renderer, Surface};
use super::ui::terminal::TerminalSurface;
use crate::cli::Args;
use crate::config::AppConfig;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum LoopEvent {
    Input(InputCommand),
    Completed(Msg),
}

pub fn run_app(args: Args) -> anyhow::Result<()> {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    docqa_logging::initialize(LogDestination::from(args.log), level);

    let config = AppConfig::resolve(&args).context("loading configuration")?;
    docqa_info!("Starting docqa against {}", config.server_url);

    let (event_tx, event_rx) = mpsc::channel::<LoopEvent>();
    let runner = EffectRunner::new(config.client_settings(), event_tx.clone())
        .context("starting request engine")?;

    let mut app = App::new(runner, TerminalSurface::stdout());
    app.surface.show_help(HELP_TEXT);
    if let Some(file) = args.file {
        app.dispatch(vec![Msg::FileSelected(file)]);
    }

    // Stdin blocks, so it gets its own thread feeding the loop.
    thread::spawn(move || {
        forward_input(std::io::stdin().lock(), &event_tx);
        let _ = event_tx.send(LoopEvent::Input(InputCommand::Quit));
    });

    while let Ok(event) = event_rx.recv() {
        if !app.handle(event) {
            break;
        }
    }
    docqa_info!("Exiting");
    Ok(())
}

/// Parses each line from `reader` into the loop until end of input.
/// Lines that are not UTF-8 are skipped rather than ending the session.
fn forward_input<R: BufRead>(mut reader: R, event_tx: &mpsc::Sender<LoopEvent>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return,
            Ok(_) => {}
            Err(err) => {
                docqa_warn!("Reading input failed: {}", err);
                return;
            }
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            docqa_warn!("Skipping input line that is not UTF-8 ({} bytes)", buf.len());
            continue;
        };
        if event_tx.send(LoopEvent::Input(parse_line(line))).is_err() {
            return;
        }
    }
}

struct App<S: Surface> {
    state: AppState,
    renderer: Renderer,
    runner: EffectRunner,
    surface: S,
}

impl<S: Surface> App<S> {
    fn new(runner: EffectRunner, surface: S) -> Self {
        Self {
            state: AppState::new(),
            renderer: Renderer::new(),
            runner,
            surface,
        }
    }

    /// Returns `false` once the user asked to quit.
    fn handle(&mut self, event: LoopEvent) -> bool {
        match event {
            LoopEvent::Input(InputCommand::Dispatch(msgs)) => self.dispatch(msgs),
            LoopEvent::Input(InputCommand::Help) => self.surface.show_help(HELP_TEXT),
            LoopEvent::Input(InputCommand::Unknown(message)) => self.surface.alert(&message),
            LoopEvent::Input(InputCommand::Quit) => return false,
            LoopEvent::Completed(msg) => self.dispatch(vec![msg]),
        }
        true
    }

    /// Applies the messages, renders once, then runs the collected effects,
    /// so entries appended by a flow are visible before its request goes out.
    fn dispatch(&mut self, msgs: Vec<Msg>) {
        let mut effects = Vec::new();
        for msg in msgs {
            self.warn_if_stale(&msg);
            let state = std::mem::take(&mut self.state);
            let (state, mut more) = update(state, msg);
            self.state = state;
            effects.append(&mut more);
        }

        if self.state.consume_dirty() {
            self.renderer.render(&self.state, &mut self.surface);
        }
        self.runner.run(effects, &mut self.surface);
    }

    fn warn_if_stale(&self, msg: &Msg) {
        let request_id = match msg {
            Msg::UploadFinished { request_id, .. } | Msg::ChatFinished { request_id, .. } => {
                *request_id
            }
            _ => return,
        };
        if self.state.awaiting() != Some(request_id) {
            docqa_warn!(
                "Ignoring completion for request {} (awaiting {:?})",
                request_id,
                self.state.awaiting()
            );
        }
    }
}
