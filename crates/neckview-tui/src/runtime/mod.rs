//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! This is the only place side effects happen. The reducer stays pure and
//! returns effects; this module executes them.
//!
//! Store notifications arrive through a forwarder task that pushes them into
//! the inbox; the loop drains the inbox, then waits for terminal input until
//! the next tick is due.

mod inbox;

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use neckview_core::store::LiveStore;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::common::{Clipboard, Clock};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Full-screen dashboard runtime.
///
/// Terminal state is restored on drop or panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    store: LiveStore,
    handle: Handle,
    inbox_rx: UiEventReceiver,
    forwarder: JoinHandle<()>,
    tick: Duration,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Creates the runtime and subscribes to `store`.
    ///
    /// Must be called from within a Tokio runtime, before the store is started,
    /// so the first snapshot is not missed.
    pub fn new(store: LiveStore, server: &str, tick: Duration) -> Result<Self> {
        let handle = Handle::current();
        let (inbox_tx, inbox_rx): (UiEventSender, UiEventReceiver) = mpsc::unbounded_channel();

        let mut subscription = store.subscribe();
        let forwarder = handle.spawn(async move {
            while let Some(event) = subscription.recv().await {
                if inbox_tx.send(UiEvent::Store(event)).is_err() {
                    break;
                }
            }
        });

        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let now = Clock::now();
        Ok(Self {
            terminal,
            state: AppState::new(server, tick, now),
            store,
            handle,
            inbox_rx,
            forwarder,
            tick,
            last_tick: now.instant,
        })
    }

    /// Runs the main event loop until the user quits.
    ///
    /// Blocks the calling thread; call it via `block_in_place` from async code.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        let result = self.event_loop();

        let _ = terminal::disable_input_features();

        result
    }

    fn event_loop(&mut self) -> Result<()> {
        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Frame goes first so layout and clock are current for everything after it.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                    now: Clock::now(),
                },
            );

            for event in events {
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if self.state.needs_render {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                self.state.needs_render = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block for input only when there is nothing else to process.
        let poll_duration = if events.is_empty() {
            self.tick.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= self.tick {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        if !effects.is_empty() {
            self.execute_effects(effects);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::Refresh => {
                debug!("manual refresh");
                let _guard = self.handle.enter();
                // The fetch runs on its own task; the result arrives as a store update.
                drop(self.store.refresh());
            }
            UiEffect::CopyToClipboard { text } => {
                let event = match Clipboard::copy(&text) {
                    Ok(()) => UiEvent::ClipboardCopied {
                        chars: text.chars().count(),
                    },
                    Err(err) => {
                        warn!(%err, "clipboard copy failed");
                        UiEvent::ClipboardFailed {
                            error: err.to_string(),
                        }
                    }
                };
                self.dispatch_event(event);
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.forwarder.abort();
        let _ = terminal::restore_terminal();
    }
}
