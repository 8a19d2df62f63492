//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use neckview_core::store::StoreEvent;
use tracing::debug;

use crate::common::ScreenLayout;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::table;

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            let ticked = app.table.tick(app.now);
            let expired = app.status.expire(app.now.instant);
            if ticked || expired {
                app.needs_render = true;
            }
            vec![]
        }
        UiEvent::Frame { width, height, now } => {
            app.now = now;
            handle_frame(app, width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Store(store_event) => {
            handle_store_event(app, &store_event);
            vec![]
        }
        UiEvent::ClipboardCopied { chars } => {
            let noun = if chars == 1 { "character" } else { "characters" };
            app.status
                .info(format!("Copied {chars} {noun}"), app.now.instant);
            app.needs_render = true;
            vec![]
        }
        UiEvent::ClipboardFailed { error } => {
            app.status.error(format!("Copy failed: {error}"), app.now.instant);
            app.needs_render = true;
            vec![]
        }
    }
}

fn handle_frame(app: &mut AppState, width: u16, height: u16) {
    let screen = ScreenLayout::new(width, height);
    if screen != app.screen {
        app.screen = screen;
        app.table.set_viewport(screen.body.width, screen.body.height);
        app.needs_render = true;
    }
}

fn handle_store_event(app: &mut AppState, event: &StoreEvent) {
    if app.header.apply(event) {
        app.needs_render = true;
    }
    if let StoreEvent::Update(snapshot) = event {
        let report = app.table.apply_snapshot(snapshot, app.now);
        if !report.is_unchanged() {
            debug!(ops = report.ops.len(), rows = app.table.rows().len(), "table reconciled");
            app.needs_render = true;
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Mouse(mouse) => {
            let effect = table::handle_mouse(&mut app.table, &app.screen, mouse);
            app.needs_render = true;
            effect.into_iter().collect()
        }
        Event::Resize(..) => {
            app.needs_render = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.kind != KeyEventKind::Press {
        return vec![];
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            vec![UiEffect::Quit]
        }
        KeyCode::Char('q') => vec![UiEffect::Quit],
        KeyCode::Char('r') => {
            app.status.info("Refreshing…", app.now.instant);
            app.needs_render = true;
            vec![UiEffect::Refresh]
        }
        KeyCode::Esc => {
            app.table.selection.clear();
            app.needs_render = true;
            vec![]
        }
        code => {
            if table::handle_key(&mut app.table, code) {
                app.needs_render = true;
            }
            vec![]
        }
    }
}
