use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::app::App;
use crate::client::{spawn_listing, ArtifactLister};
use crate::event::Event;

/// Handle a key event.
///
/// Store mutations that need a remote listing hand back a request; it is
/// spawned here so the outcome lands on the event channel.
pub fn handle_key_event(
    app: &mut App,
    key: KeyEvent,
    lister: &Arc<dyn ArtifactLister>,
    tx: &mpsc::UnboundedSender<Event>,
) {
    let request = match key.code {
        KeyCode::Char('q') => {
            app.quit();
            None
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_previous();
            None
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.select_first();
            None
        }
        KeyCode::End | KeyCode::Char('G') => {
            app.select_last();
            None
        }
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Right => {
            app.toggle_selected()
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.collapse_selected();
            None
        }
        KeyCode::Char('r') => app.refresh_selected(),
        KeyCode::Char(']') => app.next_run(),
        KeyCode::Char('[') => app.prev_run(),
        KeyCode::Char('u') => {
            app.show_download_url();
            None
        }
        _ => None,
    };

    if let Some(request) = request {
        spawn_listing(lister.clone(), request, tx.clone());
    }
}
