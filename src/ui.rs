use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    widgets::{Block, Borders},
    Frame,
};

use crate::app::App;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::{pretty_bytes, TreeWidget};
use crate::theme::ThemeColors;
use crate::tree::flatten::RowKind;
use crate::tree::store::LoadState;

/// Render the application UI: the artifact tree above a one-line status bar.
pub fn render(app: &mut App, frame: &mut Frame, theme: &ThemeColors, use_icons: bool) {
    let chunks =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(frame.area());

    // Keep the selected row visible inside the bordered tree panel.
    let visible_height = chunks[0].height.saturating_sub(2) as usize;
    app.update_scroll(visible_height);

    let block = Block::default()
        .title(format!(" artifacts: {} ", app.store.run_id()))
        .borders(Borders::ALL)
        .style(Style::default().fg(theme.tree_fg))
        .border_style(Style::default().fg(theme.border_fg));

    let tree = TreeWidget::new(
        &app.rows,
        app.selected_index,
        app.scroll_offset,
        theme,
        use_icons,
    )
    .block(block);
    frame.render_widget(tree, chunks[0]);

    let run_label = format!(
        "run {}/{}: {}",
        app.run_index + 1,
        app.runs.len(),
        app.store.run_id()
    );
    let info = selection_info(app);
    let mut status = StatusBarWidget::new(&run_label, &info, theme);
    if let Some((message, _)) = &app.status_message {
        // Failure messages are prefixed with ✗ when set.
        status = status.status_message(message, message.starts_with('✗'));
    }
    frame.render_widget(status, chunks[1]);
}

/// One-line summary of the selected row for the status bar.
fn selection_info(app: &App) -> String {
    let Some(row) = app.selected_row() else {
        return String::new();
    };
    match &row.kind {
        RowKind::File { file_size } => match file_size {
            Some(size) => format!("{}  {}", row.name, pretty_bytes(*size)),
            None => row.name.clone(),
        },
        RowKind::Dir { .. } => match app.store.find(&row.path).map(|n| &n.load_state) {
            Some(LoadState::Loaded) => {
                let count = app
                    .store
                    .find(&row.path)
                    .and_then(|n| n.children.as_ref())
                    .map(|c| c.len())
                    .unwrap_or(0);
                format!("{}/  {} items", row.name, count)
            }
            Some(LoadState::Loading) => format!("{}/  loading", row.name),
            Some(LoadState::Failed(_)) => format!(
                "{}/  {}",
                row.name,
                app.store.error_at(&row.path).unwrap_or("failed")
            ),
            _ => format!("{}/", row.name),
        },
        RowKind::Loading => "loading".to_string(),
        RowKind::Error => row.name.clone(),
    }
}
