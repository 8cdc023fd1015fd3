use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

/// Status bar widget: current run, selection info, key hints, or a
/// transient status message spanning the whole bar.
pub struct StatusBarWidget<'a> {
    run_label: &'a str,
    selection_info: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(run_label: &'a str, selection_info: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            run_label,
            selection_info,
            theme,
            status_message: None,
            is_error: false,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_fg)
            } else {
                Style::default().fg(self.theme.success_fg)
            };

            // Pad or truncate message to fill full width
            let display: String = if msg.chars().count() >= width {
                msg.chars().take(width).collect()
            } else {
                format!("{:<width$}", msg, width = width)
            };

            let line = Line::from(Span::styled(display, style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        // Normal bar: [run] [selection_info] [key_hints]
        let key_hints = " enter:open  r:refresh  [ ]:run  u:url  q:quit ";
        let hints_len = key_hints.len();

        let remaining = width.saturating_sub(hints_len);
        let info_len = self.selection_info.len();
        let run_budget = remaining.saturating_sub(info_len).saturating_sub(1);

        let run_display = if self.run_label.len() > run_budget {
            if run_budget > 3 {
                format!(
                    "...{}",
                    &self.run_label[self.run_label.len() - (run_budget - 3)..]
                )
            } else {
                self.run_label[..run_budget].to_string()
            }
        } else {
            self.run_label.to_string()
        };

        let info_budget = remaining.saturating_sub(run_display.len());
        let info_display = if self.selection_info.len() > info_budget {
            self.selection_info[..info_budget].to_string()
        } else {
            self.selection_info.to_string()
        };

        let gap = remaining
            .saturating_sub(run_display.len())
            .saturating_sub(info_display.len());

        let run_style = Style::default()
            .bg(self.theme.status_bg)
            .fg(self.theme.status_fg);
        let info_style = Style::default().fg(self.theme.info_fg);
        let hints_style = Style::default()
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::DIM);

        let mut spans = vec![
            Span::styled(run_display, run_style),
            Span::raw(" ".repeat(gap)),
            Span::styled(info_display, info_style),
        ];

        let used: usize = spans.iter().map(|s| s.content.len()).sum();
        let pad = width.saturating_sub(used).saturating_sub(hints_len);
        if pad > 0 {
            spans.push(Span::raw(" ".repeat(pad)));
        }
        spans.push(Span::styled(key_hints, hints_style));

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
