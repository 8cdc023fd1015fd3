use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::theme::ThemeColors;
use crate::tree::flatten::{RowKind, TreeRow};

/// Tree widget that renders the artifact rows with box-drawing characters.
pub struct TreeWidget<'a> {
    rows: &'a [TreeRow],
    selected_index: usize,
    scroll_offset: usize,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(
        rows: &'a [TreeRow],
        selected_index: usize,
        scroll_offset: usize,
        theme: &'a ThemeColors,
        use_icons: bool,
    ) -> Self {
        Self {
            rows,
            selected_index,
            scroll_offset,
            theme,
            use_icons,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = block.into();
        self
    }

    /// Build the prefix string for tree indentation using box-drawing characters.
    ///
    /// We need to know the ancestor chain to draw continuation lines correctly.
    fn build_prefix(row: &TreeRow, rows: &[TreeRow], row_index: usize) -> String {
        if row.depth == 0 {
            return String::new();
        }

        let mut parts: Vec<&str> = Vec::new();

        // For each ancestor level (1..depth), walk backwards to find the
        // ancestor at that depth and check whether it was a last sibling.
        for d in 1..row.depth {
            let mut ancestor_is_last = false;
            for j in (0..row_index).rev() {
                if rows[j].depth == d {
                    ancestor_is_last = rows[j].is_last_sibling;
                    break;
                }
                if rows[j].depth < d {
                    break;
                }
            }
            if ancestor_is_last {
                parts.push("   ");
            } else {
                parts.push("│  ");
            }
        }

        if row.is_last_sibling {
            parts.push("└──");
        } else {
            parts.push("├──");
        }

        parts.join("")
    }

    /// Get the row indicator: expand marker, file icon, or failure mark.
    fn row_indicator(&self, row: &TreeRow) -> &'static str {
        match &row.kind {
            RowKind::Dir { expanded, .. } => {
                if *expanded {
                    "▾ "
                } else {
                    "▸ "
                }
            }
            RowKind::File { .. } => {
                if self.use_icons {
                    Self::file_icon_by_ext(&row.name)
                } else {
                    "  "
                }
            }
            RowKind::Loading => "  ",
            RowKind::Error => "✗ ",
        }
    }

    /// Get a Nerd Font icon for a file based on its extension.
    fn file_icon_by_ext(name: &str) -> &'static str {
        let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
        match ext.as_str() {
            "json" => " ",
            "yaml" | "yml" | "toml" | "ini" | "cfg" => " ",
            "md" | "txt" | "log" => " ",
            "csv" | "tsv" | "parquet" => " ",
            "py" => " ",
            "ipynb" => " ",
            "png" | "jpg" | "jpeg" | "gif" | "svg" => " ",
            "zip" | "tar" | "gz" | "xz" => " ",
            "pkl" | "pt" | "pth" | "ckpt" | "onnx" | "bin" => " ",
            "html" | "htm" => " ",
            _ => " ",
        }
    }

    /// Trailing size annotation for file rows.
    fn size_suffix(row: &TreeRow) -> String {
        match row.kind {
            RowKind::File {
                file_size: Some(size),
            } => format!("  {}", pretty_bytes(size)),
            _ => String::new(),
        }
    }
}

impl<'a> Widget for TreeWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let visible_height = inner_area.height as usize;
        if self.rows.is_empty() || visible_height == 0 {
            return;
        }

        let visible_rows = self
            .rows
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(visible_height);

        for (i, (idx, row)) in visible_rows.enumerate() {
            let y = inner_area.y + i as u16;
            if y >= inner_area.y + inner_area.height {
                break;
            }

            let prefix = Self::build_prefix(row, self.rows, idx);
            let indicator = self.row_indicator(row);

            let style = if idx == self.selected_index {
                Style::default()
                    .bg(self.theme.tree_selected_bg)
                    .fg(self.theme.tree_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                match &row.kind {
                    RowKind::Dir { .. } => Style::default()
                        .fg(self.theme.tree_dir_fg)
                        .add_modifier(Modifier::BOLD),
                    RowKind::File { .. } => Style::default().fg(self.theme.tree_file_fg),
                    RowKind::Loading => Style::default()
                        .fg(self.theme.info_fg)
                        .add_modifier(Modifier::ITALIC),
                    RowKind::Error => Style::default().fg(self.theme.error_fg),
                }
            };

            let line_content = format!(
                "{}{}{}{}",
                prefix,
                indicator,
                row.name,
                Self::size_suffix(row)
            );
            let line = Line::from(Span::styled(line_content, style));

            let line_area = Rect::new(inner_area.x, y, inner_area.width, 1);
            buf.set_line(line_area.x, line_area.y, &line, line_area.width);
        }
    }
}

/// Human-readable byte count: `512 B`, `4.0 KB`, `1.2 MB`, ...
pub fn pretty_bytes(n: u64) -> String {
    if n < 1024 {
        return format!("{} B", n);
    }
    let units = ["KB", "MB", "GB", "TB"];
    let mut value = n as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < units.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, units[unit])
}
