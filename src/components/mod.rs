//! Ratatui widgets: the artifact tree panel and the status bar.

pub mod status_bar;
pub mod tree;
