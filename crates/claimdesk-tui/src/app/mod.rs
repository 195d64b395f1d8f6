mod update;


use claimdesk_core::{AnalysisView, SearchOutcome};

use crate::theme::Theme;

/// Whether keystrokes are commands or go into the search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

/// Top-level UI state: the analysis view plus purely presentational bits.
pub struct App {
    pub view: AnalysisView,
    pub theme: Theme,
    pub input_mode: InputMode,
    /// Highlighted row of the search dropdown.
    pub result_cursor: usize,
    pub show_help: bool,
    pub should_quit: bool,
    pub tick: usize,
}

impl App {
    pub fn new(view: AnalysisView, theme: Theme) -> Self {
        Self {
            view,
            theme,
            input_mode: InputMode::Normal,
            result_cursor: 0,
            show_help: false,
            should_quit: false,
            tick: 0,
        }
    }

    /// Hand a debouncer outcome to the view and keep the cursor in range.
    pub fn handle_search_outcome(&mut self, outcome: SearchOutcome) {
        self.view.apply_search_outcome(outcome);
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        let len = self.view.search_results().len();
        if self.result_cursor >= len {
            self.result_cursor = len.saturating_sub(1);
        }
    }

    pub fn view(&self, f: &mut ratatui::Frame) {
        crate::view::analysis::render(f, self);
        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
    }
}
