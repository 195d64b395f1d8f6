use super::{App, InputMode};
use crate::action::Action;

impl App {
    /// Apply an action. Returns `true` when the app should exit.
    pub async fn update(&mut self, action: Action) -> bool {
        // Help overlay swallows everything except its toggles and quit.
        if self.show_help {
            match action {
                Action::ToggleHelp | Action::SearchCancel => self.show_help = false,
                Action::Quit => self.should_quit = true,
                Action::Tick => self.tick = self.tick.wrapping_add(1),
                _ => {}
            }
            return self.should_quit;
        }

        match action {
            Action::None => {}
            Action::Quit => self.should_quit = true,
            Action::Tick => self.tick = self.tick.wrapping_add(1),
            Action::ToggleHelp => self.show_help = true,

            Action::StartSearch => self.input_mode = InputMode::Search,
            Action::SearchInput(c) => {
                let mut text = self.view.search_text().to_string();
                text.push(c);
                self.edit_search(text);
            }
            Action::SearchBackspace => {
                let mut text = self.view.search_text().to_string();
                text.pop();
                self.edit_search(text);
            }
            Action::SearchCancel => {
                self.view.clear_search();
                self.result_cursor = 0;
                self.input_mode = InputMode::Normal;
            }

            Action::MoveDown => {
                let len = self.view.search_results().len();
                if len > 0 {
                    self.result_cursor = (self.result_cursor + 1).min(len - 1);
                }
            }
            Action::MoveUp => {
                self.result_cursor = self.result_cursor.saturating_sub(1);
            }
            Action::AttachSelected => {
                let Some(claim) = self.view.search_results().get(self.result_cursor) else {
                    return false;
                };
                let id = claim.id.clone();
                if self.view.attach_claim(&id).await.is_ok() {
                    self.result_cursor = 0;
                    self.input_mode = InputMode::Normal;
                }
            }

            Action::MarkComplete => {
                if self.view.can_mark_complete() {
                    // Failures are already recorded as notices by the view.
                    let _ = self.view.mark_complete().await;
                }
            }
            Action::Reload => {
                let _ = self.view.load().await;
            }
        }
        self.should_quit
    }

    fn edit_search(&mut self, text: String) {
        let change = self.view.on_search_text_changed(text);
        tracing::trace!(?change, "search text edited");
        self.result_cursor = 0;
    }
}
