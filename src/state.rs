use std::rc::Rc;

use log::{info, warn};

use crate::config::Config;
use crate::controller::SearchOverlay;
use crate::events::{DomEvent, EventTarget, Key, KeyboardEvent, PointerEvent, Region};
use crate::model::Entry;
use crate::ui::input::FocusRequest;
use crate::ui::layout::{self, PopoverLayout};
use crate::ui::trigger::Trigger;

/// Side effects the frontend carries out on behalf of the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Open(Entry),
    Exit,
}

pub struct AppState {
    pub config: Config,
    pub document: EventTarget<SearchOverlay>,
    pub overlay: SearchOverlay,
    pub trigger: Trigger,
    pub focus: FocusRequest,
    pub input_focused: bool,
    pub selected_index: usize,
    pub width: f32,
    pub height: f32,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let dataset = Rc::new(config.dataset());
        if dataset.is_empty() {
            warn!("AppState: no categories configured, the overlay will be empty");
        } else {
            info!("AppState: {} categories, {} links", dataset.len(), dataset.entry_count());
        }
        let focus = FocusRequest::default();
        let document = EventTarget::new();
        let mut overlay = SearchOverlay::new(dataset, Box::new(focus.clone()));
        overlay.mount(&document);

        let width = config.theme.popover_width as f32;
        let height = config.general.bar_height as f32;
        Self {
            config,
            document,
            overlay,
            trigger: Trigger,
            focus,
            input_focused: false,
            selected_index: 0,
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.sync_container();
    }

    pub fn popover_layout(&self) -> PopoverLayout {
        layout::popover(
            self.width,
            self.height,
            &self.config.theme,
            self.overlay.results(),
            self.selected_index,
        )
    }

    pub fn trigger_region(&self) -> Region {
        layout::trigger(self.width, self.config.general.bar_height as f32)
    }

    pub fn handle_key(&mut self, event: KeyboardEvent) -> Option<Action> {
        let mut event = DomEvent::KeyDown(event);
        self.document.dispatch(&mut event, &mut self.overlay);
        self.after_event();

        let DomEvent::KeyDown(key) = event else {
            return None;
        };
        if key.default_prevented() {
            return None;
        }
        if !self.overlay.is_visible() {
            return (key.key == Key::Escape).then_some(Action::Exit);
        }
        if key.ctrl || key.meta {
            return None;
        }

        match key.key {
            Key::Char(c) => {
                let mut query = self.overlay.query().to_string();
                query.push(c);
                self.update_query(query);
            }
            Key::Backspace => {
                let mut query = self.overlay.query().to_string();
                if query.pop().is_some() {
                    self.update_query(query);
                }
            }
            Key::Up => self.move_selection(-1),
            Key::Down => self.move_selection(1),
            Key::Enter => return self.get_selected().cloned().map(Action::Open),
            Key::Escape | Key::Other => {}
        }
        None
    }

    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> Option<Action> {
        self.sync_container();
        let was_visible = self.overlay.is_visible();

        let mut event = DomEvent::PointerDown(PointerEvent { x, y });
        self.document.dispatch(&mut event, &mut self.overlay);

        let action = if !was_visible {
            if self.trigger_region().contains(x, y) {
                self.trigger.activate(&mut self.overlay);
            }
            None
        } else if self.overlay.is_visible() {
            self.popover_layout().item_at(x, y).and_then(|index| {
                self.selected_index = index;
                self.get_selected().cloned().map(Action::Open)
            })
        } else {
            None
        };

        self.after_event();
        action
    }

    /// Pointer hover highlights the item underneath.
    pub fn handle_pointer_motion(&mut self, x: f32, y: f32) -> bool {
        if !self.overlay.is_visible() {
            return false;
        }
        match self.popover_layout().item_at(x, y) {
            Some(index) if index != self.selected_index => {
                self.selected_index = index;
                true
            }
            _ => false,
        }
    }

    pub fn update_query(&mut self, query: String) {
        self.overlay.set_query(query);
        self.selected_index = 0;
        self.sync_container();
    }

    pub fn move_selection(&mut self, delta: i32) {
        let len = self.overlay.results().item_count();
        if len == 0 {
            self.selected_index = 0;
            return;
        }

        let len = len as i32;
        let new_index = (self.selected_index as i32 + delta).rem_euclid(len);
        self.selected_index = new_index as usize;
    }

    pub fn get_selected(&self) -> Option<&Entry> {
        self.overlay.results().item_at(self.selected_index)
    }

    fn after_event(&mut self) {
        if self.focus.take() {
            self.input_focused = true;
        }
        if !self.overlay.is_visible() {
            self.input_focused = false;
        }
        self.sync_container();
    }

    fn sync_container(&mut self) {
        let region = self
            .overlay
            .is_visible()
            .then(|| self.popover_layout().container);
        self.overlay.set_container(region);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        let mut state = AppState::new(Config::default());
        state.resize(1920.0, 1080.0);
        state
    }

    fn ctrl_k() -> KeyboardEvent {
        KeyboardEvent::new(Key::Char('k')).with_ctrl()
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            assert_eq!(state.handle_key(KeyboardEvent::new(Key::Char(c))), None);
        }
    }

    #[test]
    fn shortcut_opens_and_focuses_input() {
        let mut state = state();
        assert!(!state.input_focused);
        state.handle_key(ctrl_k());
        assert!(state.overlay.is_visible());
        assert!(state.input_focused);
        assert!(state.overlay.container().is_some());
    }

    #[test]
    fn typing_filters_and_resets_selection() {
        let mut state = state();
        state.handle_key(ctrl_k());
        state.move_selection(3);
        type_text(&mut state, "shad");
        assert_eq!(state.overlay.query(), "shad");
        assert_eq!(state.selected_index, 0);
        let labels: Vec<_> = state
            .overlay
            .results()
            .flat_items()
            .map(|(_, e)| e.label.as_str())
            .collect();
        assert_eq!(labels, ["ShadCN", "ShadCN installation"]);

        state.handle_key(KeyboardEvent::new(Key::Backspace));
        assert_eq!(state.overlay.query(), "sha");
    }

    #[test]
    fn typing_while_hidden_is_ignored() {
        let mut state = state();
        type_text(&mut state, "abc");
        assert_eq!(state.overlay.query(), "");
    }

    #[test]
    fn ctrl_chords_do_not_edit_query() {
        let mut state = state();
        state.handle_key(ctrl_k());
        state.handle_key(ctrl_k());
        state.handle_key(KeyboardEvent::new(Key::Char('a')).with_ctrl());
        assert_eq!(state.overlay.query(), "");
        assert!(state.overlay.is_visible());
    }

    #[test]
    fn selection_wraps() {
        let mut state = state();
        state.move_selection(-1);
        assert_eq!(state.selected_index, 11);
        state.move_selection(1);
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn enter_opens_selected_entry() {
        let mut state = state();
        state.handle_key(ctrl_k());
        type_text(&mut state, "linked");
        let action = state.handle_key(KeyboardEvent::new(Key::Enter));
        assert!(matches!(action, Some(Action::Open(ref e)) if e.label == "LinkedIn"));
    }

    #[test]
    fn enter_with_no_results_does_nothing() {
        let mut state = state();
        state.handle_key(ctrl_k());
        type_text(&mut state, "zzz");
        assert_eq!(state.handle_key(KeyboardEvent::new(Key::Enter)), None);
    }

    #[test]
    fn escape_exits_only_from_the_bar() {
        let mut state = state();
        assert_eq!(state.handle_key(KeyboardEvent::new(Key::Escape)), Some(Action::Exit));
        state.handle_key(ctrl_k());
        assert_eq!(state.handle_key(KeyboardEvent::new(Key::Escape)), None);
        assert!(state.overlay.is_visible());
    }

    #[test]
    fn trigger_click_opens_and_backdrop_click_closes() {
        let mut state = state();
        let trigger = state.trigger_region();
        state.handle_pointer_down(trigger.x + 1.0, trigger.y + 1.0);
        assert!(state.overlay.is_visible());
        assert!(state.input_focused);

        type_text(&mut state, "read");
        state.handle_pointer_down(1.0, 1.0);
        assert!(!state.overlay.is_visible());
        assert!(!state.input_focused);
        assert_eq!(state.overlay.query(), "read");
    }

    #[test]
    fn click_on_item_opens_it() {
        let mut state = state();
        state.handle_key(ctrl_k());
        let layout = state.popover_layout();
        let row = layout
            .rows
            .iter()
            .find(|r| matches!(r.kind, layout::RowKind::Item(1)))
            .unwrap()
            .region;
        let action = state.handle_pointer_down(row.x + 4.0, row.y + 4.0);
        assert!(matches!(action, Some(Action::Open(ref e)) if e.label == "Github Profile"));
        assert!(state.overlay.is_visible());
        assert_eq!(state.selected_index, 1);
    }

    #[test]
    fn click_inside_popover_keeps_it_open() {
        let mut state = state();
        state.handle_key(ctrl_k());
        let input = state.popover_layout().input;
        assert_eq!(state.handle_pointer_down(input.x + 2.0, input.y + 2.0), None);
        assert!(state.overlay.is_visible());
    }

    #[test]
    fn hover_moves_selection() {
        let mut state = state();
        assert!(!state.handle_pointer_motion(0.0, 0.0));
        state.handle_key(ctrl_k());
        let row = state
            .popover_layout()
            .rows
            .iter()
            .find(|r| matches!(r.kind, layout::RowKind::Item(2)))
            .unwrap()
            .region;
        assert!(state.handle_pointer_motion(row.x + 1.0, row.y + 1.0));
        assert_eq!(state.selected_index, 2);
        assert!(!state.handle_pointer_motion(row.x + 1.0, row.y + 1.0));
    }
}
