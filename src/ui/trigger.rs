use crate::controller::SearchOverlay;

/// The bar button. Holds no state of its own; activating it toggles the
/// overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trigger;

impl Trigger {
    pub const LABEL: &'static str = "Universal search?";
    pub const HINT: &'static str = "⌘+K";

    pub fn activate(&self, overlay: &mut SearchOverlay) {
        overlay.toggle(None);
    }
}
