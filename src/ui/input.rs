use std::cell::Cell;
use std::rc::Rc;

use crate::controller::InputFocus;

/// Focus hand-off between the overlay and the frontend. The overlay raises
/// it when it opens; the frontend consumes it after dispatching the event.
#[derive(Debug, Clone, Default)]
pub struct FocusRequest(Rc<Cell<bool>>);

impl FocusRequest {
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl InputFocus for FocusRequest {
    fn focus(&mut self) {
        self.0.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_the_request() {
        let request = FocusRequest::default();
        let mut handle = request.clone();
        assert!(!request.take());
        handle.focus();
        assert!(request.take());
        assert!(!request.take());
    }
}
