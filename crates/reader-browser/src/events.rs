//! Listeners that fire when the user may have changed the selection.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use web_sys::EventTarget;

/// Keeps the selection listeners alive; dropping it detaches them.
pub struct SelectionWatcher {
    _listeners: Vec<EventListener>,
}

/// Call `on_change` after mouse or keyboard selection inside `target`.
pub fn watch_selection(
    target: &EventTarget,
    on_change: impl FnMut() + 'static,
) -> SelectionWatcher {
    let on_change = Rc::new(RefCell::new(on_change));
    let listeners = ["mouseup", "keyup"]
        .into_iter()
        .map(|event_type| {
            let on_change = Rc::clone(&on_change);
            EventListener::new(target, event_type, move |_event| {
                // A re-entrant dispatch would already be handling this change.
                if let Ok(mut callback) = on_change.try_borrow_mut() {
                    callback();
                }
            })
        })
        .collect();
    SelectionWatcher {
        _listeners: listeners,
    }
}
