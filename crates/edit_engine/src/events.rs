//! Event subscription and synchronous dispatch

use serde::{Deserialize, Serialize};

/// Notifications fired synchronously after the corresponding mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorEvent {
    StyleChanged,
    SelectionChanged,
    LayoutChanged,
}

pub type EventCallback = Box<dyn FnMut(EditorEvent)>;

#[derive(Default)]
pub struct EventHub {
    style: Vec<EventCallback>,
    selection: Vec<EventCallback>,
    layout: Vec<EventCallback>,
}

impl EventHub {
    pub fn on(&mut self, event: EditorEvent, callback: EventCallback) {
        self.slot(event).push(callback);
    }

    /// Callbacks are moved out for the duration of the dispatch so a
    /// callback may register further callbacks
    pub fn emit(&mut self, event: EditorEvent) {
        let mut callbacks = std::mem::take(self.slot(event));
        for cb in callbacks.iter_mut() {
            cb(event);
        }
        let slot = self.slot(event);
        let late = std::mem::replace(slot, callbacks);
        slot.extend(late);
    }

    fn slot(&mut self, event: EditorEvent) -> &mut Vec<EventCallback> {
        match event {
            EditorEvent::StyleChanged => &mut self.style,
            EditorEvent::SelectionChanged => &mut self.selection,
            EditorEvent::LayoutChanged => &mut self.layout,
        }
    }
}
