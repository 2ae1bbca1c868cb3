//! Closure-based action handling for controls
//!
//! A [`ControlActions`] table stores one closure per control-event mask.
//! Firing a set of events runs every closure whose mask overlaps it.

mod button;

pub use button::Button;

use bitflags::bitflags;
use log::trace;
use std::collections::BTreeMap;
use std::fmt;

bitflags! {
    /// User-interaction triggers, laid out like the platform control events
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct ControlEvents: u32 {
        const TOUCH_DOWN = 1 << 0;
        const TOUCH_DOWN_REPEAT = 1 << 1;
        const TOUCH_DRAG_INSIDE = 1 << 2;
        const TOUCH_DRAG_OUTSIDE = 1 << 3;
        const TOUCH_DRAG_ENTER = 1 << 4;
        const TOUCH_DRAG_EXIT = 1 << 5;
        const TOUCH_UP_INSIDE = 1 << 6;
        const TOUCH_UP_OUTSIDE = 1 << 7;
        const TOUCH_CANCEL = 1 << 8;
        const VALUE_CHANGED = 1 << 12;
        const PRIMARY_ACTION_TRIGGERED = 1 << 13;
        const EDITING_DID_BEGIN = 1 << 16;
        const EDITING_CHANGED = 1 << 17;
        const EDITING_DID_END = 1 << 18;
        const EDITING_DID_END_ON_EXIT = 1 << 19;
        const ALL_TOUCH_EVENTS = 0x0000_0FFF;
        const ALL_EDITING_EVENTS = 0x000F_0000;
        const APPLICATION_RESERVED = 0x0F00_0000;
        const SYSTEM_RESERVED = 0xF000_0000;
        const ALL_EVENTS = 0xFFFF_FFFF;
    }
}

/// Closure run when a matching event fires. Receives the fired events.
pub type ControlAction = Box<dyn Fn(ControlEvents) + Send + Sync>;

/// Returned when an action is registered for no events at all. Carries the
/// rejected action back to the caller.
pub struct EmptyEventMask<F>(pub F);

impl<F> EmptyEventMask<F> {
    pub fn into_inner(self) -> F {
        self.0
    }
}

impl<F> fmt::Debug for EmptyEventMask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmptyEventMask")
    }
}

impl<F> fmt::Display for EmptyEventMask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control action registered for an empty event mask")
    }
}

impl<F> std::error::Error for EmptyEventMask<F> {}

/// One stored action per event mask
#[derive(Default)]
pub struct ControlActions {
    actions: BTreeMap<u32, ControlAction>,
}

impl ControlActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `action` for exactly `events`, returning the action it
    /// replaced, if any.
    pub fn add_action<F>(
        &mut self,
        events: ControlEvents,
        action: F,
    ) -> Result<Option<ControlAction>, EmptyEventMask<F>>
    where
        F: Fn(ControlEvents) + Send + Sync + 'static,
    {
        if events.is_empty() {
            return Err(EmptyEventMask(action));
        }
        trace!("Adding action for {:?}", events);
        Ok(self.actions.insert(events.bits(), Box::new(action)))
    }

    /// Runs every action whose mask intersects `events`, lowest mask first.
    /// Returns how many actions ran.
    pub fn send_actions(&self, events: ControlEvents) -> usize {
        let mut invoked = 0;
        for (mask, action) in &self.actions {
            if ControlEvents::from_bits_retain(*mask).intersects(events) {
                action(events);
                invoked += 1;
            }
        }
        trace!("Sent {:?} to {} actions", events, invoked);
        invoked
    }

    /// Runs the action stored for exactly `events`, if any
    pub fn invoke_action(&self, events: ControlEvents) -> bool {
        match self.actions.get(&events.bits()) {
            Some(action) => {
                action(events);
                true
            }
            None => false,
        }
    }

    pub fn remove_action(&mut self, events: ControlEvents) -> bool {
        self.actions.remove(&events.bits()).is_some()
    }

    pub fn contains(&self, events: ControlEvents) -> bool {
        self.actions.contains_key(&events.bits())
    }

    /// Union of every registered mask
    pub fn registered_events(&self) -> ControlEvents {
        self.actions
            .keys()
            .fold(ControlEvents::empty(), |acc, mask| {
                acc | ControlEvents::from_bits_retain(*mask)
            })
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Debug for ControlActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlActions")
            .field("events", &self.registered_events())
            .field("len", &self.actions.len())
            .finish()
    }
}
