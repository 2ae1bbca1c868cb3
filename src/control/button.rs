use super::{ControlAction, ControlActions, ControlEvents, EmptyEventMask};
use log::debug;

/// A titled push button that fires its actions on touch events
#[derive(Debug)]
pub struct Button {
    title: String,
    enabled: bool,
    highlighted: bool,
    actions: ControlActions,
}

impl Button {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            enabled: true,
            highlighted: false,
            actions: ControlActions::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling a button also drops any highlight
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.highlighted = false;
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn add_action<F>(
        &mut self,
        events: ControlEvents,
        action: F,
    ) -> Result<Option<ControlAction>, EmptyEventMask<F>>
    where
        F: Fn(ControlEvents) + Send + Sync + 'static,
    {
        self.actions.add_action(events, action)
    }

    pub fn invoke_action(&self, events: ControlEvents) -> bool {
        self.enabled && self.actions.invoke_action(events)
    }

    pub fn remove_action(&mut self, events: ControlEvents) -> bool {
        self.actions.remove_action(events)
    }

    pub fn actions(&self) -> &ControlActions {
        &self.actions
    }

    /// Fires `events` unless the button is disabled
    pub fn send_actions(&self, events: ControlEvents) -> usize {
        if !self.enabled {
            debug!("Button '{}' disabled, ignoring {:?}", self.title, events);
            return 0;
        }
        self.actions.send_actions(events)
    }

    pub fn touch_down(&mut self) -> usize {
        if !self.enabled {
            return 0;
        }
        self.highlighted = true;
        self.send_actions(ControlEvents::TOUCH_DOWN)
    }

    pub fn touch_up(&mut self, inside: bool) -> usize {
        if !self.enabled {
            return 0;
        }
        self.highlighted = false;
        let events = if inside {
            ControlEvents::TOUCH_UP_INSIDE | ControlEvents::PRIMARY_ACTION_TRIGGERED
        } else {
            ControlEvents::TOUCH_UP_OUTSIDE
        };
        self.send_actions(events)
    }

    pub fn touch_cancel(&mut self) -> usize {
        if !self.enabled {
            return 0;
        }
        self.highlighted = false;
        self.send_actions(ControlEvents::TOUCH_CANCEL)
    }

    /// A full press: touch down, then touch up inside
    pub fn tap(&mut self) -> usize {
        debug!("Button '{}' tapped", self.title);
        self.touch_down() + self.touch_up(true)
    }
}
