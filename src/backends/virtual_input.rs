use crate::device::{GamepadSource, RawGamepad};
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory gamepad source.
///
/// Clones share the same pads, so a host (or a test) can keep one handle to
/// drive buttons and axes while the input system owns another.
#[derive(Clone, Default)]
pub struct VirtualGamepads {
    pads: Rc<RefCell<Vec<RawGamepad>>>,
}

impl VirtualGamepads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug in a pad. A pad already in `index` is replaced.
    pub fn connect(&self, index: usize, id: &str, buttons: usize, axes: usize) {
        let mut pads = self.pads.borrow_mut();
        pads.retain(|p| p.index != index);
        pads.push(RawGamepad::new(index, id, buttons, axes));
        pads.sort_by_key(|p| p.index);
    }

    pub fn disconnect(&self, index: usize) {
        self.pads.borrow_mut().retain(|p| p.index != index);
    }

    /// Set a button value. Ignored for unknown slots or out-of-range buttons.
    pub fn set_button(&self, index: usize, button: usize, value: f32) {
        if let Some(slot) = self
            .pads
            .borrow_mut()
            .iter_mut()
            .find(|p| p.index == index)
            .and_then(|p| p.buttons.get_mut(button))
        {
            *slot = value;
        }
    }

    pub fn press_button(&self, index: usize, button: usize) {
        self.set_button(index, button, 1.0);
    }

    pub fn release_button(&self, index: usize, button: usize) {
        self.set_button(index, button, 0.0);
    }

    /// Set an axis value. Ignored for unknown slots or out-of-range axes.
    pub fn set_axis(&self, index: usize, axis: usize, value: f32) {
        if let Some(slot) = self
            .pads
            .borrow_mut()
            .iter_mut()
            .find(|p| p.index == index)
            .and_then(|p| p.axes.get_mut(axis))
        {
            *slot = value;
        }
    }
}

impl GamepadSource for VirtualGamepads {
    fn poll(&mut self) -> Vec<RawGamepad> {
        self.pads.borrow().clone()
    }

    fn name(&self) -> &str {
        "virtual"
    }
}
