//! Headless side of the configuration menu.
//!
//! A [`Menu`] is what a rendered UI drives: it tracks the current [`View`],
//! owns the periodic scans that view needs and turns them into
//! [`MenuEvent`]s when the host pumps it. Drawing is left to the host.
//!
//! Opening the menu suspends host ticks on the [`InputSystem`]; the menu
//! ticks it itself while a capture view is open. Every view owns a
//! [`ViewScope`], so navigating cancels all tasks of the view left behind.
//! Close the menu with [`Menu::close`] to hand input back to the host.

use crate::capture::CaptureEvent;
use crate::error::Result;
use crate::manager::InputSystem;
use crate::metadata::GamepadListing;
use crate::poll::{Scheduler, ViewScope};
use std::time::{Duration, Instant};

/// Rescan period of the gamepad list.
pub const GAMEPAD_SCAN: Duration = Duration::from_millis(200);
/// Rescan period of the connected-pad count on the players view.
pub const PLAYER_SCAN: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Main,
    Mappings,
    EditActionMap {
        map_id: u32,
    },
    LiveMapping {
        map_id: u32,
        action: String,
        combination: u32,
    },
    Players,
    Gamepads,
    Calibrate {
        gpad_type: String,
    },
}

impl View {
    fn captures(&self) -> bool {
        matches!(self, View::LiveMapping { .. } | View::Calibrate { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuTask {
    CaptureScan,
    GamepadScan,
    PlayerScan,
}

/// Something the UI should redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent {
    Capture(CaptureEvent),
    Gamepads(Vec<GamepadListing>),
    ConnectedPads(usize),
}

pub struct Menu {
    view: View,
    scheduler: Scheduler<MenuTask>,
    scope: Option<ViewScope>,
}

impl Menu {
    pub(crate) fn open(system: &mut InputSystem) -> Self {
        system.suspend();
        tracing::info!("input menu opened");
        Self {
            view: View::Main,
            scheduler: Scheduler::new(),
            scope: None,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Number of scans registered by the current view.
    pub fn active_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Switch to `view`, cancelling everything the old view registered.
    ///
    /// Capture views start their session here. If that fails the menu stays
    /// on the old view.
    pub fn navigate(&mut self, system: &mut InputSystem, view: View, now: Instant) -> Result<()> {
        let settings = system.config().capture.clone();
        let task = match &view {
            View::LiveMapping {
                map_id,
                action,
                combination,
            } => {
                system.start_live_mapping(*map_id, action, *combination)?;
                Some((settings.poll_interval(), MenuTask::CaptureScan))
            }
            View::Calibrate { gpad_type } => {
                system.start_calibration_monitor(gpad_type)?;
                Some((settings.calibration_poll(), MenuTask::CaptureScan))
            }
            View::Gamepads => Some((GAMEPAD_SCAN, MenuTask::GamepadScan)),
            View::Players => Some((PLAYER_SCAN, MenuTask::PlayerScan)),
            View::Main | View::Mappings | View::EditActionMap { .. } => None,
        };
        if !view.captures() {
            system.stop_capture();
        }

        self.scope = None;
        let scope = self.scheduler.scope();
        if let Some((every, task)) = task {
            self.scheduler.set_interval(&scope, now, every, task);
        }
        self.scope = Some(scope);
        tracing::debug!(?view, "menu view changed");
        self.view = view;
        Ok(())
    }

    /// Calibrate the layout of the calibrate view: every control, or only
    /// `control`. Returns `false` on any other view.
    pub fn calibrate(&mut self, system: &mut InputSystem, control: Option<&str>) -> Result<bool> {
        let View::Calibrate { gpad_type } = &self.view else {
            return Ok(false);
        };
        system.start_calibration(gpad_type, control)?;
        Ok(true)
    }

    /// Run every scan due at `now`.
    pub fn pump(&mut self, system: &mut InputSystem, now: Instant) -> Result<Vec<MenuEvent>> {
        let mut events = Vec::new();
        if self.scope.as_ref().map_or(true, ViewScope::is_cancelled) {
            return Ok(events);
        }
        for (_, task) in self.scheduler.due(now) {
            match task {
                MenuTask::CaptureScan => {
                    system.tick_forced();
                    if let Some(event) = system.poll_capture(now)? {
                        events.push(MenuEvent::Capture(event));
                    }
                }
                MenuTask::GamepadScan => events.push(MenuEvent::Gamepads(system.known_gamepads()?)),
                MenuTask::PlayerScan => {
                    events.push(MenuEvent::ConnectedPads(system.connected_gamepads().len()))
                }
            }
        }
        Ok(events)
    }

    /// Cancel all scans and give input back to the host.
    pub fn close(mut self, system: &mut InputSystem) {
        self.scheduler.purge();
        self.scope = None;
        system.resume();
        tracing::info!("input menu closed");
    }
}
