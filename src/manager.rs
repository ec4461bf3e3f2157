//! The [`InputSystem`] context object.
//!
//! One value owns everything the host talks to: the device samplers, the two
//! snapshot generations, the cached action maps, players and binding tables,
//! the persisted store and the running capture session. Several systems can
//! live side by side (tests do exactly that).
//!
//! # Tick protocol
//! 1. A suspended system (menu open) ignores [`InputSystem::tick`]; only
//!    [`InputSystem::tick_forced`] runs.
//! 2. The mouse staleness counter advances.
//! 3. *current* is copied into *previous*.
//! 4. Keyboard and mouse sampler state is copied into *current*.
//! 5. Every `refresh_interval` ticks, or right after
//!    [`InputSystem::request_refresh`], connected pads are re-enumerated and
//!    the caches are reloaded from the store.
//! 6. Every enumerated pad is translated through its binding table into
//!    *current*.
//!
//! Action queries in between two ticks read a consistent pair of snapshots.

use crate::binding::{next_action_map_id, ActionMap, InputBinding};
use crate::calibration::{calibration_targets, GamepadBindingTable};
use crate::capture::{
    observe_live, observe_raw, CaptureEvent, CaptureFlow, CaptureSession, CaptureStep,
    ObservedInput,
};
use crate::config::InputConfig;
use crate::device::{GamepadSource, NoGamepads, RawGamepad};
use crate::error::{Error, Result};
use crate::event::{InputKind, MouseButton, MouseMove};
use crate::keyboards::KeyboardLayouts;
use crate::menu::Menu;
use crate::metadata::{merge_known, GamepadListing, KnownGamepad};
use crate::player::{normalize_roster, Player};
use crate::profiles::{GamepadTypeProfile, GamepadTypeResolver};
use crate::resolver::{ActionResult, ResolveOptions, Resolver};
use crate::sampler::{KeyboardSampler, MouseSampler};
use crate::snapshot::{Direction, GamepadControl, GamepadState, InputState};
use crate::store::{self, MemoryStore, Store, ACTION_MAPS_KEY, KNOWN_GAMEPADS_KEY, PLAYERS_KEY};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

/// A pad seen by the last enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedPad {
    pub slot: usize,
    pub id: String,
    pub gpad_type: String,
    pub display_name: String,
    /// `false` when no layout matched the id.
    pub known: bool,
}

pub struct InputSystem {
    config: InputConfig,
    store: Box<dyn Store>,
    source: Box<dyn GamepadSource>,
    resolver: GamepadTypeResolver,
    keyboards: KeyboardLayouts,
    keyboard: KeyboardSampler,
    mouse: MouseSampler,
    current: InputState,
    previous: InputState,
    threshold: f32,
    tick_counter: u32,
    refresh_requested: bool,
    suspended: bool,
    connected: Vec<ConnectedPad>,
    tables: HashMap<String, GamepadBindingTable>,
    action_maps: Vec<ActionMap>,
    players: Vec<Player>,
    default_mappings: Option<Vec<ActionMap>>,
    default_players: Option<Vec<Player>>,
    capture: Option<CaptureSession>,
}

impl InputSystem {
    /// Build a system around `store` and `source`.
    ///
    /// The `mappings` and `players` of `config` seed the store only when it
    /// has no value for them yet; either way they become the defaults that
    /// [`reset_configs`](Self::reset_configs) restores.
    pub fn initialize(
        mut config: InputConfig,
        store: Box<dyn Store>,
        source: Box<dyn GamepadSource>,
    ) -> Result<Self> {
        for warning in config.validate() {
            tracing::warn!(%warning, "suspicious input configuration");
        }
        config.sanitize();

        let mut system = Self {
            threshold: config.threshold,
            default_mappings: config.mappings.clone(),
            default_players: config.players.clone(),
            config,
            store,
            source,
            resolver: GamepadTypeResolver::with_builtin(),
            keyboards: KeyboardLayouts::default(),
            keyboard: KeyboardSampler::new(),
            mouse: MouseSampler::new(),
            current: InputState::default(),
            previous: InputState::default(),
            tick_counter: 0,
            refresh_requested: true,
            suspended: false,
            connected: Vec::new(),
            tables: HashMap::new(),
            action_maps: Vec::new(),
            players: Vec::new(),
            capture: None,
        };

        if system.store.get(ACTION_MAPS_KEY).is_none() {
            if let Some(maps) = &system.config.mappings {
                store::save(&mut *system.store, ACTION_MAPS_KEY, maps)?;
            }
        }
        if system.store.get(PLAYERS_KEY).is_none() {
            if let Some(players) = &system.config.players {
                store::save(&mut *system.store, PLAYERS_KEY, players)?;
            }
        }

        tracing::info!(
            source = system.source.name(),
            actions = system.config.actions.len(),
            max_players = system.config.max_players,
            "input system initialised"
        );
        Ok(system)
    }

    /// A system with an in-memory store and no gamepads.
    pub fn in_memory(config: InputConfig) -> Result<Self> {
        Self::initialize(config, Box::new(MemoryStore::new()), Box::new(NoGamepads))
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Snapshot written by the last tick.
    pub fn current(&self) -> &InputState {
        &self.current
    }

    /// Snapshot the last tick started from.
    pub fn previous(&self) -> &InputState {
        &self.previous
    }

    pub fn gamepad_types(&self) -> &GamepadTypeResolver {
        &self.resolver
    }

    pub fn keyboard_layouts(&self) -> &KeyboardLayouts {
        &self.keyboards
    }

    pub fn keyboard_layouts_mut(&mut self) -> &mut KeyboardLayouts {
        &mut self.keyboards
    }

    // ---- host events ----

    pub fn handle(&mut self, event: InputKind) {
        match event {
            InputKind::KeyDown { code } => self.keyboard.key_down(code),
            InputKind::KeyUp { code } => self.keyboard.key_up(code),
            InputKind::MouseDown { button } => self.mouse.button_down(button),
            InputKind::MouseUp { button } => self.mouse.button_up(button),
            InputKind::MouseMoved(report) => self.mouse.on_move(&report),
        }
    }

    pub fn key_down(&mut self, code: u32) {
        self.handle(InputKind::KeyDown { code });
    }

    pub fn key_up(&mut self, code: u32) {
        self.handle(InputKind::KeyUp { code });
    }

    pub fn mouse_down(&mut self, button: MouseButton) {
        self.handle(InputKind::MouseDown { button });
    }

    pub fn mouse_up(&mut self, button: MouseButton) {
        self.handle(InputKind::MouseUp { button });
    }

    pub fn mouse_move(&mut self, report: MouseMove) {
        self.handle(InputKind::MouseMoved(report));
    }

    // ---- tick ----

    /// Advance one host frame. Returns `false` when the menu holds the input.
    pub fn tick(&mut self) -> bool {
        self.advance(false)
    }

    /// Advance even while suspended. Used by the menu's own polling.
    pub fn tick_forced(&mut self) -> bool {
        self.advance(true)
    }

    fn advance(&mut self, forced: bool) -> bool {
        if self.suspended && !forced {
            return false;
        }
        self.mouse.advance();
        self.previous.clone_from(&self.current);
        self.current.keyboard = self.keyboard.snapshot();
        self.current.mouse = self.mouse.state();

        let pads = self.source.poll();
        if self.refresh_requested || self.tick_counter == 0 {
            self.refresh_requested = false;
            self.refresh(&pads);
        }
        self.tick_counter = (self.tick_counter + 1) % self.config.refresh_interval.max(1);
        self.sample_gamepads(&pads);
        true
    }

    fn refresh(&mut self, pads: &[RawGamepad]) {
        self.connected = pads
            .iter()
            .map(|pad| {
                let resolved = self.resolver.resolve(&pad.id);
                ConnectedPad {
                    slot: pad.index,
                    id: pad.id.clone(),
                    gpad_type: resolved.gpad_type,
                    display_name: resolved.display_name,
                    known: resolved.known,
                }
            })
            .collect();

        self.tables.clear();
        for pad in &self.connected {
            if self.tables.contains_key(&pad.gpad_type) {
                continue;
            }
            let key = store::gamepad_table_key(&pad.gpad_type);
            if let Some(table) = store::load::<GamepadBindingTable>(&*self.store, &key) {
                self.tables.insert(pad.gpad_type.clone(), table);
            }
        }

        self.action_maps = store::load(&*self.store, ACTION_MAPS_KEY).unwrap_or_default();
        self.players = store::load(&*self.store, PLAYERS_KEY).unwrap_or_default();
        tracing::debug!(
            pads = self.connected.len(),
            tables = self.tables.len(),
            action_maps = self.action_maps.len(),
            players = self.players.len(),
            "refreshed input caches"
        );
    }

    fn sample_gamepads(&mut self, pads: &[RawGamepad]) {
        let mut sampled = BTreeMap::new();
        for pad in &self.connected {
            let Some(raw) = pads.iter().find(|p| p.index == pad.slot && p.id == pad.id) else {
                continue;
            };
            let mut state = GamepadState::new(pad.gpad_type.clone());
            if let Some(table) = self.tables.get(&pad.gpad_type) {
                table.apply(raw, self.threshold, &mut state);
            }
            sampled.insert(pad.slot, state);
        }
        self.current.gamepad = sampled;
    }

    // ---- actions ----

    /// Resolve `name` for player 1.
    pub fn action(&mut self, name: &str) -> ActionResult {
        self.action_with(name, 1, ResolveOptions::default())
    }

    /// Resolve `name` for `player`. Unknown players, maps or actions give the
    /// zero result.
    pub fn action_with(&mut self, name: &str, player: u8, options: ResolveOptions) -> ActionResult {
        let Some(player) = self.players.iter().find(|p| p.number == player) else {
            return ActionResult::default();
        };
        let Some(mapping) = player
            .action_map_id
            .and_then(|id| self.action_maps.iter().find(|m| m.id == id))
            .and_then(|map| map.action(name))
        else {
            return ActionResult::default();
        };
        Resolver {
            current: &mut self.current,
            previous: &mut self.previous,
            mouse_normalizer: self.config.mouse_normalizer,
        }
        .resolve(mapping, player, options)
    }

    /// Gamepad axis deadzone; applies from the next tick.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Re-enumerate pads and reload caches on the next tick.
    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    // ---- persisted mappings and players ----

    /// Stored action maps as JSON text.
    pub fn get_mappings(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.stored_action_maps())?)
    }

    /// Replace the stored action maps and make them the reset defaults.
    pub fn set_mappings(&mut self, maps: Vec<ActionMap>) -> Result<()> {
        self.save_action_maps(&maps)?;
        self.default_mappings = Some(maps);
        Ok(())
    }

    pub fn set_mappings_json(&mut self, json: &str) -> Result<()> {
        let maps = serde_json::from_str(json)?;
        self.set_mappings(maps)
    }

    /// Stored players as JSON text.
    pub fn get_players(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.stored_players())?)
    }

    /// Replace the stored players and make them the reset defaults.
    pub fn set_players(&mut self, players: Vec<Player>) -> Result<()> {
        self.save_players(&players)?;
        self.default_players = Some(players);
        Ok(())
    }

    pub fn set_players_json(&mut self, json: &str) -> Result<()> {
        let players = serde_json::from_str(json)?;
        self.set_players(players)
    }

    /// Restore the mappings and players last provided by the host.
    pub fn reset_configs(&mut self) -> Result<()> {
        if let Some(players) = self.default_players.clone() {
            self.save_players(&players)?;
        }
        if let Some(maps) = self.default_mappings.clone() {
            self.save_action_maps(&maps)?;
        }
        tracing::debug!("restored default mappings and players");
        Ok(())
    }

    fn stored_action_maps(&self) -> Vec<ActionMap> {
        store::load(&*self.store, ACTION_MAPS_KEY).unwrap_or_default()
    }

    fn stored_players(&self) -> Vec<Player> {
        store::load(&*self.store, PLAYERS_KEY).unwrap_or_default()
    }

    fn save_action_maps(&mut self, maps: &[ActionMap]) -> Result<()> {
        store::save(&mut *self.store, ACTION_MAPS_KEY, maps)?;
        self.request_refresh();
        Ok(())
    }

    fn save_players(&mut self, players: &[Player]) -> Result<()> {
        store::save(&mut *self.store, PLAYERS_KEY, players)?;
        self.request_refresh();
        Ok(())
    }

    // ---- menu ----

    /// Open the configuration menu. Host ticks are ignored until it closes.
    pub fn open_menu(&mut self) -> Menu {
        Menu::open(self)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub(crate) fn suspend(&mut self) {
        self.suspended = true;
    }

    pub(crate) fn resume(&mut self) {
        self.suspended = false;
        self.capture = None;
        self.request_refresh();
    }

    // ---- binding tables ----

    /// Binding table for a layout, created blank and stored on first use.
    ///
    /// Unknown layouts have no table: a warning is logged and `None` returned.
    pub fn binding_table(&mut self, gpad_type: &str) -> Option<GamepadBindingTable> {
        let key = store::gamepad_table_key(gpad_type);
        if let Some(table) = store::load(&*self.store, &key) {
            return Some(table);
        }
        let Some(profile) = self.resolver.profile(gpad_type) else {
            tracing::warn!(gpad_type, "no layout is configured for this gamepad type");
            return None;
        };
        let table = GamepadBindingTable::blank(profile);
        if let Err(err) = store::save(&mut *self.store, &key, &table) {
            tracing::warn!(gpad_type, %err, "could not store blank binding table");
        }
        tracing::debug!(gpad_type, "created blank binding table");
        Some(table)
    }

    /// Store a binding table (replacing the one of its layout) and use it
    /// from the next tick.
    pub fn save_binding_table(&mut self, table: GamepadBindingTable) -> Result<()> {
        store::save(
            &mut *self.store,
            &store::gamepad_table_key(&table.gpad_type),
            &table,
        )?;
        self.tables.insert(table.gpad_type.clone(), table);
        Ok(())
    }

    fn profile(&self, gpad_type: &str) -> Result<&GamepadTypeProfile> {
        self.resolver
            .profile(gpad_type)
            .ok_or_else(|| Error::UnknownGamepadType(gpad_type.to_string()))
    }

    // ---- capture ----

    /// Calibrate every control of `gpad_type`, or only `control`.
    pub fn start_calibration(&mut self, gpad_type: &str, control: Option<&str>) -> Result<()> {
        let table = self
            .binding_table(gpad_type)
            .ok_or_else(|| Error::UnknownGamepadType(gpad_type.to_string()))?;
        let targets = self.targets_for(gpad_type, control)?;
        self.tables.insert(gpad_type.to_string(), table);

        let active = observe_raw(&self.raw_pads_of(gpad_type), &self.config.capture);
        tracing::debug!(gpad_type, targets = targets.len(), "calibration started");
        self.capture = Some(match self.capture.take() {
            Some(mut session) if session.gpad_type() == Some(gpad_type) => {
                session.recalibrate(targets, &active);
                session
            }
            _ => CaptureSession::calibration(gpad_type, targets, &self.config.capture, &active),
        });
        Ok(())
    }

    fn targets_for(&self, gpad_type: &str, control: Option<&str>) -> Result<Vec<GamepadControl>> {
        let profile = self.profile(gpad_type)?;
        Ok(match control {
            None => calibration_targets(profile),
            Some(id) if profile.button(id).is_some() => vec![GamepadControl::button(id)],
            Some(id) if profile.axis(id).is_some() => Direction::ALL
                .iter()
                .map(|d| GamepadControl::axis(id, *d))
                .collect(),
            Some(id) => {
                return Err(Error::UnknownControl {
                    gpad_type: gpad_type.to_string(),
                    control: id.to_string(),
                })
            }
        })
    }

    /// Report raw presses of `gpad_type` pads as logical controls.
    pub fn start_calibration_monitor(&mut self, gpad_type: &str) -> Result<()> {
        let table = self
            .binding_table(gpad_type)
            .ok_or_else(|| Error::UnknownGamepadType(gpad_type.to_string()))?;
        self.tables.insert(gpad_type.to_string(), table);
        let active = observe_raw(&self.raw_pads_of(gpad_type), &self.config.capture);
        self.capture = Some(CaptureSession::monitor(
            gpad_type,
            &self.config.capture,
            &active,
        ));
        Ok(())
    }

    /// Append the next key or pad control that goes active to a combination.
    pub fn start_live_mapping(&mut self, map_id: u32, action: &str, combination: u32) -> Result<()> {
        let map = self
            .action_map(map_id)
            .ok_or(Error::UnknownActionMap(map_id))?;
        map.action(action)
            .ok_or_else(|| Error::UnknownAction(action.to_string()))?
            .combination(combination)
            .ok_or(Error::UnknownInputCombination(combination))?;

        let active = observe_live(
            &self.current,
            map.keyboard,
            map.gamepad.as_deref(),
            &self.config.capture,
        );
        tracing::debug!(map_id, action, combination, "live mapping started");
        self.capture = Some(CaptureSession::action_mapping(
            map_id,
            action,
            combination,
            &self.config.capture,
            &active,
        ));
        Ok(())
    }

    pub fn stop_capture(&mut self) {
        self.capture = None;
    }

    pub fn capture(&self) -> Option<&CaptureSession> {
        self.capture.as_ref()
    }

    /// Advance the running capture session and apply what it captured.
    ///
    /// Calibration and monitor sessions read the pads directly; live mapping
    /// reads the current snapshot, so the caller ticks first.
    pub fn poll_capture(&mut self, now: Instant) -> Result<Option<CaptureEvent>> {
        let Some(session) = &self.capture else {
            return Ok(None);
        };
        let active = match session.flow() {
            CaptureFlow::Calibration { gpad_type, .. } | CaptureFlow::Monitor { gpad_type } => {
                let gpad_type = gpad_type.clone();
                observe_raw(&self.raw_pads_of(&gpad_type), &self.config.capture)
            }
            CaptureFlow::ActionMapping { map_id, .. } => self.live_inputs(*map_id),
        };
        let step = self
            .capture
            .as_mut()
            .and_then(|session| session.poll(now, &active));
        match step {
            Some(step) => self.apply_capture(step),
            None => Ok(None),
        }
    }

    fn live_inputs(&self, map_id: u32) -> BTreeSet<ObservedInput> {
        match self.action_map(map_id) {
            Some(map) => observe_live(
                &self.current,
                map.keyboard,
                map.gamepad.as_deref(),
                &self.config.capture,
            ),
            None => BTreeSet::new(),
        }
    }

    fn apply_capture(&mut self, step: CaptureStep) -> Result<Option<CaptureEvent>> {
        match step {
            CaptureStep::Calibrated {
                gpad_type,
                target,
                input,
            } => {
                let mut table = self
                    .binding_table(&gpad_type)
                    .ok_or_else(|| Error::UnknownGamepadType(gpad_type.clone()))?;
                let raw_index = match (&target, &input) {
                    (GamepadControl::Button(id), ObservedInput::RawButton { index, .. }) => {
                        table.record_button(*index, id);
                        *index
                    }
                    (
                        GamepadControl::Axis { id, direction },
                        ObservedInput::RawAxis { index, .. },
                    ) => {
                        table.record_axis(*index, id, direction.subtype());
                        *index
                    }
                    _ => return Ok(None),
                };
                self.save_binding_table(table)?;
                tracing::debug!(%gpad_type, ?target, raw_index, "calibrated control");
                Ok(Some(CaptureEvent::Calibrated {
                    gpad_type,
                    control: target,
                    raw_index,
                }))
            }
            CaptureStep::CalibrationFinished { gpad_type } => {
                tracing::info!(%gpad_type, "calibration finished");
                Ok(Some(CaptureEvent::CalibrationFinished { gpad_type }))
            }
            CaptureStep::Monitored { gpad_type, input } => {
                let control = self.tables.get(&gpad_type).and_then(|table| match &input {
                    ObservedInput::RawButton { index, .. } => table.control_for_button(*index),
                    ObservedInput::RawAxis {
                        index, positive, ..
                    } => table.control_for_axis(*index, *positive),
                    _ => None,
                });
                Ok(Some(CaptureEvent::Pressed {
                    gpad_type,
                    input,
                    control,
                }))
            }
            CaptureStep::Bound {
                map_id,
                action,
                combination,
                input,
            } => {
                let Some(binding) = self.binding_for(&input) else {
                    return Ok(None);
                };
                let added = binding.clone();
                self.edit_action_map(map_id, |map| map.add_input(&action, combination, added))?;
                tracing::debug!(map_id, %action, combination, ?binding, "bound input");
                Ok(Some(CaptureEvent::Bound {
                    map_id,
                    action,
                    combination,
                    binding,
                }))
            }
        }
    }

    /// Labelled binding for a live-mapping observation.
    fn binding_for(&self, input: &ObservedInput) -> Option<InputBinding> {
        match input {
            ObservedInput::Key(code) => {
                Some(InputBinding::key(*code).with_text(self.keyboards.label(*code)))
            }
            ObservedInput::Control { slot, control } => {
                let profile = self
                    .current
                    .gamepad
                    .get(slot)
                    .and_then(|pad| self.resolver.profile(&pad.gpad_type));
                Some(match control {
                    GamepadControl::Button(id) => {
                        let text = profile.map_or_else(|| id.clone(), |p| p.button_name(id));
                        InputBinding::gamepad_button(id.clone()).with_text(text)
                    }
                    GamepadControl::Axis { id, direction } => {
                        let name = profile.map_or_else(|| id.clone(), |p| p.axis_name(id));
                        InputBinding::gamepad_axis(id.clone(), *direction)
                            .with_text(format!("{name} {}", direction.as_str()))
                    }
                })
            }
            ObservedInput::RawButton { .. } | ObservedInput::RawAxis { .. } => None,
        }
    }

    // ---- gamepads ----

    fn raw_pads_of(&mut self, gpad_type: &str) -> Vec<RawGamepad> {
        let resolver = &mut self.resolver;
        self.source
            .poll()
            .into_iter()
            .filter(|pad| resolver.resolve(&pad.id).gpad_type == gpad_type)
            .collect()
    }

    /// Pads connected right now, resolved to their layout.
    pub fn connected_gamepads(&mut self) -> Vec<ConnectedPad> {
        let pads = self.source.poll();
        pads.iter()
            .map(|pad| {
                let resolved = self.resolver.resolve(&pad.id);
                ConnectedPad {
                    slot: pad.index,
                    id: pad.id.clone(),
                    gpad_type: resolved.gpad_type,
                    display_name: resolved.display_name,
                    known: resolved.known,
                }
            })
            .collect()
    }

    /// Every unit seen so far, with the slot of those connected now. New
    /// units are remembered.
    pub fn known_gamepads(&mut self) -> Result<Vec<GamepadListing>> {
        let mut known: Vec<KnownGamepad> =
            store::load(&*self.store, KNOWN_GAMEPADS_KEY).unwrap_or_default();
        let pads = self.source.poll();
        let (listing, added) = merge_known(&mut known, &pads, &mut self.resolver);
        if added {
            store::save(&mut *self.store, KNOWN_GAMEPADS_KEY, &known)?;
        }
        Ok(listing)
    }

    // ---- action maps ----

    /// Stored action maps.
    pub fn action_maps(&self) -> Vec<ActionMap> {
        self.stored_action_maps()
    }

    pub fn action_map(&self, map_id: u32) -> Option<ActionMap> {
        self.stored_action_maps()
            .into_iter()
            .find(|m| m.id == map_id)
    }

    /// Load, edit and store one action map.
    pub fn edit_action_map<R>(
        &mut self,
        map_id: u32,
        edit: impl FnOnce(&mut ActionMap) -> Result<R>,
    ) -> Result<R> {
        let mut maps = self.stored_action_maps();
        let map = maps
            .iter_mut()
            .find(|m| m.id == map_id)
            .ok_or(Error::UnknownActionMap(map_id))?;
        let out = edit(map)?;
        self.save_action_maps(&maps)?;
        Ok(out)
    }

    /// New map seeded from the action catalog. Returns its id.
    pub fn create_action_map(&mut self) -> Result<u32> {
        let mut maps = self.stored_action_maps();
        let id = next_action_map_id(&maps)?;
        maps.push(ActionMap::from_catalog(id, &self.config.actions));
        self.save_action_maps(&maps)?;
        tracing::debug!(map_id = id, "created action map");
        Ok(id)
    }

    pub fn delete_action_map(&mut self, map_id: u32) -> Result<()> {
        let mut maps = self.stored_action_maps();
        let before = maps.len();
        maps.retain(|m| m.id != map_id);
        if maps.len() == before {
            return Err(Error::UnknownActionMap(map_id));
        }
        self.save_action_maps(&maps)
    }

    /// Replace a stored map with `map` (matched by id).
    pub fn update_action_map(&mut self, map: ActionMap) -> Result<()> {
        self.edit_action_map(map.id, |stored| {
            *stored = map;
            Ok(())
        })
    }

    pub fn rename_action_map(&mut self, map_id: u32, name: &str) -> Result<()> {
        self.edit_action_map(map_id, |map| {
            map.name = name.to_string();
            Ok(())
        })
    }

    pub fn set_map_keyboard(&mut self, map_id: u32, enabled: bool) -> Result<()> {
        self.edit_action_map(map_id, |map| {
            map.set_keyboard(enabled);
            Ok(())
        })
    }

    pub fn set_map_mouse(&mut self, map_id: u32, enabled: bool) -> Result<()> {
        self.edit_action_map(map_id, |map| {
            map.set_mouse(enabled);
            Ok(())
        })
    }

    /// Choose the gamepad layout of a map, or turn gamepads off.
    pub fn set_map_gamepad(&mut self, map_id: u32, gpad_type: Option<&str>) -> Result<()> {
        if let Some(gpad_type) = gpad_type {
            self.profile(gpad_type)?;
        }
        self.edit_action_map(map_id, |map| {
            map.set_gamepad(gpad_type.map(str::to_string));
            Ok(())
        })
    }

    pub fn add_input_combination(&mut self, map_id: u32, action: &str) -> Result<u32> {
        self.edit_action_map(map_id, |map| map.add_combination(action))
    }

    pub fn delete_input_combination(
        &mut self,
        map_id: u32,
        action: &str,
        combination: u32,
    ) -> Result<()> {
        self.edit_action_map(map_id, |map| map.delete_combination(action, combination))
    }

    pub fn add_input(
        &mut self,
        map_id: u32,
        action: &str,
        combination: u32,
        input: InputBinding,
    ) -> Result<()> {
        self.edit_action_map(map_id, |map| map.add_input(action, combination, input))
    }

    pub fn remove_input(
        &mut self,
        map_id: u32,
        action: &str,
        combination: u32,
        position: usize,
    ) -> Result<()> {
        self.edit_action_map(map_id, |map| map.remove_input(action, combination, position))
    }

    // ---- players ----

    /// One record per player number, stored back if it had to be completed.
    pub fn roster(&mut self) -> Result<Vec<Player>> {
        let stored = self.stored_players();
        let roster = normalize_roster(&stored, self.config.max_players);
        if roster != stored {
            self.save_players(&roster)?;
        }
        Ok(roster)
    }

    fn edit_player<R>(&mut self, number: u8, edit: impl FnOnce(&mut Player) -> Result<R>) -> Result<R> {
        let max = self.config.max_players;
        if number == 0 || number > max {
            return Err(Error::UnknownPlayer(number, max));
        }
        let mut roster = normalize_roster(&self.stored_players(), max);
        let out = edit(&mut roster[usize::from(number - 1)])?;
        self.save_players(&roster)?;
        Ok(out)
    }

    /// Point a player at an action map. The pad slot is kept only when it
    /// still holds a pad of the new map's layout.
    pub fn assign_action_map(&mut self, number: u8, map_id: Option<u32>) -> Result<()> {
        let layout = match map_id {
            Some(id) => self.action_map(id).ok_or(Error::UnknownActionMap(id))?.gamepad,
            None => None,
        };
        let connected = self.connected_gamepads();
        self.edit_player(number, |player| {
            player.action_map_id = map_id;
            let slot_fits = player.gamepad_index.is_some_and(|slot| {
                connected
                    .iter()
                    .any(|pad| pad.slot == slot && Some(&pad.gpad_type) == layout.as_ref())
            });
            if !slot_fits {
                player.gamepad_index = None;
            }
            Ok(())
        })
    }

    /// Bind a player to a pad slot, or unbind with `None`.
    ///
    /// The slot must hold a connected pad of the layout chosen by the
    /// player's action map.
    pub fn assign_gamepad(&mut self, number: u8, slot: Option<usize>) -> Result<()> {
        if let Some(slot) = slot {
            let stored = normalize_roster(&self.stored_players(), self.config.max_players);
            let player = stored
                .iter()
                .find(|p| p.number == number)
                .ok_or(Error::UnknownPlayer(number, self.config.max_players))?;
            let layout = player
                .action_map_id
                .and_then(|id| self.action_map(id))
                .and_then(|map| map.gamepad)
                .ok_or(Error::NoGamepadLayout(number))?;
            let pad = self
                .connected_gamepads()
                .into_iter()
                .find(|pad| pad.slot == slot)
                .ok_or(Error::EmptyGamepadSlot(slot))?;
            if pad.gpad_type != layout {
                return Err(Error::GamepadTypeMismatch {
                    slot,
                    expected: layout,
                    found: pad.gpad_type,
                });
            }
        }
        self.edit_player(number, |player| {
            player.gamepad_index = slot;
            Ok(())
        })
    }

    /// Flip the vertical inversion of `axis` for a player.
    pub fn toggle_invert(&mut self, number: u8, axis: &str) -> Result<bool> {
        self.edit_player(number, |player| Ok(player.toggle_invert(axis)))
    }
}
