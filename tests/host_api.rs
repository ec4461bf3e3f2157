use actionpad::backends::VirtualGamepads;
use actionpad::binding::InputCombination;
use actionpad::profiles::GamepadTypeResolver;
use actionpad::snapshot::{AxisSubtype, Direction, GamepadControl};
use actionpad::store::MemoryStore;
use actionpad::{
    ActionMap, InputBinding, InputConfig, InputSystem, MouseControl, MouseMove, Player,
    ResolveOptions,
};
use approx::assert_relative_eq;

const XBOX_ID: &str = "45e-28e-Xbox 360 Wired Controller";
const SPACE: u32 = 32;
const KEY_A: u32 = 65;
const KEY_D: u32 = 68;

fn catalog() -> InputConfig {
    InputConfig::default()
        .with_action("fire", "Fire", Some("combat"))
        .with_action("look_up", "Look up", Some("camera"))
        .with_action("turn", "Turn", Some("camera"))
}

/// Map 0 bound to player 1, with one combination per action.
fn seeded(bindings: &[(&str, Vec<InputBinding>)], gamepad: Option<&str>) -> InputConfig {
    let mut config = catalog();
    let mut map = ActionMap::from_catalog(0, &config.actions);
    map.gamepad = gamepad.map(str::to_string);
    for (action, inputs) in bindings {
        map.mapping
            .get_mut(*action)
            .unwrap()
            .inputs
            .push(InputCombination {
                id: 0,
                inputs: inputs.clone(),
            });
    }
    let mut player = Player::blank(1);
    player.action_map_id = Some(0);
    config.mappings = Some(vec![map]);
    config.players = Some(vec![player]);
    config
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_pressed_fires_on_release_only() {
    init_tracing();
    let mut system =
        InputSystem::in_memory(seeded(&[("fire", vec![InputBinding::key(SPACE)])], None)).unwrap();

    let mut pressed = Vec::new();
    for down in [false, true, true, false, false] {
        if down {
            system.key_down(SPACE);
        } else {
            system.key_up(SPACE);
        }
        system.tick();
        pressed.push(system.action("fire").pressed);
    }
    // The sampler is read at tick time, so values line up with the ticks.
    assert_eq!(pressed, vec![false, false, false, true, false]);
}

#[test]
fn test_first_press_reports_full_delta() {
    let mut system =
        InputSystem::in_memory(seeded(&[("fire", vec![InputBinding::key(SPACE)])], None)).unwrap();
    system.key_down(SPACE);
    system.tick();
    let result = system.action("fire");
    assert_eq!(result.val, 1.0);
    assert_eq!(result.delta, 1.0);
    assert!(!result.pressed);
}

#[test]
fn test_deadzone_and_direction_split() {
    let pads = VirtualGamepads::new();
    pads.connect(0, XBOX_ID, 17, 4);
    let mut system = InputSystem::initialize(
        catalog(),
        Box::new(MemoryStore::new()),
        Box::new(pads.clone()),
    )
    .unwrap();
    let mut table = system.binding_table("XBOX 360").unwrap();
    table.record_axis(0, "lStick", AxisSubtype::X);
    system.save_binding_table(table).unwrap();

    let left = GamepadControl::axis("lStick", Direction::Left);
    let right = GamepadControl::axis("lStick", Direction::Right);

    pads.set_axis(0, 0, 0.3);
    system.tick();
    assert_eq!(system.current().gamepad_value(0, &left), 0.0);
    assert_eq!(system.current().gamepad_value(0, &right), 0.0);

    pads.set_axis(0, 0, -0.8);
    system.tick();
    assert_relative_eq!(system.current().gamepad_value(0, &left), 0.8);
    assert_eq!(system.current().gamepad_value(0, &right), 0.0);

    system.set_threshold(0.9);
    system.tick();
    assert_eq!(system.current().gamepad_value(0, &left), 0.0);
}

#[test]
fn test_mouse_delta_decays_without_moves() {
    let mut system = InputSystem::in_memory(seeded(
        &[("turn", vec![InputBinding::mouse(MouseControl::MouseRight)])],
        None,
    ))
    .unwrap();

    system.mouse_move(MouseMove::relative(6.0, 0.0));
    system.tick();
    assert_eq!(system.current().mouse.dx, 6.0);
    assert_eq!(system.action("turn").val, 1.0);

    system.tick();
    system.tick();
    assert_eq!(system.current().mouse.dx, 0.0);
    assert_eq!(system.current().mouse.dy, 0.0);
    assert_eq!(system.action("turn").val, 0.0);
}

#[test]
fn test_zero_normalizer_leaves_resting_mouse_at_zero() {
    let mut config = seeded(
        &[("turn", vec![InputBinding::mouse(MouseControl::MouseRight)])],
        None,
    );
    config.mouse_normalizer = 0.0;
    let mut system = InputSystem::in_memory(config).unwrap();
    assert_eq!(system.config().mouse_normalizer, 3.0);

    system.tick();
    system.tick();
    assert_eq!(system.current().mouse.dx, 0.0);
    assert_eq!(system.action("turn").val, 0.0);

    system.mouse_move(MouseMove::relative(1.5, 0.0));
    system.tick();
    assert_relative_eq!(system.action("turn").val, 0.5);
}

#[test]
fn test_previous_is_independent_of_current() {
    let mut system = InputSystem::in_memory(catalog()).unwrap();
    system.key_down(KEY_A);
    system.tick();
    system.key_up(KEY_A);
    system.tick();

    assert_eq!(system.previous().key(KEY_A), 1.0);
    system.key_down(KEY_D);
    system.tick();
    assert_eq!(system.previous().key(KEY_A), 0.0);
    assert_eq!(system.previous().key(KEY_D), 0.0);
    assert_eq!(system.current().key(KEY_D), 1.0);
}

#[test]
fn test_gamepad_type_resolution() {
    let mut resolver = GamepadTypeResolver::with_builtin();
    let hit = resolver.resolve("Xbox 360 Controller (XInput STANDARD GAMEPAD)");
    assert_eq!(hit.gpad_type, "XBOX 360");
    assert!(hit.known);

    let miss = resolver.resolve("1234-5678-Homebrew Stick");
    assert_eq!(miss.gpad_type, "1234-5678-Homebrew Stick");
    assert_eq!(miss.display_name, "Unknown gamepad");
    assert!(!miss.known);
}

#[test]
fn test_last_binding_overwrites_earlier_ones() {
    let bindings = vec![InputBinding::key(KEY_A), InputBinding::key(KEY_D)];
    let mut system = InputSystem::in_memory(seeded(&[("fire", bindings)], None)).unwrap();

    system.key_down(KEY_A);
    system.key_down(KEY_D);
    system.tick();
    system.key_up(KEY_D);
    system.tick();
    let result = system.action("fire");
    assert!(result.pressed);
    assert_eq!(result.val, 0.0);

    // KEY_A still held, but the last binding decides.
    system.tick();
    let result = system.action("fire");
    assert!(!result.pressed);
    assert_eq!(result.val, 0.0);
}

#[test]
fn test_clear_consumes_release() {
    let mut system =
        InputSystem::in_memory(seeded(&[("fire", vec![InputBinding::key(SPACE)])], None)).unwrap();
    system.key_down(SPACE);
    system.tick();
    system.key_up(SPACE);
    system.tick();

    assert!(system.action_with("fire", 1, ResolveOptions::clear()).pressed);
    assert!(!system.action_with("fire", 1, ResolveOptions::clear()).pressed);
    assert!(!system.action("fire").pressed);
}

#[test]
fn test_inverted_axis_reads_opposite_direction() {
    let pads = VirtualGamepads::new();
    pads.connect(0, XBOX_ID, 17, 4);
    let mut config = seeded(
        &[(
            "look_up",
            vec![InputBinding::gamepad_axis("rStick", Direction::Up)],
        )],
        Some("XBOX 360"),
    );
    if let Some(players) = config.players.as_mut() {
        players[0].gamepad_index = Some(0);
    }
    let mut system =
        InputSystem::initialize(config, Box::new(MemoryStore::new()), Box::new(pads.clone()))
            .unwrap();
    let mut table = system.binding_table("XBOX 360").unwrap();
    table.record_axis(3, "rStick", AxisSubtype::Y);
    system.save_binding_table(table).unwrap();

    pads.set_axis(0, 3, 1.0);
    system.tick();
    assert_eq!(system.action("look_up").val, 0.0);

    assert!(system.toggle_invert(1, "rStick").unwrap());
    system.tick();
    assert_eq!(system.action("look_up").val, 1.0);
}

#[test]
fn test_mappings_round_trip_through_json() {
    let bindings = vec![
        InputBinding::key(SPACE).with_text("Spacebar"),
        InputBinding::mouse(MouseControl::MouseButtonLeft),
        InputBinding::gamepad_button("A").with_text("A"),
        InputBinding::gamepad_axis("lStick", Direction::Left),
    ];
    let mut system =
        InputSystem::in_memory(seeded(&[("fire", bindings)], Some("XBOX 360"))).unwrap();

    let json = system.get_mappings().unwrap();
    let before = system.action_maps();
    system.set_mappings_json(&json).unwrap();
    assert_eq!(system.action_maps(), before);
    assert_eq!(system.get_mappings().unwrap(), json);

    let players = system.get_players().unwrap();
    system.set_players_json(&players).unwrap();
    assert_eq!(system.get_players().unwrap(), players);
}

#[test]
fn test_unresolved_actions_are_zero() {
    let mut system = InputSystem::in_memory(catalog()).unwrap();
    system.tick();
    let result = system.action("fire");
    assert!(!result.pressed);
    assert_eq!(result.val, 0.0);
    assert_eq!(result.delta, 0.0);
    assert_eq!(
        system.action_with("nothing", 4, ResolveOptions::default()),
        Default::default()
    );
}

#[test]
fn test_refresh_applies_new_mappings_next_tick() {
    let mut system = InputSystem::in_memory(seeded(&[], None)).unwrap();
    system.tick();
    system
        .add_input(0, "fire", 0, InputBinding::key(SPACE))
        .unwrap_err();
    let combination = system.add_input_combination(0, "fire").unwrap();
    system
        .add_input(0, "fire", combination, InputBinding::key(SPACE))
        .unwrap();

    system.key_down(SPACE);
    system.tick();
    assert_eq!(system.action("fire").val, 1.0);
}

#[test]
fn test_independent_systems_do_not_share_state() {
    let config = seeded(&[("fire", vec![InputBinding::key(SPACE)])], None);
    let mut first = InputSystem::in_memory(config.clone()).unwrap();
    let mut second = InputSystem::in_memory(config).unwrap();

    first.key_down(SPACE);
    first.tick();
    second.tick();
    assert_eq!(first.action("fire").val, 1.0);
    assert_eq!(second.action("fire").val, 0.0);
}
