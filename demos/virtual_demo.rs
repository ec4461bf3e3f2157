use actionpad::backends::VirtualGamepads;
use actionpad::menu::{MenuEvent, View};
use actionpad::store::MemoryStore;
use actionpad::{InputBinding, InputConfig, InputSystem, MouseControl, MouseMove};
use std::time::{Duration, Instant};

const XBOX_ID: &str = "45e-28e-Xbox 360 Wired Controller";

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let config = InputConfig::default()
        .with_action("jump", "Jump", Some("movement"))
        .with_action("turn", "Turn right", Some("camera"));
    let pads = VirtualGamepads::new();
    pads.connect(0, XBOX_ID, 17, 4);

    let mut system = InputSystem::initialize(
        config,
        Box::new(MemoryStore::new()),
        Box::new(pads.clone()),
    )
    .expect("initialise input system");

    // One map for player 1, jump on space or pad A, turn on mouse movement.
    let map = system.create_action_map().expect("create map");
    system.set_map_gamepad(map, Some("XBOX 360")).expect("pick layout");
    let jump = system.add_input_combination(map, "jump").expect("jump combination");
    system
        .add_input(map, "jump", jump, InputBinding::key(32).with_text("Spacebar"))
        .expect("bind space");
    let turn = system.add_input_combination(map, "turn").expect("turn combination");
    system
        .add_input(map, "turn", turn, InputBinding::mouse(MouseControl::MouseRight))
        .expect("bind mouse");
    system.assign_action_map(1, Some(map)).expect("assign map");
    system.assign_gamepad(1, Some(0)).expect("assign pad");

    // Calibrate button A through the menu, then bind it to jump live.
    let mut menu = system.open_menu();
    let mut now = Instant::now();
    let step = Duration::from_millis(50);
    let calibrate = View::Calibrate {
        gpad_type: "XBOX 360".into(),
    };
    menu.navigate(&mut system, calibrate, now).expect("open calibration");
    menu.calibrate(&mut system, Some("A")).expect("calibrate A");
    pads.press_button(0, 0);
    for _ in 0..10 {
        now += step;
        for event in menu.pump(&mut system, now).expect("pump menu") {
            println!("menu: {event:?}");
        }
        pads.release_button(0, 0);
    }

    let live = View::LiveMapping {
        map_id: map,
        action: "jump".into(),
        combination: jump,
    };
    menu.navigate(&mut system, live, now).expect("open live mapping");
    pads.press_button(0, 0);
    for _ in 0..4 {
        now += step;
        for event in menu.pump(&mut system, now).expect("pump menu") {
            if let MenuEvent::Capture(captured) = event {
                println!("captured: {captured:?}");
            }
        }
    }
    pads.release_button(0, 0);
    menu.close(&mut system);

    // A few host frames.
    let frames: [(bool, bool, f32); 4] = [
        (true, false, 0.0),
        (false, false, 4.5),
        (false, true, 0.0),
        (false, false, 0.0),
    ];
    for (frame, (space, pad_a, dx)) in frames.into_iter().enumerate() {
        if space {
            system.key_down(32);
        } else {
            system.key_up(32);
        }
        if pad_a {
            pads.press_button(0, 0);
        } else {
            pads.release_button(0, 0);
        }
        if dx != 0.0 {
            system.mouse_move(MouseMove::relative(dx, 0.0));
        }
        system.tick();
        println!(
            "frame {frame}: jump={:?} turn={:?}",
            system.action("jump"),
            system.action("turn")
        );
    }

    println!("{}", system.get_mappings().expect("serialise mappings"));
}
