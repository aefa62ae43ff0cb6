/// Entry point and card loop.

mod cli;
mod config;
mod domain;
mod error;
mod logger;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use chrono::Local;
use clap::Parser;
use log::{debug, error, info, trace};

use cli::Cli;
use config::CardConfig;
use error::CardError;
use sim::clock::SystemClock;
use sim::countdown::CountdownController;
use sim::event::CardEvent;
use sim::fireworks::FireworksEngine;
use ui::gamepad::GamepadState;
use ui::input::{InputState, Intent};
use ui::menu::{visible_content, Menu};
use ui::renderer::{Frame, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        if !logger::init(path, cli.log_level) {
            eprintln!("Could not open log file {}", path.display());
        }
    }

    let config = CardConfig::load(cli.config.as_deref());

    let target = match cli.resolve_target(config.target, Local::now()) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    info!("target {} (local {})", target, target.with_timezone(&Local));

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if cli.mute || !config.sound { None } else { SoundEngine::new() };

    let result = card_loop(&mut renderer, sound.as_ref(), &config, target);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("{e}");
        eprintln!("Card error: {e}");
    }

    log::logger().flush();
}

fn card_loop(
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &CardConfig,
    target: chrono::DateTime<chrono::Utc>,
) -> Result<(), CardError> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad connected");
    }
    let mut menu = Menu::new();

    let mut countdown = CountdownController::new(SystemClock, target, config.timing.clone());
    let mut fireworks: Option<FireworksEngine> = None;
    let frame_period = Duration::from_millis(config.timing.frame_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_requested() {
            info!("quit requested");
            break;
        }

        // Resolve input against whatever is on screen at that moment.
        let mut events = Vec::new();
        let intents: Vec<Intent> = kb.intents().iter().copied().chain(gp.intents()).collect();
        for intent in intents {
            let content = visible_content(countdown.page(), countdown.time_left(), countdown.message_visible());
            let action = match intent {
                Intent::Click { col, row } => {
                    renderer.button_at(col, row).and_then(|i| menu.press(i, &content))
                }
                other => menu.resolve(other, &content),
            };
            if let Some(action) = action {
                events.extend(countdown.apply(action));
            }
        }

        events.extend(countdown.poll());

        let viewport = kb.resized().unwrap_or(renderer.size());
        let started = sync_fireworks(&mut fireworks, countdown.fireworks_visible(), viewport, config, frame_period);
        if let Some(engine) = fireworks.as_mut() {
            if let (Some((cols, rows)), false) = (kb.resized(), started) {
                engine.on_resize(cols, rows);
            }
            events.extend(engine.poll(Instant::now()));
        }

        handle_events(&events, &mut menu, sound);

        let content = visible_content(countdown.page(), countdown.time_left(), countdown.message_visible());
        renderer.render(&Frame {
            content: &content,
            focus: menu.focused(&content),
            fireworks: fireworks.as_ref().map(|e| e.surface()),
            overlay: countdown.message_visible(),
        })?;

        std::thread::sleep(FRAME_SLEEP);
    }

    countdown.teardown();
    if let Some(mut engine) = fireworks.take() {
        engine.deactivate();
    }
    Ok(())
}

/// Start or stop the fireworks engine to match the controller's flag.
/// Entering `NewYear` by hand never starts them; only the flag does.
/// Returns true when a new engine was built at the given size.
fn sync_fireworks(
    slot: &mut Option<FireworksEngine>,
    visible: bool,
    (cols, rows): (u16, u16),
    config: &CardConfig,
    frame_period: Duration,
) -> bool {
    let running = slot.as_ref().is_some_and(|e| e.is_active());
    match (running, visible) {
        (false, true) => {
            *slot = Some(FireworksEngine::activate(
                cols,
                rows,
                config.fireworks.clone(),
                frame_period,
                fastrand::Rng::new(),
                Instant::now(),
            ));
            true
        }
        (true, false) => {
            if let Some(mut engine) = slot.take() {
                engine.deactivate();
            }
            false
        }
        _ => false,
    }
}

fn handle_events(events: &[CardEvent], menu: &mut Menu, sound: Option<&SoundEngine>) {
    for event in events {
        match event {
            CardEvent::Tick(left) => trace!("{}s to go", left.total_seconds()),
            CardEvent::Midnight => {
                info!("happy new year");
                if let Some(sfx) = sound { sfx.play_chime(); }
            }
            CardEvent::MessageShown | CardEvent::MessageHidden => menu.reset(),
            CardEvent::PageChanged { from, to } => {
                debug!("page {from:?} -> {to:?}");
                menu.reset();
                if let Some(sfx) = sound { sfx.play_click(); }
            }
            CardEvent::RocketLaunched => {
                if let Some(sfx) = sound { sfx.play_launch(); }
            }
            CardEvent::Burst { x, y, color } => {
                trace!("burst at ({x:.0}, {y:.0}) rgb{:?}", color.to_u8());
                if let Some(sfx) = sound { sfx.play_burst(); }
            }
        }
    }
}
