//! Pocket Timer - a countdown timer with alarm controls
//!
//! This is the terminal host: it wires the terminal collaborators into the
//! timer, feeds stdin commands to the control loop and shuts down on signals.

use std::{io::BufRead, sync::Arc};

use tracing::{info, warn};

use pocket_timer::{
    config::Config,
    control::{request_shutdown, Command, CommandSender, Control, Controller, RemoteAction, RemoteControlRouter},
    services::{
        terminal::{GrantedPermission, LogHaptics, LogNotificationSink, TerminalBell, TerminalSurface},
        Collaborators, MemoryPreferenceStore, PreferenceStore,
    },
    state::{AppState, TimerDuration},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pocket_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting pocket-timer v1.0.0");

    let preferences: Arc<dyn PreferenceStore> = match &config.preferences {
        Some(path) => {
            info!("Loading preferences from {}", path.display());
            Arc::new(MemoryPreferenceStore::from_json_file(path)?)
        }
        None => Arc::new(MemoryPreferenceStore::new()),
    };

    let (state, commands) = AppState::new(Collaborators {
        app_name: config.app_name.clone(),
        preferences,
        notifications: Arc::new(LogNotificationSink),
        permissions: Arc::new(GrantedPermission),
        sound: Arc::new(TerminalBell),
        haptics: Arc::new(LogHaptics),
    });

    let mut controller = Controller::new(Arc::clone(&state), TerminalSurface::new());
    let inputs = config.duration()?;
    controller.handle(Command::SetInputs(inputs));
    if !inputs.is_zero() {
        controller.handle(Command::Press(Control::StartStop));
    }

    let router = RemoteControlRouter::new(state.commands.clone());
    let input_tx = state.commands.clone();
    std::thread::spawn(move || read_commands(input_tx, router));

    let shutdown_tx = state.commands.clone();
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            warn!("Failed to install signal handler: {}", e);
            return;
        }
        info!("Shutdown signal received");
        request_shutdown(&shutdown_tx);
    });

    println!("Commands: s start/stop, p pause/resume, x stop alert, h:m:s set time, q quit");
    println!("Remote actions: stop-timer, pause-timer, resume-timer, stop-sound, stop-vibration");
    controller.run(commands).await;

    info!("Timer shutdown complete");
    Ok(())
}

/// Translate stdin lines into control commands.
///
/// Runs on a plain thread so a pending read never holds up shutdown.
fn read_commands(commands: CommandSender, router: RemoteControlRouter) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        };

        let input = line.trim();
        let command = match input {
            "" => continue,
            "s" => Command::Press(Control::StartStop),
            "p" => Command::Press(Control::PauseResume),
            "x" => Command::Press(Control::StopAlert),
            "q" => Command::Shutdown,
            _ => {
                if let Ok(action) = input.parse::<RemoteAction>() {
                    if let Err(e) = router.dispatch(action) {
                        warn!("{}", e);
                        break;
                    }
                    continue;
                }
                match parse_inputs(input) {
                    Some(duration) => Command::SetInputs(duration),
                    None => {
                        println!(">> Unknown command: {}", input);
                        continue;
                    }
                }
            }
        };

        if commands.send(command).is_err() {
            break;
        }
    }
}

/// Parse `h:m:s` picker values
fn parse_inputs(input: &str) -> Option<TimerDuration> {
    let parts: Vec<u32> = input
        .split(':')
        .map(|part| part.parse().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [h, m, s] => TimerDuration::new(*h, *m, *s).ok(),
        _ => None,
    }
}
