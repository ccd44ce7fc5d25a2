mod config;
mod screen;

use config::DemoConfig;
use screen::{pick_voice, Command, HELP};
use speech_audio::CliSpeechService;
use speech_core::{render_screen, AppState, SpeechDemoController, SpeechError};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging / tracing (stderr, so the screen on stdout stays readable)
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "info,speech_core=info,speech_audio=info,speech_demo=info".to_string()
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(target: "speech_demo", "Starting Text to Speech demo");

    // Load configuration (defaults + env + optional TOML overlay)
    let cfg = DemoConfig::load();

    let service = Arc::new(CliSpeechService::new(Some(cfg.tts.clone())));
    let mut controller = SpeechDemoController::with_state(
        service,
        AppState::with_text(cfg.initial_text.clone()),
        cfg.error_policy,
    );

    // Mount: discover engines and voices once
    controller.initialize().await;
    print!("{}", render_screen(controller.state()));
    println!("(type `help` for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!(target: "speech_demo", "Shutting down...");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => dispatch(&mut controller, cmd).await,
                    Err(msg) => println!("{}", msg),
                }
            }
        }
    }

    Ok(())
}

/// Route one command to its action handler and redraw the screen.
async fn dispatch(controller: &mut SpeechDemoController, cmd: Command) {
    debug!(target: "speech_demo", command = ?cmd, "Dispatching");
    controller.dismiss_error();
    let (action, outcome) = match cmd {
        Command::Read => ("read_text", controller.read_text().await),
        Command::Text(text) => {
            controller.set_text(text);
            ("set_text", Ok(()))
        }
        Command::Rate(rate) => ("update_speech_rate", controller.update_speech_rate(rate).await),
        Command::Pitch(pitch) => {
            controller.update_speech_pitch(pitch);
            ("update_speech_pitch", Ok(()))
        }
        Command::Voice(arg) => {
            let picked = pick_voice(controller.state(), &arg).cloned();
            match picked {
                Some(voice) => ("on_voice_press", controller.on_voice_press(&voice).await),
                None => ("on_voice_press", Err(SpeechError::UnknownVoice(arg))),
            }
        }
        Command::Help => {
            println!("{}", HELP);
            return;
        }
        Command::Show | Command::Quit => ("show", Ok(())),
    };
    if let Err(e) = outcome {
        controller.absorb(action, &e);
    }
    print!("{}", render_screen(controller.state()));
}
