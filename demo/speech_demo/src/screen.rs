//! Line commands standing in for the screen's widgets.

use speech_core::{AppState, Voice};

pub const HELP: &str = "\
Commands:
  read              Read Text
  text <words...>   edit the text field
  rate <0.5-2.0>    move the Speech Rate slider
  pitch <0.5-2.0>   move the Speech Pitch slider
  voice <n|id>      pick a voice from the list
  voices | show     redraw the screen
  help              this message
  quit              exit";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Read,
    Text(String),
    Rate(f64),
    Pitch(f64),
    Voice(String),
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "read" | "r" => Ok(Command::Read),
            "text" | "t" => Ok(Command::Text(rest.to_string())),
            "rate" => parse_value(rest).map(Command::Rate),
            "pitch" => parse_value(rest).map(Command::Pitch),
            "voice" | "v" if !rest.is_empty() => Ok(Command::Voice(rest.to_string())),
            "voice" | "v" => Err("usage: voice <n|id>".into()),
            "voices" | "show" | "" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command `{}`; try `help`", other)),
        }
    }
}

fn parse_value(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("expected a number, got `{}`", s))
}

/// Resolve a 1-based list position or a voice id against the rendered list.
pub fn pick_voice<'a>(state: &'a AppState, arg: &str) -> Option<&'a Voice> {
    if let Some(v) = state.find_voice(arg) {
        return Some(v);
    }
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| state.available_voices.get(i))
}
