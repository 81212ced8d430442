//! Line oriented front end for the speech demo.

use crate::speech::{Message, SessionState, ToggleOutcome, VoiceId};
use std::fmt::Write;

pub const HELP: &str = "\
Commands:
  list              show messages and their playback state
  toggle <id>       start or stop speaking a message (or just type the id)
  voices            list available voices
  voice <name>      select the voice used for the next message
  pause | resume    pause or resume the current playback
  stop              stop whatever is playing
  status            show what is being spoken
  help              show this help
  quit              stop playback and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Help,
    ListMessages,
    ListVoices,
    SelectVoice(String),
    Toggle(String),
    Pause,
    Resume,
    Stop,
    Status,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Command::Empty;
        };
        let argument = words.next();
        if words.next().is_some() {
            return Command::Unknown(line.trim().to_owned());
        }
        match (first.to_ascii_lowercase().as_str(), argument) {
            ("help" | "?", None) => Command::Help,
            ("list" | "messages", None) => Command::ListMessages,
            ("voices", None) => Command::ListVoices,
            ("voice", Some(name)) => Command::SelectVoice(name.to_owned()),
            ("toggle", Some(id)) => Command::Toggle(id.to_owned()),
            ("pause", None) => Command::Pause,
            ("resume", None) => Command::Resume,
            ("stop", None) => Command::Stop,
            ("status", None) => Command::Status,
            ("quit" | "exit", None) => Command::Quit,
            (_, None) => Command::Toggle(first.to_owned()),
            _ => Command::Unknown(line.trim().to_owned()),
        }
    }
}

pub fn find_message<'a>(messages: &'a [Message], id: &str) -> Option<&'a Message> {
    messages.iter().find(|message| message.id().as_str() == id)
}

pub fn render_messages(messages: &[Message], session: &SessionState) -> String {
    let mut out = String::new();
    for message in messages {
        _ = writeln!(out, "[{}] {}", message.id(), session.toggle_label(message.id()));
        if let Some(line) = session.speaking_line(message.id()) {
            _ = writeln!(out, "    {}", line);
        }
    }
    out
}

pub fn render_voices(voices: &[VoiceId], selected: &VoiceId) -> String {
    let mut out = String::new();
    for voice in voices {
        let marker = if voice == selected { "*" } else { " " };
        _ = writeln!(out, "{} {}", marker, voice);
    }
    out
}

pub fn describe_outcome(outcome: &ToggleOutcome) -> String {
    match outcome {
        ToggleOutcome::Playing { message_id, .. } => format!("Playing {}", message_id),
        ToggleOutcome::Stopped { message_id } => format!("Stopped {}", message_id),
        ToggleOutcome::Failed { message_id, error } => {
            format!("Could not play {}: {}", message_id, error)
        }
        ToggleOutcome::Superseded { message_id } => format!("Cancelled {}", message_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpeechError;
    use crate::speech::VoiceCatalog;

    fn messages() -> Vec<Message> {
        vec![
            Message::new("msg1", "Dark skies").unwrap(),
            Message::new("msg2", "Once upon a time").unwrap(),
        ]
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("voice Matthew"), Command::SelectVoice("Matthew".to_owned()));
        assert_eq!(Command::parse("toggle msg2"), Command::Toggle("msg2".to_owned()));
        assert_eq!(Command::parse("msg1"), Command::Toggle("msg1".to_owned()));
        assert_eq!(Command::parse("QUIT"), Command::Quit);
        assert_eq!(
            Command::parse("voice a b"),
            Command::Unknown("voice a b".to_owned())
        );
        assert_eq!(Command::parse("stop now"), Command::Unknown("stop now".to_owned()));
    }

    #[test]
    fn finds_messages_by_id() {
        let messages = messages();
        assert_eq!(find_message(&messages, "msg2").unwrap().text(), "Once upon a time");
        assert!(find_message(&messages, "msg3").is_none());
    }

    #[test]
    fn renders_active_message() {
        let messages = messages();
        let mut session = SessionState::default();
        session.start(&messages[0]);
        assert_eq!(
            render_messages(&messages, &session),
            "[msg1] Stop Playback\n    Speaking: Dark skies\n[msg2] Start Playback\n"
        );
    }

    #[test]
    fn marks_selected_voice() {
        let catalog = VoiceCatalog::new(["Ivy", "Joey"]);
        let selected = catalog.lookup("Joey").unwrap();
        assert_eq!(render_voices(catalog.voices(), &selected), "  Ivy\n* Joey\n");
    }

    #[test]
    fn describes_failures() {
        let outcome = ToggleOutcome::Failed {
            message_id: "msg1".into(),
            error: SpeechError::EmptyAudioStream,
        };
        assert_eq!(
            describe_outcome(&outcome),
            "Could not play msg1: Synthesis returned an empty audio stream"
        );
    }
}
