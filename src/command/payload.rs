//! Inbound command payloads

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::CommandError,
    state::{timer_state::countdown_seconds, PresetOptions},
};

/// A validated display command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Timer { name: String, duration: f64 },
    /// `preset_id` is checked against the preset table when the command is applied
    Preset { preset_id: String, options: PresetOptions },
}

/// Result of decoding one bus message
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    /// Correlation id for the acknowledgment, recovered even from invalid commands
    pub message_id: Option<String>,
    pub command: Result<Command, CommandError>,
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    mode: Option<String>,
    name: Option<String>,
    duration: Option<Value>,
    preset_id: Option<String>,
    artist: Option<String>,
    song: Option<String>,
}

/// Decode a JSON command payload
pub fn decode(payload: &[u8]) -> DecodedMessage {
    let value: Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(e) => {
            return DecodedMessage {
                message_id: None,
                command: Err(CommandError::Parse(e.to_string())),
            }
        }
    };

    let Value::Object(fields) = &value else {
        return DecodedMessage {
            message_id: None,
            command: Err(CommandError::Parse("payload is not a JSON object".to_string())),
        };
    };

    let message_id = match fields.get("message_id") {
        Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    };

    let command = serde_json::from_value::<RawCommand>(value)
        .map_err(|e| CommandError::Invalid(e.to_string()))
        .and_then(Command::try_from);

    DecodedMessage { message_id, command }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl TryFrom<RawCommand> for Command {
    type Error = CommandError;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        match raw.mode.as_deref().unwrap_or("timer") {
            "timer" => {
                let name = raw
                    .name
                    .ok_or_else(|| CommandError::Invalid("timer command requires a name".to_string()))?;
                let duration = raw
                    .duration
                    .ok_or_else(|| CommandError::Invalid("timer command requires a duration".to_string()))?
                    .as_f64()
                    .ok_or_else(|| CommandError::Invalid("duration must be a number".to_string()))?;
                if countdown_seconds(duration).is_none() {
                    return Err(CommandError::Invalid(format!(
                        "duration must be at least one second, got {}",
                        duration
                    )));
                }
                Ok(Command::Timer { name, duration })
            }
            "preset" => {
                let preset_id = non_empty(raw.preset_id)
                    .ok_or_else(|| CommandError::Invalid("preset command requires a preset_id".to_string()))?;
                let duration = match raw.duration {
                    None | Some(Value::Null) => None,
                    Some(value) => {
                        let seconds = value
                            .as_f64()
                            .ok_or_else(|| CommandError::Invalid("duration must be a number".to_string()))?;
                        // Zero or negative means "until the next command"
                        if seconds > 0.0 {
                            Some(Duration::try_from_secs_f64(seconds).map_err(|e| {
                                CommandError::Invalid(format!("duration out of range: {}", e))
                            })?)
                        } else {
                            None
                        }
                    }
                };
                Ok(Command::Preset {
                    preset_id,
                    options: PresetOptions {
                        name: non_empty(raw.name),
                        duration,
                        artist: non_empty(raw.artist),
                        song: non_empty(raw.song),
                    },
                })
            }
            other => Err(CommandError::Invalid(format!("unknown mode: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_to_timer() {
        let decoded = decode(br#"{"name": "TEA", "duration": 180}"#);
        assert_eq!(decoded.message_id, None);
        assert_eq!(
            decoded.command,
            Ok(Command::Timer {
                name: "TEA".to_string(),
                duration: 180.0
            })
        );
    }

    #[test]
    fn timer_requires_positive_numeric_duration() {
        for payload in [
            r#"{"mode": "timer", "name": "x", "duration": -5}"#,
            r#"{"mode": "timer", "name": "x", "duration": 0}"#,
            r#"{"mode": "timer", "name": "x", "duration": "ten"}"#,
            r#"{"mode": "timer", "name": "x"}"#,
            r#"{"mode": "timer", "duration": 10}"#,
        ] {
            let decoded = decode(payload.as_bytes());
            assert!(
                matches!(decoded.command, Err(CommandError::Invalid(_))),
                "{payload} should be invalid"
            );
        }
    }

    #[test]
    fn preset_fields_are_optional() {
        let decoded = decode(
            br#"{"mode": "preset", "preset_id": "music", "artist": "Artist", "song": "", "duration": null, "message_id": "m-1"}"#,
        );
        assert_eq!(decoded.message_id.as_deref(), Some("m-1"));
        assert_eq!(
            decoded.command,
            Ok(Command::Preset {
                preset_id: "music".to_string(),
                options: PresetOptions {
                    name: None,
                    duration: None,
                    artist: Some("Artist".to_string()),
                    song: None,
                },
            })
        );
    }

    #[test]
    fn preset_duration_in_seconds() {
        let decoded = decode(br#"{"mode": "preset", "preset_id": "score", "duration": 2.5}"#);
        match decoded.command {
            Ok(Command::Preset { options, .. }) => {
                assert_eq!(options.duration, Some(Duration::from_millis(2500)))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_preset_id_decodes() {
        // Lookup happens against the preset table, not here
        let decoded = decode(br#"{"mode": "preset", "preset_id": "nonexistent"}"#);
        assert!(matches!(decoded.command, Ok(Command::Preset { .. })));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let decoded = decode(b"not json at all");
        assert!(matches!(decoded.command, Err(CommandError::Parse(_))));
        assert_eq!(decoded.message_id, None);

        let decoded = decode(b"[1, 2, 3]");
        assert!(matches!(decoded.command, Err(CommandError::Parse(_))));
    }

    #[test]
    fn message_id_survives_invalid_fields() {
        let decoded = decode(br#"{"mode": "timer", "name": 42, "duration": 5, "message_id": "abc"}"#);
        assert_eq!(decoded.message_id.as_deref(), Some("abc"));
        assert!(matches!(decoded.command, Err(CommandError::Invalid(_))));

        let decoded = decode(br#"{"mode": "laser", "message_id": 7}"#);
        assert_eq!(decoded.message_id.as_deref(), Some("7"));
        assert!(matches!(decoded.command, Err(CommandError::Invalid(_))));
    }
}
