//! Gateway request translation

use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::PresetId;

/// Displays the gateway can address, mapped to their command topics
pub const TARGETS: [(&str, &str); 3] = [
    ("wc", "home/displays/wc"),
    ("bathroom", "home/displays/bathroom"),
    ("eva", "home/displays/eva"),
];

/// Fields accepted from a query string or a JSON body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandRequest {
    pub target: Option<String>,
    pub mode: Option<String>,
    #[serde(alias = "text")]
    pub name: Option<String>,
    pub duration: Option<Value>,
    pub preset_id: Option<String>,
    pub artist: Option<String>,
    pub song: Option<String>,
}

/// A command ready to publish
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub topic: &'static str,
    pub payload: Value,
    pub summary: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Whole seconds from a number or numeric string; `Ok(None)` when absent or empty
fn whole_seconds(value: &Option<Value>) -> Result<Option<u64>, String> {
    let invalid = |v: &Value| format!("Invalid duration: {}", v);
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| format!("Invalid duration: {}", s)),
        Some(v @ Value::Number(n)) => match n.as_u64() {
            Some(seconds) => Ok(Some(seconds)),
            None => match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as u64)),
                _ => Err(invalid(v)),
            },
        },
        Some(v) => Err(invalid(v)),
    }
}

fn topic_for(target: &str) -> Result<&'static str, String> {
    let target_lower = target.to_lowercase();
    TARGETS
        .iter()
        .find(|(name, _)| *name == target_lower)
        .map(|(_, topic)| *topic)
        .ok_or_else(|| format!("Invalid target display: {}", target))
}

fn valid_presets() -> String {
    PresetId::ALL
        .iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a request and build the bus message; `Err` carries the 400 reason
pub fn translate(request: &CommandRequest) -> Result<Outbound, String> {
    let target = present(&request.target);
    let name = present(&request.name);

    let (payload, summary) = match present(&request.mode).unwrap_or("timer") {
        "timer" => {
            let duration = whole_seconds(&request.duration)?.filter(|seconds| *seconds > 0);
            let (Some(_), Some(name), Some(duration)) = (target, name, duration) else {
                return Err("Missing target, text, or duration".to_string());
            };
            (json!({ "name": name, "duration": duration }), format!("timer {} ({}s)", name, duration))
        }
        "preset" => {
            let preset = present(&request.preset_id).and_then(|id| id.parse::<PresetId>().ok());
            let (Some(_), Some(preset)) = (target, preset) else {
                return Err(format!(
                    "Invalid target or preset_id. Valid presets: {}",
                    valid_presets()
                ));
            };
            let duration = whole_seconds(&request.duration)?.filter(|seconds| *seconds > 0);
            let mut payload = json!({
                "mode": "preset",
                "preset_id": preset.as_str(),
                "name": name.unwrap_or(""),
                "duration": duration,
            });
            if preset == PresetId::Music {
                if let Some(artist) = present(&request.artist) {
                    payload["artist"] = json!(artist);
                }
                if let Some(song) = present(&request.song) {
                    payload["song"] = json!(song);
                }
            }
            (payload, format!("preset {}", preset))
        }
        other => return Err(format!("Invalid mode: {}", other)),
    };

    let topic = topic_for(target.unwrap_or_default())?;
    Ok(Outbound {
        topic,
        payload,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(fields: Value) -> CommandRequest {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn timer_request_maps_to_display_topic() {
        let outbound = translate(&request(json!({
            "target": "WC",
            "text": "BREAK",
            "duration": "300"
        })))
        .unwrap();
        assert_eq!(outbound.topic, "home/displays/wc");
        assert_eq!(outbound.payload, json!({ "name": "BREAK", "duration": 300 }));
    }

    #[test]
    fn timer_requires_all_fields() {
        for fields in [
            json!({ "name": "A", "duration": 5 }),
            json!({ "target": "wc", "duration": 5 }),
            json!({ "target": "wc", "name": "A" }),
            json!({ "target": "wc", "name": "A", "duration": 0 }),
        ] {
            assert_eq!(
                translate(&request(fields)),
                Err("Missing target, text, or duration".to_string())
            );
        }
    }

    #[test]
    fn non_integer_duration_is_rejected() {
        let err = translate(&request(json!({ "target": "wc", "name": "A", "duration": "abc" })));
        assert_eq!(err, Err("Invalid duration: abc".to_string()));

        let err = translate(&request(json!({ "target": "wc", "name": "A", "duration": 2.5 })));
        assert!(err.is_err());
    }

    #[test]
    fn preset_request_carries_optional_fields() {
        let outbound = translate(&request(json!({
            "target": "eva",
            "mode": "preset",
            "preset_id": "music",
            "artist": "Artist",
            "song": "Song"
        })))
        .unwrap();
        assert_eq!(outbound.topic, "home/displays/eva");
        assert_eq!(
            outbound.payload,
            json!({
                "mode": "preset",
                "preset_id": "music",
                "name": "",
                "duration": null,
                "artist": "Artist",
                "song": "Song"
            })
        );
    }

    #[test]
    fn unknown_preset_lists_valid_ones() {
        let err = translate(&request(json!({ "target": "wc", "mode": "preset", "preset_id": "disco" })))
            .unwrap_err();
        assert!(err.starts_with("Invalid target or preset_id"));
        assert!(err.contains("on_air, score, breaking, reset, music"));
    }

    #[test]
    fn unknown_target_is_rejected() {
        let err = translate(&request(json!({ "target": "kitchen", "name": "A", "duration": 5 })));
        assert_eq!(err, Err("Invalid target display: kitchen".to_string()));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = translate(&request(json!({ "target": "wc", "mode": "laser" })));
        assert_eq!(err, Err("Invalid mode: laser".to_string()));
    }
}
