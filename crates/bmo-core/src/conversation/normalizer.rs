//! Normalization of untrusted model replies into [`CanonicalResponse`].
//!
//! The model is asked for a JSON object with a fixed shape, but nothing it
//! sends is trusted. Parsing has two steps:
//!
//! 1. [`RawModelReply::parse`] rejects anything that is not a JSON object.
//!    That is the only failure; the turn is aborted.
//! 2. [`ResponseNormalizer::normalize`] derives every canonical field
//!    independently. Missing, mistyped or blank fields fall back to defaults,
//!    so a parsed reply always normalizes.
//!
//! Scalar fields accept strings as given and render numbers and booleans as
//! text; `null`, arrays and objects count as absent.

use serde::Deserialize;
use serde_json::Value;

use bmo_types::conversation::{CanonicalResponse, Emotion, Mode, NavigationDisplay};
use bmo_types::error::ConversationError;

/// Destination used when the model names none.
pub const GENERAL_DESTINATION: &str = "General";

pub const DEFAULT_ZONE: &str = "Yellow";

pub const DEFAULT_DIRECTION_GUIDE: &str = "Use the Central Library as your anchor.";

/// Closing step added when the fan-out produces fewer than three steps.
pub const SIGNAGE_STEP: &str = "Use on-site signage once you reach the zone perimeter.";

/// Upper bound on synthesized steps, zone sentence included.
const MAX_FAN_OUT_STEPS: usize = 4;

/// Below this many synthesized steps the signage step is appended.
const MIN_FAN_OUT_STEPS: usize = 3;

/// Model reply after the schema step: every known key, each optional and
/// still untyped. Unknown keys are ignored.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawModelReply {
    pub thought: Option<Value>,
    pub voice_response: Option<Value>,
    pub navigation_display: Option<Value>,
    pub destination: Option<Value>,
    pub directions: Option<Value>,
    pub emotion: Option<Value>,
}

impl RawModelReply {
    /// Parse raw model text. Fails unless it is a JSON object.
    pub fn parse(raw: &str) -> Result<Self, ConversationError> {
        let value: Value =
            serde_json::from_str(raw.trim()).map_err(|e| ConversationError::MalformedModelOutput {
                reason: e.to_string(),
            })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ConversationError> {
        if !value.is_object() {
            return Err(ConversationError::MalformedModelOutput {
                reason: format!("expected a JSON object, got {}", json_kind(&value)),
            });
        }
        serde_json::from_value(value).map_err(|e| ConversationError::MalformedModelOutput {
            reason: e.to_string(),
        })
    }

    /// Field of `navigation_display`, if that is an object.
    fn nav_field(&self, key: &str) -> Option<&Value> {
        self.navigation_display
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|nav| nav.get(key))
    }
}

/// Turns a [`RawModelReply`] into a [`CanonicalResponse`].
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    default_greeting: String,
}

impl ResponseNormalizer {
    pub fn new(default_greeting: impl Into<String>) -> Self {
        Self {
            default_greeting: default_greeting.into(),
        }
    }

    pub fn normalize(&self, reply: &RawModelReply) -> CanonicalResponse {
        let narration = text_field(reply.voice_response.as_ref())
            .unwrap_or_else(|| self.default_greeting.trim().to_string());

        let destination = text_field(reply.nav_field("target_building"))
            .or_else(|| text_field(reply.destination.as_ref()))
            .unwrap_or_else(|| GENERAL_DESTINATION.to_string());

        let zone_color = text_field(reply.nav_field("zone_color"))
            .map(|zone| title_case(&zone))
            .unwrap_or_else(|| DEFAULT_ZONE.to_string());

        let direction_guide = text_field(reply.nav_field("direction_guide"))
            .unwrap_or_else(|| DEFAULT_DIRECTION_GUIDE.to_string());

        let provided = provided_directions(reply.directions.as_ref());
        let directions = if provided.is_empty() {
            fan_out_directions(&direction_guide, &zone_color)
        } else {
            provided
        };

        let mode = Mode::derive(&destination, &directions);

        let emotion = scalar_text(reply.emotion.as_ref())
            .and_then(|label| Emotion::parse_label(&label))
            .unwrap_or_default();

        let thought = text_field(reply.thought.as_ref()).unwrap_or_default();

        CanonicalResponse {
            narration,
            destination: destination.clone(),
            directions,
            mode,
            thought,
            emotion,
            navigation_display: NavigationDisplay {
                target_building: destination,
                zone_color,
                direction_guide,
            },
        }
    }
}

/// Manufacture steps from one free-text guide.
///
/// Starts with the zone anchor sentence, then appends sentence segments of
/// `guide` until there are four steps. Short results get the signage step.
pub fn fan_out_directions(guide: &str, zone_color: &str) -> Vec<String> {
    let mut steps = Vec::with_capacity(MAX_FAN_OUT_STEPS);
    steps.push(format!(
        "Aim for the {zone_color} Zone relative to the Central Library."
    ));

    for segment in sentence_segments(guide) {
        if steps.len() >= MAX_FAN_OUT_STEPS {
            break;
        }
        steps.push(segment.to_string());
    }

    if steps.len() < MIN_FAN_OUT_STEPS {
        steps.push(SIGNAGE_STEP.to_string());
    }
    steps
}

/// Split at whitespace that follows `.`, `!` or `?`, then strip surrounding
/// commas, periods and whitespace. Empty segments are dropped.
fn sentence_segments(guide: &str) -> Vec<&str> {
    let mut raw = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = guide.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            raw.push(&guide[start..i]);
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
            start = end;
            prev = None;
            continue;
        }
        prev = Some(c);
    }
    raw.push(&guide[start..]);

    raw.into_iter()
        .map(|s| s.trim_matches(|c: char| c == ',' || c == '.' || c.is_whitespace()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Model-supplied steps: string entries only, trimmed, blanks dropped.
fn provided_directions(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Scalar rendered as text, trimmed; `None` when absent or blank.
fn text_field(value: Option<&Value>) -> Option<String> {
    scalar_text(value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
