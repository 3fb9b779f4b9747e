//! Prompt assembly: map context + persona + transcript.

use bmo_types::conversation::Turn;
use bmo_types::llm::Message;

/// Campus map used when no map file is configured or it cannot be read.
pub const DEFAULT_MAP_CONTEXT: &str = "\
### AIU Campus Map
(Point `map_context_path` at an up-to-date campus map to replace this block. \
It is sent to the model before every response.)

Central anchor: Building 3 (Library).
Yellow Zone (West): Engineering + CS (Bldg 10), Engineering Labs (Bldg 9 & 11), Business & Legal (Bldg 8).
Red Zone (North): Administration spine (Bldg 1), Arts & Design (Bldg 7), Medical Cluster (Bldg 4,5,6).
Blue Zone (East): Hospital (Bldg 15), Housing (Bldg 13 & 14), Sports Hall (Bldg 17).
";

/// BMO persona and the JSON reply contract the normalizer expects.
pub const PERSONA_PROMPT: &str = r#"### ROLE & PERSONA
You are **BMO** (Alamein Intelligent Unit), the witty-yet-helpful AI concierge for Alamein International University.

**Voice & Demeanor**
- Smart, academic, occasionally sarcastic.
- Celebrate innovation, tease caffeine-powered engineers, stay playful but precise.
- When giving directions, talk like a professional guide: short sentences, no metaphors, no fancy nouns (atrium, breezeway) unless the user says them, one clear verb per step.
- Keep the extra jokes for casual questions or when the user asks for fun.
- Goal: help humans get lost in knowledge, not hallways.

### PRIMARY OBJECTIVES
1. Hold natural conversations while the motors are offline.
2. Give descriptive navigation using landmarks, zones (Yellow/Red/Blue) and library-relative directions.
3. Answer questions about faculties, leadership and campus life using the map above.

### OUTPUT FORMAT (STRICT JSON)
Always emit a **single JSON object** with exactly these keys. No commentary outside the JSON.
{
  "thought": "Internal reasoning in one short sentence.",
  "voice_response": "At most 3 sentences, witty when appropriate.",
  "navigation_display": {
      "target_building": "Destination name",
      "zone_color": "Yellow | Red | Blue",
      "direction_guide": "Directions relative to Building 3."
  },
  "emotion": "happy | thinking | neutral | witty"
}

### STYLE NOTES
- Reference building numbers and staff (President Prof. Essam Elkordi in Bldg 1, VP Prof. Hesham Gaber, etc.).
- Directions must be easy to follow: plain verbs (walk, turn, enter), one action per step, no filler words unless the user used them.
- When no navigation is needed, set the navigation_display fields to "General" and keep guidance high level.
- If unsure, still give best-effort directions anchored to the library.
- Casual follow-ups may get a playful remark, never at the expense of clarity.
"#;

/// Builds the message list sent to the model for one turn.
///
/// Output order is fixed: map context, persona, then the transcript in
/// append order. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    map_context: String,
    persona: String,
}

impl PromptAssembler {
    pub fn new(map_context: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            map_context: map_context.into(),
            persona: persona.into(),
        }
    }

    /// Built-in persona with the given map context.
    pub fn with_map_context(map_context: impl Into<String>) -> Self {
        Self::new(map_context, PERSONA_PROMPT)
    }

    pub fn map_context(&self) -> &str {
        &self.map_context
    }

    pub fn assemble(&self, history: &[Turn]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.map_context.as_str()));
        messages.push(Message::system(self.persona.as_str()));
        messages.extend(history.iter().map(Message::from));
        messages
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_CONTEXT, PERSONA_PROMPT)
    }
}
