use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::{Result, TrainerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Rep,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    #[serde(deserialize_with = "transcript_timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// Saved transcripts carry RFC 3339 timestamps or naive ISO-8601 ones written in UTC.
mod transcript_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(timestamp.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>()
            .map(|naive| naive.and_utc())
            .map_err(|e| de::Error::custom(format!("invalid timestamp {:?}: {}", raw, e)))
    }
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered list of turns. Serializes as a bare JSON array, the saved-transcript format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn push_rep(&mut self, text: impl Into<String>) {
        self.push(Turn::new(Speaker::Rep, text));
    }

    pub fn push_ai(&mut self, text: impl Into<String>) {
        self.push(Turn::new(Speaker::Ai, text));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn rep_turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|t| t.speaker == Speaker::Rep)
    }

    pub fn ai_turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|t| t.speaker == Speaker::Ai)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    ColdCall,
    FollowUpCall,
    DemoCall,
    PricingNegotiationCall,
    RenewalCall,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::ColdCall,
        Scenario::FollowUpCall,
        Scenario::DemoCall,
        Scenario::PricingNegotiationCall,
        Scenario::RenewalCall,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::ColdCall => "Cold call",
            Scenario::FollowUpCall => "Follow-up call",
            Scenario::DemoCall => "Demo call",
            Scenario::PricingNegotiationCall => "Pricing/negotiation call",
            Scenario::RenewalCall => "Renewal call",
        }
    }

    /// First word of the lower-cased label, used as the scenario keyword when scoring.
    pub fn keyword(&self) -> String {
        self.label()
            .to_lowercase()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::ColdCall
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['-', '_', '/'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for Scenario {
    type Err = TrainerError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_name(s);
        Scenario::ALL
            .iter()
            .copied()
            .find(|scenario| {
                let label = normalize_name(scenario.label());
                label == wanted
                    || normalize_name(&scenario.keyword()) == wanted
                    || label.split(' ').next() == Some(wanted.as_str())
            })
            .ok_or_else(|| TrainerError::InvalidConfigValueError {
                field: "scenario".to_string(),
                value: s.to_string(),
                reason: format!(
                    "Unknown scenario. Valid scenarios: {}",
                    Scenario::ALL
                        .iter()
                        .map(|s| s.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Persona {
    Friendly,
    Skeptical,
    Rushed,
    Annoyed,
    TechnicalBuyer,
    EconomicBuyer,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonaProfile {
    pub tone: &'static str,
    pub verbosity: &'static str,
    pub objection_likelihood: f64,
}

impl Persona {
    pub const BUILT_IN: [Persona; 6] = [
        Persona::Friendly,
        Persona::Skeptical,
        Persona::Rushed,
        Persona::Annoyed,
        Persona::TechnicalBuyer,
        Persona::EconomicBuyer,
    ];

    pub fn name(&self) -> &str {
        match self {
            Persona::Friendly => "Friendly",
            Persona::Skeptical => "Skeptical",
            Persona::Rushed => "Rushed",
            Persona::Annoyed => "Annoyed",
            Persona::TechnicalBuyer => "Technical buyer",
            Persona::EconomicBuyer => "Economic buyer",
            Persona::Other(name) => name,
        }
    }

    pub fn profile(&self) -> PersonaProfile {
        let (tone, verbosity, objection_likelihood) = match self {
            Persona::Friendly => ("friendly", "medium", 0.25),
            Persona::Skeptical => ("skeptical", "short", 0.6),
            Persona::Rushed => ("rushed", "short", 0.45),
            Persona::Annoyed => ("annoyed", "short", 0.7),
            Persona::TechnicalBuyer => ("technical", "detailed", 0.4),
            Persona::EconomicBuyer => ("pragmatic", "medium", 0.5),
            Persona::Other(_) => ("neutral", "medium", 0.3),
        };
        PersonaProfile {
            tone,
            verbosity,
            objection_likelihood,
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Persona::Friendly
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Persona {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        Ok(Persona::BUILT_IN
            .iter()
            .find(|p| normalize_name(p.name()) == wanted)
            .cloned()
            .unwrap_or_else(|| Persona::Other(s.trim().to_string())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub confidence_score: u32,
    pub objection_score: u32,
    pub outcome_rating: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreReport {
    pub scores: Scores,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    M4a,
}

impl AudioFormat {
    pub const EXTENSIONS: [&'static str; 3] = ["wav", "mp3", "m4a"];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" => Some(AudioFormat::Wav),
            "mp3" => Some(AudioFormat::Mp3),
            "m4a" => Some(AudioFormat::M4a),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::M4a => "audio/mp4",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRequest {
    pub owner: String,
    pub slug: String,
}

impl DatasetRequest {
    /// Parses an `owner/slug` handle.
    pub fn parse(handle: &str) -> Result<Self> {
        match handle.trim().split_once('/') {
            Some((owner, slug))
                if !owner.is_empty() && !slug.is_empty() && !slug.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    slug: slug.to_string(),
                })
            }
            _ => Err(TrainerError::InvalidConfigValueError {
                field: "dataset.handle".to_string(),
                value: handle.to_string(),
                reason: "Expected the form owner/dataset".to_string(),
            }),
        }
    }

    pub fn handle(&self) -> String {
        format!("{}/{}", self.owner, self.slug)
    }

    pub fn directory_name(&self) -> String {
        format!("{}__{}", self.owner, self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_serializes_in_transcript_shape() {
        let turn = Turn::new(Speaker::Rep, "Hello there");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["speaker"], "rep");
        assert_eq!(value["text"], "Hello there");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_conversation_loads_saved_transcript() {
        let json = r#"[
            {"speaker": "rep", "text": "Hi, quick call?", "timestamp": "2024-05-01T10:00:00Z"},
            {"speaker": "ai", "text": "Send me an email.", "timestamp": "2024-05-01T10:00:01Z"}
        ]"#;
        let conversation: Conversation = serde_json::from_str(json).unwrap();
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.rep_turns().count(), 1);
        assert_eq!(conversation.ai_turns().count(), 1);
        assert_eq!(conversation.transcript(), "Hi, quick call? Send me an email.");
    }

    #[test]
    fn test_conversation_loads_naive_utc_timestamps() {
        let json = r#"[
            {"speaker": "rep", "text": "Hi", "timestamp": "2024-05-01T10:00:00.123456"},
            {"speaker": "ai", "text": "Who is this?", "timestamp": "2024-05-01T10:00:02"}
        ]"#;
        let conversation: Conversation = serde_json::from_str(json).unwrap();
        let first = conversation.turns()[0].timestamp;
        assert_eq!(first.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");

        let reserialized = serde_json::to_value(&conversation).unwrap();
        assert_eq!(reserialized[1]["timestamp"], "2024-05-01T10:00:02Z");

        let bad = r#"[{"speaker": "rep", "text": "Hi", "timestamp": "yesterday"}]"#;
        assert!(serde_json::from_str::<Conversation>(bad).is_err());
    }

    #[test]
    fn test_scenario_parsing() {
        assert_eq!("Cold call".parse::<Scenario>().unwrap(), Scenario::ColdCall);
        assert_eq!("cold-call".parse::<Scenario>().unwrap(), Scenario::ColdCall);
        assert_eq!("renewal".parse::<Scenario>().unwrap(), Scenario::RenewalCall);
        assert_eq!(
            "follow-up".parse::<Scenario>().unwrap(),
            Scenario::FollowUpCall
        );
        assert_eq!(
            "pricing/negotiation call".parse::<Scenario>().unwrap(),
            Scenario::PricingNegotiationCall
        );
        for slug in ["pricing-negotiation-call", "pricing-negotiation", "pricing", "pricing_negotiation"] {
            assert_eq!(
                slug.parse::<Scenario>().unwrap(),
                Scenario::PricingNegotiationCall,
                "{}",
                slug
            );
        }
        assert_eq!("demo".parse::<Scenario>().unwrap(), Scenario::DemoCall);
        assert_eq!("follow".parse::<Scenario>().unwrap(), Scenario::FollowUpCall);
        assert!("board meeting".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_scenario_keyword() {
        assert_eq!(Scenario::ColdCall.keyword(), "cold");
        assert_eq!(Scenario::FollowUpCall.keyword(), "follow-up");
        assert_eq!(
            Scenario::PricingNegotiationCall.keyword(),
            "pricing/negotiation"
        );
    }

    #[test]
    fn test_persona_parsing_falls_back_to_other() {
        assert_eq!(
            "technical-buyer".parse::<Persona>().unwrap(),
            Persona::TechnicalBuyer
        );
        assert_eq!("SKEPTICAL".parse::<Persona>().unwrap(), Persona::Skeptical);
        assert_eq!(
            "Gatekeeper".parse::<Persona>().unwrap(),
            Persona::Other("Gatekeeper".to_string())
        );
    }

    #[test]
    fn test_persona_profiles() {
        let annoyed = Persona::Annoyed.profile();
        assert_eq!(annoyed.tone, "annoyed");
        assert_eq!(annoyed.verbosity, "short");
        assert_eq!(annoyed.objection_likelihood, 0.7);

        let other = Persona::Other("Gatekeeper".into()).profile();
        assert_eq!(other.tone, "neutral");
        assert_eq!(other.objection_likelihood, 0.3);
    }

    #[test]
    fn test_dataset_request_parse() {
        let req = DatasetRequest::parse("axondata/call-center-speech-dataset").unwrap();
        assert_eq!(req.owner, "axondata");
        assert_eq!(req.directory_name(), "axondata__call-center-speech-dataset");
        assert!(DatasetRequest::parse("no-slash").is_err());
        assert!(DatasetRequest::parse("a/b/c").is_err());
    }
}
