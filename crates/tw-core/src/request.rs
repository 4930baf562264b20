use serde::{Deserialize, Serialize};

/// A story generation request. Immutable once parsed; the fingerprint of a
/// request is the cache key for its story payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRequest {
    pub story_idea: String,
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_art_style")]
    pub art_style: String,
    #[serde(default)]
    pub characters: Vec<String>,
}

impl StoryRequest {
    /// Lead character, defaulting when the request names nobody.
    pub fn main_character(&self) -> &str {
        self.characters
            .first()
            .map(String::as_str)
            .unwrap_or("brave hero")
    }

    pub fn supporting_characters(&self) -> &[String] {
        if self.characters.len() > 1 {
            &self.characters[1..]
        } else {
            &[]
        }
    }
}

fn default_genre() -> String {
    "fantasy".to_string()
}

fn default_tone() -> String {
    "lighthearted".to_string()
}

fn default_audience() -> String {
    "all".to_string()
}

fn default_art_style() -> String {
    "cartoon".to_string()
}
