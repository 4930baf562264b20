use serde::{Deserialize, Serialize};

/// The four fixed narrative beats of a story, each requiring an illustration.
///
/// The variant order is the canonical order; all iteration over scenes goes
/// through [`SceneId::ALL`] so output stays reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SceneId {
    Introduction,
    // JSON keys use the display form, space included.
    #[serde(rename = "Rising Action")]
    RisingAction,
    Climax,
    Resolution,
}

impl SceneId {
    pub const ALL: [SceneId; 4] = [
        Self::Introduction,
        Self::RisingAction,
        Self::Climax,
        Self::Resolution,
    ];

    /// Display name used in story payloads and API responses.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Introduction => "Introduction",
            Self::RisingAction => "Rising Action",
            Self::Climax => "Climax",
            Self::Resolution => "Resolution",
        }
    }

    /// Filename-safe identifier.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::RisingAction => "rising_action",
            Self::Climax => "climax",
            Self::Resolution => "resolution",
        }
    }

    /// Decorative glyph line for placeholder captions.
    pub fn decoration(&self) -> &'static str {
        match self {
            Self::Introduction => "~ * ~",
            Self::RisingAction => "> ! <",
            Self::Climax => "* X *",
            Self::Resolution => "= @ =",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        assert_eq!(
            SceneId::ALL,
            [
                SceneId::Introduction,
                SceneId::RisingAction,
                SceneId::Climax,
                SceneId::Resolution,
            ]
        );
    }

    #[test]
    fn test_slugs_are_filename_safe() {
        for scene in SceneId::ALL {
            assert!(
                scene
                    .slug()
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c == '_')
            );
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(SceneId::RisingAction.name(), "Rising Action");
        assert_eq!(SceneId::Climax.slug(), "climax");
    }

    #[test]
    fn test_serialized_form_matches_display_name() {
        for scene in SceneId::ALL {
            let json = serde_json::to_string(&scene).unwrap();
            assert_eq!(json, format!("{:?}", scene.name()));
        }
    }
}
