//! Template-driven story generation.
//!
//! Stories are assembled instantly from fixed per-genre template tables and
//! personalized with the request's characters, audience and tone. Variant
//! choice hashes the story idea so the same request always reads the same.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tw_core::fingerprint::stable_bucket;
use tw_core::{SceneId, StoryRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub scenes: BTreeMap<SceneId, String>,
}

impl Story {
    pub fn scene_text(&self, scene: SceneId) -> &str {
        self.scenes.get(&scene).map(String::as_str).unwrap_or("")
    }
}

// Three variants per scene, indexed in SceneId::ALL order.
const FANTASY: [[&str; 3]; 4] = [
    [
        "In a magical kingdom far away, lived a brave young hero named Alex who discovered they had special powers.",
        "Once upon a time, in an enchanted forest, a curious child found a mysterious glowing crystal.",
        "In the land of dragons and wizards, a young apprentice began their first magical adventure.",
    ],
    [
        "The hero faced their first challenge when an evil sorcerer threatened the peaceful village.",
        "Dark clouds gathered as ancient magic began to stir, and our hero must learn to control their new abilities.",
        "A dangerous quest began when the magical artifact was stolen by shadow creatures.",
    ],
    [
        "In an epic battle of good versus evil, the hero used all their courage and newfound powers.",
        "At the highest tower of the dark castle, the final confrontation with the villain began.",
        "The fate of the magical realm hung in balance as the ultimate test of bravery arrived.",
    ],
    [
        "Peace was restored to the land, and the hero was celebrated by all the magical creatures.",
        "The kingdom was saved, and our hero learned that true magic comes from friendship and kindness.",
        "With evil defeated, the magical world flourished once again under the hero's protection.",
    ],
];

const ADVENTURE: [[&str; 3]; 4] = [
    [
        "Captain Maya set sail across the seven seas in search of the legendary treasure island.",
        "In the dense Amazon jungle, explorer Sam discovered clues to an ancient lost city.",
        "High in the mountain peaks, brave climber Alex found a hidden cave full of mysteries.",
    ],
    [
        "Dangerous storms and sea monsters challenged our brave adventurer's journey.",
        "Ancient traps and wild animals protected the secrets of the forgotten civilization.",
        "Treacherous paths and mysterious guardians tested the explorer's determination.",
    ],
    [
        "In the final chamber, the adventurer faced the ultimate puzzle that guarded the treasure.",
        "At the heart of the lost temple, our hero confronted the ancient guardian spirit.",
        "The most dangerous part of the journey led to the discovery of incredible secrets.",
    ],
    [
        "The treasure was found, but the real reward was the wisdom gained along the way.",
        "The lost city's secrets were preserved, and our adventurer became a legendary explorer.",
        "The journey ended safely, with amazing stories to share with the world.",
    ],
];

const MYSTERY: [[&str; 3]; 4] = [
    [
        "Detective Riley received a puzzling case about a missing jewel from the museum.",
        "In the quiet town of Willowbrook, strange things started happening every full moon.",
        "Young sleuth Alex noticed peculiar clues that others had completely overlooked.",
    ],
    [
        "More clues appeared, but each one led to even more confusing questions and dead ends.",
        "The mystery deepened when witnesses gave conflicting stories about what they saw.",
        "Secret passages and hidden messages revealed that someone was watching everything.",
    ],
    [
        "All the clues finally came together in a surprising revelation that no one expected.",
        "The truth was more shocking than anyone imagined, hidden in plain sight all along.",
        "In a dramatic confrontation, the real culprit was finally revealed to everyone.",
    ],
    [
        "Justice was served, and the mystery was solved thanks to careful detective work.",
        "The truth brought peace to the community, and the detective earned great respect.",
        "With the case closed, everyone learned valuable lessons about truth and justice.",
    ],
];

const SCIFI: [[&str; 3]; 4] = [
    [
        "Commander Zara explored distant galaxies aboard the starship Discovery in the year 3024.",
        "On Mars colony, young scientist Kim discovered strange signals from deep space.",
        "In the underwater city of New Atlantis, engineer Pat built amazing robots.",
    ],
    [
        "Alien contact changed everything when mysterious visitors arrived from another dimension.",
        "The space station faced danger when systems began failing in impossible ways.",
        "Time itself seemed to bend when the experimental portal started malfunctioning.",
    ],
    [
        "Humans and aliens worked together to save both civilizations from a cosmic threat.",
        "The fate of Earth hung in the balance as our heroes raced against time.",
        "Advanced technology and human courage combined to face the ultimate challenge.",
    ],
    [
        "Peace between worlds was established, opening new chapters in galactic history.",
        "The universe became safer thanks to the brave actions of our space heroes.",
        "New discoveries led to amazing advances that helped all living beings thrive.",
    ],
];

fn genre_templates(genre: &str) -> &'static [[&'static str; 3]; 4] {
    match genre {
        "adventure" => &ADVENTURE,
        "mystery" => &MYSTERY,
        "scifi" => &SCIFI,
        _ => &FANTASY,
    }
}

/// Placeholder names baked into the templates; all become the lead.
const TEMPLATE_NAMES: [&str; 7] = ["Alex", "Maya", "Sam", "Riley", "Zara", "Kim", "Pat"];

pub fn generate_story(req: &StoryRequest) -> Story {
    let templates = genre_templates(&req.genre);
    let main_character = req.main_character().to_string();
    let supporting = req.supporting_characters();

    let mut scenes = BTreeMap::new();
    for (idx, scene) in SceneId::ALL.into_iter().enumerate() {
        let variants = &templates[idx];
        let pick = stable_bucket(&format!("{}{}", req.story_idea, scene.name()), variants.len());
        let mut text = variants[pick].to_string();

        text = text.replace("hero", &main_character);
        for name in TEMPLATE_NAMES {
            text = text.replace(name, &main_character);
        }

        if !supporting.is_empty() {
            match scene {
                SceneId::Introduction => {
                    let intro = format!(", accompanied by {}", join_names(supporting));
                    text = text.replacen('.', &format!("{intro}."), 1);
                }
                SceneId::RisingAction => {
                    text.push_str(&format!(
                        " With help from {}, they faced the challenge together.",
                        supporting[0]
                    ));
                }
                _ => {}
            }
        }

        text = weave_story_idea(text, scene, &req.story_idea);

        if req.audience == "preschool" {
            text = text
                .replace("dangerous", "challenging")
                .replace("evil", "not-so-nice")
                .replace("battle", "face-off");
        }

        match req.tone.as_str() {
            "magical" => text.push_str(" Sparkles of magic fill the air with wonder."),
            "adventurous" => text.push_str(" The adventure continues with courage."),
            "educational" if scene == SceneId::Resolution => {
                text.push_str(" And everyone learned something new with learning.");
            }
            _ => {}
        }

        scenes.insert(scene, text);
    }

    Story {
        title: derive_title(req),
        scenes,
    }
}

fn weave_story_idea(text: String, scene: SceneId, story_idea: &str) -> String {
    if text.to_lowercase().contains(&story_idea.to_lowercase()) {
        return text;
    }
    match scene {
        SceneId::Introduction => text.replace("adventure", &format!("{story_idea} adventure")),
        SceneId::RisingAction => format!("{text} The {story_idea} story becomes more intense."),
        SceneId::Climax => format!("{text} The heart of the {story_idea} tale reaches its peak."),
        SceneId::Resolution => format!("{text} The {story_idea} adventure concludes beautifully."),
    }
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!(
            "{} and {last}",
            init.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn derive_title(req: &StoryRequest) -> String {
    let mut title = title_case(&req.story_idea);
    if req.characters.len() > 1 {
        title.push_str(&format!(" and the {}", title_case(&req.characters[1])));
    }
    title
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remote prompt for a scene: a scene-specific skeleton capped in length,
/// then the style suffix the backends respond well to.
pub fn scene_prompt(req: &StoryRequest, scene: SceneId) -> String {
    let cast = if req.characters.is_empty() {
        match scene {
            SceneId::Introduction => "main character".to_string(),
            SceneId::RisingAction => "heroes".to_string(),
            SceneId::Climax => "protagonist".to_string(),
            SceneId::Resolution => "characters".to_string(),
        }
    } else {
        req.characters.join(", ")
    };

    let base = match scene {
        SceneId::Introduction => format!(
            "opening scene, {}, beginning of adventure, {cast}, {} style",
            req.story_idea, req.art_style
        ),
        SceneId::RisingAction => format!(
            "action scene, {}, challenges and obstacles, {cast}, {} style",
            req.story_idea, req.art_style
        ),
        SceneId::Climax => format!(
            "dramatic climax, {}, most exciting moment, {cast}, {} style",
            req.story_idea, req.art_style
        ),
        SceneId::Resolution => format!(
            "happy ending, {}, celebration, {cast}, {} style",
            req.story_idea, req.art_style
        ),
    };

    let clean = base.replace('\n', " ");
    let clean = clean.trim();
    let capped: String = clean.chars().take(100).collect();

    format!(
        "{capped}, {}, storybook illustration, high quality",
        style_text(&req.art_style)
    )
}

fn style_text(art_style: &str) -> &'static str {
    match art_style {
        "cartoon" => "cartoon style, animated, colorful, simple, child-friendly",
        "realistic" => "photorealistic, detailed, high quality, professional",
        "anime" => "anime style, manga, vibrant colors, detailed",
        "watercolor" => "watercolor painting, soft colors, artistic, painted",
        _ => "digital art, colorful",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StoryRequest {
        StoryRequest {
            story_idea: "a lost dragon".into(),
            genre: "fantasy".into(),
            tone: "lighthearted".into(),
            audience: "all".into(),
            art_style: "cartoon".into(),
            characters: vec!["Mira".into(), "Tobo".into()],
        }
    }

    #[test]
    fn test_story_is_deterministic() {
        let req = request();
        assert_eq!(generate_story(&req), generate_story(&req));
    }

    #[test]
    fn test_all_scenes_present() {
        let story = generate_story(&request());
        for scene in SceneId::ALL {
            assert!(!story.scene_text(scene).is_empty(), "{} empty", scene.name());
        }
    }

    #[test]
    fn test_main_character_substituted() {
        let story = generate_story(&request());
        let all_text: String = story.scenes.values().cloned().collect();
        assert!(!all_text.contains("Alex"));
        assert!(!all_text.contains("hero "), "template lead not replaced: {all_text}");
    }

    #[test]
    fn test_supporting_character_woven_in() {
        let story = generate_story(&request());
        let intro = story.scene_text(SceneId::Introduction);
        let rising = story.scene_text(SceneId::RisingAction);
        assert!(
            intro.contains("Tobo") || rising.contains("Tobo"),
            "supporting cast missing: {intro} / {rising}"
        );
    }

    #[test]
    fn test_preschool_softening() {
        let mut req = request();
        req.audience = "preschool".into();
        let story = generate_story(&req);
        for scene in SceneId::ALL {
            let text = story.scene_text(scene);
            assert!(!text.contains("dangerous"), "{text}");
            assert!(!text.contains("evil"), "{text}");
            assert!(!text.contains("battle"), "{text}");
        }
    }

    #[test]
    fn test_magical_tone_flourish() {
        let mut req = request();
        req.tone = "magical".into();
        let story = generate_story(&req);
        assert!(
            story
                .scene_text(SceneId::Introduction)
                .contains("Sparkles of magic")
        );
    }

    #[test]
    fn test_title_derivation() {
        let story = generate_story(&request());
        assert_eq!(story.title, "A Lost Dragon and the Tobo");

        let mut solo = request();
        solo.characters = vec!["Mira".into()];
        assert_eq!(generate_story(&solo).title, "A Lost Dragon");
    }

    #[test]
    fn test_unknown_genre_falls_back_to_fantasy() {
        let mut req = request();
        req.genre = "western".into();
        // Must not panic and must still produce all four scenes.
        assert_eq!(generate_story(&req).scenes.len(), 4);
    }

    #[test]
    fn test_scene_prompt_shape() {
        let req = request();
        let prompt = scene_prompt(&req, SceneId::Climax);
        assert!(prompt.contains("dramatic climax"));
        assert!(prompt.contains("Mira, Tobo"));
        assert!(prompt.contains("storybook illustration"));
        assert!(prompt.contains("cartoon style"));
    }

    #[test]
    fn test_scene_prompt_caps_base_length() {
        let mut req = request();
        req.story_idea = "x".repeat(300);
        let prompt = scene_prompt(&req, SceneId::Introduction);
        // Base is capped at 100 chars before the style suffix is appended.
        assert!(prompt.len() < 220, "{} chars", prompt.len());
    }

    #[test]
    fn test_no_characters_uses_defaults() {
        let mut req = request();
        req.characters.clear();
        let story = generate_story(&req);
        assert!(!story.scene_text(SceneId::Introduction).is_empty());
        let prompt = scene_prompt(&req, SceneId::RisingAction);
        assert!(prompt.contains("heroes"));
    }
}
