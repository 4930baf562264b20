use sha2::{Digest, Sha256};

use crate::request::StoryRequest;

/// Stable cache key for a request: a truncated sha256 over the normalized
/// fields. Characters are sorted first so their order never affects hits.
pub fn fingerprint(req: &StoryRequest) -> String {
    let mut characters: Vec<&str> = req.characters.iter().map(|c| c.trim()).collect();
    characters.sort_unstable();

    // Unit separator keeps adjacent fields from bleeding into each other.
    let canonical = format!(
        "{}\x1f{}\x1f{}\x1f{}\x1f{}\x1f{}",
        req.story_idea.trim(),
        req.genre,
        req.tone,
        req.audience,
        req.art_style,
        characters.join(","),
    );

    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(digest)[..12].to_string()
}

/// Deterministic bucket pick for `text`, used to choose among template
/// variants without any process-local hash seeding.
pub fn stable_bucket(text: &str, buckets: usize) -> usize {
    if buckets == 0 {
        return 0;
    }
    let digest = Sha256::digest(text.as_bytes());
    let head = u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ]);
    (head % buckets as u64) as usize
}
