pub mod artifact;
pub mod error;
pub mod fingerprint;
pub mod request;
pub mod scene;

pub use artifact::{ImageArtifact, ImageStrategy, sanitize_model};
pub use error::{Error, Result};
pub use fingerprint::fingerprint;
pub use request::StoryRequest;
pub use scene::SceneId;
