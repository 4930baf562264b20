pub mod client;
pub mod inference;
pub mod sequencer;

pub use client::{ProviderClient, TextToImageClient};
pub use inference::InferenceApiClient;
pub use sequencer::ModelFallbackSequencer;
