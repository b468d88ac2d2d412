mod client;
mod normalize;
mod search;
mod selector;

pub use client::{FetchError, MirrorClient};
pub use normalize::{AudioCandidate, NormalizeError, audio_candidates, normalize};
pub use selector::{MirrorGroup, MirrorInstance, MirrorResponse, MirrorSelector, SelectorError};
