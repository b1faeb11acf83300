//! Domain model shared by every layer.

pub mod icon;
pub mod manifest;
pub mod snapshot;

pub use icon::{
    looks_like_icon_id, Candidate, CandidateSource, IconId, IconIdError, ResolutionOutcome,
};
pub use manifest::{
    parse_manifest, EffectiveRenderOptions, ManifestError, ManifestItem, OutputFormat,
    RenderDefaults,
};
pub use snapshot::Snapshot;
