//! Domain model (requests, generated content, records, outcomes, errors).
//!
//! ホストの CMS やネットワークを一切知らない純粋な型だけを置きます。

pub mod content;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod record;
pub mod request;

pub use content::{GeneratedContent, ParseError, strip_code_fence};
pub use errors::GenerateError;
pub use ids::{MediaId, PostId};
pub use outcome::{GenerationReport, SkippedItem};
pub use record::{CreatedRecord, GENERATED_MARKER, NewPost, PostRef, PostStatus};
pub use request::{GenerationRequest, topic_hash};
