mod resolved_stream;
mod video_id;

pub use resolved_stream::{DurationField, ResolvedStream};
pub use video_id::{ExtractionError, VideoId};
