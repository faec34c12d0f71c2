pub mod decode;
pub mod model;
pub mod snapshot;
pub mod timestamp;

pub use decode::{DecodeError, RecordDecoder};
pub use model::{DashboardSnapshot, JobStatus, JobView, RawJobRecord};
pub use snapshot::{SnapshotAssembler, SnapshotConfig};
pub use timestamp::RawTimestamp;
