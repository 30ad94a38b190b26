pub mod mailbox;
pub mod producer;
pub mod queue;
pub mod registry;
pub mod test_pattern;
pub mod types;

pub use mailbox::FrameMailbox;
pub use producer::{Producer, StreamProducer};
pub use queue::SerialQueue;
pub use registry::{ProducerId, ProducerRegistry};
pub use test_pattern::{PatternConfig, TestPattern};
pub use types::{CameraPosition, Extent, Frame, FrameId};
