pub mod event;
pub mod host;
pub mod sink;

pub use event::{decode_event, SessionEvent};
pub use host::SessionHost;
pub use sink::{ChannelSink, ChatSink, NullSink};
