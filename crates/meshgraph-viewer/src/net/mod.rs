pub mod protocol;
pub mod uds;

pub use protocol::Incoming;
pub use uds::spawn_poller;
