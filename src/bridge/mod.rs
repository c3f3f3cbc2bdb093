//! External chat bridge integration.
//!
//! ## Module Structure
//!
//! - `channels`: Outbound message shape and channel selection
//! - `relay`: The `BridgeGateway` capability and its queue-backed implementation

pub mod channels;
pub mod relay;

pub use channels::{BridgeChannel, BridgeChannels, BridgeOutbound};
pub use relay::{BridgeGateway, BridgeRelay};
