//! # signage-protocol
//!
//! Wire types exchanged with stations and the codec for the one-shot JSON
//! responses and the server-push event stream.

pub mod codec;
pub mod messages;

pub use codec::*;
pub use messages::*;
