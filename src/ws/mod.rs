//! WebSocket Endpoints
//!
//! Connection lifecycle contract, the concrete endpoint handlers, and the
//! wire envelope.
//!
//! ## Architecture
//!
//! - **MessageHandler**: open/message/close/error lifecycle trait; one
//!   instance per WebSocket route, shared by all of its connections
//! - **serve_socket**: drives an upgraded socket through that lifecycle
//! - **Messages**: tagged JSON client and server envelopes
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8080/app/my-app-key');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'subscribe', channel: 'general'}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   console.log('Received:', msg);
//! };
//! ```

mod handler;
mod messages;

pub use handler::{serve_socket, teardown, ChannelHandler, EchoHandler, MessageHandler};
pub use messages::{ClientMessage, ServerMessage};
