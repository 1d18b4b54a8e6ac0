//! Management of websocket connections and room broadcast

mod message;
pub use message::{Envelope, Payload};

mod client;
pub use client::Client;

mod hub;
pub use hub::Hub;
