//! Session establishment: bootstrap call plus streaming connection

mod connection;
mod establisher;
mod reconnect;

pub use connection::{Session, WsSink, WsSource, WsStream};
pub use establisher::SessionEstablisher;
pub use reconnect::ExponentialBackoff;
