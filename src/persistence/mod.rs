//! Selection persistence: the backend protocol and its transport.

mod client;
mod error;
mod transport;

pub use client::{DeleteConfirmation, SelectionClient};
pub use error::{Operation, PersistenceError};
pub use transport::{HttpTransport, Method, Request, Response, Transport, TransportError};
