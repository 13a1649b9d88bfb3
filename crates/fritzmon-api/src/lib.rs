// fritzmon-api: Router-communication surface for TR-064 capable routers
//
// The SOAP/UPnP machinery lives in an external library. This crate pins down
// the boundary the engine talks to (`Connector` / `Connection`), the raw value
// types that cross it, and an in-memory router for tests and dry runs.

pub mod connection;
pub mod error;
pub mod memory;
pub mod value;

pub use connection::{
    Connection, ConnectionParams, Connector, DEFAULT_ADDRESS, DEFAULT_PORT, DEFAULT_USER,
};
pub use error::Error;
pub use memory::{CallRecord, MemoryConnection, MemoryRouter};
pub use value::{ActionName, FieldValue, Fields};
