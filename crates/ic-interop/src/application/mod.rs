//! Application layer: the assembled module and its read endpoint.

pub mod endpoint;
pub mod service;

pub use endpoint::{EndpointError, InteropEndpoint};
pub use service::InteropModule;
