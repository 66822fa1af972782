pub mod api;
pub mod http;
pub mod transport;
