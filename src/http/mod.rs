//! # HTTP
//!
//! Bearer-authenticated JSON calls against the management API.

pub mod client;
pub mod method;
pub mod request;
pub mod response;

pub use client::RestClient;
pub use method::HttpMethod;
pub use request::ApiRequest;
pub use response::ApiResult;
