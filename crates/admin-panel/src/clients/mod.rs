//! Backend API clients.

mod api;
pub mod csrf;
mod http_client;
pub mod wire;

pub use api::AdminApi;
#[cfg(any(test, feature = "test-utils"))]
pub use api::MockAdminApi;
pub use http_client::HttpApiClient;
