//! `api` crate: the Posty5 REST client.
//!
//! Everything that touches the wire lives here:
//!   - [`Gateway`] sends one authenticated call and unwraps the response envelope
//!   - [`Posty5Api::upload`] PUTs raw bytes to a pre-signed URL
//!   - [`pagination`] walks list endpoints page by page
//!
//! Resource builders in the `nodes` crate only ever see the [`Posty5Api`] trait,
//! so tests can swap in [`mock::MockApi`].

pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod pagination;
pub mod request;
pub mod traits;
pub mod upload;

pub use config::{ClientConfig, Credential};
pub use error::ApiError;
pub use gateway::Gateway;
pub use request::{ApiRequest, Method, Query};
pub use traits::Posty5Api;
pub use upload::{UploadResponse, UploadTarget};
