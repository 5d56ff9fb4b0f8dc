//! Network side of wakecal.
//!
//! - [`HttpClient`] - transport capability, with a reqwest implementation
//! - [`google`] - calendar fetcher, OAuth token endpoint and token lifecycle
//! - [`ProviderError`] - error type for everything above
//!
//! ```text
//!   Authenticator ──refresh──▶ TokenEndpoint (OAuthClient)
//!        │                           │
//!   access token                     │
//!        ▼                           ▼
//!   CalendarFetcher ───────────▶ HttpClient ──▶ Google
//!        │
//!        ▼
//!    EventBatch
//! ```

pub mod error;
pub mod google;
pub mod http;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use http::{BoxFuture, HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestClient};
