/* src/routes/client/rust/src/lib.rs */

pub mod error;
pub mod hmr;
pub mod host;
pub mod router;

pub use error::ClientError;
pub use hmr::{
  HmrClient, ManifestFetcher, ReqwestFetcher, cache_busted, connect, hmr_url, manifest_url,
};
pub use host::{BrowserHost, ClickOutcome, LinkClick, Modifiers, PassReason, Renderer};
pub use router::{Router, RouterState, Shell};

/// Re-export the route core for convenience
pub use arbor_routes;
