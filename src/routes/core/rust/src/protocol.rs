/* src/routes/core/rust/src/protocol.rs */

// Wire constants shared by the dev server and hot-reload clients.

/// The only text frame the server pushes: the route table changed.
pub const UPDATE_ROUTES: &str = "update-routes";

/// Subprotocol a client offers to register for route updates.
pub const HMR_SUBPROTOCOL: &str = "arbor-hmr";

pub const HMR_ENDPOINT: &str = "/_arbor/hmr";

pub const ROUTES_MODULE_PATH: &str = "/routes/client:routes.js";
pub const ROUTES_MANIFEST_PATH: &str = "/routes/client:routes.json";
pub const ENV_MODULE_PATH: &str = "/routes/client:env.js";

/// Query parameter clients append to bypass caches on refetch.
pub const CACHE_BUST_PARAM: &str = "t";
