/* src/routes/core/rust/src/lib.rs */

pub mod errors;
mod fnv;
pub mod layout;
pub mod manifest;
pub mod mapping;
pub mod path;
pub mod plugin;
pub mod protocol;
pub mod server_only;
pub mod synth;
pub mod table;

// Re-exports for ergonomic use
pub use errors::{Result, RoutesError, ScanError};
pub use layout::{is_layout_path, layout_pathnames, resolve_layouts, wrap_with_layouts};
pub use manifest::{MANIFEST_VERSION, ManifestEntry, RouteManifest};
pub use mapping::{Component, ComponentRegistry, RouteMapping};
pub use path::normalize;
pub use plugin::{
  Environment, HydrationStrategy, LoadedModule, Loader, PluginOptions, Resolved, RoutesPlugin,
  ShellModule, demangle_original, mangle_original,
};
pub use synth::{ORIGINAL_PREFIX, SynthesizedRoutes, component_ident, synthesize};
pub use table::{RouteEntry, RouteTable, RoutingStyle, default_extensions};
