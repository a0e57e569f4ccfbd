/* src/server/adapter/axum/src/rebuild.rs */

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use arbor_routes::protocol::UPDATE_ROUTES;
use arbor_routes::{RoutesError, RoutesPlugin, SynthesizedRoutes};
use tracing::{debug, error, info, warn};

use crate::hub::HotReloadHub;

/// Something that can rebuild the route module from disk.
pub trait RouteSource: Send + Sync + 'static {
  /// Directory whose changes can affect the build
  fn root(&self) -> &Path;
  fn build(&self) -> arbor_routes::Result<SynthesizedRoutes>;
}

impl RouteSource for RoutesPlugin {
  fn root(&self) -> &Path {
    self.route_dir()
  }

  fn build(&self) -> arbor_routes::Result<SynthesizedRoutes> {
    RoutesPlugin::build(self)
  }
}

/// One successful build, as served to clients.
#[derive(Debug)]
pub struct Published {
  pub generation: u64,
  pub routes: SynthesizedRoutes,
  /// Manifest rendered once at publish time
  pub manifest_json: String,
}

impl Published {
  fn new(generation: u64, routes: SynthesizedRoutes) -> arbor_routes::Result<Self> {
    let manifest_json = routes.manifest.to_json()?;
    Ok(Self { generation, routes, manifest_json })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildOutcome {
  /// Path outside the route root
  Ignored,
  /// Another rebuild was running; this change was dropped
  InFlight,
  Rebuilt { generation: u64, notified: usize },
  /// Build failed; the previous publish stays
  Failed(String),
}

/// Clears the in-flight flag when the rebuild ends, however it ends.
struct BuildGuard<'a>(&'a AtomicBool);

impl<'a> BuildGuard<'a> {
  fn acquire(flag: &'a AtomicBool) -> Option<Self> {
    flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).ok().map(|_| Self(flag))
  }
}

impl Drop for BuildGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

/// At most one rebuild at a time. A successful rebuild publishes a new
/// generation, then notifies every hot-reload session once.
pub struct Rebuilder {
  source: Arc<dyn RouteSource>,
  hub: Arc<HotReloadHub>,
  building: AtomicBool,
  generation: AtomicU64,
  published: RwLock<Arc<Published>>,
}

impl Rebuilder {
  /// Run the first build synchronously. Fails when the route directory cannot be built at all.
  pub fn initial(
    source: Arc<dyn RouteSource>,
    hub: Arc<HotReloadHub>,
  ) -> Result<Self, RoutesError> {
    let routes = source.build()?;
    info!(routes = routes.len(), root = %source.root().display(), "initial route build");
    let published = Published::new(0, routes)?;
    Ok(Self {
      source,
      hub,
      building: AtomicBool::new(false),
      generation: AtomicU64::new(0),
      published: RwLock::new(Arc::new(published)),
    })
  }

  pub fn root(&self) -> &Path {
    self.source.root()
  }

  pub fn published(&self) -> Arc<Published> {
    Arc::clone(&self.published.read().unwrap_or_else(PoisonError::into_inner))
  }

  pub fn generation(&self) -> u64 {
    self.generation.load(Ordering::Acquire)
  }

  pub fn is_building(&self) -> bool {
    self.building.load(Ordering::Acquire)
  }

  /// Filesystem event entry point.
  pub async fn on_change(&self, path: &Path) -> RebuildOutcome {
    if !path.starts_with(self.source.root()) {
      debug!(path = %path.display(), "change outside route root ignored");
      return RebuildOutcome::Ignored;
    }
    self.rebuild().await
  }

  pub async fn rebuild(&self) -> RebuildOutcome {
    let Some(_guard) = BuildGuard::acquire(&self.building) else {
      warn!("rebuild already in flight, change dropped");
      return RebuildOutcome::InFlight;
    };

    let started = Instant::now();
    let source = Arc::clone(&self.source);
    let built = tokio::task::spawn_blocking(move || source.build()).await;
    let routes = match built {
      Ok(Ok(routes)) => routes,
      Ok(Err(e)) => {
        error!("route rebuild failed: {e}");
        return RebuildOutcome::Failed(e.to_string());
      }
      Err(e) => {
        error!("route rebuild panicked: {e}");
        return RebuildOutcome::Failed(e.to_string());
      }
    };

    let generation = self.generation.load(Ordering::Acquire) + 1;
    let published = match Published::new(generation, routes) {
      Ok(published) => published,
      Err(e) => {
        error!("route manifest rendering failed: {e}");
        return RebuildOutcome::Failed(e.to_string());
      }
    };
    let count = published.routes.len();
    *self.published.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(published);
    self.generation.store(generation, Ordering::Release);

    let notified = self.hub.broadcast(UPDATE_ROUTES);
    info!(
      generation,
      routes = count,
      notified,
      elapsed_ms = started.elapsed().as_millis() as u64,
      "routes rebuilt"
    );
    RebuildOutcome::Rebuilt { generation, notified }
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;
  use std::sync::Mutex;
  use std::sync::atomic::AtomicUsize;
  use std::sync::mpsc as std_mpsc;

  use arbor_routes::{RouteEntry, RouteTable, synthesize};
  use tokio::sync::mpsc;

  use super::*;
  use crate::hub::SessionPurpose;

  /// Source whose builds can be held open or made to fail.
  struct FakeSource {
    root: PathBuf,
    builds: AtomicUsize,
    fail: AtomicBool,
    gate: Mutex<Option<(mpsc::UnboundedSender<()>, std_mpsc::Receiver<()>)>>,
  }

  impl FakeSource {
    fn new() -> Self {
      Self {
        root: PathBuf::from("/app/pages"),
        builds: AtomicUsize::new(0),
        fail: AtomicBool::new(false),
        gate: Mutex::new(None),
      }
    }
  }

  impl RouteSource for FakeSource {
    fn root(&self) -> &Path {
      &self.root
    }

    fn build(&self) -> arbor_routes::Result<SynthesizedRoutes> {
      self.builds.fetch_add(1, Ordering::SeqCst);
      if let Some((entered, release)) = self.gate.lock().unwrap().as_ref() {
        entered.send(()).unwrap();
        release.recv().unwrap();
      }
      if self.fail.load(Ordering::SeqCst) {
        return Err(RoutesError::DuplicateRoute {
          pathname: "/about".into(),
          first: self.root.join("about.tsx"),
          second: self.root.join("about/index.tsx"),
        });
      }
      let table = RouteTable::from_entries(
        &self.root,
        [RouteEntry { pathname: "/".into(), source: self.root.join("index.tsx") }],
      )?;
      Ok(synthesize(&table))
    }
  }

  fn setup() -> (Arc<FakeSource>, Arc<HotReloadHub>, Arc<Rebuilder>) {
    let source = Arc::new(FakeSource::new());
    let hub = Arc::new(HotReloadHub::new());
    let rebuilder =
      Arc::new(Rebuilder::initial(source.clone() as Arc<dyn RouteSource>, hub.clone()).unwrap());
    (source, hub, rebuilder)
  }

  #[tokio::test]
  async fn one_change_one_rebuild_one_broadcast() {
    let (source, hub, rebuilder) = setup();
    let (_, mut session) = hub.open(SessionPurpose::HotReload).unwrap();

    let outcome = rebuilder.on_change(Path::new("/app/pages/about.tsx")).await;
    assert_eq!(outcome, RebuildOutcome::Rebuilt { generation: 1, notified: 1 });
    assert_eq!(source.builds.load(Ordering::SeqCst), 2);
    assert_eq!(session.try_recv().unwrap(), "update-routes");
    assert!(session.try_recv().is_err());
    assert_eq!(rebuilder.published().generation, 1);
  }

  #[tokio::test]
  async fn change_during_rebuild_is_dropped() {
    let (source, hub, rebuilder) = setup();
    let (_, mut session) = hub.open(SessionPurpose::HotReload).unwrap();
    let (entered_tx, mut entered_rx) = mpsc::unbounded_channel();
    let (release_tx, release_rx) = std_mpsc::channel();
    *source.gate.lock().unwrap() = Some((entered_tx, release_rx));

    let first = {
      let rebuilder = Arc::clone(&rebuilder);
      tokio::spawn(async move { rebuilder.on_change(Path::new("/app/pages/a.tsx")).await })
    };
    entered_rx.recv().await.unwrap();
    assert!(rebuilder.is_building());

    let second = rebuilder.on_change(Path::new("/app/pages/b.tsx")).await;
    assert_eq!(second, RebuildOutcome::InFlight);

    release_tx.send(()).unwrap();
    let first = first.await.unwrap();
    assert_eq!(first, RebuildOutcome::Rebuilt { generation: 1, notified: 1 });

    // initial build + exactly one rebuild; nothing queued behind it
    assert_eq!(source.builds.load(Ordering::SeqCst), 2);
    assert!(!rebuilder.is_building());
    assert_eq!(session.try_recv().unwrap(), "update-routes");
    assert!(session.try_recv().is_err());
  }

  #[tokio::test]
  async fn failed_rebuild_keeps_previous_publish() {
    let (source, hub, rebuilder) = setup();
    let (_, mut session) = hub.open(SessionPurpose::HotReload).unwrap();
    let before = rebuilder.published();
    source.fail.store(true, Ordering::SeqCst);

    let outcome = rebuilder.rebuild().await;
    assert!(matches!(outcome, RebuildOutcome::Failed(ref msg) if msg.contains("duplicate route")));
    assert!(Arc::ptr_eq(&before, &rebuilder.published()));
    assert_eq!(rebuilder.generation(), 0);
    assert!(session.try_recv().is_err());
    assert!(!rebuilder.is_building());
  }

  #[tokio::test]
  async fn changes_outside_root_are_ignored() {
    let (source, _hub, rebuilder) = setup();
    let outcome = rebuilder.on_change(Path::new("/app/src/shell.tsx")).await;
    assert_eq!(outcome, RebuildOutcome::Ignored);
    assert_eq!(source.builds.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn initial_failure_is_an_error() {
    let source = FakeSource::new();
    source.fail.store(true, Ordering::SeqCst);
    let result = Rebuilder::initial(Arc::new(source), Arc::new(HotReloadHub::new()));
    assert!(result.is_err());
  }
}
