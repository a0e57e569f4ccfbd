/* src/cli/core/src/dev/watcher.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

/// Watch `dir` recursively and forward the paths of content changes.
pub(super) fn setup_watcher(dir: &Path) -> Result<(RecommendedWatcher, mpsc::Receiver<PathBuf>)> {
  let (tx, rx) = mpsc::channel(64);
  let mut watcher = RecommendedWatcher::new(
    move |res: notify::Result<notify::Event>| match res {
      Ok(event) if is_content_change(&event.kind) => {
        for path in event.paths {
          let _ = tx.blocking_send(path);
        }
      }
      Ok(_) => {}
      Err(e) => warn!("file watcher error: {e}"),
    },
    notify::Config::default(),
  )?;
  watcher
    .watch(dir, RecursiveMode::Recursive)
    .with_context(|| format!("failed to watch {}", dir.display()))?;
  Ok((watcher, rx))
}

fn is_content_change(kind: &EventKind) -> bool {
  matches!(kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
}

/// Collapse one debounced batch into the single path that triggers a rebuild.
pub(super) fn pick_change(
  batch: impl IntoIterator<Item = PathBuf>,
  root: &Path,
) -> Option<PathBuf> {
  batch.into_iter().find(|path| path.starts_with(root))
}

#[cfg(test)]
mod tests {
  use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

  use super::*;

  #[test]
  fn access_events_are_not_changes() {
    assert!(!is_content_change(&EventKind::Access(AccessKind::Any)));
    assert!(!is_content_change(&EventKind::Other));
    assert!(is_content_change(&EventKind::Create(CreateKind::File)));
    assert!(is_content_change(&EventKind::Modify(ModifyKind::Any)));
    assert!(is_content_change(&EventKind::Remove(RemoveKind::File)));
  }

  #[test]
  fn batch_collapses_to_first_path_under_root() {
    let root = Path::new("/app/src/pages");
    let batch = vec![
      PathBuf::from("/app/.arbor/routes.json"),
      PathBuf::from("/app/src/pages/about.tsx"),
      PathBuf::from("/app/src/pages/index.tsx"),
    ];
    assert_eq!(pick_change(batch, root), Some(PathBuf::from("/app/src/pages/about.tsx")));
  }

  #[test]
  fn batch_outside_root_is_dropped() {
    let batch = vec![PathBuf::from("/app/README.md")];
    assert_eq!(pick_change(batch, Path::new("/app/src/pages")), None);
  }

  #[tokio::test]
  async fn watcher_reports_new_route_file() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let (_watcher, mut rx) = setup_watcher(&root).unwrap();
    std::fs::write(root.join("contact.tsx"), "export default function Contact() {}\n").unwrap();

    let path = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
      .await
      .unwrap()
      .unwrap();
    assert!(path.starts_with(&root));
  }
}
