/* src/routes/client/rust/src/host.rs */

// Boundaries between the router and the page it runs in: the browser (location,
// history, scrolling) and the UI library's render primitives.

use url::Url;

use crate::error::ClientError;

/// Mouse button index of a primary click.
pub const PRIMARY_BUTTON: i16 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
  pub ctrl: bool,
  pub meta: bool,
  pub shift: bool,
  pub alt: bool,
}

impl Modifiers {
  pub fn any(self) -> bool {
    self.ctrl || self.meta || self.shift || self.alt
  }
}

/// Click on an anchor element, as seen by the document-level listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClick {
  /// `href` attribute as written; may be relative
  pub href: String,
  pub button: i16,
  pub modifiers: Modifiers,
  pub target: Option<String>,
  pub download: bool,
}

impl LinkClick {
  /// Plain left click with no modifiers on a link without `target`/`download`.
  pub fn primary(href: impl Into<String>) -> Self {
    Self {
      href: href.into(),
      button: PRIMARY_BUTTON,
      modifiers: Modifiers::default(),
      target: None,
      download: false,
    }
  }
}

/// Why a click was left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
  Modified,
  NonPrimaryButton,
  Target,
  Download,
  InvalidHref,
  CrossOrigin,
  FragmentOnly,
  UnknownRoute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
  /// Default prevented; the router navigated.
  Intercepted,
  PassThrough(PassReason),
}

impl ClickOutcome {
  pub fn prevents_default(self) -> bool {
    self == Self::Intercepted
  }
}

pub trait BrowserHost {
  fn location(&self) -> Url;
  fn push_state(&mut self, url: &Url);
  /// Scroll the element with this id into view. False when there is none.
  fn scroll_to_fragment(&mut self, fragment: &str) -> bool;
  fn scroll_to_top(&mut self);
}

pub trait Renderer<V> {
  /// Attach to server-rendered markup. Called once.
  fn hydrate(&mut self, tree: V);
  /// Replace the rendered tree.
  fn commit(&mut self, tree: V);
  fn show_error(&mut self, error: &ClientError);
}
