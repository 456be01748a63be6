//! Measurement seam for the document the extension renders into.

/// The document context an extension is rendered in.
pub trait Window: Send + Sync {
    /// Height of the document body in pixels, or `None` if there is no body.
    fn body_height(&self) -> Option<u32>;
}

/// A window with no measurable body. Always reports no height.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedWindow;

impl Window for DetachedWindow {
    fn body_height(&self) -> Option<u32> {
        None
    }
}

/// A window whose body has a fixed height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWindow(pub u32);

impl Window for FixedWindow {
    fn body_height(&self) -> Option<u32> {
        Some(self.0)
    }
}
