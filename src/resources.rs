//! Per-colour render handles supplied by the front end (textures, terminal colours, ...).
//!
//! The core never loads images; it only keeps one opaque handle per [`TileColor`].

use crate::tile::TileColor;

#[derive(Debug, Clone)]
pub struct Resources<H> {
    handles: [Option<H>; TileColor::COUNT],
}

impl<H> Resources<H> {
    pub fn new() -> Self {
        Self {
            handles: std::array::from_fn(|_| None),
        }
    }

    /// Register the handle for `color`. The first registration wins; a
    /// second one is logged and ignored. Returns whether it was stored.
    pub fn register(&mut self, color: TileColor, handle: H) -> bool {
        let slot = &mut self.handles[color.index()];
        if slot.is_some() {
            log::warn!("resources: handle already set for {color:?}");
            return false;
        }
        *slot = Some(handle);
        true
    }

    pub fn get(&self, color: TileColor) -> Option<&H> {
        self.handles[color.index()].as_ref()
    }

    /// True when every colour has a handle.
    pub fn is_complete(&self) -> bool {
        self.handles.iter().all(Option::is_some)
    }
}

impl<H> Default for Resources<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> FromIterator<(TileColor, H)> for Resources<H> {
    fn from_iter<I: IntoIterator<Item = (TileColor, H)>>(iter: I) -> Self {
        let mut resources = Self::new();
        for (color, handle) in iter {
            resources.register(color, handle);
        }
        resources
    }
}
