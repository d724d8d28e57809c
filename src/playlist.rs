//! Circular playlist over media items used to implement an endless slideshow.

use crate::error::Error;
use crate::media::MediaItem;
use crate::scan::PlaybackOrder;

/// A ring over media items with a wrapping cursor.
#[derive(Debug, Clone)]
pub struct Playlist {
    items: Vec<MediaItem>,
    idx: usize,
    order: PlaybackOrder,
}

// Never empty, so `len` has no `is_empty` twin.
#[allow(clippy::len_without_is_empty)]
impl Playlist {
    /// Construct a playlist from already ordered items.
    ///
    /// # Errors
    /// Returns [`Error::EmptyPlaylist`] if `items` is empty.
    pub fn from_vec(items: Vec<MediaItem>, order: PlaybackOrder) -> Result<Self, Error> {
        if items.is_empty() {
            return Err(Error::EmptyPlaylist);
        }
        Ok(Self {
            items,
            idx: 0,
            order,
        })
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.idx
    }

    #[must_use]
    pub const fn order(&self) -> PlaybackOrder {
        self.order
    }

    /// Borrow the current item without advancing.
    #[must_use]
    pub fn current(&self) -> &MediaItem {
        &self.items[self.idx]
    }

    /// Move to the next item, wrapping at the end, and return it.
    pub fn advance(&mut self) -> &MediaItem {
        self.idx = (self.idx + 1) % self.items.len();
        &self.items[self.idx]
    }
}
