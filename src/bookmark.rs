//! Bookmark records.

use serde::{Deserialize, Serialize};

/// Largest total size, in bytes, of the text fields of one bookmark
///
/// `BookmarkStore::save` rejects anything bigger with `InvalidRecord`, which
/// keeps every accepted bookmark well inside the codec's record limit.
pub const MAX_CONTENT_LEN: usize = 512 * 1024;

/// A bookmark as supplied by the caller, before the store assigns an id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBookmark {
    pub title: String,
    pub site_name: String,
    /// Original URL; must not be empty
    pub link: String,
    pub description: String,
    pub image_url: String,
}

impl NewBookmark {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = site_name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Combined byte length of every text field
    pub fn content_len(&self) -> usize {
        self.title.len()
            + self.site_name.len()
            + self.link.len()
            + self.description.len()
            + self.image_url.len()
    }

    /// Attach the id assigned by the store
    pub(crate) fn into_bookmark(self, id: u64) -> Bookmark {
        Bookmark {
            id,
            title: self.title,
            site_name: self.site_name,
            link: self.link,
            description: self.description,
            image_url: self.image_url,
        }
    }
}

/// A stored bookmark
///
/// Field order is part of the encoded value layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: u64,
    pub title: String,
    pub site_name: String,
    pub link: String,
    pub description: String,
    pub image_url: String,
}
