//! Image records produced by the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role an image plays in the costume-select screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    /// Large display image.
    Portrait,
    /// Small square icon.
    Icon,
    /// Neither; excluded from all indices and matching.
    Unclassified,
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageType::Portrait => write!(f, "Portrait"),
            ImageType::Icon => write!(f, "Icon"),
            ImageType::Unclassified => write!(f, "Unclassified"),
        }
    }
}

/// One classified image. The identity/folder/type/name-key fields are
/// immutable; `effective_folder` and `consumed` are engine-local state owned
/// by a single correlation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Archive-unique path.
    pub identity: String,
    /// Folder derived from the identity; empty string at the archive root.
    pub folder: String,
    /// Role assigned by the classifier.
    pub image_type: ImageType,
    /// Lowercase stem with type keywords stripped once from each side.
    pub name_key: String,
    /// Character encoded in the filename itself, when recognized.
    pub character: Option<String>,
    /// Color encoded in the filename itself, when recognized.
    pub color: Option<String>,
    /// Starts equal to `folder`; folder promotion may rewrite it once.
    pub effective_folder: String,
    /// Set by consuming strategies; a consumed image is unavailable to later
    /// descriptors of the same type.
    pub consumed: bool,
}

impl ImageRecord {
    /// Whether the folder-promotion pre-pass or a prior run moved it.
    pub fn promoted(&self) -> bool {
        self.effective_folder != self.folder
    }
}

/// One stage preview screenshot, input to the stage engine. Screenshots are
/// not typed; the stage engine considers every image it is handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotRecord {
    /// Archive-unique path.
    pub identity: String,
    /// Folder derived from the identity; empty string at the archive root.
    pub folder: String,
    /// Lowercase filename stem.
    pub name_key: String,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

impl ScreenshotRecord {
    /// Build a record from an identity and known dimensions.
    pub fn new(identity: impl Into<String>, width: u32, height: u32) -> Self {
        let identity = identity.into();
        let folder = crate::text::folder_of(&identity).to_string();
        let name_key = crate::text::stem(&identity);
        Self {
            identity,
            folder,
            name_key,
            width,
            height,
        }
    }

    /// Width/height ratio; zero-height screenshots yield 0.0.
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}
