//! Image classification and per-archive image indices.
//!
//! Classification never decodes pixel content: an image is typed from its
//! dimensions, its filename, or its aspect ratio, in that priority order.
//! The classifier also extracts a best-effort character/color identity from
//! the filename itself, mirroring the descriptor parser's compound-code
//! pattern.

pub mod dimensions;

use std::collections::HashMap;

use tracing::trace;

use crate::conventions::Conventions;
use crate::core::image::{ImageRecord, ImageType};
use crate::text;

pub use self::dimensions::probe_dimensions;

/// Classify one image from its identity and known pixel dimensions.
///
/// `dimensions = None` (unreadable image) yields an Unclassified record:
/// recovered locally, never an error. First matching rule wins:
/// exact base-resolution multiple, filename keyword, aspect ratio.
pub fn classify_image(
    identity: &str,
    dimensions: Option<(u32, u32)>,
    conv: &Conventions,
) -> ImageRecord {
    let stem = text::stem(identity);
    let image_type = match dimensions {
        Some((w, h)) => decide_type(w, h, &stem, conv),
        None => ImageType::Unclassified,
    };

    let name_key = match image_type {
        ImageType::Portrait => text::strip_type_tokens(&stem, &conv.portrait_keywords),
        ImageType::Icon => text::strip_type_tokens(&stem, &conv.icon_keywords),
        ImageType::Unclassified => stem,
    };

    let (character, color) = self_identity(identity, conv);

    let folder = text::folder_of(identity).to_string();
    let record = ImageRecord {
        identity: identity.to_string(),
        effective_folder: folder.clone(),
        folder,
        image_type,
        name_key,
        character,
        color,
        consumed: false,
    };
    trace!(identity, kind = %record.image_type, key = %record.name_key, "image classified");
    record
}

fn decide_type(w: u32, h: u32, stem: &str, conv: &Conventions) -> ImageType {
    // 1. Exact positive integer multiple of a base resolution, same factor
    //    on both axes. Loaded tables may ship zero bases; those skip this
    //    rule instead of dividing by zero.
    let (pw, ph) = conv.portrait_base;
    if w > 0 && h > 0 {
        if pw > 0 && ph > 0 && w % pw == 0 && h % ph == 0 && w / pw == h / ph {
            return ImageType::Portrait;
        }
        let edge = conv.icon_base;
        if edge > 0 && w == h && w % edge == 0 {
            return ImageType::Icon;
        }
    }

    // 2. Filename keywords. A portrait keyword only counts when no icon
    //    keyword is present; an icon keyword always counts.
    let has_portrait_kw = conv.portrait_keywords.iter().any(|k| stem.contains(k.as_str()));
    let has_icon_kw = conv.icon_keywords.iter().any(|k| stem.contains(k.as_str()));
    if has_portrait_kw && !has_icon_kw {
        return ImageType::Portrait;
    }
    if has_icon_kw {
        return ImageType::Icon;
    }

    // 3. Aspect ratio within tolerance.
    if w > 0 && h > 0 {
        let aspect = f64::from(w) / f64::from(h);
        if (aspect - conv.portrait_ratio()).abs() <= conv.aspect_tolerance {
            return ImageType::Portrait;
        }
        if (aspect - 1.0).abs() <= conv.aspect_tolerance {
            return ImageType::Icon;
        }
    }

    ImageType::Unclassified
}

/// Character/color the image claims for itself: a compound code anywhere in
/// the filename, else the `character_color` word-split heuristic checked
/// against the character-name table.
fn self_identity(identity: &str, conv: &Conventions) -> (Option<String>, Option<String>) {
    if let Some((character, color)) = conv.compound_code_in(text::file_name(identity)) {
        return (Some(character.to_string()), Some(color.to_string()));
    }

    let toks = text::tokens(&text::stem(identity));
    if toks.len() >= 2 {
        let last = &toks[toks.len() - 1];
        if let Some(color) = conv.color_for_word(last) {
            let name_part = toks[..toks.len() - 1].concat();
            for (_, name) in &conv.character_codes {
                let squashed = text::squash(name);
                let last_word = name
                    .rsplit(|c: char| !c.is_ascii_alphanumeric())
                    .find(|w| !w.is_empty())
                    .unwrap_or(name);
                if name_part == squashed || name_part == text::squash(last_word) {
                    return (Some(name.clone()), Some(color.to_string()));
                }
            }
        }
    }
    (None, None)
}

/// Per-archive image indices, built once per scan.
///
/// Owns the engine-local mutable state (consumption flags, effective
/// folders) for one correlation run; independent archives use independent
/// indices, keeping the engine re-entrant. Unclassified images are excluded.
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    images: Vec<ImageRecord>,
    by_name_key: HashMap<(ImageType, String), Vec<usize>>,
    by_identity: HashMap<String, usize>,
}

impl ImageIndex {
    /// Build the per-type indices, preserving input order.
    pub fn build(records: impl IntoIterator<Item = ImageRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            if record.image_type == ImageType::Unclassified {
                continue;
            }
            let i = index.images.len();
            index
                .by_name_key
                .entry((record.image_type, record.name_key.clone()))
                .or_default()
                .push(i);
            index.by_identity.insert(record.identity.clone(), i);
            index.images.push(record);
        }
        index
    }

    /// Indices of all images of a type, in input order.
    pub(crate) fn of_type(&self, t: ImageType) -> impl Iterator<Item = usize> + '_ {
        self.images
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.image_type == t)
            .map(|(i, _)| i)
    }

    /// Indices sharing a name key within one type, in input order.
    pub(crate) fn by_name_key(&self, t: ImageType, key: &str) -> &[usize] {
        self.by_name_key
            .get(&(t, key.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Record by archive identity.
    pub fn by_identity(&self, identity: &str) -> Option<&ImageRecord> {
        self.by_identity.get(identity).map(|&i| &self.images[i])
    }

    pub(crate) fn get(&self, i: usize) -> &ImageRecord {
        &self.images[i]
    }

    pub(crate) fn get_mut(&mut self, i: usize) -> &mut ImageRecord {
        &mut self.images[i]
    }

    /// Number of indexed (classified) images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no classified image exists.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ImageRecord> {
        self.images.iter_mut()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ImageRecord> {
        self.images.iter()
    }
}
