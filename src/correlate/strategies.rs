//! The per-descriptor matching cascade.
//!
//! Each numbered strategy is a small pure function `(engine, descriptor,
//! type, index) -> Option<image index>`. The engine walks [`STRATEGIES`] in
//! order and stops at the first hit. Consuming strategies take ownership of
//! the chosen image for their type; non-consuming strategies may hand the
//! same image to several descriptors.

use std::collections::BTreeSet;

use super::engine::CostumeCorrelator;
use crate::classify::ImageIndex;
use crate::core::descriptor::DescriptorRecord;
use crate::core::image::ImageType;
use crate::text;

pub(super) struct Strategy {
    pub name: &'static str,
    pub consumes: bool,
    pub run: fn(&CostumeCorrelator, &DescriptorRecord, ImageType, &ImageIndex) -> Option<usize>,
}

/// Fixed cascade order. Strategy numbering from the original tool is kept in
/// the comments for cross-reference with its import logs.
pub(super) const STRATEGIES: &[Strategy] = &[
    Strategy { name: "exact_name", consumes: true, run: exact_name }, // 1
    Strategy { name: "character_color", consumes: true, run: character_color }, // 2
    Strategy { name: "folder_word", consumes: false, run: folder_word }, // 2.5
    Strategy { name: "color_word", consumes: false, run: color_word }, // 2.6
    Strategy { name: "name_overlap", consumes: false, run: name_overlap }, // 2.7
    Strategy { name: "same_folder", consumes: true, run: same_folder }, // 3
    Strategy { name: "single_image_in_folder", consumes: false, run: single_image_in_folder }, // 3.5
    Strategy { name: "positional", consumes: false, run: positional }, // 3.75
    Strategy { name: "folder_share", consumes: false, run: folder_share }, // 3.8
    Strategy { name: "global", consumes: true, run: global }, // 4
    Strategy { name: "single_image_total", consumes: false, run: single_image_total }, // 5
];

/// 1: unconsumed image whose name key equals the descriptor stem, preferring
/// one already in the descriptor's folder.
fn exact_name(
    _cx: &CostumeCorrelator,
    d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    let key = d.stem();
    let candidates: Vec<usize> = idx
        .by_name_key(t, &key)
        .iter()
        .copied()
        .filter(|&i| !idx.get(i).consumed)
        .collect();
    candidates
        .iter()
        .copied()
        .find(|&i| idx.get(i).effective_folder == d.folder())
        .or_else(|| candidates.first().copied())
}

/// 2: unconsumed image whose own character and color equal the descriptor's.
/// The Unknown sentinel relaxes the color constraint to character-only.
fn character_color(
    cx: &CostumeCorrelator,
    d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    let character = d.character.as_deref()?;
    let color = d.color.as_deref()?;
    let character_only = color == cx.conv().unknown_color;
    idx.of_type(t).find(|&i| {
        let r = idx.get(i);
        !r.consumed
            && r.character.as_deref() == Some(character)
            && (character_only || r.color.as_deref() == Some(color))
    })
}

/// 2.5: the descriptor's normalized folder name appears as whole words in
/// some name key. Only for folders holding exactly one in-scope descriptor.
fn folder_word(
    cx: &CostumeCorrelator,
    d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    if cx.folder_scope_count(d.folder()) != 1 {
        return None;
    }
    let name = text::normalize_folder_name(text::leaf(d.folder()));
    let words = text::tokens(&name);
    if words.is_empty() {
        return None;
    }
    idx.of_type(t).find(|&i| {
        let keys = text::tokens(&idx.get(i).name_key);
        words.iter().all(|w| keys.contains(w))
    })
}

/// 2.6: a name-key word naming the descriptor's color. A direct color word
/// scores 2, an alias 1; score ties are broken by word overlap with the
/// descriptor stem, and an unresolved tie is no match, never a guess.
fn color_word(
    cx: &CostumeCorrelator,
    d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    let color = d.color.as_deref()?;
    if color == cx.conv().unknown_color {
        return None;
    }
    let direct = color.to_ascii_lowercase();

    let mut best: Vec<usize> = Vec::new();
    let mut best_score = 0u8;
    for i in idx.of_type(t) {
        let mut score = 0u8;
        for w in text::tokens(&idx.get(i).name_key) {
            if w == direct {
                score = score.max(2);
            } else if cx.conv().word_aliases_color(&w, color) {
                score = score.max(1);
            }
        }
        if score > best_score {
            best_score = score;
            best.clear();
            best.push(i);
        } else if score == best_score && score > 0 {
            best.push(i);
        }
    }
    match best.len() {
        0 => None,
        1 => Some(best[0]),
        _ => {
            let stem_words = text::tokens(&d.stem());
            strict_max_by_key(&best, |&i| {
                text::tokens(&idx.get(i).name_key)
                    .iter()
                    .filter(|w| stem_words.contains(w))
                    .count() as i64
            })
        }
    }
}

/// 2.7: shared content words minus extra image words, strict single winner.
fn name_overlap(
    cx: &CostumeCorrelator,
    d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    let d_words = content_words(cx, &d.stem());
    if d_words.is_empty() {
        return None;
    }
    let scored: Vec<usize> = idx
        .of_type(t)
        .filter(|&i| {
            content_words(cx, &idx.get(i).name_key)
                .intersection(&d_words)
                .next()
                .is_some()
        })
        .collect();
    strict_max_by_key(&scored, |&i| {
        let img_words = content_words(cx, &idx.get(i).name_key);
        let shared = img_words.intersection(&d_words).count() as i64;
        let extra = img_words.difference(&d_words).count() as i64;
        shared - extra
    })
}

/// 3: any unconsumed image already in the descriptor's folder. Only for
/// folders holding exactly one in-scope descriptor.
fn same_folder(
    cx: &CostumeCorrelator,
    d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    if cx.folder_scope_count(d.folder()) != 1 {
        return None;
    }
    idx.of_type(t).find(|&i| {
        let r = idx.get(i);
        !r.consumed && r.effective_folder == d.folder()
    })
}

/// 3.5: the descriptor's non-root folder holds exactly one image of this
/// type, regardless of descriptor count or consumption.
fn single_image_in_folder(
    _cx: &CostumeCorrelator,
    d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    if d.folder().is_empty() {
        return None;
    }
    let mut in_folder = idx
        .of_type(t)
        .filter(|&i| idx.get(i).effective_folder == d.folder());
    match (in_folder.next(), in_folder.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// 3.75: identity-sorted positional pairing when a folder holds at least as
/// many images as descriptors (two or more of each side). The root folder is
/// only eligible while no root image of this type has been consumed.
fn positional(
    cx: &CostumeCorrelator,
    d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    let folder = d.folder();
    if folder.is_empty() {
        let root_consumed = idx
            .of_type(t)
            .any(|i| idx.get(i).consumed && idx.get(i).effective_folder.is_empty());
        if root_consumed {
            return None;
        }
    }

    let mut images: Vec<usize> = idx
        .of_type(t)
        .filter(|&i| idx.get(i).effective_folder == folder)
        .collect();
    let mut descriptors: Vec<&str> = cx
        .scope()
        .iter()
        .filter(|x| x.folder() == folder)
        .map(|x| x.identity.as_str())
        .collect();
    if descriptors.len() < 2 || images.len() < descriptors.len() {
        return None;
    }
    images.sort_by(|&a, &b| idx.get(a).identity.cmp(&idx.get(b).identity));
    descriptors.sort_unstable();
    let position = descriptors.iter().position(|id| *id == d.identity)?;
    images.get(position).copied()
}

/// 3.8: fewer images than descriptors in the folder; everyone shares the
/// identity-first image.
fn folder_share(
    cx: &CostumeCorrelator,
    d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    let folder = d.folder();
    let images: Vec<usize> = idx
        .of_type(t)
        .filter(|&i| idx.get(i).effective_folder == folder)
        .collect();
    let descriptors = cx.folder_scope_count(folder);
    if images.is_empty() || images.len() >= descriptors {
        return None;
    }
    images
        .into_iter()
        .min_by(|&a, &b| idx.get(a).identity.cmp(&idx.get(b).identity))
}

/// 4: any unconsumed image anywhere, only when the archive holds exactly one
/// distinct-hash in-scope descriptor.
fn global(
    cx: &CostumeCorrelator,
    _d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    if cx.distinct_hashes() != 1 {
        return None;
    }
    idx.of_type(t).find(|&i| !idx.get(i).consumed)
}

/// 5: exactly one image of this type exists in the whole archive.
fn single_image_total(
    _cx: &CostumeCorrelator,
    _d: &DescriptorRecord,
    t: ImageType,
    idx: &ImageIndex,
) -> Option<usize> {
    let mut all = idx.of_type(t);
    match (all.next(), all.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

/// Filename tokens with noise words, color words, and character codes
/// removed.
fn content_words(cx: &CostumeCorrelator, s: &str) -> BTreeSet<String> {
    text::tokens(s)
        .into_iter()
        .filter(|w| {
            !cx.conv().is_noise_word(w) && !cx.conv().is_color_word(w) && !cx.conv().is_code_word(w)
        })
        .collect()
}

/// Element with the strictly largest key, or None on a tie or empty input.
fn strict_max_by_key<K: Ord>(items: &[usize], key: impl Fn(&usize) -> K) -> Option<usize> {
    let mut best: Option<(usize, K)> = None;
    let mut tied = false;
    for &i in items {
        let k = key(&i);
        match &best {
            None => {
                best = Some((i, k));
                tied = false;
            }
            Some((_, bk)) => {
                if k > *bk {
                    best = Some((i, k));
                    tied = false;
                } else if k == *bk {
                    tied = true;
                }
            }
        }
    }
    match (best, tied) {
        (Some((i, _)), false) => Some(i),
        _ => None,
    }
}
