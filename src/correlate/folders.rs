//! Folder-promotion pre-pass.
//!
//! Archive authors often park images in generic media subfolders
//! ("portraits/", "icons/", "ui/") next to, under, or above the descriptor
//! folders. Promotion rewrites each image's `effective_folder` so the
//! folder-based strategies see the descriptor folder the author meant.
//!
//! Rules are evaluated against the immutable original folder and the first
//! hit wins, so running the pass twice is a no-op. Descriptor folders are
//! never touched.

use std::collections::BTreeSet;

use tracing::debug;

use crate::classify::ImageIndex;
use crate::conventions::Conventions;
use crate::text;

pub(super) fn promote(
    descriptor_folders: &BTreeSet<String>,
    index: &mut ImageIndex,
    conv: &Conventions,
) {
    for img in index.iter_mut() {
        let folder = img.folder.clone();
        img.effective_folder = target_for(&folder, descriptor_folders, conv).unwrap_or(folder);
        if img.promoted() {
            debug!(
                identity = %img.identity,
                from = %img.folder,
                to = %img.effective_folder,
                "image folder promoted"
            );
        }
    }
}

fn target_for(
    folder: &str,
    descriptor_folders: &BTreeSet<String>,
    conv: &Conventions,
) -> Option<String> {
    if descriptor_folders.contains(folder) {
        return None;
    }

    if !folder.is_empty() {
        // (a) a container-named direct child of a descriptor folder.
        let parent = text::parent(folder);
        if conv.is_container_folder(text::leaf(folder)) && descriptor_folders.contains(parent) {
            return Some(parent.to_string());
        }

        // (b) leading container segment stripped equals a descriptor folder.
        if let Some((first, rest)) = folder.split_once('/') {
            if conv.is_container_folder(first) && descriptor_folders.contains(rest) {
                return Some(rest.to_string());
            }
        }

        // (c) exactly one descriptor folder shares this folder's parent.
        let mut siblings = descriptor_folders
            .iter()
            .filter(|f| text::parent(f) == parent && f.as_str() != folder);
        if let (Some(only), None) = (siblings.next(), siblings.next()) {
            return Some(only.clone());
        }
    }

    // (d) this folder is the direct parent of exactly one descriptor folder.
    let mut children = descriptor_folders
        .iter()
        .filter(|f| !f.is_empty() && text::parent(f) == folder);
    if let (Some(only), None) = (children.next(), children.next()) {
        return Some(only.clone());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_image;

    fn folders(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn index_of(identities: &[&str]) -> ImageIndex {
        let conv = Conventions::default();
        ImageIndex::build(
            identities
                .iter()
                .map(|id| classify_image(id, Some((136, 188)), &conv)),
        )
    }

    #[test]
    fn test_container_child_promoted_to_parent() {
        let conv = Conventions::default();
        let mut index = index_of(&["Hero/portraits/a.png"]);
        promote(&folders(&["Hero"]), &mut index, &conv);
        assert_eq!(index.by_identity("Hero/portraits/a.png").unwrap().effective_folder, "Hero");
    }

    #[test]
    fn test_leading_container_segment_stripped() {
        let conv = Conventions::default();
        let mut index = index_of(&["ui/Hero/a.png"]);
        promote(&folders(&["Hero"]), &mut index, &conv);
        assert_eq!(index.by_identity("ui/Hero/a.png").unwrap().effective_folder, "Hero");
    }

    #[test]
    fn test_unique_sibling_descriptor_folder() {
        let conv = Conventions::default();
        let mut index = index_of(&["Pack/art/a.png"]);
        promote(&folders(&["Pack/Hero"]), &mut index, &conv);
        assert_eq!(index.by_identity("Pack/art/a.png").unwrap().effective_folder, "Pack/Hero");
    }

    #[test]
    fn test_parent_of_unique_descriptor_folder() {
        let conv = Conventions::default();
        let mut index = index_of(&["Pack/a.png"]);
        promote(&folders(&["Pack/Hero"]), &mut index, &conv);
        assert_eq!(index.by_identity("Pack/a.png").unwrap().effective_folder, "Pack/Hero");
    }

    #[test]
    fn test_descriptor_folder_images_untouched_and_idempotent() {
        let conv = Conventions::default();
        let mut index = index_of(&["Hero/a.png", "elsewhere/b.png"]);
        let dirs = folders(&["Hero"]);
        promote(&dirs, &mut index, &conv);
        let first: Vec<String> = index.iter().map(|r| r.effective_folder.clone()).collect();
        promote(&dirs, &mut index, &conv);
        let second: Vec<String> = index.iter().map(|r| r.effective_folder.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(index.by_identity("Hero/a.png").unwrap().effective_folder, "Hero");
    }

    #[test]
    fn test_ambiguous_siblings_keep_folder() {
        let conv = Conventions::default();
        let mut index = index_of(&["Pack/art/a.png"]);
        promote(&folders(&["Pack/Hero", "Pack/Villain"]), &mut index, &conv);
        assert_eq!(index.by_identity("Pack/art/a.png").unwrap().effective_folder, "Pack/art");
    }
}
