//! The costume correlation engine.
//!
//! One engine instance owns one archive run: Init → FolderPromotion →
//! PerDescriptorMatch → PostProcess → Done. There are no failure states;
//! a descriptor that matches nothing keeps an entry with both fields unset.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use super::folders;
use super::strategies::{Strategy, STRATEGIES};
use crate::classify::ImageIndex;
use crate::conventions::Conventions;
use crate::core::descriptor::DescriptorRecord;
use crate::core::image::ImageType;
use crate::core::match_result::{CostumeMatch, MatchResult};

/// The two pools every descriptor is matched against, in match order.
const POOLS: [ImageType; 2] = [ImageType::Portrait, ImageType::Icon];

fn field(entry: &CostumeMatch, t: ImageType) -> &Option<String> {
    match t {
        ImageType::Portrait => &entry.portrait,
        ImageType::Icon => &entry.icon,
        ImageType::Unclassified => unreachable!("unclassified images are never matched"),
    }
}

fn set_field(entry: &mut CostumeMatch, t: ImageType, value: String) {
    match t {
        ImageType::Portrait => entry.portrait = Some(value),
        ImageType::Icon => entry.icon = Some(value),
        ImageType::Unclassified => unreachable!("unclassified images are never matched"),
    }
}

/// Correlates one archive's costume descriptors with its portrait and icon
/// pools. Holds only immutable scope data; all mutable per-run state lives
/// in the [`ImageIndex`] passed to [`run`](Self::run), keeping independent
/// archive runs re-entrant.
pub struct CostumeCorrelator<'a> {
    conv: &'a Conventions,
    scope: Vec<DescriptorRecord>,
    folder_counts: HashMap<String, usize>,
    distinct_hashes: usize,
}

impl<'a> CostumeCorrelator<'a> {
    /// Restrict to in-scope descriptors: playable costumes, not secondary
    /// units, with a recognized character. Listed order is preserved and
    /// observable.
    pub fn new(descriptors: &[DescriptorRecord], conv: &'a Conventions) -> Self {
        let scope: Vec<DescriptorRecord> = descriptors
            .iter()
            .filter(|d| d.in_scope())
            .cloned()
            .collect();
        let mut folder_counts: HashMap<String, usize> = HashMap::new();
        for d in &scope {
            *folder_counts.entry(d.folder().to_string()).or_insert(0) += 1;
        }
        let distinct_hashes = scope
            .iter()
            .map(|d| d.content_hash.as_str())
            .collect::<HashSet<_>>()
            .len();
        Self {
            conv,
            scope,
            folder_counts,
            distinct_hashes,
        }
    }

    pub(super) fn conv(&self) -> &Conventions {
        self.conv
    }

    pub(super) fn scope(&self) -> &[DescriptorRecord] {
        &self.scope
    }

    /// In-scope descriptors living in `folder`.
    pub(super) fn folder_scope_count(&self, folder: &str) -> usize {
        self.folder_counts.get(folder).copied().unwrap_or(0)
    }

    pub(super) fn distinct_hashes(&self) -> usize {
        self.distinct_hashes
    }

    /// Run the full match pipeline over one archive's image index.
    pub fn run(&self, index: &mut ImageIndex) -> MatchResult {
        let descriptor_folders: BTreeSet<String> = self
            .scope
            .iter()
            .map(|d| d.folder().to_string())
            .collect();
        folders::promote(&descriptor_folders, index, self.conv);

        // Single-costume injection: with one distinct descriptor every
        // anonymous image can only belong to it.
        if self.distinct_hashes == 1 {
            if let Some(d) = self.scope.first() {
                for img in index.iter_mut() {
                    if img.character.is_none() && img.color.is_none() {
                        img.character = d.character.clone();
                        img.color = d.color.clone();
                    }
                }
            }
        }

        let mut result = MatchResult::default();
        for d in &self.scope {
            result.insert(&d.identity);
        }

        for d in &self.scope {
            for t in POOLS {
                let Some((i, strategy)) = self.first_hit(d, t, index) else {
                    continue;
                };
                let image_identity = index.get(i).identity.clone();
                if strategy.consumes {
                    index.get_mut(i).consumed = true;
                }
                debug!(
                    descriptor = %d.identity,
                    image = %image_identity,
                    pool = %t,
                    strategy = strategy.name,
                    consumed = strategy.consumes,
                    "descriptor matched"
                );
                if let Some(entry) = result.entry_mut(&d.identity) {
                    set_field(entry, t, image_identity);
                }
            }
        }

        self.propagate_hash_siblings(&mut result);
        self.reuse_character_color(&mut result);
        self.pair_folder_leftovers(&mut result, index);
        result
    }

    fn first_hit(
        &self,
        d: &DescriptorRecord,
        t: ImageType,
        index: &ImageIndex,
    ) -> Option<(usize, &'static Strategy)> {
        STRATEGIES
            .iter()
            .find_map(|s| (s.run)(self, d, t, index).map(|i| (i, s)))
    }

    /// PostProcess (a): byte-identical descriptors must end up equal. The
    /// first-listed member with a match donates it to the whole group, which
    /// also settles siblings that independently won different images.
    fn propagate_hash_siblings(&self, result: &mut MatchResult) {
        let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();
        for d in &self.scope {
            groups
                .entry(d.content_hash.as_str())
                .or_default()
                .push(d.identity.as_str());
        }
        for members in groups.values().filter(|m| m.len() > 1) {
            for t in POOLS {
                let donor = members
                    .iter()
                    .find_map(|id| result.get(id).and_then(|e| field(e, t).clone()));
                let Some(donor) = donor else { continue };
                for id in members {
                    if let Some(entry) = result.entry_mut(id) {
                        set_field(entry, t, donor.clone());
                    }
                }
            }
        }
    }

    /// PostProcess (b): first-seen (character, color) → image reuse.
    fn reuse_character_color(&self, result: &mut MatchResult) {
        for t in POOLS {
            let mut first_seen: HashMap<(&str, &str), String> = HashMap::new();
            for d in &self.scope {
                let (Some(character), Some(color)) = (d.character.as_deref(), d.color.as_deref())
                else {
                    continue;
                };
                if let Some(image) = result.get(&d.identity).and_then(|e| field(e, t).clone()) {
                    first_seen.entry((character, color)).or_insert(image);
                }
            }
            for d in &self.scope {
                let (Some(character), Some(color)) = (d.character.as_deref(), d.color.as_deref())
                else {
                    continue;
                };
                let Some(image) = first_seen.get(&(character, color)).cloned() else {
                    continue;
                };
                if let Some(entry) = result.entry_mut(&d.identity) {
                    if field(entry, t).is_none() {
                        set_field(entry, t, image);
                    }
                }
            }
        }
    }

    /// PostProcess (c): a folder left with exactly one unmatched descriptor
    /// and exactly one unconsumed image of a type pairs them up.
    fn pair_folder_leftovers(&self, result: &mut MatchResult, index: &ImageIndex) {
        let folders: BTreeSet<&str> = self.scope.iter().map(|d| d.folder()).collect();
        for folder in folders {
            for t in POOLS {
                let unmatched: Vec<&str> = self
                    .scope
                    .iter()
                    .filter(|d| d.folder() == folder)
                    .filter(|d| {
                        result
                            .get(&d.identity)
                            .map(|e| field(e, t).is_none())
                            .unwrap_or(false)
                    })
                    .map(|d| d.identity.as_str())
                    .collect();
                let unconsumed: Vec<usize> = index
                    .of_type(t)
                    .filter(|&i| {
                        let r = index.get(i);
                        !r.consumed && r.effective_folder == folder
                    })
                    .collect();
                if let ([id], [img]) = (unmatched.as_slice(), unconsumed.as_slice()) {
                    let image_identity = index.get(*img).identity.clone();
                    debug!(descriptor = %id, image = %image_identity, pool = %t, "folder leftover paired");
                    if let Some(entry) = result.entry_mut(id) {
                        set_field(entry, t, image_identity);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_image, ImageIndex};

    fn descriptor(identity: &str, character: &str, color: &str, hash: &str) -> DescriptorRecord {
        DescriptorRecord {
            identity: identity.to_string(),
            character: Some(character.to_string()),
            color: Some(color.to_string()),
            canonical_code: None,
            content_hash: hash.to_string(),
            is_playable_costume: true,
            is_secondary_unit: false,
        }
    }

    fn portraits(conv: &Conventions, identities: &[&str]) -> ImageIndex {
        ImageIndex::build(
            identities
                .iter()
                .map(|id| classify_image(id, Some((136, 188)), conv)),
        )
    }

    #[test]
    fn test_exact_name_consumes_per_descriptor() {
        // Scenario B: two root descriptors, two keyed portraits, no
        // cross-assignment, each image consumed exactly once.
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("a.bin", "Fox", "Red", "h1"),
            descriptor("b.bin", "Fox", "Green", "h2"),
        ];
        let mut index = portraits(&conv, &["a_portrait.png", "b_portrait.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(
            result.get("a.bin").unwrap().portrait.as_deref(),
            Some("a_portrait.png")
        );
        assert_eq!(
            result.get("b.bin").unwrap().portrait.as_deref(),
            Some("b_portrait.png")
        );
        assert!(index.by_identity("a_portrait.png").unwrap().consumed);
        assert!(index.by_identity("b_portrait.png").unwrap().consumed);
    }

    #[test]
    fn test_shared_image_for_underfilled_folder() {
        // Scenario C: three descriptors, one shared portrait, nobody
        // consumes it.
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("Pack/red.bin", "Fox", "Red", "h1"),
            descriptor("Pack/green.bin", "Fox", "Green", "h2"),
            descriptor("Pack/blue.bin", "Fox", "Blue", "h3"),
        ];
        let mut index = portraits(&conv, &["Pack/shared.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        for id in ["Pack/red.bin", "Pack/green.bin", "Pack/blue.bin"] {
            assert_eq!(
                result.get(id).unwrap().portrait.as_deref(),
                Some("Pack/shared.png"),
                "{id}"
            );
        }
        assert!(!index.by_identity("Pack/shared.png").unwrap().consumed);
    }

    #[test]
    fn test_color_word_direct_beats_alias() {
        // Scenario D: Orange matches "orange.png" over the "red" alias.
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("Fighter/costume.bin", "Captain Falcon", "Orange", "h1"),
            descriptor("Other/decoy.bin", "Mario", "Pink", "h2"),
        ];
        let mut index = portraits(&conv, &["Fighter/red.png", "Fighter/orange.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(
            result.get("Fighter/costume.bin").unwrap().portrait.as_deref(),
            Some("Fighter/orange.png")
        );
    }

    #[test]
    fn test_no_images_of_a_type_is_not_an_error() {
        // Scenario E: icons absent, every icon field unset.
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("Hero/red.bin", "Fox", "Red", "h1"),
            descriptor("Hero/green.bin", "Fox", "Green", "h2"),
        ];
        let mut index = ImageIndex::build(std::iter::empty());
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(result.len(), 2);
        for (_, entry) in result.iter() {
            assert_eq!(entry.portrait, None);
            assert_eq!(entry.icon, None);
        }
    }

    #[test]
    fn test_single_costume_archive_matches_lone_portrait() {
        // Scenario A: one descriptor, one portrait in its folder.
        let conv = Conventions::default();
        let descriptors = vec![descriptor("Hero/red.bin", "Fox", "Red", "h1")];
        let mut index = portraits(&conv, &["Hero/portrait.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(
            result.get("Hero/red.bin").unwrap().portrait.as_deref(),
            Some("Hero/portrait.png")
        );
    }

    #[test]
    fn test_hash_siblings_equalized() {
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("Hero/red.bin", "Fox", "Red", "same"),
            descriptor("Mirror/copy.bin", "Fox", "Red", "same"),
        ];
        // Only the first folder has an image; the sibling inherits it.
        let mut index = portraits(&conv, &["Hero/fox_red.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        let a = result.get("Hero/red.bin").unwrap();
        let b = result.get("Mirror/copy.bin").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.portrait.as_deref(), Some("Hero/fox_red.png"));
    }

    #[test]
    fn test_diverging_hash_siblings_equalized() {
        // Each sibling wins its own exact-name match first; the propagation
        // pass settles both on the first-listed member's image.
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("A/one.dat", "Fox", "Red", "same"),
            descriptor("B/two.dat", "Fox", "Red", "same"),
        ];
        let mut index = portraits(&conv, &["A/one.png", "B/two.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        let a = result.get("A/one.dat").unwrap();
        let b = result.get("B/two.dat").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.portrait.as_deref(), Some("A/one.png"));
    }

    #[test]
    fn test_positional_pairing() {
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("Pack/a.bin", "Fox", "Red", "h1"),
            descriptor("Pack/b.bin", "Fox", "Green", "h2"),
        ];
        let mut index = portraits(&conv, &["Pack/zz1.png", "Pack/zz2.png", "Pack/zz3.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(
            result.get("Pack/a.bin").unwrap().portrait.as_deref(),
            Some("Pack/zz1.png")
        );
        assert_eq!(
            result.get("Pack/b.bin").unwrap().portrait.as_deref(),
            Some("Pack/zz2.png")
        );
    }

    #[test]
    fn test_folder_words_found_in_name_key() {
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("Hero Pack/x.bin", "Fox", "Blue", "h1"),
            descriptor("Other/y.bin", "Mario", "Green", "h2"),
        ];
        // The second portrait keeps the sole-image fallback out of play.
        let mut index = portraits(&conv, &["art/hero_pack_select.png", "misc/zebra.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(
            result.get("Hero Pack/x.bin").unwrap().portrait.as_deref(),
            Some("art/hero_pack_select.png")
        );
        assert_eq!(result.get("Other/y.bin").unwrap().portrait, None);
    }

    #[test]
    fn test_alias_tie_never_guesses() {
        // Two images alias Orange equally well; the color strategy yields
        // nothing and the folder fallback takes the first one instead.
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("Pack/a.bin", "Captain Falcon", "Orange", "h1"),
            descriptor("Other/decoy.bin", "Mario", "Green", "h2"),
        ];
        let mut index = portraits(&conv, &["Pack/team_red.png", "Pack/squad_red.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(
            result.get("Pack/a.bin").unwrap().portrait.as_deref(),
            Some("Pack/team_red.png")
        );
        // Consumption proves the match came from the folder fallback, not
        // from an alias guess.
        assert!(index.by_identity("Pack/team_red.png").unwrap().consumed);
        assert!(!index.by_identity("Pack/squad_red.png").unwrap().consumed);
        assert_eq!(result.get("Other/decoy.bin").unwrap().portrait, None);
    }

    #[test]
    fn test_unknown_color_matches_on_character_alone() {
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("Hero/PlFx.bin", "Fox", &conv.unknown_color, "h1"),
            descriptor("Other/decoy.bin", "Mario", "Green", "h2"),
        ];
        let mut index = portraits(&conv, &["art/fox_red.png", "misc/zebra.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(
            result.get("Hero/PlFx.bin").unwrap().portrait.as_deref(),
            Some("art/fox_red.png")
        );
        assert!(index.by_identity("art/fox_red.png").unwrap().consumed);
    }

    #[test]
    fn test_character_color_reuse_across_folders() {
        // Same (character, color) in two folders, but only one folder has an
        // image; the other descriptor reuses the first-seen match.
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("A/x.bin", "Fox", "Red", "h1"),
            descriptor("B/y.bin", "Fox", "Red", "h2"),
        ];
        let mut index = portraits(&conv, &["A/fox.png", "C/other.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(
            result.get("A/x.bin").unwrap().portrait.as_deref(),
            Some("A/fox.png")
        );
        assert_eq!(
            result.get("B/y.bin").unwrap().portrait.as_deref(),
            Some("A/fox.png")
        );
    }

    #[test]
    fn test_root_leftovers_paired_after_cascade() {
        // Root positional pairing is blocked once a root image is consumed;
        // the leftover pass unites the last descriptor with the last image.
        let conv = Conventions::default();
        let descriptors = vec![
            descriptor("alpha.bin", "Fox", "Red", "h1"),
            descriptor("beta.bin", "Fox", "Green", "h2"),
        ];
        let mut index = portraits(&conv, &["alpha.png", "zzz.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert_eq!(
            result.get("alpha.bin").unwrap().portrait.as_deref(),
            Some("alpha.png")
        );
        assert_eq!(
            result.get("beta.bin").unwrap().portrait.as_deref(),
            Some("zzz.png")
        );
    }

    #[test]
    fn test_secondary_unit_and_aux_data_excluded() {
        let conv = Conventions::default();
        let mut aux = descriptor("Hero/data.bin", "Fox", "Red", "h1");
        aux.is_playable_costume = false;
        let mut partner = descriptor("Hero/nana.bin", "Nana", "White", "h2");
        partner.is_secondary_unit = true;
        let descriptors = vec![aux, partner];
        let mut index = portraits(&conv, &["Hero/portrait.png"]);
        let result = CostumeCorrelator::new(&descriptors, &conv).run(&mut index);
        assert!(result.is_empty());
    }
}
