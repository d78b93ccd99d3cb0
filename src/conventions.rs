//! Injected lookup tables for one game title's asset conventions.
//!
//! Everything the parser, classifier, and correlation engines need to know
//! about a title lives here: symbol prefixes, character and color codes,
//! folder and filename conventions, base resolutions. The tables are plain
//! data with serde round-tripping, so a new title ships new tables instead
//! of new engine logic. The defaults cover the GameCube fighter the tool was
//! originally written for.

use serde::{Deserialize, Serialize};

use crate::error::{CostumierError, Result};

/// Lookup tables and tuning constants for one title.
///
/// Ordered tables are scanned front to back; first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conventions {
    /// Prefix shared by every playable-unit symbol (e.g. `Ply`).
    pub playable_marker: String,
    /// Playable-unit symbol prefixes, prefix → character name.
    pub playable_prefixes: Vec<(String, String)>,
    /// Pure-data symbol prefixes, prefix → character name.
    pub data_prefixes: Vec<(String, String)>,
    /// Two-letter character codes, code → character name.
    pub character_codes: Vec<(String, String)>,
    /// Two-letter color codes, code → color name.
    pub color_codes: Vec<(String, String)>,
    /// Color alias words, alias → color name. One alias word may map to
    /// several colors; direct color names always outrank aliases.
    pub color_aliases: Vec<(String, String)>,
    /// Characters whose descriptors are resolved externally by copying the
    /// linked primary descriptor's result.
    pub secondary_units: Vec<String>,
    /// Generic media-container folder names eligible for folder promotion.
    pub container_folders: Vec<String>,
    /// Filename tokens carrying no matching signal.
    pub noise_words: Vec<String>,
    /// Filename keywords marking a portrait.
    pub portrait_keywords: Vec<String>,
    /// Filename keywords marking an icon.
    pub icon_keywords: Vec<String>,
    /// Portrait base resolution (width, height); real portraits are exact
    /// integer multiples of it.
    pub portrait_base: (u32, u32),
    /// Icon base edge; icons are square multiples of it.
    pub icon_base: u32,
    /// Tolerance for aspect-ratio classification.
    pub aspect_tolerance: f64,
    /// Target aspect ratio used to break ties between stage screenshots.
    pub widescreen_ratio: f64,
    /// Stage short codes, code → stage name.
    pub stage_codes: Vec<(String, String)>,
    /// Explicit sentinel for a color that could not be determined. Distinct
    /// from "unset": Unknown still matches by character-only constraints.
    pub unknown_color: String,
}

impl Conventions {
    /// Load a table set from its JSON form, the format per-title convention
    /// files ship in.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CostumierError::InvalidInput(format!("convention tables: {e}")))
    }

    /// Character named by a symbol, with `true` when the hit came from the
    /// playable-prefix family. Membership is by substring, per the source
    /// conventions (`ftDataCaptain` appears mid-symbol in some blobs).
    pub fn character_for_symbol(&self, symbol: &str) -> Option<(&str, bool)> {
        for (prefix, name) in &self.playable_prefixes {
            if symbol.contains(prefix.as_str()) {
                return Some((name, true));
            }
        }
        for (prefix, name) in &self.data_prefixes {
            if symbol.contains(prefix.as_str()) {
                return Some((name, false));
            }
        }
        None
    }

    /// Whether a symbol belongs to the playable-unit family.
    pub fn is_playable_symbol(&self, symbol: &str) -> bool {
        symbol.starts_with(self.playable_marker.as_str())
    }

    /// Two-letter code for a character name.
    pub fn code_for_character(&self, character: &str) -> Option<&str> {
        self.character_codes
            .iter()
            .find(|(_, name)| name == character)
            .map(|(code, _)| code.as_str())
    }

    /// Character name for a two-letter code.
    pub fn character_for_code(&self, code: &str) -> Option<&str> {
        self.character_codes
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, name)| name.as_str())
    }

    /// Color name for a two-letter code.
    pub fn color_for_code(&self, code: &str) -> Option<&str> {
        self.color_codes
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, name)| name.as_str())
    }

    /// Two-letter code for a color name.
    pub fn code_for_color(&self, color: &str) -> Option<&str> {
        self.color_codes
            .iter()
            .find(|(_, name)| name == color)
            .map(|(code, _)| code.as_str())
    }

    /// First 4-letter compound code (character code + color code) inside
    /// `text`, returned as (character name, color name). Codes are
    /// case-sensitive; the window slides one byte at a time.
    pub fn compound_code_in(&self, text: &str) -> Option<(&str, &str)> {
        let bytes = text.as_bytes();
        if bytes.len() < 4 {
            return None;
        }
        for i in 0..=bytes.len() - 4 {
            let window = &bytes[i..i + 4];
            if !window.is_ascii() {
                continue;
            }
            let Ok(window) = std::str::from_utf8(window) else {
                continue;
            };
            let (ch, co) = (&window[..2], &window[2..]);
            if let (Some(character), Some(color)) =
                (self.character_for_code(ch), self.color_for_code(co))
            {
                return Some((character, color));
            }
        }
        None
    }

    /// Whether a character has a linked secondary unit resolved externally.
    pub fn is_secondary_unit(&self, character: &str) -> bool {
        self.secondary_units.iter().any(|c| c == character)
    }

    /// Color name whose lowercase form equals `word`, if any.
    pub fn color_for_word(&self, word: &str) -> Option<&str> {
        self.color_codes
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(word))
            .map(|(_, name)| name.as_str())
    }

    /// Whether `word` is an alias for `color`.
    pub fn word_aliases_color(&self, word: &str, color: &str) -> bool {
        self.color_aliases
            .iter()
            .any(|(alias, name)| alias == word && name == color)
    }

    /// Whether `word` carries color meaning, directly or through an alias.
    pub fn is_color_word(&self, word: &str) -> bool {
        self.color_for_word(word).is_some()
            || self.color_aliases.iter().any(|(alias, _)| alias == word)
    }

    /// Whether a lowercase token is a character code or a full compound.
    pub fn is_code_word(&self, word: &str) -> bool {
        match word.len() {
            2 => self
                .character_codes
                .iter()
                .any(|(code, _)| code.eq_ignore_ascii_case(word)),
            4 => {
                let (ch, co) = (&word[..2], &word[2..]);
                self.character_codes
                    .iter()
                    .any(|(code, _)| code.eq_ignore_ascii_case(ch))
                    && self
                        .color_codes
                        .iter()
                        .any(|(code, _)| code.eq_ignore_ascii_case(co))
            }
            _ => false,
        }
    }

    /// Whether a lowercase token is a noise word.
    pub fn is_noise_word(&self, word: &str) -> bool {
        self.noise_words.iter().any(|w| w == word)
    }

    /// Whether a folder name is one of the generic media-container names.
    pub fn is_container_folder(&self, name: &str) -> bool {
        self.container_folders
            .iter()
            .any(|c| c.eq_ignore_ascii_case(name))
    }

    /// Portrait width/height ratio.
    pub fn portrait_ratio(&self) -> f64 {
        f64::from(self.portrait_base.0) / f64::from(self.portrait_base.1)
    }

    /// Stage name for a short code.
    pub fn stage_for_code(&self, code: &str) -> Option<&str> {
        self.stage_codes
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, name)| name.as_str())
    }
}

fn pairs(table: &[(&str, &str)]) -> Vec<(String, String)> {
    table
        .iter()
        .map(|(a, b)| ((*a).to_string(), (*b).to_string()))
        .collect()
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

impl Default for Conventions {
    fn default() -> Self {
        const CHARACTERS: &[(&str, &str, &str)] = &[
            // (code, internal symbol name, character name)
            ("Ca", "Captain", "Captain Falcon"),
            ("Dk", "Donkey", "Donkey Kong"),
            ("Fx", "Fox", "Fox"),
            ("Gw", "Gamewatch", "Mr. Game & Watch"),
            ("Kb", "Kirby", "Kirby"),
            ("Kp", "Koopa", "Bowser"),
            ("Lk", "Link", "Link"),
            ("Lg", "Luigi", "Luigi"),
            ("Mr", "Mario", "Mario"),
            ("Ms", "Mars", "Marth"),
            ("Mt", "Mewtwo", "Mewtwo"),
            ("Ns", "Ness", "Ness"),
            ("Pe", "Peach", "Peach"),
            ("Pk", "Pikachu", "Pikachu"),
            ("Pp", "Popo", "Popo"),
            ("Nn", "Nana", "Nana"),
            ("Pr", "Purin", "Jigglypuff"),
            ("Sk", "Seak", "Sheik"),
            ("Ss", "Samus", "Samus"),
            ("Ys", "Yoshi", "Yoshi"),
            ("Zd", "Zelda", "Zelda"),
            ("Fc", "Falco", "Falco"),
            ("Cl", "Clink", "Young Link"),
            ("Dr", "Drmario", "Dr. Mario"),
            ("Fe", "Emblem", "Roy"),
            ("Pc", "Pichu", "Pichu"),
            ("Gn", "Ganon", "Ganondorf"),
        ];

        let playable_prefixes = CHARACTERS
            .iter()
            .map(|(_, sym, name)| (format!("Ply{sym}"), (*name).to_string()))
            .collect();
        let data_prefixes = CHARACTERS
            .iter()
            .map(|(_, sym, name)| (format!("ftData{sym}"), (*name).to_string()))
            .collect();
        let character_codes = CHARACTERS
            .iter()
            .map(|(code, _, name)| ((*code).to_string(), (*name).to_string()))
            .collect();

        Self {
            playable_marker: "Ply".to_string(),
            playable_prefixes,
            data_prefixes,
            character_codes,
            color_codes: pairs(&[
                ("Nr", "Neutral"),
                ("Re", "Red"),
                ("Bu", "Blue"),
                ("Gr", "Green"),
                ("Ye", "Yellow"),
                ("Or", "Orange"),
                ("Wh", "White"),
                ("Bk", "Black"),
                ("Aq", "Aqua"),
                ("La", "Lavender"),
                ("Pi", "Pink"),
                ("Gy", "Gray"),
            ]),
            color_aliases: pairs(&[
                ("default", "Neutral"),
                ("normal", "Neutral"),
                ("original", "Neutral"),
                ("standard", "Neutral"),
                ("vanilla", "Neutral"),
                ("crimson", "Red"),
                ("scarlet", "Red"),
                ("maroon", "Red"),
                ("navy", "Blue"),
                // Many archives label the orange costume "red".
                ("red", "Orange"),
                ("teal", "Aqua"),
                ("cyan", "Aqua"),
                ("blue", "Aqua"),
                ("purple", "Lavender"),
                ("violet", "Lavender"),
                ("blue", "Lavender"),
                ("grey", "Gray"),
                ("silver", "Gray"),
                ("gold", "Yellow"),
                ("rose", "Pink"),
            ]),
            secondary_units: words(&["Nana"]),
            container_folders: words(&[
                "portraits", "portrait", "icons", "icon", "ui", "css", "csp", "images", "img",
                "textures", "assets",
            ]),
            noise_words: words(&[
                "a",
                "an",
                "the",
                "and",
                "of",
                "by",
                "for",
                "with",
                "alt",
                "alternate",
                "custom",
                "skin",
                "costume",
                "texture",
                "recolor",
                "color",
                "colour",
                "team",
                "mod",
                "final",
                "new",
                "old",
                "hd",
            ]),
            portrait_keywords: words(&["portrait", "csp", "select"]),
            icon_keywords: words(&["icon", "csi", "stock", "mini"]),
            portrait_base: (136, 188),
            icon_base: 24,
            aspect_tolerance: 0.05,
            widescreen_ratio: 16.0 / 9.0,
            stage_codes: pairs(&[
                ("GrNBa", "Battlefield"),
                ("GrNLa", "Final Destination"),
                ("GrSt", "Yoshi's Story"),
                ("GrIz", "Fountain of Dreams"),
                ("GrOp", "Dream Land"),
                ("GrPs", "Pokemon Stadium"),
                ("GrKg", "Kongo Jungle"),
                ("GrGb", "Great Bay"),
                ("GrSh", "Temple"),
                ("GrZe", "Brinstar"),
                ("GrCn", "Corneria"),
                ("GrVe", "Venom"),
                ("GrMc", "Mute City"),
                ("GrOn", "Onett"),
                ("GrFs", "Flat Zone"),
            ]),
            unknown_color: "Unknown Color".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_code_window() {
        let conv = Conventions::default();
        assert_eq!(
            conv.compound_code_in("PlyCaptain5KRe_Share_joint"),
            None,
            "5K breaks the window before Re"
        );
        assert_eq!(
            conv.compound_code_in("PlCaRe"),
            Some(("Captain Falcon", "Red"))
        );
        assert_eq!(conv.compound_code_in("abc"), None);
    }

    #[test]
    fn test_character_for_symbol_families() {
        let conv = Conventions::default();
        assert_eq!(
            conv.character_for_symbol("PlyCaptain5K_Share_joint"),
            Some(("Captain Falcon", true))
        );
        assert_eq!(
            conv.character_for_symbol("ftDataCaptain"),
            Some(("Captain Falcon", false))
        );
        assert_eq!(conv.character_for_symbol("map_head"), None);
    }

    #[test]
    fn test_direct_color_outranks_alias() {
        let conv = Conventions::default();
        assert_eq!(conv.color_for_word("orange"), Some("Orange"));
        assert!(conv.word_aliases_color("red", "Orange"));
        assert!(conv.is_color_word("purple"));
        assert!(!conv.is_color_word("hero"));
    }

    #[test]
    fn test_serde_round_trip() {
        let conv = Conventions::default();
        let json = serde_json::to_string(&conv).unwrap();
        let back = Conventions::from_json(&json).unwrap();
        assert_eq!(back.character_codes, conv.character_codes);
        assert_eq!(back.portrait_base, conv.portrait_base);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Conventions::from_json("{").unwrap_err();
        assert!(matches!(err, CostumierError::InvalidInput(_)));
    }
}
