//! Costumier: deterministic correlation of costume descriptors with their
//! portrait and icon images inside a game-asset archive.
//!
//! The crate is a pure, synchronous library: the caller reads the archive,
//! hands over descriptor bytes and image dimensions, and receives a
//! [`core::match_result::MatchResult`] mapping every playable costume
//! descriptor to at most one portrait and one icon. A sibling engine pairs
//! stage descriptors with preview screenshots. All naming conventions and
//! lookup tables are injected through [`conventions::Conventions`], so a new
//! title only needs new tables, never new engine logic.

/// Image typing and per-archive image indices.
pub mod classify;
/// Injected lookup tables and tuning constants.
pub mod conventions;
/// Core data types shared by the parser, classifier, and engines.
pub mod core;
/// The costume and stage correlation engines.
pub mod correlate;
/// Error types.
pub mod error;
/// Tracing initialization.
pub mod logging;
/// Binary descriptor container parser.
pub mod parser;
/// Filename tokenization helpers.
pub mod text;

pub use crate::classify::{classify_image, probe_dimensions, ImageIndex};
pub use crate::conventions::Conventions;
pub use crate::core::descriptor::DescriptorRecord;
pub use crate::core::image::{ImageRecord, ImageType, ScreenshotRecord};
pub use crate::core::match_result::{CostumeMatch, MatchResult, StageMatchResult};
pub use crate::core::stage::StageRecord;
pub use crate::correlate::stage::correlate_stages;
pub use crate::correlate::CostumeCorrelator;
pub use crate::error::{CostumierError, Result};
pub use crate::parser::{parse_descriptor, parse_stage};
