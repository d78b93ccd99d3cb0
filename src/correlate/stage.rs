//! The stage correlation engine.
//!
//! A simpler sibling of the costume engine: no folder promotion and no
//! consuming/non-consuming split. A screenshot is globally exclusive the
//! moment it is assigned; it leaves every later candidate pool immediately.

use std::collections::HashMap;

use tracing::debug;

use crate::conventions::Conventions;
use crate::core::image::ScreenshotRecord;
use crate::core::match_result::StageMatchResult;
use crate::core::stage::StageRecord;

/// Pair every stage descriptor with at most one preview screenshot.
///
/// Four tiers per stage, first hit wins: exact stem match, short code inside
/// the screenshot filename (same folder preferred), sole stage descriptor in
/// a folder, sole stage descriptor in the archive. When several screenshots
/// remain in tiers 2 and 3 the one with the aspect ratio closest to the
/// widescreen target wins.
pub fn correlate_stages(
    stages: &[StageRecord],
    screenshots: &[ScreenshotRecord],
    conv: &Conventions,
) -> StageMatchResult {
    let mut folder_counts: HashMap<&str, usize> = HashMap::new();
    for stage in stages {
        *folder_counts.entry(stage.folder()).or_insert(0) += 1;
    }

    let mut result = StageMatchResult::new();
    let mut available: Vec<usize> = (0..screenshots.len()).collect();

    for stage in stages {
        result.insert(stage.identity.clone(), None);
    }

    for stage in stages {
        let pick = tier_exact_stem(stage, screenshots, &available)
            .or_else(|| tier_code_in_name(stage, screenshots, &available))
            .or_else(|| tier_sole_in_folder(stage, screenshots, &available, &folder_counts, conv))
            .or_else(|| tier_sole_in_archive(stages, screenshots, &available, conv));
        let Some(i) = pick else { continue };
        debug!(stage = %stage.identity, screenshot = %screenshots[i].identity, "stage matched");
        result.insert(stage.identity.clone(), Some(screenshots[i].identity.clone()));
        available.retain(|&j| j != i);
    }

    result
}

/// Tier 0: screenshot name key equals the stage stem.
fn tier_exact_stem(
    stage: &StageRecord,
    shots: &[ScreenshotRecord],
    available: &[usize],
) -> Option<usize> {
    let stem = stage.stem();
    available.iter().copied().find(|&i| shots[i].name_key == stem)
}

/// Tier 1: the stage's short code appears inside the screenshot filename,
/// preferring a screenshot from the stage's own folder.
fn tier_code_in_name(
    stage: &StageRecord,
    shots: &[ScreenshotRecord],
    available: &[usize],
) -> Option<usize> {
    let code = stage.code.as_deref()?.to_ascii_lowercase();
    let hits: Vec<usize> = available
        .iter()
        .copied()
        .filter(|&i| {
            crate::text::file_name(&shots[i].identity)
                .to_ascii_lowercase()
                .contains(&code)
        })
        .collect();
    hits.iter()
        .copied()
        .find(|&i| shots[i].folder == stage.folder())
        .or_else(|| hits.first().copied())
}

/// Tier 2: the stage is the only stage descriptor in its folder; remaining
/// screenshots of that folder are candidates.
fn tier_sole_in_folder(
    stage: &StageRecord,
    shots: &[ScreenshotRecord],
    available: &[usize],
    folder_counts: &HashMap<&str, usize>,
    conv: &Conventions,
) -> Option<usize> {
    if folder_counts.get(stage.folder()).copied().unwrap_or(0) != 1 {
        return None;
    }
    let candidates: Vec<usize> = available
        .iter()
        .copied()
        .filter(|&i| shots[i].folder == stage.folder())
        .collect();
    closest_to_widescreen(&candidates, shots, conv)
}

/// Tier 3: the archive holds exactly one stage descriptor; every remaining
/// screenshot is a candidate.
fn tier_sole_in_archive(
    stages: &[StageRecord],
    shots: &[ScreenshotRecord],
    available: &[usize],
    conv: &Conventions,
) -> Option<usize> {
    if stages.len() != 1 {
        return None;
    }
    closest_to_widescreen(available, shots, conv)
}

/// Candidate whose aspect ratio is closest to the widescreen target; earlier
/// candidates win exact distance ties for determinism.
fn closest_to_widescreen(
    candidates: &[usize],
    shots: &[ScreenshotRecord],
    conv: &Conventions,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &i in candidates {
        let distance = (shots[i].aspect() - conv.widescreen_ratio).abs();
        if best.map(|(_, d)| distance < d).unwrap_or(true) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i)
}
