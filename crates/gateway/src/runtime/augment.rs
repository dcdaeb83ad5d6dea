//! Deterministic action injection after the round loop.
//!
//! The assistant regularly calls `show_building_points` but forgets the
//! matching `apply_filters`, or drops slider values the user spelled out.
//! Those gaps are filled from the utterance itself.

use gm_domain::action::dedupe;
use gm_domain::{Action, ActionKind};

use super::intent::{detect_numeric, SliderField};

/// Phrases asking to include ineligible buildings.
pub const BROADEN_KEYWORDS: [&str; 7] = [
    "ineligible",
    "all buildings",
    "show all",
    "include ineligible",
    "as well",
    "both eligible and",
    "eligible and ineligible",
];

/// Phrases asking about grant eligibility.
pub const ELIGIBILITY_KEYWORDS: [&str; 6] = [
    "eligible",
    "grant",
    "qualify",
    "qualifying",
    "eligib",
    "size_eligible",
];

pub fn wants_broaden(msg_lower: &str) -> bool {
    BROADEN_KEYWORDS.iter().any(|kw| msg_lower.contains(kw))
}

pub fn wants_eligible_only(msg_lower: &str) -> bool {
    ELIGIBILITY_KEYWORDS.iter().any(|kw| msg_lower.contains(kw)) && !msg_lower.contains("ineligible")
}

/// Inject slider values and the eligibility filter, then dedupe.
///
/// Injected actions are appended; assistant-supplied actions are never
/// removed or reordered.
pub fn augment(utterance: &str, mut actions: Vec<Action>) -> Vec<Action> {
    let msg = utterance.to_lowercase();

    let has_show = actions.iter().any(|a| a.kind == ActionKind::ShowBuildingPoints);
    let has_filters = actions.iter().any(|a| a.kind == ActionKind::ApplyFilters);
    let set_coverage = actions.iter().any(|a| a.min_coverage.is_some());
    let set_buildings = actions.iter().any(|a| a.min_buildings.is_some());

    for (field, action, _) in detect_numeric(&msg) {
        let already = match field {
            SliderField::MinCoverage => set_coverage,
            SliderField::MinBuildings => set_buildings,
        };
        if !already {
            tracing::info!(?field, "injecting slider value from utterance");
            actions.push(action);
        }
    }

    if wants_broaden(&msg) {
        tracing::info!("injecting size_eligible_only=false for show-all query");
        actions.push(Action::size_eligible_only(false));
    } else if has_show && !has_filters && wants_eligible_only(&msg) {
        tracing::info!("injecting size_eligible_only=true for eligibility query");
        actions.push(Action::size_eligible_only(true));
    }

    dedupe(actions)
}
