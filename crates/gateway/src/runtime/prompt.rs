//! Prompt enrichment for remote turns.

use gm_domain::map_state::{MapState, MIN_BUILDINGS_FLOOR, MIN_COVERAGE_FLOOR};
use gm_domain::ActionKind;

/// Tool-combination directives sent with every remote turn.
pub const TOOL_RULES: &str = "[TOOL RULES: \
1. ALWAYS call search_documents FIRST for any grant, eligibility, or policy question - prefer RAG info over general knowledge. \
2. To show eligible buildings, call BOTH show_building_points(visible=true) AND apply_filters(size_eligible_only=true). \
3. To show buildings of a specific type, call show_building_points AND apply_filters with the type. \
4. To adjust the area coverage slider, call apply_filters(min_coverage=<value>) with a value from 0.1 to 60. \
5. To adjust the min buildings per cell slider, call apply_filters(min_buildings=<value>) with an integer from 0 to 50. \
6. Be LIBERAL with tool calls - if your answer mentions a settlement, highlight and zoom to it. \
If your answer discusses filters, apply them. Call multiple tools in a single response. \
7. Always call apply_filters when the user asks about filtering, eligibility, sliders, coverage, density, or building criteria.]";

/// Terse `key=value` annotations for every non-default map-state field.
pub fn map_state_annotations(ms: &MapState) -> Vec<String> {
    let mut parts = Vec::new();
    if !ms.settlement.is_empty() {
        parts.push(format!("selected_settlement={}", ms.settlement));
    }
    if ms.size_eligible_only {
        parts.push("size_eligible_filter=ON".to_string());
    }
    if !ms.building_type.is_empty() {
        parts.push(format!("building_type_filter={}", ms.building_type));
    }
    if !ms.storey_tier.is_empty() {
        parts.push(format!("storey_tier_filter={}", ms.storey_tier));
    }
    if ms.min_coverage != MIN_COVERAGE_FLOOR {
        parts.push(format!("min_coverage={}", ms.min_coverage));
    }
    if ms.min_buildings != MIN_BUILDINGS_FLOOR {
        parts.push(format!("min_buildings={}", ms.min_buildings));
    }
    if ms.show_buildings {
        parts.push("building_points=visible".to_string());
    }
    parts
}

/// Map-state context, tool rules, a blank line, then the raw utterance.
pub fn build_enriched_prompt(ms: &MapState, utterance: &str) -> String {
    let annotations = map_state_annotations(ms);
    let map_ctx = if annotations.is_empty() {
        String::new()
    } else {
        format!("[Current map state: {}]\n", annotations.join(", "))
    };
    format!("{map_ctx}{TOOL_RULES}\n\n{utterance}")
}

/// The constrained prompt used when resubmitting on a fresh thread after a
/// failed or corrupted run.
pub fn build_recovery_prompt(enriched: &str) -> String {
    let tools: Vec<&str> = ActionKind::ALL.iter().map(|k| k.as_str()).collect();
    format!(
        "[IMPORTANT: Do NOT call search_documents. Answer using your system prompt knowledge only. \
         Use only these tools: {}.]\n\n{enriched}",
        tools.join(", ")
    )
}
