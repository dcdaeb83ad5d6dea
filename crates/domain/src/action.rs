//! Client-facing map actions.
//!
//! An [`Action`] is a value object: equality is structural over the kind
//! and every typed field (unset fields included), which is what turn
//! finalization uses for deduplication. Unset fields mean "leave
//! unchanged" on the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::map_state::{clamp_buildings, clamp_coverage};

/// The fixed set of action kinds the client understands. The wire names
/// double as the assistant's client-facing tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    HighlightSettlement,
    ZoomToSettlement,
    ApplyFilters,
    ShowBuildingPoints,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::HighlightSettlement,
        ActionKind::ZoomToSettlement,
        ActionKind::ApplyFilters,
        ActionKind::ShowBuildingPoints,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::HighlightSettlement => "highlight_settlement",
            ActionKind::ZoomToSettlement => "zoom_to_settlement",
            ActionKind::ApplyFilters => "apply_filters",
            ActionKind::ShowBuildingPoints => "show_building_points",
        }
    }

    /// Map a tool name to a client-facing kind. `None` for service-internal
    /// tools such as `search_documents`.
    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default)]
    pub settlement: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub size_eligible_only: Option<bool>,
    #[serde(default)]
    pub building_type: Option<String>,
    #[serde(default)]
    pub storey_tier: Option<String>,
    /// Clamped to `[0.1, 60.0]`.
    #[serde(default)]
    pub min_coverage: Option<f64>,
    /// Clamped to `[0, 50]`.
    #[serde(default)]
    pub min_buildings: Option<u32>,
}

impl Action {
    /// An action of `kind` with every field unset.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            settlement: None,
            visible: None,
            size_eligible_only: None,
            building_type: None,
            storey_tier: None,
            min_coverage: None,
            min_buildings: None,
        }
    }

    pub fn show_points(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Self::new(ActionKind::ShowBuildingPoints)
        }
    }

    pub fn min_coverage(value: f64) -> Self {
        Self {
            min_coverage: Some(clamp_coverage(value)),
            ..Self::new(ActionKind::ApplyFilters)
        }
    }

    pub fn min_buildings(value: u64) -> Self {
        Self {
            min_buildings: Some(clamp_buildings(value)),
            ..Self::new(ActionKind::ApplyFilters)
        }
    }

    pub fn size_eligible_only(on: bool) -> Self {
        Self {
            size_eligible_only: Some(on),
            ..Self::new(ActionKind::ApplyFilters)
        }
    }

    /// Materialize a tool call's argument bag as an action.
    ///
    /// Numbers and booleans sent as strings (`"20"`, `"true"`) are coerced.
    /// Anything else of the wrong JSON type leaves the field unset rather
    /// than failing the call; numeric sliders are clamped.
    pub fn from_tool_arguments(kind: ActionKind, args: &Value) -> Self {
        let str_arg = |key: &str| args.get(key).and_then(Value::as_str).map(String::from);
        let bool_arg = |key: &str| args.get(key).and_then(coerce_bool);

        let min_buildings = args.get("min_buildings").and_then(|v| {
            coerce_u64(v).or_else(|| coerce_f64(v).map(|f| if f <= 0.0 { 0 } else { f.round() as u64 }))
        });

        Self {
            kind,
            settlement: str_arg("settlement"),
            visible: bool_arg("visible"),
            size_eligible_only: bool_arg("size_eligible_only"),
            building_type: str_arg("building_type"),
            storey_tier: str_arg("storey_tier"),
            min_coverage: args
                .get("min_coverage")
                .and_then(coerce_f64)
                .map(clamp_coverage),
            min_buildings: min_buildings.map(clamp_buildings),
        }
    }
}

fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn coerce_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Drop later structural duplicates, keeping first-seen order.
pub fn dedupe(actions: Vec<Action>) -> Vec<Action> {
    let mut out: Vec<Action> = Vec::with_capacity(actions.len());
    for action in actions {
        if !out.contains(&action) {
            out.push(action);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_round_trips_tool_names() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_tool_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ActionKind::from_tool_name("search_documents"), None);
    }

    #[test]
    fn serializes_with_type_tag_and_nulls() {
        let v = serde_json::to_value(Action::min_coverage(25.0)).unwrap();
        assert_eq!(v["type"], "apply_filters");
        assert_eq!(v["min_coverage"], 25.0);
        assert!(v["settlement"].is_null());
    }

    #[test]
    fn tool_arguments_are_clamped() {
        let a = Action::from_tool_arguments(
            ActionKind::ApplyFilters,
            &json!({"min_coverage": 99, "min_buildings": -3, "storey_tier": "low"}),
        );
        assert_eq!(a.min_coverage, Some(60.0));
        assert_eq!(a.min_buildings, Some(0));
        assert_eq!(a.storey_tier.as_deref(), Some("low"));
    }

    #[test]
    fn wrong_typed_arguments_are_ignored() {
        let a = Action::from_tool_arguments(
            ActionKind::ShowBuildingPoints,
            &json!({"visible": "sometimes", "extra": 1}),
        );
        assert_eq!(a, Action::new(ActionKind::ShowBuildingPoints));

        let a = Action::from_tool_arguments(
            ActionKind::ApplyFilters,
            &json!({"min_coverage": [20], "size_eligible_only": {"on": true}, "settlement": 3}),
        );
        assert_eq!(a, Action::new(ActionKind::ApplyFilters));
    }

    #[test]
    fn stringly_typed_arguments_are_coerced() {
        let a = Action::from_tool_arguments(
            ActionKind::ApplyFilters,
            &json!({
                "min_coverage": "20",
                "min_buildings": " 7 ",
                "size_eligible_only": "True",
            }),
        );
        assert_eq!(a.min_coverage, Some(20.0));
        assert_eq!(a.min_buildings, Some(7));
        assert_eq!(a.size_eligible_only, Some(true));

        let a = Action::from_tool_arguments(ActionKind::ShowBuildingPoints, &json!({"visible": "false"}));
        assert_eq!(a.visible, Some(false));

        let a = Action::from_tool_arguments(ActionKind::ApplyFilters, &json!({"min_coverage": "95.5"}));
        assert_eq!(a.min_coverage, Some(60.0));
    }

    #[test]
    fn float_building_counts_round() {
        let a = Action::from_tool_arguments(ActionKind::ApplyFilters, &json!({"min_buildings": 9.6}));
        assert_eq!(a.min_buildings, Some(10));
    }

    #[test]
    fn dedupe_is_structural_and_order_preserving() {
        let from_json: Action = serde_json::from_str(
            r#"{"min_coverage": 20.0, "type": "apply_filters"}"#,
        )
        .unwrap();
        let actions = vec![
            Action::show_points(true),
            Action::min_coverage(20.0),
            Action::show_points(true),
            from_json,
            Action::show_points(false),
        ];
        let out = dedupe(actions);
        assert_eq!(
            out,
            vec![
                Action::show_points(true),
                Action::min_coverage(20.0),
                Action::show_points(false),
            ]
        );
    }

    #[test]
    fn unset_and_set_fields_differ() {
        let mut a = Action::size_eligible_only(false);
        assert_ne!(a, Action::new(ActionKind::ApplyFilters));
        a.size_eligible_only = None;
        assert_eq!(a, Action::new(ActionKind::ApplyFilters));
    }
}
