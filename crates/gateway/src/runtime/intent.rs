//! Local intent resolution.
//!
//! Purely mechanical slider / layer commands ("set coverage to 25%",
//! "hide building points") are answered here without touching the
//! assistant service. Each matching command contributes one [`Action`] and
//! one reply fragment; fragments are joined in detection order.

use std::sync::LazyLock;

use gm_domain::Action;
use regex::Regex;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pattern table
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which slider a numeric command drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderField {
    MinCoverage,
    MinBuildings,
}

/// A numeric slider command: the first capture group holds the value.
pub struct NumericCommand {
    pub field: SliderField,
    pub pattern: Regex,
}

impl NumericCommand {
    /// Parse the first match in `msg` (already lower-cased) into a clamped
    /// action plus its reply fragment.
    pub fn detect(&self, msg: &str) -> Option<(Action, String)> {
        let raw = self.pattern.captures(msg)?.get(1)?.as_str();
        match self.field {
            SliderField::MinCoverage => {
                let action = Action::min_coverage(raw.parse::<f64>().ok()?);
                let v = action.min_coverage?;
                Some((action, format!("Minimum area coverage set to **{v}%**.")))
            }
            SliderField::MinBuildings => {
                // Digit strings too long for u64 still mean "a lot".
                let action = Action::min_buildings(raw.parse::<u64>().unwrap_or(u64::MAX));
                let v = action.min_buildings?;
                Some((action, format!("Minimum buildings per cell set to **{v}**.")))
            }
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("intent pattern table must compile")
}

/// Slider commands, in detection order.
pub static NUMERIC_COMMANDS: LazyLock<[NumericCommand; 2]> = LazyLock::new(|| {
    [
        NumericCommand {
            field: SliderField::MinCoverage,
            pattern: compile(r"(?:area\s+)?coverage\s*(?:of|to|at|=|slider\s+to|:)?\s*(\d+(?:\.\d+)?)\s*%?"),
        },
        NumericCommand {
            field: SliderField::MinBuildings,
            pattern: compile(
                r"(?:min(?:imum)?\s+)?buildings?\s*(?:per\s+cell)?\s*(?:of|to|at|=|slider\s+to|:)?\s*(\d+)",
            ),
        },
    ]
});

static SHOW_POINTS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(show|display|turn on|enable)\b.*\bbuilding\s*points?\b"));

static HIDE_POINTS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(hide|remove|turn off|disable)\b.*\bbuilding\s*points?\b"));

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A turn answered without the assistant service.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalReply {
    pub message: String,
    pub actions: Vec<Action>,
}

/// Scan the numeric slider table only. Used by the augmenter as well.
pub fn detect_numeric(msg_lower: &str) -> Vec<(SliderField, Action, String)> {
    NUMERIC_COMMANDS
        .iter()
        .filter_map(|cmd| {
            cmd.detect(msg_lower)
                .map(|(action, fragment)| (cmd.field, action, fragment))
        })
        .collect()
}

/// Try to answer `utterance` locally. `None` means the turn must go to the
/// assistant service.
pub fn resolve_local(utterance: &str) -> Option<LocalReply> {
    let msg = utterance.trim().to_lowercase();

    let mut actions = Vec::new();
    let mut fragments = Vec::new();

    for (_, action, fragment) in detect_numeric(&msg) {
        actions.push(action);
        fragments.push(fragment);
    }

    // Show wins when both phrasings appear.
    if SHOW_POINTS.is_match(&msg) {
        actions.push(Action::show_points(true));
        fragments.push("Building points layer is now **visible**.".to_string());
    } else if HIDE_POINTS.is_match(&msg) {
        actions.push(Action::show_points(false));
        fragments.push("Building points layer is now **hidden**.".to_string());
    }

    if actions.is_empty() {
        return None;
    }
    Some(LocalReply {
        message: fragments.join(" "),
        actions,
    })
}
