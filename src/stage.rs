use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static MAIN_EVENT_ROUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"main[\s_]*event.*?[^a-z]round[\s_]*(\d+)").expect("valid round pattern"));
static MAIN_EVENT_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"main[\s_]*event.*?[^a-z]day[\s_]*(\d+)").expect("valid day pattern"));

const QUALIFYING_SERIES: &str = "worlds qualifying series";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StageKind {
    PlayIn,
    PlayInTiebreaker,
    MainEventTiebreaker,
    MainEventRound,
    MainEventDay,
    QuarterFinals,
    SemiFinals,
    Finals,
    Unknown,
}

impl StageKind {
    /// Elimination stages whose deciding game gets highlighted.
    pub fn is_elimination(self) -> bool {
        matches!(
            self,
            StageKind::QuarterFinals | StageKind::SemiFinals | StageKind::Finals
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageClassification {
    pub kind: StageKind,
    pub sub_format: Option<String>,
    pub ordinal: Option<u32>,
    pub display_label: String,
}

impl StageClassification {
    fn simple(kind: StageKind, label: &str) -> Self {
        Self {
            kind,
            sub_format: None,
            ordinal: None,
            display_label: label.to_string(),
        }
    }

    fn tiebreaker(kind: StageKind, label: &str) -> Self {
        Self {
            kind,
            sub_format: Some("Tiebreaker".to_string()),
            ordinal: None,
            display_label: label.to_string(),
        }
    }

    fn numbered(kind: StageKind, sub_format: &str, ordinal: u32) -> Self {
        Self {
            kind,
            sub_format: Some(sub_format.to_string()),
            ordinal: Some(ordinal),
            display_label: format!("MainEvent {} {}", sub_format, ordinal),
        }
    }

    pub fn unknown() -> Self {
        Self::simple(StageKind::Unknown, "Unknown")
    }
}

/// A classification rule sees the lowercased identifier and either claims it or passes.
type Rule = fn(&str) -> Option<StageClassification>;

/// Evaluated top to bottom, first match wins.
const RULES: &[(&str, Rule)] = &[
    ("qualifying-series", qualifying_series),
    ("tiebreaker", tiebreaker),
    ("play-in", play_in),
    ("main-event-round", main_event_round),
    ("main-event-day", main_event_day),
    ("bracket", bracket),
];

fn is_play_in(id: &str) -> bool {
    id.contains("play-in") || id.contains("playin")
}

fn has_token(id: &str, token: &str) -> bool {
    id.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|part| part == token)
}

fn qualifying_series(id: &str) -> Option<StageClassification> {
    id.contains(QUALIFYING_SERIES)
        .then(|| StageClassification::simple(StageKind::PlayIn, "PlayIn"))
}

fn tiebreaker(id: &str) -> Option<StageClassification> {
    if !id.contains("tiebreaker") {
        return None;
    }

    Some(if is_play_in(id) {
        StageClassification::tiebreaker(StageKind::PlayInTiebreaker, "PlayIn Tiebreaker")
    } else {
        StageClassification::tiebreaker(StageKind::MainEventTiebreaker, "MainEvent Tiebreaker")
    })
}

fn play_in(id: &str) -> Option<StageClassification> {
    is_play_in(id).then(|| StageClassification::simple(StageKind::PlayIn, "PlayIn"))
}

fn main_event_round(id: &str) -> Option<StageClassification> {
    let ordinal = MAIN_EVENT_ROUND.captures(id)?.get(1)?.as_str().parse().ok()?;
    Some(StageClassification::numbered(
        StageKind::MainEventRound,
        "Round",
        ordinal,
    ))
}

fn main_event_day(id: &str) -> Option<StageClassification> {
    let ordinal = MAIN_EVENT_DAY.captures(id)?.get(1)?.as_str().parse().ok()?;
    Some(StageClassification::numbered(
        StageKind::MainEventDay,
        "Day",
        ordinal,
    ))
}

fn bracket(id: &str) -> Option<StageClassification> {
    if id.contains("quarter") || has_token(id, "qf") {
        return Some(StageClassification::simple(
            StageKind::QuarterFinals,
            "QuarterFinals",
        ));
    }
    if id.contains("semi") || has_token(id, "sf") {
        return Some(StageClassification::simple(
            StageKind::SemiFinals,
            "SemiFinals",
        ));
    }
    finals(id)
}

/// "final" also appears inside "quarterfinal" and "semifinal"; those never count.
fn finals(id: &str) -> Option<StageClassification> {
    if !id.contains("final") || id.contains("quarter") || id.contains("semi") {
        return None;
    }
    Some(StageClassification::simple(StageKind::Finals, "Finals"))
}

/// Whether a game identifier belongs to the pre-bracket qualifying series.
pub fn is_qualifying_series(identifier: &str) -> bool {
    identifier.to_lowercase().contains(QUALIFYING_SERIES)
}

/// Maps game identifiers to stages, memoizing by lowercased identifier.
///
/// One instance per aggregation pass; call [`StageClassifier::reset`] before
/// reusing an instance for unrelated data.
#[derive(Debug, Default)]
pub struct StageClassifier {
    cache: HashMap<String, StageClassification>,
    seen_labels: HashSet<String>,
}

impl StageClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&mut self, identifier: &str) -> StageClassification {
        let key = identifier.to_lowercase();
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let (rule, classification) = RULES
            .iter()
            .find_map(|(name, rule)| rule(&key).map(|c| (*name, c)))
            .unwrap_or(("fallback", StageClassification::unknown()));

        if self.seen_labels.insert(classification.display_label.clone()) {
            tracing::debug!(
                label = %classification.display_label,
                rule,
                identifier,
                "new stage label"
            );
        }

        self.cache.insert(key, classification.clone());
        classification
    }

    pub fn seen_labels(&self) -> &HashSet<String> {
        &self.seen_labels
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn reset(&mut self) {
        self.cache.clear();
        self.seen_labels.clear();
    }
}
