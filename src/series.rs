use crate::model::MatchRecord;
use crate::stage::is_qualifying_series;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

/// How the deciding game of a series is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerminalRule {
    /// Greatest identifier by plain string comparison.
    Lexicographic,
    /// Greatest (round, series, game) triplet, identifier string on ties.
    #[default]
    Numeric,
}

impl FromStr for TerminalRule {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "lexicographic" | "lex" => Ok(TerminalRule::Lexicographic),
            "numeric" => Ok(TerminalRule::Numeric),
            other => Err(format!(
                "Unsupported terminal rule '{}'. Supported rules: lexicographic, numeric.",
                other
            )),
        }
    }
}

impl TerminalRule {
    fn compare(self, a: &MatchRecord, b: &MatchRecord) -> Ordering {
        match self {
            TerminalRule::Lexicographic => a.game_identifier.cmp(&b.game_identifier),
            TerminalRule::Numeric => (a.round_number, a.series_number, a.game_number)
                .cmp(&(b.round_number, b.series_number, b.game_number))
                .then_with(|| a.game_identifier.cmp(&b.game_identifier)),
        }
    }
}

/// "A vs B" with the two names in sorted order, so both pairings share a key.
pub fn match_group_key(team1: &str, team2: &str) -> String {
    let (first, second) = if team1 <= team2 {
        (team1, team2)
    } else {
        (team2, team1)
    };
    format!("{} vs {}", first, second)
}

pub fn series_id(identifier: &str) -> &str {
    identifier.split('_').next().unwrap_or(identifier)
}

/// The last three `_`-separated tokens as (round, series, game); zeros when
/// they are missing or not all numeric.
pub fn parse_triplet(identifier: &str) -> (u32, u32, u32) {
    let tokens: Vec<&str> = identifier.split('_').collect();
    if tokens.len() < 3 {
        return (0, 0, 0);
    }

    let tail = &tokens[tokens.len() - 3..];
    match (
        tail[0].trim().parse(),
        tail[1].trim().parse(),
        tail[2].trim().parse(),
    ) {
        (Ok(round), Ok(series), Ok(game)) => (round, series, game),
        _ => (0, 0, 0),
    }
}

/// Annotates every record with its series fields. Must run after all rows are
/// folded: whether a game is the last of its series depends on every game
/// sharing its group.
pub fn annotate(records: &mut [MatchRecord], rule: TerminalRule) {
    for record in records.iter_mut() {
        record.match_group_key = match_group_key(&record.team1_name, &record.team2_name);
        record.series_id = series_id(&record.game_identifier).to_string();
        record.is_qualifying_series = is_qualifying_series(&record.game_identifier);

        let (round, series, game) = if record.is_qualifying_series {
            (0, 0, 0)
        } else {
            parse_triplet(&record.game_identifier)
        };
        record.round_number = round;
        record.series_number = series;
        record.game_number = game;
    }

    let mut terminal: HashMap<(String, String), usize> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        let key = (record.match_group_key.clone(), record.series_id.clone());
        terminal
            .entry(key)
            .and_modify(|current| {
                if rule.compare(record, &records[*current]) == Ordering::Greater {
                    *current = idx;
                }
            })
            .or_insert(idx);
    }

    for record in records.iter_mut() {
        record.is_last_game_in_group = false;
        record.use_decisive_treatment = false;
    }
    for idx in terminal.into_values() {
        let record = &mut records[idx];
        record.is_last_game_in_group = true;
        record.use_decisive_treatment = record.stage.kind.is_elimination();
    }

    tracing::debug!(records = records.len(), "annotated series");
}
