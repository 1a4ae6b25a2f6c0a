use crate::model::MatchRecord;
use std::cmp::Ordering;

fn play_in_phase(identifier: &str) -> u8 {
    if identifier.contains("Play-In_Elimination") {
        0
    } else {
        1
    }
}

/// Display order: stage label, qualifying series first, then round, series
/// and game numbers, then Play-In elimination games ahead of qualifiers.
pub fn compare(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    a.stage
        .display_label
        .cmp(&b.stage.display_label)
        .then_with(|| b.is_qualifying_series.cmp(&a.is_qualifying_series))
        .then_with(|| a.round_number.cmp(&b.round_number))
        .then_with(|| a.series_number.cmp(&b.series_number))
        .then_with(|| a.game_number.cmp(&b.game_number))
        .then_with(|| play_in_phase(&a.game_identifier).cmp(&play_in_phase(&b.game_identifier)))
}

/// Stable: records with equal keys keep their encounter order.
pub fn order(records: &mut [MatchRecord]) {
    records.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GameRow, Role};
    use crate::series::{TerminalRule, annotate};
    use crate::stage::StageClassifier;

    fn record(id: &str, player_team: &str) -> MatchRecord {
        let row = GameRow {
            game_identifier: id.to_string(),
            team1_name: "A".to_string(),
            team2_name: "B".to_string(),
            champion_raw: String::new(),
            role: Role::Top,
            player_team_name: player_team.to_string(),
            player_name: String::new(),
            winner_indicator: 1,
            overview_page_name: String::new(),
            mvp_player_name: None,
            team1_kills: None,
            team2_kills: None,
            kills: None,
            deaths: None,
            assists: None,
            runes_raw: None,
            summoner_spells_raw: None,
            match_day: Some(player_team.to_string()),
        };
        let stage = StageClassifier::new().classify(id);
        MatchRecord::new(&row, stage, String::new(), String::new())
    }

    fn ids(records: &[MatchRecord]) -> Vec<&str> {
        records.iter().map(|r| r.game_identifier.as_str()).collect()
    }

    #[test]
    fn stage_label_then_numbers() {
        let mut records = vec![
            record("SF_1_2_1", "A"),
            record("QF_2_1_1", "A"),
            record("QF_1_1_2", "A"),
            record("QF_1_1_1", "A"),
            record("Finals_1_1_1", "A"),
        ];
        annotate(&mut records, TerminalRule::Numeric);
        order(&mut records);

        assert_eq!(
            ids(&records),
            vec!["Finals_1_1_1", "QF_1_1_1", "QF_1_1_2", "QF_2_1_1", "SF_1_2_1"]
        );
    }

    #[test]
    fn qualifying_series_leads_its_stage() {
        let mut records = vec![
            record("Worlds Play-In_1_1_1", "A"),
            record("2024 Worlds Qualifying Series_1", "A"),
        ];
        annotate(&mut records, TerminalRule::Numeric);
        order(&mut records);

        assert_eq!(
            ids(&records),
            vec!["2024 Worlds Qualifying Series_1", "Worlds Play-In_1_1_1"]
        );
    }

    #[test]
    fn elimination_before_qualifiers() {
        let mut records = vec![
            record("Worlds Play-In_Qualifiers_1_1_1", "A"),
            record("Worlds Play-In_Elimination_1_1_1", "A"),
        ];
        annotate(&mut records, TerminalRule::Numeric);
        order(&mut records);

        assert_eq!(
            ids(&records),
            vec!["Worlds Play-In_Elimination_1_1_1", "Worlds Play-In_Qualifiers_1_1_1"]
        );
    }

    #[test]
    fn equal_keys_keep_encounter_order() {
        let mut records = vec![record("QF_1_1_1", "first"), record("QF_1_1_1", "second")];
        annotate(&mut records, TerminalRule::Numeric);
        order(&mut records);

        let days: Vec<_> = records.iter().map(|r| r.match_day.as_deref()).collect();
        assert_eq!(days, vec![Some("first"), Some("second")]);
    }
}
