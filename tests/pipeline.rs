use std::cell::RefCell;
use std::fs;
use worlds_results::error::SourceError;
use worlds_results::export;
use worlds_results::images::{ImageLookup, ImageStores, NoImages};
use worlds_results::model::{GameRow, ROLE_ORDER, Role, Side};
use worlds_results::pipeline::{self, PipelineOptions};
use worlds_results::series::TerminalRule;
use worlds_results::source::{MatchSource, TournamentFilter};
use worlds_results::stage::StageKind;

struct MemorySource(Vec<GameRow>);

impl MatchSource for MemorySource {
    fn fetch_rows(&self, _filter: &TournamentFilter) -> Result<Vec<GameRow>, SourceError> {
        Ok(self.0.clone())
    }
}

struct FailingSource;

impl MatchSource for FailingSource {
    fn fetch_rows(&self, _filter: &TournamentFilter) -> Result<Vec<GameRow>, SourceError> {
        Err(SourceError::Config("wiki unreachable".to_string()))
    }
}

#[derive(Default)]
struct RecordingLookup {
    players: RefCell<Vec<String>>,
}

impl ImageLookup for RecordingLookup {
    fn player_image(&self, player_link: &str) -> Result<Option<String>, SourceError> {
        self.players.borrow_mut().push(player_link.to_string());
        Ok(Some(format!("https://img/{}.png", player_link)))
    }

    fn team_image(&self, team_name: &str) -> Result<Option<String>, SourceError> {
        if team_name == "T1" {
            Ok(Some("https://img/t1.png".to_string()))
        } else {
            Err(SourceError::Config("no logo".to_string()))
        }
    }
}

fn game(id: &str, team1: &str, team2: &str, winner: u8) -> Vec<GameRow> {
    let mut rows = Vec::new();
    for (team, prefix) in [(team1, "a"), (team2, "b")] {
        for (i, role) in ROLE_ORDER.iter().enumerate() {
            let player = format!("{}-{}{}", team, prefix, i);
            rows.push(GameRow {
                game_identifier: id.to_string(),
                team1_name: team1.to_string(),
                team2_name: team2.to_string(),
                champion_raw: "Kai'Sa".to_string(),
                role: *role,
                player_team_name: team.to_string(),
                player_name: player.clone(),
                winner_indicator: winner,
                overview_page_name: player,
                mvp_player_name: Some(format!("{}-a2", team1)),
                team1_kills: Some(15),
                team2_kills: Some(9),
                kills: Some(i as u32),
                deaths: None,
                assists: Some(2),
                runes_raw: Some("Conqueror,Triumph".to_string()),
                summoner_spells_raw: Some("Flash,Teleport".to_string()),
                match_day: None,
            });
        }
    }
    rows
}

fn tournament() -> Vec<GameRow> {
    let mut rows = Vec::new();
    rows.extend(game("2024 Worlds Main Event Semifinals_1_1_2", "T1", "Gen.G", 1));
    rows.extend(game("2024 Worlds Main Event Quarterfinals_1_2_1", "BLG", "T1", 2));
    rows.extend(game("2024 Worlds Main Event Semifinals_1_1_1", "Gen.G", "T1", 1));
    rows.extend(game("2024 Worlds Main Event Round 1_1_1_1", "HLE", "T1", 2));
    rows.extend(game("2024 Worlds Qualifying Series_1", "PSG", "MDK", 1));
    rows
}

#[test]
fn full_pass_orders_and_annotates() {
    let source = MemorySource(tournament());
    let lookup = RecordingLookup::default();
    let mut images = ImageStores::default();

    let matches = pipeline::run(
        &source,
        &TournamentFilter::new("2024 Season World Championship"),
        &PipelineOptions::default(),
        &mut images,
        &lookup,
    );

    let order: Vec<_> = matches.iter().map(|m| m.game_identifier.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "2024 Worlds Main Event Round 1_1_1_1",
            "2024 Worlds Qualifying Series_1",
            "2024 Worlds Main Event Quarterfinals_1_2_1",
            "2024 Worlds Main Event Semifinals_1_1_1",
            "2024 Worlds Main Event Semifinals_1_1_2",
        ]
    );

    let semis: Vec<_> = matches
        .iter()
        .filter(|m| m.stage.kind == StageKind::SemiFinals)
        .collect();
    assert_eq!(semis.len(), 2);
    assert!(semis.iter().all(|m| m.match_group_key == "Gen.G vs T1"));
    assert!(!semis[0].is_last_game_in_group);
    assert!(semis[1].is_last_game_in_group && semis[1].use_decisive_treatment);

    let round = &matches[0];
    assert_eq!(round.stage.kind, StageKind::MainEventRound);
    assert!(round.is_last_game_in_group);
    assert!(!round.use_decisive_treatment);

    let qualifying = &matches[1];
    assert!(qualifying.is_qualifying_series);
    assert_eq!(qualifying.stage.display_label, "PlayIn");

    for m in &matches {
        assert_eq!(m.players(Side::Team1).len(), 5);
        assert_eq!(m.players(Side::Team2).len(), 5);
    }

    let mvp = &matches[3].players(Side::Team1)[&Role::Mid];
    assert!(mvp.is_mvp);
    assert_eq!(mvp.image_path, format!("https://img/{}.png", mvp.display_name));

    // T1 has a logo, Gen.G's lookup fails and degrades to an empty path.
    let quarter = &matches[2];
    assert_eq!(quarter.team2_image_path, "https://img/t1.png");
    assert_eq!(quarter.team1_image_path, "");
    assert_eq!(quarter.winning_team_name, "T1");

    // 5 games, 10 players each, T1 players reused across games.
    let looked_up = lookup.players.borrow();
    let mut unique = looked_up.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(looked_up.len(), unique.len());
}

#[test]
fn failing_source_renders_nothing() {
    let mut images = ImageStores::default();
    let matches = pipeline::run(
        &FailingSource,
        &TournamentFilter::new("2024 Season World Championship"),
        &PipelineOptions::default(),
        &mut images,
        &NoImages,
    );
    assert!(matches.is_empty());
}

#[test]
fn lexicographic_rule_is_available() {
    let mut rows = Vec::new();
    rows.extend(game("SF_1_1_9", "T1", "Gen.G", 1));
    rows.extend(game("SF_1_1_10", "T1", "Gen.G", 2));

    let options = PipelineOptions {
        terminal_rule: TerminalRule::Lexicographic,
        ..PipelineOptions::default()
    };
    let mut images = ImageStores::default();
    let matches = pipeline::aggregate(rows, &options, &mut images, &NoImages);

    let last: Vec<_> = matches
        .iter()
        .filter(|m| m.is_last_game_in_group)
        .map(|m| m.game_identifier.as_str())
        .collect();
    assert_eq!(last, vec!["SF_1_1_9"]);
}

#[test]
fn exports_page_json_and_player_summary() {
    let mut images = ImageStores::default();
    let matches = pipeline::aggregate(
        game("QF_1_1_1", "T1", "Gen.G", 1),
        &PipelineOptions::default(),
        &mut images,
        &NoImages,
    );

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("out/results.json");
    let csv_path = dir.path().join("out/players.csv");
    export::write_page_json(&matches, &json_path).unwrap();
    export::write_player_summary(&matches, &csv_path).unwrap();

    let payload: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(
        payload["role_order"],
        serde_json::json!(["Top", "Jungle", "Mid", "Bot", "Support"])
    );
    assert_eq!(payload["matches"][0]["stage"]["kind"], "QuarterFinals");
    assert_eq!(
        payload["matches"][0]["team1_players"]["Mid"]["champion_asset_path"],
        "https://ddragon.leagueoflegends.com/cdn/15.4.1/img/champion/KaiSa.png"
    );

    let summary = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<_> = summary.lines().collect();
    assert_eq!(lines.len(), 11);
    assert!(lines[0].starts_with("game_identifier,stage,team,opponent,won"));
    assert!(lines[1].starts_with("QF_1_1_1,QuarterFinals,T1,Gen.G,1,1,Top,T1-a0"));
}
