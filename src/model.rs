use crate::stage::StageClassification;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Bot,
    Support,
}

/// Order in which the page lays out each side's roster.
pub const ROLE_ORDER: [Role; 5] = [Role::Top, Role::Jungle, Role::Mid, Role::Bot, Role::Support];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Top => "Top",
            Role::Jungle => "Jungle",
            Role::Mid => "Mid",
            Role::Bot => "Bot",
            Role::Support => "Support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "top" => Ok(Role::Top),
            "jungle" | "jng" => Ok(Role::Jungle),
            "mid" | "middle" => Ok(Role::Mid),
            "bot" | "bottom" | "adc" => Ok(Role::Bot),
            "support" | "supp" | "utility" => Ok(Role::Support),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Team1,
    Team2,
}

/// One player's line of one game, as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GameRow {
    pub game_identifier: String,
    pub team1_name: String,
    pub team2_name: String,
    pub champion_raw: String,
    pub role: Role,
    pub player_team_name: String,
    pub player_name: String,
    pub winner_indicator: u8,
    pub overview_page_name: String,
    #[serde(default)]
    pub mvp_player_name: Option<String>,
    #[serde(default)]
    pub team1_kills: Option<u32>,
    #[serde(default)]
    pub team2_kills: Option<u32>,
    #[serde(default)]
    pub kills: Option<u32>,
    #[serde(default)]
    pub deaths: Option<u32>,
    #[serde(default)]
    pub assists: Option<u32>,
    #[serde(default)]
    pub runes_raw: Option<String>,
    #[serde(default)]
    pub summoner_spells_raw: Option<String>,
    #[serde(default)]
    pub match_day: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSlot {
    pub display_name: String,
    pub image_path: String,
    pub champion_asset_path: String,
    pub role: Role,
    pub is_mvp: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub rune_asset_path: String,
    pub summoner_spell_asset_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub game_identifier: String,
    pub team1_name: String,
    pub team2_name: String,
    pub team1_image_path: String,
    pub team2_image_path: String,
    pub stage: StageClassification,
    pub winner_indicator: u8,
    pub winning_team_name: String,
    pub team1_points: Option<u32>,
    pub team2_points: Option<u32>,
    pub mvp_player_name: Option<String>,
    pub match_day: Option<String>,
    pub team1_players: BTreeMap<Role, PlayerSlot>,
    pub team2_players: BTreeMap<Role, PlayerSlot>,

    // Filled in by the series aggregator once every row has been folded.
    pub match_group_key: String,
    pub series_id: String,
    pub round_number: u32,
    pub series_number: u32,
    pub game_number: u32,
    pub is_qualifying_series: bool,
    pub is_last_game_in_group: bool,
    pub use_decisive_treatment: bool,
}

impl MatchRecord {
    pub fn new(
        row: &GameRow,
        stage: StageClassification,
        team1_image_path: String,
        team2_image_path: String,
    ) -> Self {
        let winning_team_name = if row.winner_indicator == 1 {
            row.team1_name.clone()
        } else {
            row.team2_name.clone()
        };

        Self {
            game_identifier: row.game_identifier.clone(),
            team1_name: row.team1_name.clone(),
            team2_name: row.team2_name.clone(),
            team1_image_path,
            team2_image_path,
            stage,
            winner_indicator: row.winner_indicator,
            winning_team_name,
            team1_points: row.team1_kills,
            team2_points: row.team2_kills,
            mvp_player_name: row.mvp_player_name.clone(),
            match_day: row.match_day.clone(),
            team1_players: BTreeMap::new(),
            team2_players: BTreeMap::new(),
            match_group_key: String::new(),
            series_id: String::new(),
            round_number: 0,
            series_number: 0,
            game_number: 0,
            is_qualifying_series: false,
            is_last_game_in_group: false,
            use_decisive_treatment: false,
        }
    }

    /// Which side a team name plays on in this game, if either.
    pub fn side_of(&self, team_name: &str) -> Option<Side> {
        if team_name == self.team1_name {
            Some(Side::Team1)
        } else if team_name == self.team2_name {
            Some(Side::Team2)
        } else {
            None
        }
    }

    pub fn players(&self, side: Side) -> &BTreeMap<Role, PlayerSlot> {
        match side {
            Side::Team1 => &self.team1_players,
            Side::Team2 => &self.team2_players,
        }
    }

    pub fn players_mut(&mut self, side: Side) -> &mut BTreeMap<Role, PlayerSlot> {
        match side {
            Side::Team1 => &mut self.team1_players,
            Side::Team2 => &mut self.team2_players,
        }
    }

    pub fn is_mvp(&self, player_name: &str) -> bool {
        self.mvp_player_name
            .as_deref()
            .map(|mvp| mvp.trim().to_lowercase() == player_name.trim().to_lowercase())
            .unwrap_or(false)
    }
}
