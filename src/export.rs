use crate::error::SourceError;
use crate::model::{MatchRecord, ROLE_ORDER, Role, Side};
use csv::Writer;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// What the page template receives.
#[derive(Debug, Serialize)]
pub struct PagePayload<'a> {
    pub generated_at: String,
    pub role_order: [Role; 5],
    pub matches: &'a [MatchRecord],
}

impl<'a> PagePayload<'a> {
    pub fn new(matches: &'a [MatchRecord]) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            role_order: ROLE_ORDER,
            matches,
        }
    }
}

#[derive(Serialize)]
struct PlayerSummaryRow<'a> {
    game_identifier: &'a str,
    stage: &'a str,
    team: &'a str,
    opponent: &'a str,
    won: u8,
    decisive: u8,
    role: Role,
    player: &'a str,
    champion_asset: &'a str,
    kills: u32,
    deaths: u32,
    assists: u32,
    mvp: u8,
}

fn ensure_parent(path: &Path) -> Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn write_page_json(matches: &[MatchRecord], out_file: &Path) -> Result<(), SourceError> {
    ensure_parent(out_file)?;
    let serialized = serde_json::to_vec_pretty(&PagePayload::new(matches))?;
    fs::write(out_file, serialized)?;
    Ok(())
}

/// One line per player slot, in display order, roles in roster order.
pub fn write_player_summary(matches: &[MatchRecord], out_file: &Path) -> Result<(), SourceError> {
    ensure_parent(out_file)?;
    let mut writer = Writer::from_path(out_file)?;

    for record in matches {
        for side in [Side::Team1, Side::Team2] {
            let (team, opponent) = match side {
                Side::Team1 => (&record.team1_name, &record.team2_name),
                Side::Team2 => (&record.team2_name, &record.team1_name),
            };
            let players = record.players(side);

            for role in ROLE_ORDER {
                let Some(slot) = players.get(&role) else {
                    continue;
                };

                writer.serialize(PlayerSummaryRow {
                    game_identifier: &record.game_identifier,
                    stage: &record.stage.display_label,
                    team,
                    opponent,
                    won: u8::from(record.winning_team_name == *team),
                    decisive: u8::from(record.use_decisive_treatment),
                    role,
                    player: &slot.display_name,
                    champion_asset: &slot.champion_asset_path,
                    kills: slot.kills,
                    deaths: slot.deaths,
                    assists: slot.assists,
                    mvp: u8::from(slot.is_mvp),
                })?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}
