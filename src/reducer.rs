use crate::assets::AssetPaths;
use crate::images::{ImageLookup, ImageStores};
use crate::model::{GameRow, MatchRecord, PlayerSlot};
use crate::stage::StageClassifier;
use std::collections::HashMap;

/// Folds per-player rows into one record per game identifier, keeping the
/// order in which games were first seen.
pub struct RowReducer<'a, L: ImageLookup + ?Sized> {
    classifier: &'a mut StageClassifier,
    assets: &'a AssetPaths,
    images: &'a mut ImageStores,
    lookup: &'a L,
    records: Vec<MatchRecord>,
    index: HashMap<String, usize>,
    dropped_rows: usize,
}

impl<'a, L: ImageLookup + ?Sized> RowReducer<'a, L> {
    pub fn new(
        classifier: &'a mut StageClassifier,
        assets: &'a AssetPaths,
        images: &'a mut ImageStores,
        lookup: &'a L,
    ) -> Self {
        Self {
            classifier,
            assets,
            images,
            lookup,
            records: Vec::new(),
            index: HashMap::new(),
            dropped_rows: 0,
        }
    }

    pub fn fold_all<I>(mut self, rows: I) -> Vec<MatchRecord>
    where
        I: IntoIterator<Item = GameRow>,
    {
        for row in rows {
            self.fold(&row);
        }

        if self.dropped_rows > 0 {
            tracing::info!(dropped = self.dropped_rows, "rows matched neither team");
        }
        self.records
    }

    pub fn fold(&mut self, row: &GameRow) {
        let idx = self.record_index(row);
        let Some(side) = self.records[idx].side_of(&row.player_team_name) else {
            tracing::debug!(
                game_id = %row.game_identifier,
                team = %row.player_team_name,
                player = %row.player_name,
                "dropping row for team outside this game"
            );
            self.dropped_rows += 1;
            return;
        };

        let record = &mut self.records[idx];
        if record.mvp_player_name.is_none() {
            record.mvp_player_name = row.mvp_player_name.clone();
        }
        let is_mvp = record.is_mvp(&row.player_name);

        let lookup = self.lookup;
        let image_path = self
            .images
            .players
            .resolve(&row.overview_page_name, |link| lookup.player_image(link));

        let slot = PlayerSlot {
            display_name: row.player_name.clone(),
            image_path,
            champion_asset_path: self.assets.champion(&row.champion_raw),
            role: row.role,
            is_mvp,
            kills: row.kills.unwrap_or(0),
            deaths: row.deaths.unwrap_or(0),
            assists: row.assists.unwrap_or(0),
            rune_asset_path: self.assets.rune(row.runes_raw.as_deref()),
            summoner_spell_asset_paths: self
                .assets
                .summoner_spells(row.summoner_spells_raw.as_deref()),
        };

        self.records[idx].players_mut(side).insert(row.role, slot);
    }

    fn record_index(&mut self, row: &GameRow) -> usize {
        if let Some(&idx) = self.index.get(&row.game_identifier) {
            return idx;
        }

        let stage = self.classifier.classify(&row.game_identifier);
        let lookup = self.lookup;
        let team1_image = self
            .images
            .teams
            .resolve(&row.team1_name, |team| lookup.team_image(team));
        let team2_image = self
            .images
            .teams
            .resolve(&row.team2_name, |team| lookup.team_image(team));

        let idx = self.records.len();
        self.records
            .push(MatchRecord::new(row, stage, team1_image, team2_image));
        self.index.insert(row.game_identifier.clone(), idx);
        idx
    }
}
