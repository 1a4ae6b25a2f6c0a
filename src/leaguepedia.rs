use crate::error::SourceError;
use crate::images::ImageLookup;
use crate::model::{GameRow, Role};
use crate::source::{MatchSource, TournamentFilter};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread::sleep;
use std::time::{Duration, Instant};

pub const DEFAULT_API_URL: &str = "https://lol.fandom.com/api.php";
pub const DEFAULT_MAX_REQS_PER_MIN: usize = 60;
const PAGE_SIZE: usize = 500;
const WINDOW: Duration = Duration::from_secs(60);

const ROW_TABLES: &str = "ScoreboardGames=SG, ScoreboardPlayers=SP, MatchSchedule=MS";
const ROW_JOIN: &str = "SG.GameId=SP.GameId, SG.MatchId=MS.MatchId";
const ROW_FIELDS: &str = "SG.GameId=GameId, SG.Team1=Team1, SG.Team2=Team2, \
    SP.Champion=Champion, SP.Role=Role, SP.Team=PlayerTeam, SP.Name=Player, \
    SG.Winner=Winner, SP.Link=Link, MS.MVP=MVP, SG.Team1Kills=Team1Kills, \
    SG.Team2Kills=Team2Kills, SP.Kills=Kills, SP.Deaths=Deaths, SP.Assists=Assists, \
    SP.Runes=Runes, SP.SummonerSpells=SummonerSpells, MS.Tab=MatchDay";
const ROW_ORDER: &str = "SG.DateTime_UTC, SG.GameId, SP.Side";

#[derive(Deserialize)]
struct CargoResponse<T> {
    #[serde(default = "Vec::new")]
    cargoquery: Vec<CargoEntry<T>>,
}

#[derive(Deserialize)]
struct CargoEntry<T> {
    title: T,
}

/// One ScoreboardPlayers row joined with its game. Cargo returns every
/// field as a string, or null when unset.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct CargoGameRow {
    game_id: Option<String>,
    team1: Option<String>,
    team2: Option<String>,
    champion: Option<String>,
    role: Option<String>,
    player_team: Option<String>,
    player: Option<String>,
    winner: Option<String>,
    link: Option<String>,
    #[serde(rename = "MVP")]
    mvp: Option<String>,
    team1_kills: Option<String>,
    team2_kills: Option<String>,
    kills: Option<String>,
    deaths: Option<String>,
    assists: Option<String>,
    runes: Option<String>,
    summoner_spells: Option<String>,
    match_day: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn number(value: &Option<String>) -> Option<u32> {
    value.as_deref().and_then(|s| s.trim().parse().ok())
}

impl CargoGameRow {
    fn into_game_row(self) -> Option<GameRow> {
        let role: Role = self.role.as_deref()?.parse().ok()?;
        let winner_indicator = match self.winner.as_deref().map(str::trim) {
            Some("1") => 1,
            Some("2") => 2,
            _ => return None,
        };
        let player_name = non_empty(self.player)?;

        Some(GameRow {
            game_identifier: non_empty(self.game_id)?,
            team1_name: non_empty(self.team1)?,
            team2_name: non_empty(self.team2)?,
            champion_raw: self.champion.unwrap_or_default(),
            role,
            player_team_name: non_empty(self.player_team)?,
            overview_page_name: non_empty(self.link).unwrap_or_else(|| player_name.clone()),
            player_name,
            winner_indicator,
            mvp_player_name: non_empty(self.mvp),
            team1_kills: number(&self.team1_kills),
            team2_kills: number(&self.team2_kills),
            kills: number(&self.kills),
            deaths: number(&self.deaths),
            assists: number(&self.assists),
            runes_raw: non_empty(self.runes),
            summoner_spells_raw: non_empty(self.summoner_spells),
            match_day: non_empty(self.match_day),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct FileNameRow {
    file_name: Option<String>,
}

/// Escapes a value for a double-quoted Cargo `where` literal.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn build_headers() -> Result<HeaderMap, SourceError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("worlds-results/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Client for the Leaguepedia MediaWiki API: Cargo queries for game rows and
/// image filenames, `imageinfo` for file URLs.
pub struct LeaguepediaClient {
    client: Client,
    headers: HeaderMap,
    api_url: String,
    limiter: Mutex<RateLimiter>,
}

impl LeaguepediaClient {
    pub fn new(api_url: &str, max_reqs_per_min: usize) -> Result<Self, SourceError> {
        if max_reqs_per_min == 0 {
            return Err(SourceError::Config(
                "request budget must be at least one per minute".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            headers: build_headers()?,
            api_url: api_url.to_string(),
            limiter: Mutex::new(RateLimiter::new(max_reqs_per_min, WINDOW)),
        })
    }

    fn cargo_query<T: DeserializeOwned>(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, SourceError> {
        let mut query: Vec<(&str, String)> = vec![
            ("action", "cargoquery".to_string()),
            ("format", "json".to_string()),
        ];
        query.extend(params.iter().cloned());

        let response: CargoResponse<T> = self.get_json(&query)?;
        Ok(response.cargoquery.into_iter().map(|e| e.title).collect())
    }

    fn get_json<T: DeserializeOwned>(&self, query: &[(&str, String)]) -> Result<T, SourceError> {
        self.wait_rate_limit();

        let response = self
            .client
            .get(&self.api_url)
            .headers(self.headers.clone())
            .query(query)
            .send()?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                url: self.api_url.clone(),
                status: response.status(),
            });
        }

        Ok(response.json()?)
    }

    fn wait_rate_limit(&self) {
        let mut guard = self
            .limiter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.wait();
    }

    fn row_where(filter: &TournamentFilter) -> String {
        let mut clause = format!("SG.OverviewPage={}", quote(&filter.overview_page));
        if let Some((start, end)) = filter.utc_window() {
            clause.push_str(&format!(
                " AND SG.DateTime_UTC >= '{}' AND SG.DateTime_UTC < '{}'",
                start, end
            ));
        }
        clause
    }

    /// Resolves `File:<name>` to its full URL.
    fn file_url(&self, file_name: &str) -> Result<Option<String>, SourceError> {
        let response: Value = self.get_json(&[
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("titles", format!("File:{}", file_name)),
            ("prop", "imageinfo".to_string()),
            ("iiprop", "url".to_string()),
        ])?;

        Ok(response
            .get("query")
            .and_then(|q| q.get("pages"))
            .and_then(|pages| pages.as_object())
            .and_then(|pages| pages.values().next())
            .and_then(|page| page.get("imageinfo"))
            .and_then(|info| info.as_array())
            .and_then(|info| info.first())
            .and_then(|info| info.get("url"))
            .and_then(|url| url.as_str())
            .map(|url| url.to_string()))
    }

    fn image_from_file_rows(&self, rows: Vec<FileNameRow>) -> Result<Option<String>, SourceError> {
        let Some(file_name) = rows.into_iter().find_map(|r| non_empty(r.file_name)) else {
            return Ok(None);
        };
        self.file_url(&file_name)
    }
}

impl MatchSource for LeaguepediaClient {
    fn fetch_rows(&self, filter: &TournamentFilter) -> Result<Vec<GameRow>, SourceError> {
        let where_clause = Self::row_where(filter);
        let mut rows = Vec::new();
        let mut skipped = 0usize;
        let mut offset = 0usize;

        loop {
            let page: Vec<CargoGameRow> = self.cargo_query(&[
                ("tables", ROW_TABLES.to_string()),
                ("join_on", ROW_JOIN.to_string()),
                ("fields", ROW_FIELDS.to_string()),
                ("where", where_clause.clone()),
                ("order_by", ROW_ORDER.to_string()),
                ("limit", PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ])?;

            let fetched = page.len();
            for raw in page {
                match raw.into_game_row() {
                    Some(row) => rows.push(row),
                    None => skipped += 1,
                }
            }

            tracing::debug!(offset, fetched, "fetched scoreboard page");
            if fetched < PAGE_SIZE {
                break;
            }
            offset += fetched;
        }

        if skipped > 0 {
            tracing::warn!(skipped, "skipped scoreboard rows missing required fields");
        }
        Ok(rows)
    }
}

impl ImageLookup for LeaguepediaClient {
    fn player_image(&self, player_link: &str) -> Result<Option<String>, SourceError> {
        let rows: Vec<FileNameRow> = self.cargo_query(&[
            ("tables", "PlayerImages=PI, Tournaments=T".to_string()),
            ("join_on", "PI.Tournament=T.OverviewPage".to_string()),
            ("fields", "PI.FileName=FileName".to_string()),
            ("where", format!("PI.Link={}", quote(player_link))),
            ("order_by", "PI.SortDate DESC, T.DateStart DESC".to_string()),
            ("limit", "1".to_string()),
        ])?;
        self.image_from_file_rows(rows)
    }

    fn team_image(&self, team_name: &str) -> Result<Option<String>, SourceError> {
        let rows: Vec<FileNameRow> = self.cargo_query(&[
            ("tables", "Teams".to_string()),
            ("fields", "Teams.Image=FileName".to_string()),
            ("where", format!("Teams.Name={}", quote(team_name))),
            ("limit", "1".to_string()),
        ])?;
        self.image_from_file_rows(rows)
    }
}

/// Sliding-window request budget: at most `max_reqs` sends per `window`.
pub struct RateLimiter {
    max_reqs: usize,
    window: Duration,
    timestamps: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_reqs: usize, window: Duration) -> Self {
        Self {
            max_reqs: max_reqs.max(1),
            window,
            timestamps: VecDeque::new(),
        }
    }

    pub fn wait(&mut self) {
        loop {
            let now = Instant::now();
            self.prune(now);

            if self.timestamps.len() >= self.max_reqs {
                if let Some(oldest) = self.timestamps.front() {
                    let elapsed = now.duration_since(*oldest);
                    if elapsed < self.window {
                        sleep(self.window - elapsed);
                        continue;
                    }
                }
            }

            self.timestamps.push_back(Instant::now());
            break;
        }
    }

    fn prune(&mut self, now: Instant) {
        while let Some(front) = self.timestamps.front() {
            if now.duration_since(*front) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargo_rows_parse_leniently() {
        let body = r#"{"cargoquery":[
            {"title":{"GameId":"QF_1_1_1","Team1":"T1","Team2":"Gen.G","Champion":"Kai'Sa",
                      "Role":"Bot","PlayerTeam":"T1","Player":"Gumayusi","Winner":"1",
                      "Link":"Gumayusi","MVP":"","Team1Kills":"18","Team2Kills":null,
                      "Kills":"7","Deaths":"x","Assists":"5","Runes":"Lethal Tempo,Triumph",
                      "SummonerSpells":"Flash,Heal","MatchDay":"Day 2"}},
            {"title":{"GameId":"QF_1_1_1","Role":"Coach","Winner":"1"}}
        ]}"#;

        let response: CargoResponse<CargoGameRow> = serde_json::from_str(body).unwrap();
        let rows: Vec<GameRow> = response
            .cargoquery
            .into_iter()
            .filter_map(|e| e.title.into_game_row())
            .collect();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.role, Role::Bot);
        assert_eq!(row.winner_indicator, 1);
        assert_eq!(row.mvp_player_name, None);
        assert_eq!(row.team1_kills, Some(18));
        assert_eq!(row.team2_kills, None);
        assert_eq!(row.deaths, None);
        assert_eq!(row.match_day.as_deref(), Some("Day 2"));
    }

    #[test]
    fn where_clause_includes_date_window() {
        let filter = TournamentFilter::new("Data:2024 \"Worlds\"")
            .on_date("2024-11-02")
            .unwrap();
        assert_eq!(
            LeaguepediaClient::row_where(&filter),
            "SG.OverviewPage=\"Data:2024 \\\"Worlds\\\"\" AND SG.DateTime_UTC >= '2024-11-02 00:00:00' AND SG.DateTime_UTC < '2024-11-03 00:00:00'"
        );
    }

    #[test]
    fn zero_budget_rejected() {
        assert!(LeaguepediaClient::new(DEFAULT_API_URL, 0).is_err());
    }

    #[test]
    fn limiter_allows_budget_without_sleeping() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait();
        }
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.timestamps.len(), 3);
    }
}
