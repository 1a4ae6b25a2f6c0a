const DDRAGON_BASE: &str = "https://ddragon.leagueoflegends.com/cdn";
const DDRAGON_PATCH: &str = "15.4.1";

/// Base locations for the static images the page shows next to each player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub champion_base: String,
    pub rune_base: String,
    pub spell_base: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            champion_base: format!("{}/{}/img/champion", DDRAGON_BASE, DDRAGON_PATCH),
            rune_base: "static/img/runes".to_string(),
            spell_base: format!("{}/{}/img/spell", DDRAGON_BASE, DDRAGON_PATCH),
        }
    }
}

/// Keeps ASCII and non-ASCII letters only: "Kai'Sa" -> "KaiSa", "Dr. Mundo" -> "DrMundo".
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_alphabetic()).collect()
}

impl AssetPaths {
    pub fn champion(&self, raw: &str) -> String {
        asset_path(&self.champion_base, "", raw)
    }

    /// Only the first (keystone) entry of a comma-joined rune list is shown.
    pub fn rune(&self, runes_raw: Option<&str>) -> String {
        let first = runes_raw
            .and_then(|raw| raw.split(',').next())
            .unwrap_or("");
        asset_path(&self.rune_base, "", first)
    }

    pub fn summoner_spells(&self, spells_raw: Option<&str>) -> Vec<String> {
        let Some(raw) = spells_raw else {
            return Vec::new();
        };

        raw.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| asset_path(&self.spell_base, "Summoner", token))
            .collect()
    }
}

fn asset_path(base: &str, prefix: &str, raw: &str) -> String {
    let name = sanitize(raw);
    if name.is_empty() {
        return String::new();
    }
    format!("{}/{}{}.png", base.trim_end_matches('/'), prefix, name)
}
