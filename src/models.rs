use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Rapid,
    Bullet,
    Blitz,
    Classical,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Rapid,
        Variant::Bullet,
        Variant::Blitz,
        Variant::Classical,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Variant::Rapid => "rapid",
            Variant::Bullet => "bullet",
            Variant::Blitz => "blitz",
            Variant::Classical => "classical",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::Rapid => "Rapid",
            Variant::Bullet => "Bullet",
            Variant::Blitz => "Blitz",
            Variant::Classical => "Classical",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Variant::ALL
            .into_iter()
            .find(|v| v.key().eq_ignore_ascii_case(raw))
    }

    pub fn next(self) -> Self {
        let idx = Variant::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Variant::ALL[(idx + 1) % Variant::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Variant::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Variant::ALL[(idx + Variant::ALL.len() - 1) % Variant::ALL.len()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Perf {
    pub rating: Option<i32>,
    pub rd: Option<f64>,
    pub games: Option<u32>,
    // Profiles report `prog`, leaderboards report `progress`.
    #[serde(alias = "progress")]
    pub prog: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameCounts {
    pub all: Option<u32>,
    pub win: Option<u32>,
    pub draw: Option<u32>,
    pub loss: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileDetails {
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayTime {
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub patron: bool,
    #[serde(default, deserialize_with = "de_flag")]
    pub online: bool,
    pub profile: Option<ProfileDetails>,
    pub count: Option<GameCounts>,
    pub created_at: Option<i64>,
    pub seen_at: Option<i64>,
    pub play_time: Option<PlayTime>,
    #[serde(default)]
    pub perfs: BTreeMap<String, Perf>,
    pub followable: Option<bool>,
    pub nb_following: Option<u32>,
}

impl UserProfile {
    pub fn bio(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .and_then(|p| p.bio.as_deref())
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeaderboardEntry {
    pub username: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    pub online: bool,
    #[serde(default)]
    pub perfs: BTreeMap<String, Perf>,
}

impl LeaderboardEntry {
    pub fn perf(&self, variant: Variant) -> Option<&Perf> {
        self.perfs.get(variant.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Clock {
    pub limit: Option<u32>,
    pub increment: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NamedKey {
    pub key: Option<String>,
    pub name: Option<String>,
}

// The list endpoint sends `{key, name}`; the detail endpoint sends a bare key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TournamentVariant {
    Named(NamedKey),
    Key(String),
}

impl TournamentVariant {
    pub fn name(&self) -> Option<&str> {
        match self {
            TournamentVariant::Named(named) => named.name.as_deref().or(named.key.as_deref()),
            TournamentVariant::Key(key) => Some(key.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: Option<String>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub created_by: Option<String>,
    pub clock: Option<Clock>,
    pub nb_players: Option<u32>,
    pub max_players: Option<u32>,
    pub variant: Option<TournamentVariant>,
    #[serde(default, deserialize_with = "de_timestamp_ms")]
    pub starts_at: Option<i64>,
    pub minutes: Option<u32>,
    pub rated: Option<bool>,
    pub is_finished: Option<bool>,
}

impl Tournament {
    pub fn display_name(&self) -> Option<&str> {
        self.full_name.as_deref().or(self.name.as_deref())
    }

    pub fn variant_name(&self) -> Option<&str> {
        self.variant.as_ref().and_then(TournamentVariant::name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TournamentList {
    #[serde(default)]
    pub created: Vec<Tournament>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TournamentResult {
    pub rank: Option<u32>,
    pub score: Option<i32>,
    pub rating: Option<i32>,
    pub username: Option<String>,
    pub title: Option<String>,
    pub performance: Option<i32>,
}

// `[year, month (0-based), day, rating]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RatingPoint(pub i32, pub u32, pub u32, pub i32);

impl RatingPoint {
    pub fn rating(&self) -> i32 {
        self.3
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RatingSeries {
    pub name: String,
    #[serde(default)]
    pub points: Vec<RatingPoint>,
}

impl RatingSeries {
    pub fn latest(&self) -> Option<&RatingPoint> {
        self.points.last()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameUser {
    pub name: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePlayer {
    pub user: Option<GameUser>,
    pub rating: Option<i32>,
    pub rating_diff: Option<i32>,
    pub ai_level: Option<u8>,
}

impl GamePlayer {
    pub fn name(&self) -> String {
        let user = self.user.as_ref();
        if let Some(name) = user.and_then(|u| u.name.as_deref()) {
            return match user.and_then(|u| u.title.as_deref()) {
                Some(title) => format!("{title} {name}"),
                None => name.to_string(),
            };
        }
        match self.ai_level {
            Some(level) => format!("Stockfish level {level}"),
            None => "Anonymous".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GamePlayers {
    pub white: Option<GamePlayer>,
    pub black: Option<GamePlayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub speed: Option<String>,
    pub created_at: Option<i64>,
    pub status: Option<String>,
    pub winner: Option<String>,
    pub players: Option<GamePlayers>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

// Lichess sometimes sends `null` for flags it would otherwise omit.
fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Accepts epoch milliseconds or an RFC 3339 string.
fn de_timestamp_ms<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawTimestamp::Millis(ms)) => Some(ms),
        Some(RawTimestamp::Text(text)) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|dt| dt.timestamp_millis()),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_cycles_in_both_directions() {
        assert_eq!(Variant::Rapid.next(), Variant::Bullet);
        assert_eq!(Variant::Classical.next(), Variant::Rapid);
        assert_eq!(Variant::Rapid.prev(), Variant::Classical);
    }

    #[test]
    fn tournament_start_accepts_iso_string() {
        let t: Tournament =
            serde_json::from_str(r#"{"id":"abc","startsAt":"2026-10-18T12:00:00Z"}"#)
                .expect("valid json");
        assert_eq!(t.starts_at, Some(1_792_324_800_000));
    }

    #[test]
    fn tournament_variant_accepts_both_shapes() {
        let listed: Tournament =
            serde_json::from_str(r#"{"variant":{"key":"standard","name":"Standard"}}"#)
                .expect("valid json");
        assert_eq!(listed.variant_name(), Some("Standard"));
        let detail: Tournament =
            serde_json::from_str(r#"{"variant":"chess960"}"#).expect("valid json");
        assert_eq!(detail.variant_name(), Some("chess960"));
    }

    #[test]
    fn tournament_rated_distinguishes_missing_from_false() {
        let missing: Tournament = serde_json::from_str(r#"{"id":"a"}"#).expect("json");
        assert_eq!(missing.rated, None);
        assert_eq!(missing.is_finished, None);
        let null: Tournament =
            serde_json::from_str(r#"{"id":"b","rated":null,"isFinished":null}"#).expect("json");
        assert_eq!(null.rated, None);
        let casual: Tournament = serde_json::from_str(r#"{"id":"c","rated":false}"#).expect("json");
        assert_eq!(casual.rated, Some(false));
    }

    #[test]
    fn null_online_flag_reads_as_offline() {
        let entry: LeaderboardEntry =
            serde_json::from_str(r#"{"username":"a","online":null}"#).expect("json");
        assert!(!entry.online);
    }

    #[test]
    fn titled_player_name_carries_title() {
        let player: GamePlayer =
            serde_json::from_str(r#"{"user":{"name":"Magnus","title":"GM"},"rating":2850}"#)
                .expect("json");
        assert_eq!(player.name(), "GM Magnus");
    }

    #[test]
    fn leaderboard_progress_maps_to_prog() {
        let perf: Perf = serde_json::from_str(r#"{"rating":2900,"progress":-7}"#).expect("json");
        assert_eq!(perf.prog, Some(-7));
    }
}
