//! Display helpers shared by the screens. Everything here is pure.

use chrono::{DateTime, Utc};

use crate::models::{Clock, GameCounts, Perf, Tournament};

pub const PLACEHOLDER: &str = "-";

const SITE_BASE: &str = "https://lichess.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Purple,
    Pink,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    Gold,
    Silver,
    Bronze,
    TopTen,
    Default,
}

const LEADERBOARD_TIERS: [(i32, Tone); 6] = [
    (2700, Tone::Purple),
    (2500, Tone::Pink),
    (2400, Tone::Red),
    (2300, Tone::Orange),
    (2200, Tone::Yellow),
    (2100, Tone::Green),
];

const PROFILE_TIERS: [(i32, Tone); 7] = [
    (2400, Tone::Purple),
    (2200, Tone::Pink),
    (2000, Tone::Red),
    (1800, Tone::Orange),
    (1600, Tone::Yellow),
    (1400, Tone::Green),
    (1200, Tone::Blue),
];

pub fn rank_medal(rank: usize) -> Option<&'static str> {
    match rank {
        1 => Some("🥇"),
        2 => Some("🥈"),
        3 => Some("🥉"),
        _ => None,
    }
}

pub fn rank_tier(rank: usize) -> RankTier {
    match rank {
        1 => RankTier::Gold,
        2 => RankTier::Silver,
        3 => RankTier::Bronze,
        r if r <= 10 => RankTier::TopTen,
        _ => RankTier::Default,
    }
}

fn tier_for(rating: i32, tiers: &[(i32, Tone)], fallback: Tone) -> Tone {
    tiers
        .iter()
        .find(|(threshold, _)| rating >= *threshold)
        .map(|(_, tone)| *tone)
        .unwrap_or(fallback)
}

pub fn leaderboard_rating_tone(rating: i32) -> Tone {
    tier_for(rating, &LEADERBOARD_TIERS, Tone::Blue)
}

pub fn profile_rating_tone(rating: i32) -> Tone {
    tier_for(rating, &PROFILE_TIERS, Tone::Gray)
}

pub fn progress_label(prog: i32) -> String {
    if prog >= 0 {
        format!("+{prog}")
    } else {
        prog.to_string()
    }
}

pub fn progress_tone(prog: i32) -> Tone {
    if prog >= 0 { Tone::Green } else { Tone::Red }
}

pub fn rd_label(rd: f64) -> String {
    format!("±{}", rd.round() as i64)
}

pub fn rating_label(perf: Option<&Perf>) -> String {
    perf.and_then(|p| p.rating)
        .map(|r| r.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn games_bar_percent(games: u32) -> u16 {
    games.min(100) as u16
}

pub fn win_rate(count: &GameCounts) -> Option<f64> {
    let all = count.all.filter(|a| *a > 0)?;
    let win = count.win.unwrap_or(0);
    Some(f64::from(win) / f64::from(all) * 100.0)
}

pub fn play_time_hours(seconds: u64) -> u64 {
    seconds / 3600
}

pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{hours}h")
    }
}

pub fn format_time_control(clock: Option<&Clock>) -> String {
    let Some(clock) = clock else {
        return "Unknown".to_string();
    };
    let initial = clock.limit.unwrap_or(0) / 60;
    let increment = clock.increment.unwrap_or(0);
    format!("{initial}+{increment}")
}

// `None` when there is no cap.
pub fn capacity_percent(nb_players: u32, max_players: Option<u32>) -> Option<u16> {
    let max = max_players.filter(|m| *m > 0)?;
    let pct = (f64::from(nb_players) / f64::from(max) * 100.0).min(100.0);
    Some(pct.floor() as u16)
}

pub fn players_label(nb_players: Option<u32>, max_players: Option<u32>) -> String {
    let nb = nb_players.unwrap_or(0);
    match max_players {
        Some(max) if max > 0 => format!("{nb} / {max}"),
        _ => format!("{nb} / ∞"),
    }
}

/// Tournaments starting strictly after `now_ms`, in source order.
pub fn upcoming_tournaments(tournaments: &[Tournament], now_ms: i64) -> Vec<Tournament> {
    tournaments
        .iter()
        .filter(|t| t.starts_at.is_some_and(|start| start > now_ms))
        .cloned()
        .collect()
}

pub fn perf_label(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for (idx, ch) in key.chars().enumerate() {
        if idx == 0 {
            out.extend(ch.to_uppercase());
        } else if ch.is_ascii_uppercase() {
            out.push(' ');
            out.push(ch);
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn played_perfs<'a, I>(perfs: I) -> Vec<(&'a str, &'a Perf)>
where
    I: IntoIterator<Item = (&'a String, &'a Perf)>,
{
    let mut rows: Vec<(&str, &Perf)> = perfs
        .into_iter()
        .filter(|(_, perf)| perf.games.unwrap_or(0) > 0)
        .map(|(key, perf)| (key.as_str(), perf))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));
    rows
}

pub fn rated_label(rated: Option<bool>) -> &'static str {
    match rated {
        Some(true) => "rated",
        Some(false) => "casual",
        None => PLACEHOLDER,
    }
}

pub fn tournament_url(id: &str) -> String {
    format!("{SITE_BASE}/tournament/{id}")
}

pub fn game_result(winner: Option<&str>, status: Option<&str>) -> &'static str {
    match (winner, status) {
        (Some("white"), _) => "1-0",
        (Some("black"), _) => "0-1",
        (_, Some("aborted" | "noStart" | "created" | "started")) => "*",
        _ => "½-½",
    }
}

fn to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}

pub fn format_date(ms: i64) -> Option<String> {
    to_datetime(ms).map(|dt| dt.format("%Y-%m-%d").to_string())
}

pub fn format_time(ms: i64) -> Option<String> {
    to_datetime(ms).map(|dt| dt.format("%H:%M").to_string())
}

pub fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_examples() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(59), "59m");
        assert_eq!(format_duration(60), "1h");
        assert_eq!(format_duration(90), "1h 30m");
        assert_eq!(format_duration(120), "2h");
    }

    #[test]
    fn time_control_examples() {
        let clock = Clock {
            limit: Some(300),
            increment: Some(3),
        };
        assert_eq!(format_time_control(Some(&clock)), "5+3");
        assert_eq!(format_time_control(None), "Unknown");
        let half_minute = Clock {
            limit: Some(30),
            increment: Some(0),
        };
        assert_eq!(format_time_control(Some(&half_minute)), "0+0");
    }

    #[test]
    fn leaderboard_tone_boundaries() {
        assert_eq!(leaderboard_rating_tone(2800), Tone::Purple);
        assert_eq!(leaderboard_rating_tone(2701), Tone::Purple);
        assert_eq!(leaderboard_rating_tone(2700), Tone::Purple);
        assert_eq!(leaderboard_rating_tone(2699), Tone::Pink);
        assert_eq!(leaderboard_rating_tone(2100), Tone::Green);
        assert_eq!(leaderboard_rating_tone(2099), Tone::Blue);
    }

    #[test]
    fn profile_tone_boundaries() {
        assert_eq!(profile_rating_tone(2400), Tone::Purple);
        assert_eq!(profile_rating_tone(1599), Tone::Green);
        assert_eq!(profile_rating_tone(1200), Tone::Blue);
        assert_eq!(profile_rating_tone(1199), Tone::Gray);
    }

    #[test]
    fn rank_buckets() {
        assert_eq!(rank_medal(1), Some("🥇"));
        assert_eq!(rank_medal(3), Some("🥉"));
        assert_eq!(rank_medal(4), None);
        assert_eq!(rank_tier(2), RankTier::Silver);
        assert_eq!(rank_tier(10), RankTier::TopTen);
        assert_eq!(rank_tier(11), RankTier::Default);
    }

    #[test]
    fn capacity_is_capped() {
        assert_eq!(capacity_percent(120, Some(100)), Some(100));
        assert_eq!(capacity_percent(25, Some(100)), Some(25));
        assert_eq!(capacity_percent(5, None), None);
        assert_eq!(capacity_percent(5, Some(0)), None);
        assert_eq!(players_label(Some(7), None), "7 / ∞");
        assert_eq!(players_label(None, Some(64)), "0 / 64");
    }

    #[test]
    fn perf_labels_split_camel_case() {
        assert_eq!(perf_label("ultraBullet"), "Ultra Bullet");
        assert_eq!(perf_label("blitz"), "Blitz");
        assert_eq!(perf_label("kingOfTheHill"), "King Of The Hill");
    }

    #[test]
    fn progress_is_signed() {
        assert_eq!(progress_label(12), "+12");
        assert_eq!(progress_label(0), "+0");
        assert_eq!(progress_label(-5), "-5");
        assert_eq!(progress_tone(-1), Tone::Red);
        assert_eq!(rd_label(45.6), "±46");
    }

    #[test]
    fn win_rate_needs_games() {
        let none = GameCounts::default();
        assert_eq!(win_rate(&none), None);
        let some = GameCounts {
            all: Some(200),
            win: Some(50),
            ..GameCounts::default()
        };
        assert_eq!(win_rate(&some), Some(25.0));
    }

    #[test]
    fn rated_label_keeps_unknown_apart() {
        assert_eq!(rated_label(Some(true)), "rated");
        assert_eq!(rated_label(Some(false)), "casual");
        assert_eq!(rated_label(None), PLACEHOLDER);
    }

    #[test]
    fn tournament_link_points_at_site() {
        assert_eq!(tournament_url("abc123"), "https://lichess.org/tournament/abc123");
    }

    #[test]
    fn game_results_by_winner_and_status() {
        assert_eq!(game_result(Some("white"), Some("mate")), "1-0");
        assert_eq!(game_result(Some("black"), Some("resign")), "0-1");
        assert_eq!(game_result(None, Some("draw")), "½-½");
        assert_eq!(game_result(None, Some("aborted")), "*");
    }

    #[test]
    fn dates_render_in_utc() {
        assert_eq!(format_date(1_704_067_200_000).as_deref(), Some("2024-01-01"));
        assert_eq!(format_time(1_704_067_200_000 + 90 * 60_000).as_deref(), Some("01:30"));
        assert_eq!(format_date(i64::MAX), None);
    }
}
