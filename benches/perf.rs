use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use chess_terminal::format::{format_duration, format_time_control, upcoming_tournaments};
use chess_terminal::lichess_api::{parse_leaderboard_json, parse_list_json};
use chess_terminal::models::{Clock, GameSummary, Tournament, TournamentList, UserProfile};

const PROFILE_JSON: &str = include_str!("../tests/fixtures/user_profile.json");
const LEADERBOARD_JSON: &str = include_str!("../tests/fixtures/leaderboard_rapid.json");
const TOURNAMENTS_JSON: &str = include_str!("../tests/fixtures/tournaments.json");
const GAMES_NDJSON: &str = include_str!("../tests/fixtures/user_games.ndjson");

fn bench_profile_parse(c: &mut Criterion) {
    c.bench_function("profile_parse", |b| {
        b.iter(|| {
            let profile: UserProfile = serde_json::from_str(black_box(PROFILE_JSON)).unwrap();
            black_box(profile.perfs.len());
        })
    });
}

fn bench_leaderboard_parse(c: &mut Criterion) {
    c.bench_function("leaderboard_parse", |b| {
        b.iter(|| {
            let entries = parse_leaderboard_json(black_box(LEADERBOARD_JSON)).unwrap();
            black_box(entries.len());
        })
    });
}

fn bench_games_ndjson_parse(c: &mut Criterion) {
    c.bench_function("games_ndjson_parse", |b| {
        b.iter(|| {
            let games: Vec<GameSummary> = parse_list_json(black_box(GAMES_NDJSON)).unwrap();
            black_box(games.len());
        })
    });
}

fn bench_upcoming_filter(c: &mut Criterion) {
    let list: TournamentList = serde_json::from_str(TOURNAMENTS_JSON).unwrap();
    let mut created: Vec<Tournament> = Vec::new();
    for i in 0..500 {
        let mut t = list.created[i % list.created.len()].clone();
        t.starts_at = Some(i as i64 * 60_000);
        created.push(t);
    }
    let now = 250 * 60_000;

    c.bench_function("upcoming_filter", |b| {
        b.iter(|| {
            let upcoming = upcoming_tournaments(black_box(&created), black_box(now));
            black_box(upcoming.len());
        })
    });
}

fn bench_row_formatting(c: &mut Criterion) {
    let clock = Clock {
        limit: Some(180),
        increment: Some(2),
    };
    c.bench_function("row_formatting", |b| {
        b.iter(|| {
            for minutes in 0..240u32 {
                black_box(format_duration(black_box(minutes)));
            }
            black_box(format_time_control(Some(black_box(&clock))));
        })
    });
}

criterion_group!(
    benches,
    bench_profile_parse,
    bench_leaderboard_parse,
    bench_games_ndjson_parse,
    bench_upcoming_filter,
    bench_row_formatting
);
criterion_main!(benches);
