use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::lichess_api::{GamesQuery, LichessClient};
use crate::state::{
    Delta, LEADERBOARD_ERROR, PROFILE_ERROR, Page, ProviderCommand, RequestToken,
    TOURNAMENT_DETAIL_ERROR, TOURNAMENTS_ERROR,
};

#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub leaderboard_size: u32,
    pub results_nb: u32,
    pub games: GamesQuery,
}

impl From<&Config> for FetchLimits {
    fn from(config: &Config) -> Self {
        Self {
            leaderboard_size: config.leaderboard_size,
            results_nb: config.results_nb,
            games: GamesQuery {
                max: config.games_max,
                rated: true,
            },
        }
    }
}

/// Runs commands one at a time on a worker thread until the command channel closes.
pub fn spawn_provider(
    client: LichessClient,
    limits: FetchLimits,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        info!(base = client.base_url(), "provider started");
        while let Ok(cmd) = cmd_rx.recv() {
            for delta in handle_command(&client, &limits, cmd) {
                if tx.send(delta).is_err() {
                    return;
                }
            }
        }
        info!("provider stopped");
    })
}

pub fn handle_command(
    client: &LichessClient,
    limits: &FetchLimits,
    cmd: ProviderCommand,
) -> Vec<Delta> {
    match cmd {
        ProviderCommand::FetchProfile { token, username } => {
            fetch_profile(client, limits, token, &username)
        }
        ProviderCommand::FetchLeaderboard { token, variant } => {
            match client.leaderboard(variant, limits.leaderboard_size) {
                Ok(entries) => vec![Delta::LeaderboardLoaded {
                    token,
                    variant,
                    entries,
                }],
                Err(err) => failed(Page::Leaderboard, token, LEADERBOARD_ERROR, &err),
            }
        }
        ProviderCommand::FetchTournaments { token } => match client.tournaments() {
            Ok(list) => vec![Delta::TournamentsLoaded {
                token,
                created: list.created,
            }],
            Err(err) => failed(Page::Tournaments, token, TOURNAMENTS_ERROR, &err),
        },
        ProviderCommand::FetchTournamentDetail { token, id } => {
            let tournament = match client.tournament(&id) {
                Ok(t) => t,
                Err(err) => {
                    return failed(Page::TournamentDetail, token, TOURNAMENT_DETAIL_ERROR, &err);
                }
            };
            let mut out = Vec::new();
            let results = match client.tournament_results(&id, limits.results_nb) {
                Ok(rows) => rows,
                Err(err) => {
                    out.push(warn_log("Standings", &err));
                    Vec::new()
                }
            };
            out.push(Delta::TournamentDetailLoaded {
                token,
                tournament: Box::new(tournament),
                results,
            });
            out
        }
    }
}

fn fetch_profile(
    client: &LichessClient,
    limits: &FetchLimits,
    token: RequestToken,
    username: &str,
) -> Vec<Delta> {
    let profile = match client.user_profile(username) {
        Ok(profile) => profile,
        Err(err) => return failed(Page::Profile, token, PROFILE_ERROR, &err),
    };

    // History and games are extras; the profile still renders without them.
    let mut out = Vec::new();
    let history = client.rating_history(username).unwrap_or_else(|err| {
        out.push(warn_log("Rating history", &err));
        Vec::new()
    });
    let games = client
        .user_games(username, &limits.games)
        .unwrap_or_else(|err| {
            out.push(warn_log("Recent games", &err));
            Vec::new()
        });

    out.push(Delta::ProfileLoaded {
        token,
        profile: Box::new(profile),
        history,
        games,
    });
    out
}

fn failed(page: Page, token: RequestToken, message: &str, err: &ApiError) -> Vec<Delta> {
    warn!(page = page.label(), error = %err, "fetch failed");
    vec![
        Delta::Log(format!("[WARN] {} fetch error: {err}", page.label())),
        Delta::Failed {
            page,
            token,
            message: message.to_string(),
        },
    ]
}

fn warn_log(what: &str, err: &ApiError) -> Delta {
    warn!(what, error = %err, "partial fetch failed");
    Delta::Log(format!("[WARN] {what} error: {err}"))
}
