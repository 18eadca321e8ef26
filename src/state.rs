use std::collections::VecDeque;

use tracing::debug;

use crate::format;
use crate::models::{
    GameSummary, LeaderboardEntry, RatingSeries, Tournament, TournamentResult, UserProfile,
    Variant,
};

pub const PROFILE_ERROR: &str =
    "User not found or API error. Please check the username and try again.";
pub const LEADERBOARD_ERROR: &str = "Failed to fetch leaderboard data. Please try again.";
pub const TOURNAMENTS_ERROR: &str = "Failed to fetch tournament data. Please try again.";
pub const TOURNAMENT_DETAIL_ERROR: &str =
    "Failed to fetch tournament details. Please try again.";

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Profile,
    Leaderboards,
    Tournaments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Profile,
    Leaderboard,
    Tournaments,
    TournamentDetail,
}

impl Page {
    pub fn label(self) -> &'static str {
        match self {
            Page::Profile => "profile",
            Page::Leaderboard => "leaderboard",
            Page::Tournaments => "tournaments",
            Page::TournamentDetail => "tournament detail",
        }
    }
}

// Only the newest token per page may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

#[derive(Debug, Clone, Default)]
pub struct FetchStatus {
    pub latest: Option<RequestToken>,
    pub loading: bool,
    pub error: Option<String>,
}

impl FetchStatus {
    fn begin(&mut self, token: RequestToken) {
        self.latest = Some(token);
        self.loading = true;
        self.error = None;
    }

    fn is_current(&self, token: RequestToken) -> bool {
        self.latest == Some(token)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePage {
    pub query: String,
    pub editing: bool,
    pub status: FetchStatus,
    pub profile: Option<UserProfile>,
    pub history: Vec<RatingSeries>,
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Clone)]
pub struct LeaderboardPage {
    pub variant: Variant,
    pub status: FetchStatus,
    pub entries: Vec<LeaderboardEntry>,
    pub selected: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TournamentsPage {
    pub status: FetchStatus,
    // Raw `created` list; the upcoming filter runs at render time.
    pub listed: Vec<Tournament>,
    // Rows shift as tournaments start, so the selection follows the id.
    // `selected_row` is only the fallback when the id has left the list.
    pub selected_id: Option<String>,
    pub selected_row: usize,
    pub detail_status: FetchStatus,
    pub detail: Option<Tournament>,
    pub results: Vec<TournamentResult>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub profile: ProfilePage,
    pub leaderboard: LeaderboardPage,
    pub tournaments: TournamentsPage,
    next_token: u64,
}

impl AppState {
    pub fn new(default_variant: Variant) -> Self {
        Self {
            screen: Screen::Home,
            help_overlay: false,
            logs: VecDeque::new(),
            profile: ProfilePage::default(),
            leaderboard: LeaderboardPage {
                variant: default_variant,
                status: FetchStatus::default(),
                entries: Vec::new(),
                selected: 0,
            },
            tournaments: TournamentsPage::default(),
            next_token: 0,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn status_mut(&mut self, page: Page) -> &mut FetchStatus {
        match page {
            Page::Profile => &mut self.profile.status,
            Page::Leaderboard => &mut self.leaderboard.status,
            Page::Tournaments => &mut self.tournaments.status,
            Page::TournamentDetail => &mut self.tournaments.detail_status,
        }
    }

    pub fn status(&self, page: Page) -> &FetchStatus {
        match page {
            Page::Profile => &self.profile.status,
            Page::Leaderboard => &self.leaderboard.status,
            Page::Tournaments => &self.tournaments.status,
            Page::TournamentDetail => &self.tournaments.detail_status,
        }
    }

    pub fn issue_token(&mut self, page: Page) -> RequestToken {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.status_mut(page).begin(token);
        token
    }

    pub fn is_current(&self, page: Page, token: RequestToken) -> bool {
        self.status(page).is_current(token)
    }

    pub fn begin_profile_search(&mut self) -> Option<ProviderCommand> {
        let username = self.profile.query.trim().to_string();
        if username.is_empty() {
            return None;
        }
        let token = self.issue_token(Page::Profile);
        self.profile.profile = None;
        self.profile.history.clear();
        self.profile.games.clear();
        Some(ProviderCommand::FetchProfile { token, username })
    }

    pub fn begin_leaderboard_fetch(&mut self) -> ProviderCommand {
        let token = self.issue_token(Page::Leaderboard);
        ProviderCommand::FetchLeaderboard {
            token,
            variant: self.leaderboard.variant,
        }
    }

    pub fn select_variant(&mut self, variant: Variant) -> ProviderCommand {
        self.leaderboard.variant = variant;
        self.leaderboard.entries.clear();
        self.leaderboard.selected = 0;
        self.begin_leaderboard_fetch()
    }

    pub fn begin_tournaments_fetch(&mut self) -> ProviderCommand {
        let token = self.issue_token(Page::Tournaments);
        ProviderCommand::FetchTournaments { token }
    }

    pub fn begin_tournament_detail(&mut self, now_ms: i64) -> Option<ProviderCommand> {
        let upcoming = self.upcoming_tournaments(now_ms);
        let idx = self.selected_tournament_index(&upcoming)?;
        let id = upcoming[idx].id.clone()?;
        self.select_tournament(&upcoming, idx);
        let token = self.issue_token(Page::TournamentDetail);
        self.tournaments.detail = None;
        self.tournaments.results.clear();
        Some(ProviderCommand::FetchTournamentDetail { token, id })
    }

    pub fn upcoming_tournaments(&self, now_ms: i64) -> Vec<Tournament> {
        format::upcoming_tournaments(&self.tournaments.listed, now_ms)
    }

    /// Row of the selected tournament within `upcoming`.
    ///
    /// When the selected tournament has started since it was picked, the
    /// selection moves to the next upcoming entry after it in the listing,
    /// or to the last row when nothing follows.
    pub fn selected_tournament_index(&self, upcoming: &[Tournament]) -> Option<usize> {
        if upcoming.is_empty() {
            return None;
        }
        let page = &self.tournaments;
        let Some(id) = page.selected_id.as_deref() else {
            return Some(page.selected_row.min(upcoming.len() - 1));
        };
        if let Some(idx) = upcoming.iter().position(|t| t.id.as_deref() == Some(id)) {
            return Some(idx);
        }
        let Some(listed_pos) = page.listed.iter().position(|t| t.id.as_deref() == Some(id)) else {
            return Some(page.selected_row.min(upcoming.len() - 1));
        };
        let following = page.listed[listed_pos..]
            .iter()
            .filter_map(|t| t.id.as_deref())
            .find_map(|later| upcoming.iter().position(|u| u.id.as_deref() == Some(later)));
        Some(following.unwrap_or(upcoming.len() - 1))
    }

    fn select_tournament(&mut self, upcoming: &[Tournament], idx: usize) {
        self.tournaments.selected_row = idx;
        self.tournaments.selected_id = upcoming.get(idx).and_then(|t| t.id.clone());
    }

    pub fn select_next(&mut self, now_ms: i64) {
        match self.screen {
            Screen::Leaderboards => {
                let len = self.leaderboard.entries.len();
                if len > 0 && self.leaderboard.selected + 1 < len {
                    self.leaderboard.selected += 1;
                }
            }
            Screen::Tournaments => {
                let upcoming = self.upcoming_tournaments(now_ms);
                if let Some(idx) = self.selected_tournament_index(&upcoming) {
                    let next = (idx + 1).min(upcoming.len() - 1);
                    self.select_tournament(&upcoming, next);
                }
            }
            _ => {}
        }
    }

    pub fn select_prev(&mut self, now_ms: i64) {
        match self.screen {
            Screen::Leaderboards => {
                self.leaderboard.selected = self.leaderboard.selected.saturating_sub(1);
            }
            Screen::Tournaments => {
                let upcoming = self.upcoming_tournaments(now_ms);
                if let Some(idx) = self.selected_tournament_index(&upcoming) {
                    self.select_tournament(&upcoming, idx.saturating_sub(1));
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    ProfileLoaded {
        token: RequestToken,
        profile: Box<UserProfile>,
        history: Vec<RatingSeries>,
        games: Vec<GameSummary>,
    },
    LeaderboardLoaded {
        token: RequestToken,
        variant: Variant,
        entries: Vec<LeaderboardEntry>,
    },
    TournamentsLoaded {
        token: RequestToken,
        created: Vec<Tournament>,
    },
    TournamentDetailLoaded {
        token: RequestToken,
        tournament: Box<Tournament>,
        results: Vec<TournamentResult>,
    },
    Failed {
        page: Page,
        token: RequestToken,
        message: String,
    },
    Log(String),
}

impl Delta {
    fn target(&self) -> Option<(Page, RequestToken)> {
        match self {
            Delta::ProfileLoaded { token, .. } => Some((Page::Profile, *token)),
            Delta::LeaderboardLoaded { token, .. } => Some((Page::Leaderboard, *token)),
            Delta::TournamentsLoaded { token, .. } => Some((Page::Tournaments, *token)),
            Delta::TournamentDetailLoaded { token, .. } => {
                Some((Page::TournamentDetail, *token))
            }
            Delta::Failed { page, token, .. } => Some((*page, *token)),
            Delta::Log(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchProfile {
        token: RequestToken,
        username: String,
    },
    FetchLeaderboard {
        token: RequestToken,
        variant: Variant,
    },
    FetchTournaments {
        token: RequestToken,
    },
    FetchTournamentDetail {
        token: RequestToken,
        id: String,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    if let Some((page, token)) = delta.target() {
        if !state.is_current(page, token) {
            debug!(page = page.label(), token = token.0, "dropping stale response");
            state.push_log(format!("[INFO] Dropped stale {} response", page.label()));
            return;
        }
        state.status_mut(page).loading = false;
    }

    match delta {
        Delta::ProfileLoaded {
            profile,
            history,
            games,
            ..
        } => {
            state.profile.profile = Some(*profile);
            state.profile.history = history;
            state.profile.games = games;
        }
        Delta::LeaderboardLoaded {
            variant, entries, ..
        } => {
            state.leaderboard.variant = variant;
            state.leaderboard.entries = entries;
            let len = state.leaderboard.entries.len();
            state.leaderboard.selected = state.leaderboard.selected.min(len.saturating_sub(1));
        }
        Delta::TournamentsLoaded { created, .. } => {
            state.tournaments.listed = created;
            state.tournaments.selected_id = None;
            state.tournaments.selected_row = 0;
        }
        Delta::TournamentDetailLoaded {
            tournament,
            results,
            ..
        } => {
            state.tournaments.detail = Some(*tournament);
            state.tournaments.results = results;
        }
        Delta::Failed { page, message, .. } => {
            state.status_mut(page).error = Some(message);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase_across_pages() {
        let mut state = AppState::new(Variant::Rapid);
        let a = state.issue_token(Page::Profile);
        let b = state.issue_token(Page::Leaderboard);
        assert!(b > a);
        assert!(state.is_current(Page::Profile, a));
        assert!(state.is_current(Page::Leaderboard, b));
        assert!(!state.is_current(Page::Leaderboard, a));
    }

    #[test]
    fn blank_search_issues_nothing() {
        let mut state = AppState::new(Variant::Rapid);
        state.profile.query = "   ".to_string();
        assert!(state.begin_profile_search().is_none());
        assert!(state.profile.status.latest.is_none());
    }

    #[test]
    fn search_trims_username() {
        let mut state = AppState::new(Variant::Rapid);
        state.profile.query = "  thibault ".to_string();
        let cmd = state.begin_profile_search().expect("command");
        assert!(matches!(
            cmd,
            ProviderCommand::FetchProfile { ref username, .. } if username == "thibault"
        ));
        assert!(state.profile.status.loading);
    }

    #[test]
    fn log_ring_is_bounded() {
        let mut state = AppState::new(Variant::Rapid);
        for i in 0..250 {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
    }
}
