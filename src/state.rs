use crate::calendar::Clock;
use crate::config::Settings;
use crate::errors::AppError;
use crate::fetcher::StatsClient;
use crate::models::{GoalConfig, SeriesSnapshot};
use crate::storage::{persist_profile, StoredProfile};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Mutable view state: selected user, goal settings and the one series buffer.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: Option<String>,
    pub goal: GoalConfig,
    pub snapshot: Option<Arc<SeriesSnapshot>>,
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub clock: Clock,
    pub client: StatsClient,
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(settings: Settings, profile: StoredProfile) -> Self {
        let clock = Clock::new(settings.timezone);
        let client = StatsClient::new(
            settings.upstream_base_url.clone(),
            settings.timezone,
            settings.batch_size,
        );
        let session = Session {
            username: profile.username.or_else(|| settings.default_username.clone()),
            goal: settings.goal,
            snapshot: None,
        };
        Self {
            settings: Arc::new(settings),
            clock,
            client,
            session: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn current_user(&self) -> Option<String> {
        self.session.lock().await.username.clone()
    }

    /// Switches the tracked user, persists the choice and drops the old series.
    pub async fn select_user(&self, username: &str) -> Result<(), AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::bad_request("username must not be empty"));
        }

        // The file is written under the lock so it always names the session's user.
        let mut session = self.session.lock().await;
        persist_profile(
            &self.settings.data_path,
            &StoredProfile {
                username: Some(username.to_string()),
            },
        )
        .await?;
        session.username = Some(username.to_string());
        session.snapshot = None;
        info!(user = username, "selected user");
        Ok(())
    }

    /// Fetches a fresh snapshot for `username` and installs it, unless the
    /// selection moved on to another user while the fetch was in flight.
    pub async fn reload(&self, username: &str) -> Arc<SeriesSnapshot> {
        let today = self.clock.today();
        let snapshot = Arc::new(self.client.load_snapshot(username, today).await);

        let mut session = self.session.lock().await;
        if session.username.as_deref() == Some(username) {
            session.snapshot = Some(Arc::clone(&snapshot));
        } else {
            info!(user = username, "discarding stats for a user that is no longer selected");
        }
        snapshot
    }

    /// The current user's snapshot, loading it on first use and again once
    /// the local date has moved past the day it was fetched on.
    pub async fn snapshot(&self) -> Result<(Arc<SeriesSnapshot>, GoalConfig), AppError> {
        let today = self.clock.today();
        let (username, cached, goal) = {
            let session = self.session.lock().await;
            let username = session
                .username
                .clone()
                .ok_or_else(|| AppError::not_found("no user selected"))?;
            let cached = session
                .snapshot
                .clone()
                .filter(|snapshot| snapshot.username == username && snapshot.fetched_on == today);
            (username, cached, session.goal)
        };

        match cached {
            Some(snapshot) => Ok((snapshot, goal)),
            None => Ok((self.reload(&username).await, goal)),
        }
    }
}
