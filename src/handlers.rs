use crate::errors::AppError;
use crate::metrics::build_metrics_at;
use crate::models::{
    DashboardResponse, GoalConfig, GoalConfigUpdate, NamedDuration, SeriesSnapshot, UserRequest,
};
use crate::state::AppState;
use crate::ui::{render_dashboard, render_login};
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};
use tracing::info;

const TOP_LANGUAGES: usize = 5;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    match state.current_user().await {
        Some(username) => Html(render_dashboard(&username)),
        None => Html(render_login(None)),
    }
}

pub async fn login_form(State(state): State<AppState>) -> Html<String> {
    let current = state.current_user().await;
    Html(render_login(current.as_deref()))
}

pub async fn login(
    State(state): State<AppState>,
    Form(payload): Form<UserRequest>,
) -> Result<Redirect, AppError> {
    state.select_user(&payload.username).await?;
    Ok(Redirect::to("/"))
}

pub async fn set_user(
    State(state): State<AppState>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    state.select_user(&payload.username).await?;
    let (snapshot, goal) = state.snapshot().await?;
    Ok(Json(dashboard_response(&state, &snapshot, &goal)))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, AppError> {
    let (snapshot, goal) = state.snapshot().await?;
    Ok(Json(dashboard_response(&state, &snapshot, &goal)))
}

pub async fn refresh(State(state): State<AppState>) -> Result<Json<DashboardResponse>, AppError> {
    let username = state
        .current_user()
        .await
        .ok_or_else(|| AppError::not_found("no user selected"))?;
    let snapshot = state.reload(&username).await;
    let goal = state.session.lock().await.goal;
    Ok(Json(dashboard_response(&state, &snapshot, &goal)))
}

pub async fn get_config(State(state): State<AppState>) -> Json<GoalConfig> {
    Json(state.session.lock().await.goal)
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<GoalConfigUpdate>,
) -> Result<Json<GoalConfig>, AppError> {
    let mut session = state.session.lock().await;
    let mut goal = session.goal;
    goal.apply(&update);
    goal.validate().map_err(AppError::bad_request)?;

    session.goal = goal;
    info!(mode = %goal.mode, "goal settings updated");
    Ok(Json(goal))
}

fn dashboard_response(state: &AppState, snapshot: &SeriesSnapshot, goal: &GoalConfig) -> DashboardResponse {
    let today = state.clock.today();
    DashboardResponse {
        username: snapshot.username.clone(),
        today,
        fetched_on: snapshot.fetched_on,
        timezone: state.clock.timezone().name().to_string(),
        goal: *goal,
        metrics: build_metrics_at(today, &snapshot.series, snapshot.year_total_seconds, goal),
        top_languages: top_languages(snapshot),
    }
}

fn top_languages(snapshot: &SeriesSnapshot) -> Vec<NamedDuration> {
    let mut languages = snapshot
        .today
        .as_ref()
        .map(|stats| stats.languages.clone())
        .unwrap_or_default();
    languages.sort_by(|a, b| b.total_seconds.total_cmp(&a.total_seconds));
    languages.truncate(TOP_LANGUAGES);
    languages
}
