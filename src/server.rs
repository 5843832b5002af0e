use std::{future, io, net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Json, Router,
};
use serde::{de::IgnoredAny, Deserialize};
use tokio::{net::TcpListener, signal};

use crate::calendar::Calendar;
use crate::schedule::CourseSchedule;

pub const OCCURRENCES_PATH: &str = "/occurrences";
pub const DEFAULT_CALENDAR_NAME: &str = "Courses";

#[derive(Debug, Clone)]
pub struct AppState {
    pub term_year: i32,
}

#[derive(Deserialize)]
struct OccurrenceQuery {
    #[serde(default)]
    ics: bool,
    name: Option<String>,
}

#[derive(Deserialize)]
struct OccurrenceRequest {
    #[serde(default)]
    schedules: Vec<ScheduleEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScheduleEntry {
    Schedule(CourseSchedule),
    Unreadable(IgnoredAny),
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(OCCURRENCES_PATH, post(handle_occurrences))
        .fallback(|| async { Redirect::permanent(env!("CARGO_PKG_REPOSITORY")) })
        .with_state(Arc::new(state))
}

pub async fn serve(address: SocketAddr, state: AppState) -> io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!("Listening at http://{address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(%err, "failed to install Ctrl-C handler");
        future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn handle_occurrences(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OccurrenceQuery>,
    Json(request): Json<OccurrenceRequest>,
) -> Response {
    let schedules = request
        .schedules
        .into_iter()
        .filter_map(|entry| match entry {
            ScheduleEntry::Schedule(schedule) => Some(schedule),
            ScheduleEntry::Unreadable(_) => {
                tracing::warn!("skipping schedule record that is not an object");
                None
            }
        })
        .map(|mut schedule| {
            if schedule.date_range.is_some() && schedule.year.is_none() {
                schedule.year = Some(state.term_year);
            }
            schedule
        })
        .collect::<Vec<_>>();

    let name = query
        .name
        .unwrap_or_else(|| DEFAULT_CALENDAR_NAME.to_owned());
    let calendar = Calendar::from_schedules(name, &schedules);

    tracing::info!(
        courses = schedules.len(),
        occurrences = calendar.occurrences.len(),
        "materialized calendar"
    );

    if query.ics {
        return (
            [(header::CONTENT_TYPE, "text/calendar")],
            calendar.to_ics().to_string(),
        )
            .into_response();
    }

    Json(calendar.occurrences).into_response()
}
