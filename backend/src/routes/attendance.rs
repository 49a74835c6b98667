//! Attendance API routes
//!
//! Every endpoint acts on behalf of the member named by the bearer token.

use crate::auth::MemberSession;
use crate::error::ApiResult;
use crate::services::AttendanceService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use gym_dashboard_shared::attendance::AttendanceRecord;
use gym_dashboard_shared::types::{
    AttendanceHistoryQuery, AttendanceSummaryResponse, CalendarQuery, CalendarResponse,
    TodayAttendanceResponse, UserAttendanceResponse,
};
use uuid::Uuid;

/// Create attendance routes
pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/today", get(get_today))
        .route("/check-in", post(check_in))
        .route("/check-out", post(check_out))
        .route("/user/:user_id", get(get_user_attendance))
        .route("/summary", get(get_summary))
        .route("/calendar", get(get_calendar))
}

/// GET /api/v1/attendance/today
async fn get_today(
    State(state): State<AppState>,
    session: MemberSession,
) -> ApiResult<Json<TodayAttendanceResponse>> {
    let attendance = AttendanceService::today(state.db(), session.user_id, Utc::now()).await?;
    Ok(Json(TodayAttendanceResponse { attendance }))
}

/// POST /api/v1/attendance/check-in
async fn check_in(
    State(state): State<AppState>,
    session: MemberSession,
) -> ApiResult<(StatusCode, Json<AttendanceRecord>)> {
    let record = AttendanceService::check_in(state.db(), session.user_id, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/v1/attendance/check-out
async fn check_out(
    State(state): State<AppState>,
    session: MemberSession,
) -> ApiResult<Json<AttendanceRecord>> {
    let record = AttendanceService::check_out(state.db(), session.user_id, Utc::now()).await?;
    Ok(Json(record))
}

/// GET /api/v1/attendance/user/:user_id?start_date=&limit=
async fn get_user_attendance(
    State(state): State<AppState>,
    session: MemberSession,
    Path(user_id): Path<Uuid>,
    Query(query): Query<AttendanceHistoryQuery>,
) -> ApiResult<Json<UserAttendanceResponse>> {
    let response = AttendanceService::user_attendance(
        state.db(),
        state.attendance(),
        session.user_id,
        user_id,
        &query,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/attendance/summary
async fn get_summary(
    State(state): State<AppState>,
    session: MemberSession,
) -> ApiResult<Json<AttendanceSummaryResponse>> {
    let response = AttendanceService::summary(
        state.db(),
        state.attendance(),
        session.user_id,
        Utc::now(),
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/v1/attendance/calendar?month=&year=
async fn get_calendar(
    State(state): State<AppState>,
    session: MemberSession,
    Query(query): Query<CalendarQuery>,
) -> ApiResult<Json<CalendarResponse>> {
    let response =
        AttendanceService::calendar(state.db(), session.user_id, query.month, query.year).await?;
    Ok(Json(response))
}
