// HTTP surface: the player pool view and the lineups view.
//
// Handlers are stateless beyond the explicit session store; every request
// re-fetches and re-parses the feed, which is an accepted cost at this data
// volume.

pub mod session;
pub mod views;

use std::convert::Infallible;
use std::sync::Arc;

use tracing::{debug, error};
use warp::http::{header, StatusCode};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::config::ContestConfig;
use crate::lineup::builder::build_lineups;
use crate::lineup::optimizer::LineupOptimizer;
use crate::pool::filter::filter_by_time;
use crate::pool::heuristic::ProjectionWeights;
use crate::pool::loader::{load_players, CsvSource};
use crate::pool::PlayerRow;
use crate::server::session::{new_session_id, FilterState, SessionStore};

// ---------------------------------------------------------------------------
// Shared request context
// ---------------------------------------------------------------------------

/// Everything a handler needs, passed explicitly so handlers stay
/// independently testable.
#[derive(Clone)]
pub struct AppContext {
    pub contest: ContestConfig,
    pub weights: ProjectionWeights,
    pub source: Arc<dyn CsvSource>,
    pub optimizer: Arc<dyn LineupOptimizer>,
    pub sessions: Arc<SessionStore>,
}

fn with_ctx(
    ctx: AppContext,
) -> impl Filter<Extract = (AppContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// The complete route tree: `GET /`, `POST /`, `GET /lineups`.
pub fn routes(
    ctx: AppContext,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let pool_get = warp::get()
        .and(warp::path::end())
        .and(with_ctx(ctx.clone()))
        .and(warp::cookie::optional("sid"))
        .and_then(player_pool);

    let pool_post = warp::post()
        .and(warp::path::end())
        .and(with_ctx(ctx.clone()))
        .and(warp::cookie::optional("sid"))
        .and(warp::body::content_length_limit(64 * 1024))
        .and(warp::body::form())
        .and_then(submit_selections);

    let lineups = warp::get()
        .and(warp::path("lineups"))
        .and(warp::path::end())
        .and(with_ctx(ctx))
        .and(warp::cookie::optional("sid"))
        .and_then(lineups_view);

    pool_get.or(pool_post).or(lineups)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Resolve the session for a request. A request without a cookie gets a
/// fresh id; the caller sets the cookie on the way out.
fn resolve_session(ctx: &AppContext, cookie: Option<String>) -> (String, FilterState, bool) {
    match cookie {
        Some(sid) => {
            let state = ctx.sessions.get(&sid);
            (sid, state, false)
        }
        None => (new_session_id(), FilterState::default(), true),
    }
}

/// Time-filter the loaded rows, then drop the session's exclusions.
fn visible_rows(rows: &[PlayerRow], state: &FilterState) -> Vec<PlayerRow> {
    filter_by_time(rows, state.time_filter)
        .into_iter()
        .filter(|row| !state.excluded_ids.contains(&row.unique_id))
        .collect()
}

async fn player_pool(
    ctx: AppContext,
    cookie: Option<String>,
) -> Result<Response, Infallible> {
    let (sid, state, is_new) = resolve_session(&ctx, cookie);
    let set_cookie = is_new.then(|| sid.clone());

    match load_players(ctx.source.as_ref(), &ctx.weights).await {
        Ok(pool) => {
            let rows = visible_rows(&pool.rows, &state);
            debug!("pool view: {} of {} rows visible", rows.len(), pool.rows.len());
            let body = views::player_pool_page(&rows, &pool.teams, &state);
            Ok(html_response(StatusCode::OK, body, set_cookie))
        }
        Err(e) => {
            error!("player pool load failed: {e}");
            let body = views::error_page(&e.to_string());
            Ok(html_response(StatusCode::BAD_GATEWAY, body, set_cookie))
        }
    }
}

async fn submit_selections(
    ctx: AppContext,
    cookie: Option<String>,
    form: Vec<(String, String)>,
) -> Result<Response, Infallible> {
    let (sid, _, is_new) = resolve_session(&ctx, cookie);
    let state = FilterState::from_form(&form);
    debug!(
        "session {sid}: {} locked, {} excluded, {} lineups, filter {}",
        state.locked_ids.len(),
        state.excluded_ids.len(),
        state.num_lineups,
        state.time_filter.as_str()
    );
    ctx.sessions.put(&sid, state);

    // Post/redirect/get, so a reload does not resubmit the form.
    Ok(redirect_response("/lineups", is_new.then(|| sid)))
}

async fn lineups_view(
    ctx: AppContext,
    cookie: Option<String>,
) -> Result<Response, Infallible> {
    let (sid, state, is_new) = resolve_session(&ctx, cookie);
    let set_cookie = is_new.then(|| sid.clone());

    match load_players(ctx.source.as_ref(), &ctx.weights).await {
        Ok(pool) => {
            let rows = visible_rows(&pool.rows, &state);
            let lineups = build_lineups(
                &rows,
                state.num_lineups,
                &state.locked_ids,
                &state.excluded_ids,
                state.stack_team.as_deref(),
                ctx.optimizer.as_ref(),
                &ctx.contest,
            );
            let body = views::lineups_page(&lineups, &state);
            Ok(html_response(StatusCode::OK, body, set_cookie))
        }
        Err(e) => {
            error!("lineups view load failed: {e}");
            let body = views::error_page(&e.to_string());
            Ok(html_response(StatusCode::BAD_GATEWAY, body, set_cookie))
        }
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn session_cookie(sid: &str) -> Option<header::HeaderValue> {
    header::HeaderValue::from_str(&format!("sid={sid}; Path=/; HttpOnly")).ok()
}

fn html_response(status: StatusCode, body: String, cookie: Option<String>) -> Response {
    let mut response = warp::reply::html(body).into_response();
    *response.status_mut() = status;
    if let Some(value) = cookie.as_deref().and_then(session_cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

fn redirect_response(location: &'static str, cookie: Option<String>) -> Response {
    let mut response = warp::reply::html(String::new()).into_response();
    *response.status_mut() = StatusCode::SEE_OTHER;
    response
        .headers_mut()
        .insert(header::LOCATION, header::HeaderValue::from_static(location));
    if let Some(value) = cookie.as_deref().and_then(session_cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
