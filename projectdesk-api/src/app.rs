/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use projectdesk_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = projectdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use projectdesk_shared::auth::{jwt, Principal};
use projectdesk_shared::models::user::User;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    pub fn jwt_issuer(&self) -> &str {
        &self.config.jwt.issuer
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET /health                              (public)
/// └── /v1/                                     (bearer token)
///     ├── /users            GET
///     ├── /users/:id        GET
///     ├── /projects         GET POST
///     ├── /projects/:id     GET PATCH DELETE
///     ├── /projects/:id/members  GET POST
///     ├── /projects/:id/tasks    GET POST      (nested)
///     ├── /tasks            GET POST           (direct)
///     ├── /tasks/:id        GET PATCH DELETE
///     ├── /tasks/:id/comments    GET POST      (nested)
///     ├── /comments         GET POST           (direct)
///     └── /comments/:id     GET PATCH DELETE
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{comments, health, projects, tasks, users};

    let health_routes = Router::new().route("/health", get(health::health_check));

    let v1_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user))
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/projects/:id/members",
            get(projects::list_members).post(projects::add_member),
        )
        .route(
            "/projects/:id/tasks",
            get(tasks::list_project_tasks).post(tasks::create_project_task),
        )
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/tasks/:id/comments",
            get(comments::list_task_comments).post(comments::create_task_comment),
        )
        .route(
            "/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/comments/:id",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication
///
/// Validates the token, loads the user named by `sub` and injects the
/// [`Principal`] into request extensions. Unknown users are rejected like
/// bad tokens.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret(), state.jwt_issuer())?;

    let user = User::find_by_id(&state.db, claims.sub).await?.ok_or_else(|| {
        tracing::debug!(user_id = %claims.sub, "Token subject does not exist");
        ApiError::Unauthorized("Unknown user".to_string())
    })?;

    req.extensions_mut().insert(Principal::from(&user));

    Ok(next.run(req).await)
}
