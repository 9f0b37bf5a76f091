use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::auth::RegisterOutcome;
use crate::app::blogs::BlogService;
use crate::app::engagement::EngagementService;
use crate::app::events::EventService;
use crate::app::leaderboard::LEADERBOARD_LIMIT;
use crate::app::notifications::NotificationService;
use crate::app::posts::PostService;
use crate::app::properties::PropertyService;
use crate::app::service_listings::ServiceListingService;
use crate::app::users::UserService;
use crate::domain::engagement::{Comment, LikeTarget, LikeToggle};
use crate::domain::leaderboard::LeaderboardEntry;
use crate::domain::listing::{
    Blog, CreateBlogRequest, CreateEventRequest, CreatePropertyRequest, CreateServiceRequest,
    Event, ListingFilter, Property, ServiceListing,
};
use crate::domain::notification::Notification;
use crate::domain::post::{CreateCommentRequest, CreatePostRequest, Post};
use crate::domain::user::{LoginRequest, PublicUser, RegisterRequest, User};
use crate::http::{AdminToken, AppError, AuthUser};
use crate::AppState;

type Created<T> = (StatusCode, Json<T>);

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

#[derive(Serialize)]
pub struct ToggleResponse<T> {
    pub message: String,
    pub data: T,
    pub liked: bool,
}

impl<T> ToggleResponse<T> {
    fn new(target: LikeTarget, toggle: LikeToggle<T>) -> Self {
        let verb = if toggle.liked { "liked" } else { "unliked" };
        Self {
            message: format!("{} {}", target.label(), verb),
            data: toggle.entity,
            liked: toggle.liked,
        }
    }
}

#[derive(Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl ListingQuery {
    fn into_filter(self) -> Result<ListingFilter, AppError> {
        Ok(ListingFilter::new(self.category, self.search, self.limit)?)
    }
}

/// Forum posts have no category; unknown parameters are rejected.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl PostQuery {
    fn into_filter(self) -> Result<ListingFilter, AppError> {
        Ok(ListingFilter::new(None, self.search, self.limit)?)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentQuery {
    pub limit: Option<i64>,
}

impl CommentQuery {
    fn into_limit(self) -> Result<i64, AppError> {
        Ok(ListingFilter::new(None, None, self.limit)?.limit)
    }
}

#[derive(Deserialize)]
pub struct EventQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub upcoming: bool,
}

#[derive(Deserialize)]
pub struct NotificationQuery {
    pub limit: Option<i64>,
    #[serde(default)]
    pub unread_only: bool,
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::bad_request(format!("invalid {} id", what)))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    let Json(payload) = payload?;
    Ok(payload)
}

fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    let Query(query) = query?;
    Ok(query)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db = state.db.ping().await.is_ok();
    let redis = state.cache.ping().await.is_ok();
    let status = if db && redis { "ok" } else { "degraded" };

    Json(HealthResponse { status })
}

/// Diagnostic route: the driver error is returned to the caller verbatim.
pub(crate) async fn health_db(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, AppError> {
    state.db.ping().await.map_err(|err| {
        tracing::error!(error = ?err, "database ping failed");
        AppError::internal(format!("database unavailable: {:#}", err))
    })?;

    Ok(Json(HealthResponse { status: "ok" }))
}

// ---------------------------------------------------------------------------
// Auth and users
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Created<User>, AppError> {
    let new_user = body(payload)?.validate().map_err(AppError::validation)?;

    let outcome = state.auth_service().register(new_user).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to register user");
        AppError::internal("failed to register user")
    })?;

    match outcome {
        RegisterOutcome::Created(user) => {
            tracing::info!(user_id = %user.id, "user registered");
            Ok((StatusCode::CREATED, Json(user)))
        }
        RegisterOutcome::HandleTaken => Err(AppError::conflict("handle already taken")),
        RegisterOutcome::EmailTaken => Err(AppError::conflict("email already taken")),
    }
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let payload = body(payload)?;
    let identifier = payload.identifier.unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    if identifier.trim().is_empty() || password.is_empty() {
        return Err(AppError::bad_request("identifier and password are required"));
    }

    let token = state
        .auth_service()
        .login(&identifier, &password)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to login");
            AppError::internal("failed to login")
        })?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    Ok(Json(AccessTokenResponse {
        access_token: token.token,
        expires_at: token.expires_at,
    }))
}

pub async fn get_current_user(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let service = UserService::new(state.db.clone());
    let user = service.get_user(auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to fetch current user");
        AppError::internal("failed to fetch current user")
    })?;

    match user {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::not_found("user not found")),
    }
}

pub async fn get_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PublicUser>, AppError> {
    let id = parse_id(&id, "user")?;
    let service = UserService::new(state.db.clone());
    let user = service.get_user(id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to fetch user");
        AppError::internal("failed to fetch user")
    })?;

    match user {
        Some(user) => Ok(Json(user.into())),
        None => Err(AppError::not_found("user not found")),
    }
}

// ---------------------------------------------------------------------------
// Forum posts, comments and likes
// ---------------------------------------------------------------------------

pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<Created<Post>, AppError> {
    let new_post = body(payload)?.validate().map_err(AppError::validation)?;

    let service = PostService::new(state.db.clone());
    let post = service
        .create_post(auth.user_id, new_post)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create post");
            AppError::internal("failed to create post")
        })?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_posts(
    State(state): State<AppState>,
    params: Result<Query<PostQuery>, QueryRejection>,
) -> Result<Json<ListResponse<Post>>, AppError> {
    let filter = query(params)?.into_filter()?;

    let service = PostService::new(state.db.clone());
    let posts = service
        .list_posts(filter.search.as_deref(), filter.limit)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to list posts");
            AppError::internal("failed to list posts")
        })?;

    Ok(Json(ListResponse { items: posts }))
}

pub async fn get_post(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Post>, AppError> {
    let id = parse_id(&id, "post")?;
    let service = PostService::new(state.db.clone());
    let post = service.get_post(id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to fetch post");
        AppError::internal("failed to fetch post")
    })?;

    match post {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::not_found("post not found")),
    }
}

pub async fn toggle_post_like(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ToggleResponse<Post>>, AppError> {
    let id = parse_id(&id, "post")?;
    let service = EngagementService::new(state.db.clone());
    let toggle = service
        .toggle_post_like(id, auth.user_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, post_id = %id, "failed to toggle post like");
            AppError::internal("failed to toggle like")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;

    Ok(Json(ToggleResponse::new(LikeTarget::Post, toggle)))
}

pub async fn comment_post(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<Created<Comment>, AppError> {
    let id = parse_id(&id, "post")?;
    let comment_body = body(payload)?.validate().map_err(AppError::validation)?;

    let service = EngagementService::new(state.db.clone());
    let comment = service
        .comment_post(id, auth.user_id, comment_body)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, post_id = %id, "failed to comment on post");
            AppError::internal("failed to comment on post")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_post_comments(
    Path(id): Path<String>,
    State(state): State<AppState>,
    params: Result<Query<CommentQuery>, QueryRejection>,
) -> Result<Json<ListResponse<Comment>>, AppError> {
    let id = parse_id(&id, "post")?;
    let limit = query(params)?.into_limit()?;

    let service = EngagementService::new(state.db.clone());
    let comments = service
        .list_comments(id, limit)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to list comments");
            AppError::internal("failed to list comments")
        })?
        .ok_or_else(|| AppError::not_found("post not found"))?;

    Ok(Json(ListResponse { items: comments }))
}

pub async fn toggle_comment_like(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ToggleResponse<Comment>>, AppError> {
    let id = parse_id(&id, "comment")?;
    let service = EngagementService::new(state.db.clone());
    let toggle = service
        .toggle_comment_like(id, auth.user_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, comment_id = %id, "failed to toggle comment like");
            AppError::internal("failed to toggle like")
        })?
        .ok_or_else(|| AppError::not_found("comment not found"))?;

    Ok(Json(ToggleResponse::new(LikeTarget::Comment, toggle)))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

pub async fn create_property(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreatePropertyRequest>, JsonRejection>,
) -> Result<Created<Property>, AppError> {
    let property = body(payload)?.validate().map_err(AppError::validation)?;

    let service = PropertyService::new(state.db.clone());
    let property = service.create(auth.user_id, property).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create property");
        AppError::internal("failed to create property")
    })?;

    Ok((StatusCode::CREATED, Json(property)))
}

pub async fn list_properties(
    State(state): State<AppState>,
    params: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<ListResponse<Property>>, AppError> {
    let filter = query(params)?.into_filter()?;

    let service = PropertyService::new(state.db.clone());
    let properties = service.list(&filter).await.map_err(|err| {
        tracing::error!(error = ?err, ?filter, "failed to list properties");
        AppError::internal("failed to list properties")
    })?;

    Ok(Json(ListResponse { items: properties }))
}

pub async fn get_property(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Property>, AppError> {
    let id = parse_id(&id, "property")?;
    let service = PropertyService::new(state.db.clone());
    let property = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, property_id = %id, "failed to fetch property");
        AppError::internal("failed to fetch property")
    })?;

    match property {
        Some(property) => Ok(Json(property)),
        None => Err(AppError::not_found("property not found")),
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

pub async fn create_service(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateServiceRequest>, JsonRejection>,
) -> Result<Created<ServiceListing>, AppError> {
    let listing = body(payload)?.validate().map_err(AppError::validation)?;

    let service = ServiceListingService::new(state.db.clone());
    let listing = service.create(auth.user_id, listing).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create service");
        AppError::internal("failed to create service")
    })?;

    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn list_services(
    State(state): State<AppState>,
    params: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<ListResponse<ServiceListing>>, AppError> {
    let filter = query(params)?.into_filter()?;

    let service = ServiceListingService::new(state.db.clone());
    let listings = service.list(&filter).await.map_err(|err| {
        tracing::error!(error = ?err, ?filter, "failed to list services");
        AppError::internal("failed to list services")
    })?;

    Ok(Json(ListResponse { items: listings }))
}

pub async fn get_service(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ServiceListing>, AppError> {
    let id = parse_id(&id, "service")?;
    let service = ServiceListingService::new(state.db.clone());
    let listing = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, service_id = %id, "failed to fetch service");
        AppError::internal("failed to fetch service")
    })?;

    match listing {
        Some(listing) => Ok(Json(listing)),
        None => Err(AppError::not_found("service not found")),
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Created<Event>, AppError> {
    let event = body(payload)?.validate().map_err(AppError::validation)?;

    let service = EventService::new(state.db.clone());
    let event = service.create(auth.user_id, event).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create event");
        AppError::internal("failed to create event")
    })?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<EventQuery>, QueryRejection>,
) -> Result<Json<ListResponse<Event>>, AppError> {
    let params = query(params)?;
    let filter = ListingFilter::new(params.category, params.search, params.limit)?;

    let service = EventService::new(state.db.clone());
    let events = service
        .list(&filter, params.upcoming)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, ?filter, "failed to list events");
            AppError::internal("failed to list events")
        })?;

    Ok(Json(ListResponse { items: events }))
}

pub async fn get_event(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Event>, AppError> {
    let id = parse_id(&id, "event")?;
    let service = EventService::new(state.db.clone());
    let event = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, event_id = %id, "failed to fetch event");
        AppError::internal("failed to fetch event")
    })?;

    match event {
        Some(event) => Ok(Json(event)),
        None => Err(AppError::not_found("event not found")),
    }
}

// ---------------------------------------------------------------------------
// Blogs
// ---------------------------------------------------------------------------

pub async fn create_blog(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateBlogRequest>, JsonRejection>,
) -> Result<Created<Blog>, AppError> {
    let blog = body(payload)?.validate().map_err(AppError::validation)?;

    let service = BlogService::new(state.db.clone());
    let blog = service.create(auth.user_id, blog).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create blog");
        AppError::internal("failed to create blog")
    })?;

    Ok((StatusCode::CREATED, Json(blog)))
}

pub async fn list_blogs(
    State(state): State<AppState>,
    params: Result<Query<ListingQuery>, QueryRejection>,
) -> Result<Json<ListResponse<Blog>>, AppError> {
    let filter = query(params)?.into_filter()?;

    let service = BlogService::new(state.db.clone());
    let blogs = service.list(&filter).await.map_err(|err| {
        tracing::error!(error = ?err, ?filter, "failed to list blogs");
        AppError::internal("failed to list blogs")
    })?;

    Ok(Json(ListResponse { items: blogs }))
}

pub async fn get_blog(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Blog>, AppError> {
    let id = parse_id(&id, "blog")?;
    let service = BlogService::new(state.db.clone());
    let blog = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, blog_id = %id, "failed to fetch blog");
        AppError::internal("failed to fetch blog")
    })?;

    match blog {
        Some(blog) => Ok(Json(blog)),
        None => Err(AppError::not_found("blog not found")),
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    params: Result<Query<NotificationQuery>, QueryRejection>,
) -> Result<Json<ListResponse<Notification>>, AppError> {
    let params = query(params)?;
    let limit = params.limit.unwrap_or(30);
    if !(1..=200).contains(&limit) {
        return Err(AppError::bad_request("limit must be between 1 and 200"));
    }

    let service = NotificationService::new(state.db.clone());
    let notifications = service
        .list(auth.user_id, params.unread_only, limit)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, "failed to list notifications");
            AppError::internal("failed to list notifications")
        })?;

    Ok(Json(ListResponse {
        items: notifications,
    }))
}

pub async fn mark_notification_read(
    Path(id): Path<String>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Notification>, AppError> {
    let id = parse_id(&id, "notification")?;
    let service = NotificationService::new(state.db.clone());
    let notification = service
        .mark_read(id, auth.user_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, notification_id = %id, "failed to mark notification read");
            AppError::internal("failed to mark notification read")
        })?;

    match notification {
        Some(notification) => Ok(Json(notification)),
        None => Err(AppError::not_found("notification not found")),
    }
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<LeaderboardEntry>>, AppError> {
    let entries = state
        .leaderboard_service()
        .get_leaderboard(LEADERBOARD_LIMIT)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to load leaderboard");
            AppError::internal("failed to load leaderboard")
        })?;

    Ok(Json(ListResponse { items: entries }))
}

#[derive(Deserialize)]
pub struct SetScoreRequest {
    pub score: Option<i64>,
}

pub async fn set_leaderboard_score(
    _admin: AdminToken,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<SetScoreRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    let score = body(payload)?
        .score
        .ok_or_else(|| AppError::bad_request("score is required"))?;

    let updated = state
        .leaderboard_service()
        .set_score(user_id, score)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %user_id, "failed to set leaderboard score");
            AppError::internal("failed to set leaderboard score")
        })?;

    if updated {
        tracing::info!(user_id = %user_id, score, "leaderboard score set");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("user not found"))
    }
}
