/// HTTP router
use crate::{api, middleware, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application router under `/api`
pub fn create_router(app_state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(api::health::health));

    let protected_routes = Router::new()
        // Playlists
        .route("/playlists/:id", delete(api::playlists::delete_playlist))
        .route(
            "/playlists/:id/songs",
            get(api::playlists::list_songs).post(api::playlists::add_song),
        )
        .route(
            "/playlists/:id/songs/:song_id",
            delete(api::playlists::remove_song),
        )
        .route("/playlists/:id/reorder", patch(api::playlists::reorder_songs))
        .route("/playlists/:id/activity", get(api::playlists::activity))
        // Albums
        .route("/albums/:id", delete(api::albums::delete_album))
        .route(
            "/albums/:id/songs",
            get(api::albums::list_tracks).post(api::albums::add_tracks),
        )
        .route(
            "/albums/:id/songs/reorder",
            patch(api::albums::reorder_tracks),
        )
        .route(
            "/albums/:id/songs/:song_id",
            post(api::albums::add_track).delete(api::albums::remove_track),
        )
        // Play queue
        .route(
            "/queue",
            get(api::queue::list_queue)
                .post(api::queue::enqueue)
                .delete(api::queue::clear_queue),
        )
        .route("/queue/reorder", patch(api::queue::reorder_queue))
        .route("/queue/:entry_id", delete(api::queue::remove_entry))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&app_state.auth_service),
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
