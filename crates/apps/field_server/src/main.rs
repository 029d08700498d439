use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use formats::FieldCollection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Serves the oil-field GeoJSON next to the web viewer.
#[derive(Debug, Parser)]
struct Args {
    #[arg(long, env = "FIELD_ADDR", default_value = "127.0.0.1:9200")]
    addr: SocketAddr,
    /// GeoJSON FeatureCollection to serve.
    #[arg(
        long,
        env = "FIELD_DATA",
        default_value = "crates/apps/field_server/assets/geojson/oilfields.geojson"
    )]
    data: PathBuf,
    #[arg(long, default_value = "fldName")]
    name_property: String,
}

#[derive(Clone)]
struct AppState {
    data: Arc<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    check_data(&args.data, &args.name_property).await;

    let app = router(AppState {
        data: Arc::new(args.data),
    });

    let listener = match tokio::net::TcpListener::bind(args.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("bind {} failed: {err}", args.addr);
            std::process::exit(1);
        }
    };
    info!("field server listening on http://{}", args.addr);
    if let Err(err) = axum::serve(listener, app).await {
        error!("server stopped: {err}");
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/geojson/oilfields.geojson", get(get_fields))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parses the data file once at startup so bad data shows up in the log.
/// The server still starts; clients then see the same failure.
async fn check_data(path: &Path, name_property: &str) -> Option<usize> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) => {
            warn!("field data {path:?} unreadable: {err}");
            return None;
        }
    };
    match FieldCollection::from_geojson_str(&text, name_property) {
        Ok(collection) => {
            for skipped in &collection.skipped {
                warn!(
                    index = skipped.index,
                    reason = %skipped.reason,
                    "feature skipped"
                );
            }
            info!(
                fields = collection.fields.len(),
                skipped = collection.skipped.len(),
                "field data {path:?} ok"
            );
            Some(collection.fields.len())
        }
        Err(err) => {
            warn!("field data {path:?} invalid: {err}");
            None
        }
    }
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_fields(State(state): State<AppState>) -> Response {
    serve_file(&state.data, "application/geo+json").await
}

async fn serve_file(path: &Path, content_type: &str) -> Response {
    match tokio::fs::read(path).await {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_str(content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/json")),
            );
            (StatusCode::OK, headers, Body::from(data)).into_response()
        }
        Err(err) => {
            error!("file read failed: {path:?} -> {err}");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{check_data, serve_file};
    use axum::http::StatusCode;
    use std::path::PathBuf;

    fn bundled() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/geojson/oilfields.geojson")
    }

    #[tokio::test]
    async fn bundled_data_parses() {
        assert_eq!(check_data(&bundled(), "fldName").await, Some(4));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let missing = bundled().with_file_name("missing.geojson");
        assert_eq!(check_data(&missing, "fldName").await, None);
        let resp = serve_file(&missing, "application/geo+json").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn serves_geojson_content_type() {
        let resp = serve_file(&bundled(), "application/geo+json").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/geo+json")
        );
    }
}
