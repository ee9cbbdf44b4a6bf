//! Middleware for the API router. CORS stays permissive; the service is
//! expected to sit behind its own gateway.
use tower_http::cors::CorsLayer;

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}
