//! Liveness probe. Does not touch the identity store.

pub async fn health_check() -> &'static str {
    "OK"
}
