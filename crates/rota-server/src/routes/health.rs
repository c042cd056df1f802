/// GET /healthz: liveness probe, no auth.
pub async fn healthz() -> &'static str {
    "ok"
}
