use std::sync::Arc;

use axum::response::Html;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::jobs::{DashboardSnapshot, SnapshotAssembler};
use crate::store::{StoreConnector, StoreError};

pub struct ApiState<C> {
    pub snapshots: Arc<SnapshotAssembler<C>>,
}

impl<C> ApiState<C> {
    pub fn new(snapshots: SnapshotAssembler<C>) -> Self {
        Self {
            snapshots: Arc::new(snapshots),
        }
    }
}

// derive(Clone) would demand C: Clone
impl<C> Clone for ApiState<C> {
    fn clone(&self) -> Self {
        Self {
            snapshots: Arc::clone(&self.snapshots),
        }
    }
}

pub fn router<C>(state: ApiState<C>) -> Router
where
    C: StoreConnector + 'static,
{
    Router::new()
        .route("/", get(dashboard_index))
        .route("/api/data", get(get_dashboard_data::<C>))
        // Health
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

const DASHBOARD_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Job Queue Dashboard</title>
  <style>
    :root {
      color-scheme: light;
      --bg: #f6f7fb;
      --panel: #ffffff;
      --border: #d7dbe6;
      --text: #1b1f2a;
      --muted: #5b6275;
      --ok: #1a7f37;
      --bad: #cf222e;
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      font-family: "Segoe UI", "Helvetica Neue", Arial, sans-serif;
      background: var(--bg);
      color: var(--text);
    }
    header {
      padding: 20px 24px;
      border-bottom: 1px solid var(--border);
      background: var(--panel);
      display: flex;
      align-items: baseline;
      gap: 24px;
    }
    h1 { margin: 0; font-size: 20px; }
    .muted { color: var(--muted); font-size: 12px; }
    .count { font-size: 16px; }
    main { padding: 16px 24px 32px; }
    table {
      width: 100%;
      border-collapse: collapse;
      background: var(--panel);
      border: 1px solid var(--border);
      font-size: 13px;
    }
    th, td {
      text-align: left;
      padding: 6px 8px;
      border-bottom: 1px solid var(--border);
      vertical-align: top;
    }
    th { background: #eef1f7; }
    td.mono { font-family: ui-monospace, Menlo, monospace; word-break: break-all; }
    .complete { color: var(--ok); font-weight: 600; }
    .failed { color: var(--bad); font-weight: 600; }
  </style>
</head>
<body>
  <header>
    <h1>Job Queue Dashboard</h1>
    <div class="count">Queued: <strong id="queued">-</strong></div>
    <div class="muted" id="updated">loading...</div>
  </header>
  <main>
    <div class="muted">Best-effort recent window; not a complete history.</div>
    <table>
      <thead>
        <tr>
          <th>Job</th><th>Function</th><th>Status</th><th>Args</th><th>Result</th>
          <th>Enqueued</th><th>Started</th><th>Finished</th><th>Duration</th>
        </tr>
      </thead>
      <tbody id="jobs"></tbody>
    </table>
  </main>
  <script>
    function cell(text, cls) {
      const td = document.createElement("td");
      td.textContent = text == null ? "-" : String(text);
      if (cls) td.className = cls;
      return td;
    }

    async function refresh() {
      try {
        const res = await fetch("/api/data");
        const body = await res.json();
        if (!res.ok) {
          document.getElementById("updated").textContent = body.error || "request failed";
          return;
        }
        document.getElementById("queued").textContent = body.queued_count;
        const tbody = document.getElementById("jobs");
        tbody.innerHTML = "";
        for (const job of body.jobs) {
          const tr = document.createElement("tr");
          tr.appendChild(cell(job.job_id, "mono"));
          tr.appendChild(cell(job.function));
          tr.appendChild(cell(job.status, job.status));
          tr.appendChild(cell(job.args, "mono"));
          tr.appendChild(cell(job.result, "mono"));
          tr.appendChild(cell(job.enqueue_time));
          tr.appendChild(cell(job.start_time));
          tr.appendChild(cell(job.finish_time));
          tr.appendChild(cell(job.duration));
          tbody.appendChild(tr);
        }
        document.getElementById("updated").textContent = "updated " + new Date().toLocaleTimeString();
      } catch (e) {
        document.getElementById("updated").textContent = "fetch failed: " + e;
      }
    }

    refresh();
    setInterval(refresh, 3000);
  </script>
</body>
</html>
"#;

pub async fn dashboard_index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn store_err(e: StoreError) -> (StatusCode, Json<ErrorBody>) {
    error!(error = %e, "snapshot build failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: format!("store unavailable: {e}"),
        }),
    )
}

pub async fn get_dashboard_data<C>(
    State(state): State<ApiState<C>>,
) -> Result<Json<DashboardSnapshot>, (StatusCode, Json<ErrorBody>)>
where
    C: StoreConnector + 'static,
{
    let snapshot = state.snapshots.build_snapshot().await.map_err(store_err)?;
    Ok(Json(snapshot))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
