use crate::error::{DashError, DashResult};
use crate::loader::RecordEnvelope;
use crate::types::{Direction, RawRecord};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Filters the backend can apply before returning rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerFilters {
    pub state: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub complaint_type: Option<String>,
    pub decision_parent: Option<String>,
    pub decision: Option<String>,
    pub category: Option<String>,
}

impl ServerFilters {
    /// Query pairs for the list endpoint; unset filters are left out.
    pub fn query(&self, direction: Direction) -> Vec<(&'static str, String)> {
        let mut q = vec![("table", direction.table_param().to_string())];
        let text = [
            ("state", &self.state),
            ("complaint_type", &self.complaint_type),
            ("decision_parent", &self.decision_parent),
            ("decision", &self.decision),
            ("category", &self.category),
        ];
        for (name, value) in text {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                q.push((name, v.to_string()));
            }
        }
        if let Some(y) = self.start_year {
            q.push(("start_year", y.to_string()));
        }
        if let Some(y) = self.end_year {
            q.push(("end_year", y.to_string()));
        }
        q
    }
}

/// Selectable values for each filter dimension, as published by the
/// backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub complaint_types: Vec<String>,
    #[serde(default)]
    pub affiliations: Vec<String>,
    #[serde(default)]
    pub decisions: Vec<String>,
}

/// Both source tables, fetched together.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub by_press: Vec<RawRecord>,
    pub against_press: Vec<RawRecord>,
}

/// Client that always asks for fresh responses.
pub fn build_client() -> DashResult<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store, max-age=0"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    Ok(Client::builder().default_headers(headers).build()?)
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> DashResult<T> {
    let resp = client.get(url).query(query).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(DashError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}

pub async fn fetch_table(
    client: &Client,
    base: &str,
    direction: Direction,
    filters: &ServerFilters,
) -> DashResult<Vec<RawRecord>> {
    let url = endpoint(base, "complaints/list");
    let start = std::time::Instant::now();
    debug!("Fetching table - table={}, url={}", direction.table_param(), url);

    let envelope: RecordEnvelope = get_json(client, &url, &filters.query(direction)).await?;
    let records = envelope.into_records();

    info!(
        "Table fetch completed - table={}, duration={:.2}s, rows={}",
        direction.table_param(),
        start.elapsed().as_secs_f32(),
        records.len()
    );
    Ok(records)
}

pub async fn fetch_filter_options(client: &Client, base: &str) -> DashResult<FilterOptions> {
    let url = endpoint(base, "complaints/filters");
    let options: FilterOptions = get_json(client, &url, &[]).await?;
    debug!(
        "Filter options - years={}, states={}, types={}",
        options.years.len(),
        options.states.len(),
        options.complaint_types.len()
    );
    Ok(options)
}

/// Fetch both tables concurrently. Either failure fails the whole load.
pub async fn fetch_snapshot(client: &Client, base: &str, filters: &ServerFilters) -> DashResult<Snapshot> {
    let (by_press, against_press) = tokio::try_join!(
        fetch_table(client, base, Direction::ByPress, filters),
        fetch_table(client, base, Direction::AgainstPress, filters),
    )?;
    Ok(Snapshot {
        by_press,
        against_press,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn query_skips_unset_and_blank_filters() {
        let filters = ServerFilters {
            state: Some("Delhi".into()),
            decision: Some("  ".into()),
            start_year: Some(2015),
            ..Default::default()
        };
        assert_eq!(
            filters.query(Direction::AgainstPress),
            vec![
                ("table", "against".to_string()),
                ("state", "Delhi".to_string()),
                ("start_year", "2015".to_string()),
            ]
        );
        assert_eq!(
            ServerFilters::default().query(Direction::ByPress),
            vec![("table", "by".to_string())]
        );
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(endpoint("http://h:8000/", "/complaints/list"), "http://h:8000/complaints/list");
        assert_eq!(endpoint("http://h/api", "complaints/filters"), "http://h/api/complaints/filters");
    }

    #[test]
    fn filter_options_tolerate_missing_keys() {
        let opts: FilterOptions =
            serde_json::from_str(r#"{"years":[2019,2020],"states":["Delhi"]}"#).unwrap();
        assert_eq!(opts.years, vec![2019, 2020]);
        assert!(opts.decisions.is_empty());
    }

    #[test]
    fn client_builds() {
        assert!(build_client().is_ok());
    }

    type Seen = Arc<Mutex<Vec<String>>>;

    /// Loopback backend: `table=by` gets one empty record, `table=against`
    /// gets `against_status`. Request heads are recorded lowercased.
    async fn spawn_backend(against_status: &'static str) -> (String, Seen) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let seen_srv = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let seen = Arc::clone(&seen_srv);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = sock.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                    }
                    let head = String::from_utf8_lossy(&buf).to_lowercase();
                    let (status, body) = if head.contains("table=against") {
                        (against_status, r#"{"data":[{},{}]}"#)
                    } else {
                        ("200 OK", r#"{"data":[{}]}"#)
                    };
                    seen.lock().unwrap().push(head);
                    let resp = format!(
                        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = sock.write_all(resp.as_bytes()).await;
                    let _ = sock.shutdown().await;
                });
            }
        });
        (format!("http://{}", addr), seen)
    }

    /// One failing table fails the whole snapshot; the by-press rows that
    /// did arrive are not returned on their own.
    #[tokio::test]
    async fn failed_table_fails_whole_snapshot() {
        let (base, seen) = spawn_backend("500 Internal Server Error").await;
        let client = build_client().unwrap();

        let result = fetch_snapshot(&client, &base, &ServerFilters::default()).await;
        assert!(
            matches!(result, Err(DashError::Status { status: 500, .. })),
            "expected a 500 status error, got {result:?}"
        );

        let seen = seen.lock().unwrap();
        assert!(seen.iter().any(|h| h.contains("table=against")));
        assert!(seen.iter().all(|h| h.contains("cache-control: no-cache")));
        assert!(seen.iter().all(|h| h.contains("pragma: no-cache")));
    }

    #[tokio::test]
    async fn both_tables_fetched_with_cache_bypass() {
        let (base, seen) = spawn_backend("200 OK").await;
        let client = build_client().unwrap();

        let snapshot = fetch_snapshot(&client, &base, &ServerFilters::default())
            .await
            .unwrap();
        assert_eq!(snapshot.by_press.len(), 1);
        assert_eq!(snapshot.against_press.len(), 2);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|h| h.starts_with("get /complaints/list?table=")));
        assert!(seen.iter().all(|h| h.contains("cache-control: no-cache")));
    }
}
