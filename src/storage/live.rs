//! Data provider backed by the hosted backend's REST interface
//!
//! Tables are read with `GET {url}/rest/v1/{table}?select=...&order=...`,
//! one `Range` window at a time with `Prefer: count=exact`, until the
//! total reported in `Content-Range` has arrived.
//! Member and attendance reads embed `centers(name)` so rows arrive with
//! their center name already resolved. Inserts ask for the stored row back
//! with `Prefer: return=representation`.

use crate::config::{BackendCredentials, HttpConfig};
use crate::core::error::{ConfigError, FetchError, Result};
use crate::core::provider::DataProvider;
use crate::core::record::RecordKind;
use crate::entities::{
    ActivityLog, AttendanceRecord, Center, CreateAttendanceInput, CreateMemberInput, Member,
    Message, MessageStatus, SendMessageInput, UNKNOWN_CENTER,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Sender recorded on messages when none is configured
pub const DEFAULT_SENDER: &str = "admin-1";

const MEMBER_COLUMNS: &str = "id,full_name,phone,email,center_id,service_unit,gender,marital_status,dob,created_at,centers(name)";
const ATTENDANCE_COLUMNS: &str = "*,centers(name)";
const CENTER_COLUMNS: &str = "id,name,address";
const ALL_COLUMNS: &str = "*";

/// Rows requested per window; the backend's row cap may return fewer
const PAGE_ROWS: usize = 1000;

/// Live data provider
#[derive(Debug, Clone)]
pub struct LiveProvider {
    client: Client,
    credentials: BackendCredentials,
    sender_id: String,
}

impl LiveProvider {
    /// Create a provider for the given backend
    pub fn new(credentials: BackendCredentials, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(http.timeout())
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "http".to_string(),
                value: format!("{}s timeout", http.timeout_secs),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        info!(url = %credentials.url, timeout_secs = http.timeout_secs, "Initializing live data provider");

        Ok(Self {
            client,
            credentials,
            sender_id: DEFAULT_SENDER.to_string(),
        })
    }

    /// Record messages under a different sender id
    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = sender_id.into();
        self
    }

    /// REST endpoint of a table
    pub fn rest_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.credentials.url.trim_end_matches('/'),
            table
        )
    }

    /// Build a request with the backend's authentication headers
    fn build_request(&self, method: Method, kind: RecordKind) -> RequestBuilder {
        self.client
            .request(method, self.rest_url(kind.table()))
            .header("apikey", &self.credentials.key)
            .header("Authorization", format!("Bearer {}", self.credentials.key))
    }

    /// Read every row of a table
    ///
    /// Windows are requested from the end of what has arrived so far, so a
    /// backend that caps responses below `PAGE_ROWS` is still read in full.
    async fn select<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        columns: &str,
        order: Option<&str>,
    ) -> Result<Vec<T>> {
        let mut query = vec![("select", columns)];
        if let Some(order) = order {
            query.push(("order", order));
        }

        let mut rows: Vec<T> = Vec::new();
        loop {
            let from = rows.len();
            let response = self
                .build_request(Method::GET, kind)
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", from, from + PAGE_ROWS - 1))
                .header("Prefer", "count=exact")
                .query(&query)
                .send()
                .await
                .map_err(|e| http_error(kind, e))?;

            let total = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|value| value.to_str().ok())
                .and_then(content_range_total);
            let page: Vec<T> = decode(kind, response).await?;
            let received = page.len();
            rows.extend(page);

            debug!(table = kind.table(), from, received, total, "fetched rows");

            let complete = match total {
                Some(total) => rows.len() >= total,
                None => received < PAGE_ROWS,
            };
            if complete || received == 0 {
                break;
            }
        }

        Ok(rows)
    }

    /// Insert one row and return what the backend stored
    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        columns: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .build_request(Method::POST, kind)
            .header("Prefer", "return=representation")
            .query(&[("select", columns)])
            .json(&[body])
            .send()
            .await
            .map_err(|e| http_error(kind, e))?;

        let rows: Vec<T> = decode(kind, response).await?;
        let row = rows.into_iter().next().ok_or_else(|| FetchError::EmptyInsert {
            table: kind.table().to_string(),
        })?;

        info!(table = kind.table(), "inserted {}", kind.singular());
        Ok(row)
    }
}

/// Total row count from a `Content-Range` value such as `0-999/1500`
///
/// `None` when the backend did not count (`0-999/*`).
fn content_range_total(value: &str) -> Option<usize> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn http_error(kind: RecordKind, e: reqwest::Error) -> FetchError {
    FetchError::Http {
        table: kind.table().to_string(),
        message: e.to_string(),
    }
}

async fn decode<T: DeserializeOwned>(kind: RecordKind, response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(|e| http_error(kind, e))?;

    if !status.is_success() {
        return Err(FetchError::Status {
            table: kind.table().to_string(),
            status: status.as_u16(),
            message: body,
        }
        .into());
    }

    serde_json::from_str(&body).map_err(|e| {
        FetchError::Decode {
            table: kind.table().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// A row with its embedded center
#[derive(Debug, Deserialize)]
struct Joined<T> {
    #[serde(flatten)]
    row: T,
    #[serde(default)]
    centers: Option<CenterJoin>,
}

/// The embedded resource comes back as an object or a one-element array
/// depending on how the relationship is declared
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CenterJoin {
    One(CenterName),
    Many(Vec<CenterName>),
}

#[derive(Debug, Deserialize)]
struct CenterName {
    name: String,
}

impl<T> Joined<T> {
    fn into_parts(self) -> (T, String) {
        let name = match self.centers {
            Some(CenterJoin::One(center)) => Some(center.name),
            Some(CenterJoin::Many(centers)) => centers.into_iter().next().map(|c| c.name),
            None => None,
        };
        (self.row, name.unwrap_or_else(|| UNKNOWN_CENTER.to_string()))
    }
}

fn with_member_center(joined: Joined<Member>) -> Member {
    let (mut member, name) = joined.into_parts();
    member.center_name = name;
    member
}

fn with_attendance_center(joined: Joined<AttendanceRecord>) -> AttendanceRecord {
    let (mut record, name) = joined.into_parts();
    record.center_name = name;
    record
}

/// Message row as inserted
#[derive(Debug, Serialize)]
struct MessageInsert<'a> {
    #[serde(flatten)]
    input: &'a SendMessageInput,
    sender_id: &'a str,
    status: MessageStatus,
}

#[async_trait]
impl DataProvider for LiveProvider {
    fn backend_name(&self) -> &'static str {
        "live"
    }

    async fn fetch_members(&self) -> Result<Vec<Member>> {
        let rows: Vec<Joined<Member>> = self
            .select(RecordKind::Member, MEMBER_COLUMNS, Some("created_at.desc"))
            .await?;
        Ok(rows.into_iter().map(with_member_center).collect())
    }

    async fn fetch_centers(&self) -> Result<Vec<Center>> {
        self.select(RecordKind::Center, CENTER_COLUMNS, Some("name.asc"))
            .await
    }

    async fn fetch_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        let rows: Vec<Joined<AttendanceRecord>> = self
            .select(RecordKind::Attendance, ATTENDANCE_COLUMNS, Some("date.desc"))
            .await?;
        Ok(rows.into_iter().map(with_attendance_center).collect())
    }

    async fn fetch_messages(&self) -> Result<Vec<Message>> {
        self.select(RecordKind::Message, ALL_COLUMNS, Some("created_at.desc"))
            .await
    }

    async fn fetch_activity(&self) -> Result<Vec<ActivityLog>> {
        self.select(RecordKind::AuditLog, ALL_COLUMNS, Some("created_at.desc"))
            .await
    }

    async fn create_member(&self, input: CreateMemberInput) -> Result<Member> {
        let joined: Joined<Member> = self
            .insert(RecordKind::Member, MEMBER_COLUMNS, &input)
            .await?;
        Ok(with_member_center(joined))
    }

    async fn create_attendance(&self, input: CreateAttendanceInput) -> Result<AttendanceRecord> {
        let joined: Joined<AttendanceRecord> = self
            .insert(RecordKind::Attendance, ATTENDANCE_COLUMNS, &input)
            .await?;
        Ok(with_attendance_center(joined))
    }

    async fn send_message(&self, input: SendMessageInput) -> Result<Message> {
        let row = MessageInsert {
            status: input.initial_status(),
            input: &input,
            sender_id: &self.sender_id,
        };
        self.insert(RecordKind::Message, ALL_COLUMNS, &row).await
    }
}
