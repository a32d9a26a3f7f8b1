//! The admin service: one operation per dashboard screen
//!
//! Every read validates its parameters, then consults the query cache, then
//! the provider. Every write validates its input, calls the provider and
//! invalidates the cached reads of the record kind it touched.

mod builder;

pub use builder::AdminServiceBuilder;

use crate::cache::{BIRTHDAY_CHART_VIEW, DASHBOARD_STATS_VIEW, QueryCache, QueryKey};
use crate::config::AppConfig;
use crate::core::aggregate::{
    self, AttendanceSummary, BirthdayBucket, DashboardStats, DemographicBreakdown, TrendPoint,
};
use crate::core::error::{FetchError, Result, ShepherdError};
use crate::core::listing;
use crate::core::provider::DataProvider;
use crate::core::query::{ListQuery, Page, RangeFilter};
use crate::core::record::{Record, RecordKind};
use crate::core::validation::validate_input;
use crate::entities::{
    ActivityLog, AttendanceRecord, AudienceFilters, Center, CreateAttendanceInput,
    CreateMemberInput, Member, Message, RecipientGroup, SendMessageInput,
};
use crate::storage::{fixture, select_provider};
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Narrowing applied to the attendance report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceFilters {
    pub center_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AttendanceFilters {
    fn to_query(&self) -> ListQuery {
        let mut query = ListQuery::default();
        query.filters.insert_opt("center_id", self.center_id.clone());
        if self.start_date.is_some() || self.end_date.is_some() {
            query.range = Some(RangeFilter::new(
                "date",
                self.start_date.map(|d| d.to_string()),
                self.end_date.map(|d| d.to_string()),
            ));
        }
        query
    }
}

/// Everything the attendance screen shows for one filter selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceReport {
    /// Matching records, newest service first
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
    pub breakdown: DemographicBreakdown,
    pub trend: Vec<TrendPoint>,
}

/// The four dashboard panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub birthdays: Vec<BirthdayBucket>,
    pub newest: Vec<Member>,
    pub activity: Vec<ActivityLog>,
}

/// Admin dashboard operations over an injected provider
#[derive(Clone)]
pub struct AdminService {
    provider: Arc<dyn DataProvider>,
    cache: QueryCache,
}

impl AdminService {
    pub fn new(provider: Arc<dyn DataProvider>, cache: QueryCache) -> Self {
        Self { provider, cache }
    }

    pub fn builder() -> AdminServiceBuilder {
        AdminServiceBuilder::new()
    }

    /// Select the provider from configuration and build the service
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::builder()
            .with_shared_provider(select_provider(config)?)
            .with_cache_config(config.cache.clone())
            .build()
    }

    pub fn backend_name(&self) -> &'static str {
        self.provider.backend_name()
    }

    pub fn provider(&self) -> &Arc<dyn DataProvider> {
        &self.provider
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // === Members ===

    /// One page of the member directory
    pub async fn list_members(&self, query: &ListQuery) -> Result<Page<Member>> {
        self.list_cached(query, self.provider.fetch_members()).await
    }

    /// Register a member
    pub async fn create_member(&self, input: CreateMemberInput) -> Result<Member> {
        validate_input(&input)?;

        let member = self.provider.create_member(input).await?;
        self.cache.invalidate_kind(RecordKind::Member);

        tracing::info!(id = %member.id, center = %member.center_id, "member created");
        Ok(member)
    }

    // === Centers ===

    /// Every center, by name
    pub async fn list_centers(&self) -> Result<Vec<Center>> {
        let key = QueryKey::view(RecordKind::Center, "all");
        self.cache
            .get_or_fetch(key, || async {
                let mut centers = self.provider.fetch_centers().await?;
                listing::sort_records(&mut centers, &Center::default_sort());
                Ok(centers)
            })
            .await
    }

    // === Attendance ===

    /// One page of the attendance log
    pub async fn list_attendance(&self, query: &ListQuery) -> Result<Page<AttendanceRecord>> {
        self.list_cached(query, self.provider.fetch_attendance())
            .await
    }

    /// Records, totals, breakdown and trend for a filter selection
    pub async fn attendance_report(&self, filters: &AttendanceFilters) -> Result<AttendanceReport> {
        let query = filters.to_query();
        listing::validate::<AttendanceRecord>(&query)?;

        let key = QueryKey::with_params(RecordKind::Attendance, "report", filters)?;
        self.cache
            .get_or_fetch(key, || async {
                let all = self.provider.fetch_attendance().await?;
                let records = listing::select(&all, &query)?;

                Ok(AttendanceReport {
                    summary: aggregate::attendance_summary(&records),
                    breakdown: aggregate::attendance_breakdown(&records),
                    trend: aggregate::attendance_trend(&records),
                    records,
                })
            })
            .await
    }

    /// Log the headcount of a service
    pub async fn create_attendance(&self, input: CreateAttendanceInput) -> Result<AttendanceRecord> {
        validate_input(&input)?;

        let record = self.provider.create_attendance(input).await?;
        self.cache.invalidate_kind(RecordKind::Attendance);

        tracing::info!(
            id = %record.id,
            center = %record.center_id,
            service = %record.service_type,
            total = record.total(),
            "attendance logged"
        );
        Ok(record)
    }

    // === Messages ===

    /// One page of the message history
    ///
    /// When the backend cannot be read the built-in history is served
    /// instead. Fallback pages are not cached.
    pub async fn list_messages(&self, query: &ListQuery) -> Result<Page<Message>> {
        listing::validate::<Message>(query)?;

        let key = QueryKey::with_params(RecordKind::Message, "list", query)?;
        let cached = self
            .cache
            .get_or_fetch(key, || async {
                let messages = self.provider.fetch_messages().await?;
                Ok(listing::list(&messages, query)?)
            })
            .await;

        match cached {
            Ok(page) => Ok(page),
            Err(ShepherdError::Fetch(e)) => {
                tracing::warn!(
                    backend = self.backend_name(),
                    error = %e,
                    "message history unavailable, serving built-in history"
                );
                let messages = fixture::seed_messages().map_err(|e| FetchError::Store {
                    message: format!("failed to decode seed messages: {}", e),
                })?;
                Ok(listing::list(&messages, query)?)
            }
            Err(e) => Err(e),
        }
    }

    /// Compose a message
    pub async fn send_message(&self, input: SendMessageInput) -> Result<Message> {
        let input = input.normalized();
        validate_input(&input)?;

        let message = self.provider.send_message(input).await?;
        self.cache.invalidate_kind(RecordKind::Message);

        tracing::info!(
            id = %message.id,
            group = message.recipient_group.as_str(),
            status = message.status.as_str(),
            "message recorded"
        );
        Ok(message)
    }

    /// Members a message with this audience would reach, as of today
    pub async fn estimate_reach(
        &self,
        group: RecipientGroup,
        filters: &AudienceFilters,
    ) -> Result<usize> {
        self.estimate_reach_on(group, filters, today()).await
    }

    pub async fn estimate_reach_on(
        &self,
        group: RecipientGroup,
        filters: &AudienceFilters,
        today: NaiveDate,
    ) -> Result<usize> {
        let key = QueryKey::with_params(RecordKind::Member, "reach", &(group, filters, today))?;
        self.cache
            .get_or_fetch(key, || async {
                let members = self.provider.fetch_members().await?;
                Ok(aggregate::estimate_reach(&members, group, filters, today))
            })
            .await
    }

    // === Dashboard ===

    /// Headline counters as of today
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.dashboard_stats_on(today()).await
    }

    pub async fn dashboard_stats_on(&self, today: NaiveDate) -> Result<DashboardStats> {
        let key = QueryKey::with_params(RecordKind::Member, DASHBOARD_STATS_VIEW, &today)?;
        self.cache
            .get_or_fetch(key, || async {
                let (members, centers) =
                    tokio::try_join!(self.provider.fetch_members(), self.provider.fetch_centers())?;
                Ok(aggregate::dashboard_stats(&members, &centers, today))
            })
            .await
    }

    /// Birthdays per calendar month
    pub async fn birthday_chart(&self) -> Result<Vec<BirthdayBucket>> {
        let key = QueryKey::view(RecordKind::Member, BIRTHDAY_CHART_VIEW);
        self.cache
            .get_or_fetch(key, || async {
                let members = self.provider.fetch_members().await?;
                Ok(aggregate::birthday_histogram(&members))
            })
            .await
    }

    /// The most recently registered members
    pub async fn newest_members(&self) -> Result<Vec<Member>> {
        let key = QueryKey::view(RecordKind::Member, "newest");
        self.cache
            .get_or_fetch(key, || async {
                let members = self.provider.fetch_members().await?;
                Ok(aggregate::newest_members(&members))
            })
            .await
    }

    /// The most recent audit log entries
    pub async fn activity_feed(&self) -> Result<Vec<ActivityLog>> {
        let key = QueryKey::view(RecordKind::AuditLog, "feed");
        self.cache
            .get_or_fetch(key, || async {
                let logs = self.provider.fetch_activity().await?;
                Ok(aggregate::activity_feed(&logs))
            })
            .await
    }

    /// All four dashboard panels, loaded concurrently
    pub async fn dashboard_overview(&self) -> Result<DashboardOverview> {
        let (stats, birthdays, newest, activity) = tokio::try_join!(
            self.dashboard_stats(),
            self.birthday_chart(),
            self.newest_members(),
            self.activity_feed(),
        )?;

        Ok(DashboardOverview {
            stats,
            birthdays,
            newest,
            activity,
        })
    }

    async fn list_cached<T, Fut>(&self, query: &ListQuery, fetch: Fut) -> Result<Page<T>>
    where
        T: Record + Serialize + DeserializeOwned,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        listing::validate::<T>(query)?;

        let key = QueryKey::with_params(T::KIND, "list", query)?;
        self.cache
            .get_or_fetch(key, || async {
                let records = fetch.await?;
                Ok(listing::list(&records, query)?)
            })
            .await
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
