//! # Shepherd
//!
//! Data core of a church and feeding-centre administration dashboard.
//!
//! ## Features
//!
//! - **Listing pipeline**: filter, search, sort and paginate any [`Record`](core::Record) type
//! - **Aggregations**: dashboard counters, birthday histogram, attendance breakdown and trend
//! - **Provider duality**: a live REST backend or an in-memory fixture behind one trait
//! - **Query cache**: per-record-kind invalidation on writes
//! - **Typed errors**: validation, fetch and configuration failures with stable codes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shepherd::prelude::*;
//!
//! shepherd::logging::init()?;
//! let service = AdminService::from_config(&AppConfig::from_env()?)?;
//!
//! let page = service
//!     .list_members(&ListQuery::new(1, 10).filter("center_id", "1").search("jo"))
//!     .await?;
//! println!("showing {}-{} of {}", page.pagination.first_item(),
//!     page.pagination.last_item(), page.total_count());
//!
//! let overview = service.dashboard_overview().await?;
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod entities;
pub mod logging;
pub mod service;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        DataProvider, FilterSpec, ListQuery, Page, PaginationMeta, RangeFilter, Record,
        RecordKind, SearchSpec, SortDirection, SortSpec,
        error::{ConfigError, FetchError, Result, ShepherdError, ValidationError},
    };

    // === Entities ===
    pub use crate::entities::{
        ActivityLog, AttendanceRecord, AudienceFilters, Center, Channel, CreateAttendanceInput,
        CreateMemberInput, Member, Message, MessageStatus, Period, RecipientGroup,
        SendMessageInput, ServiceType,
    };

    // === Storage ===
    pub use crate::storage::{FixtureProvider, LiveProvider, select_provider};

    // === Service ===
    pub use crate::cache::{QueryCache, QueryKey};
    pub use crate::config::AppConfig;
    pub use crate::service::{
        AdminService, AdminServiceBuilder, AttendanceFilters, AttendanceReport, DashboardOverview,
    };

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
}
