//! Pure reductions behind the dashboard, attendance and messaging screens
//!
//! Nothing here fetches or caches; callers hand in the records and, where
//! the answer depends on the calendar, the date to treat as today.

use crate::core::listing::sort_records;
use crate::core::record::Record;
use crate::entities::{
    ActivityLog, AttendanceRecord, AudienceFilters, Center, Member, Period, RecipientGroup,
    ServiceType,
};
use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Window, in days after today, counted as an upcoming birthday
pub const UPCOMING_BIRTHDAY_DAYS: i64 = 7;

/// Length of the dashboard's newest-members and activity lists
pub const RECENT_LIMIT: usize = 10;

/// Labels of the birthday histogram buckets
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Headline counters of the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_members: usize,
    pub new_this_month: usize,
    pub upcoming_birthdays: usize,
    pub centers_count: usize,
}

/// Compute the dashboard counters as of `today`, in local time
pub fn dashboard_stats(members: &[Member], centers: &[Center], today: NaiveDate) -> DashboardStats {
    dashboard_stats_in(members, centers, today, &Local)
}

/// Compute the dashboard counters as of `today` in `tz`
///
/// A member is new this month when their registration falls in today's
/// month on `tz`'s calendar.
pub fn dashboard_stats_in<Tz: TimeZone>(
    members: &[Member],
    centers: &[Center],
    today: NaiveDate,
    tz: &Tz,
) -> DashboardStats {
    let new_this_month = members
        .iter()
        .filter(|m| {
            let created = m.created_at.with_timezone(tz).date_naive();
            created.year() == today.year() && created.month() == today.month()
        })
        .count();

    let upcoming_birthdays = members
        .iter()
        .filter_map(|m| m.dob)
        .filter(|dob| {
            days_until_birthday(*dob, today).is_some_and(|days| days <= UPCOMING_BIRTHDAY_DAYS)
        })
        .count();

    let centers_count = centers
        .iter()
        .map(|c| c.id.as_str())
        .collect::<HashSet<_>>()
        .len();

    DashboardStats {
        total_members: members.len(),
        new_this_month,
        upcoming_birthdays,
        centers_count,
    }
}

/// Days from `today` to the next birthday on or after it
///
/// Zero when the birthday is today. A 29 February birthday falls on
/// 28 February in non-leap years.
pub fn days_until_birthday(dob: NaiveDate, today: NaiveDate) -> Option<i64> {
    let this_year = anniversary(dob, today.year())?;
    let next = if this_year >= today {
        this_year
    } else {
        anniversary(dob, today.year() + 1)?
    };
    Some((next - today).num_days())
}

fn anniversary(dob: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, dob.month(), dob.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
}

/// One bar of the birthday chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayBucket {
    pub month: String,
    pub count: usize,
}

/// Count birthdays per calendar month, Jan..Dec, zero-filled
pub fn birthday_histogram(members: &[Member]) -> Vec<BirthdayBucket> {
    let mut counts = [0usize; 12];
    for dob in members.iter().filter_map(|m| m.dob) {
        counts[dob.month0() as usize] += 1;
    }

    MONTH_LABELS
        .iter()
        .zip(counts)
        .map(|(label, count)| BirthdayBucket {
            month: (*label).to_string(),
            count,
        })
        .collect()
}

/// Attendance summed per demographic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicBreakdown {
    pub adult_male: u64,
    pub adult_female: u64,
    pub child_male: u64,
    pub child_female: u64,
}

impl DemographicBreakdown {
    /// Chart bars with their display labels
    pub fn entries(&self) -> [(&'static str, u64); 4] {
        [
            ("Adult Male", self.adult_male),
            ("Adult Female", self.adult_female),
            ("Child Male", self.child_male),
            ("Child Female", self.child_female),
        ]
    }

    pub fn total(&self) -> u64 {
        self.adult_male + self.adult_female + self.child_male + self.child_female
    }
}

pub fn attendance_breakdown(records: &[AttendanceRecord]) -> DemographicBreakdown {
    records
        .iter()
        .fold(DemographicBreakdown::default(), |mut acc, r| {
            acc.adult_male += u64::from(r.adult_male);
            acc.adult_female += u64::from(r.adult_female);
            acc.child_male += u64::from(r.child_male);
            acc.child_female += u64::from(r.child_female);
            acc
        })
}

/// Per-service headcounts of one trend point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTotals {
    #[serde(rename = "Sunday Service")]
    pub sunday_service: u64,
    #[serde(rename = "FTN Bible Study")]
    pub ftn_bible_study: u64,
    #[serde(rename = "Prayer Meeting")]
    pub prayer_meeting: u64,
}

impl ServiceTotals {
    pub fn get(&self, service: ServiceType) -> u64 {
        match service {
            ServiceType::SundayService => self.sunday_service,
            ServiceType::FtnBibleStudy => self.ftn_bible_study,
            ServiceType::PrayerMeeting => self.prayer_meeting,
        }
    }

    fn add(&mut self, service: ServiceType, count: u64) {
        let slot = match service {
            ServiceType::SundayService => &mut self.sunday_service,
            ServiceType::FtnBibleStudy => &mut self.ftn_bible_study,
            ServiceType::PrayerMeeting => &mut self.prayer_meeting,
        };
        *slot += count;
    }
}

/// Attendance on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub services: ServiceTotals,
    pub total: u64,
}

/// Group attendance by date and service type, oldest date first
pub fn attendance_trend(records: &[AttendanceRecord]) -> Vec<TrendPoint> {
    let mut grouped: IndexMap<NaiveDate, TrendPoint> = IndexMap::new();

    for record in records {
        let count = record.total();
        let point = grouped.entry(record.date).or_insert_with(|| TrendPoint {
            date: record.date,
            services: ServiceTotals::default(),
            total: 0,
        });
        point.services.add(record.service_type, count);
        point.total += count;
    }

    let mut points: Vec<TrendPoint> = grouped.into_values().collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Headline numbers of the attendance screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total_attendance: u64,
    pub service_count: usize,
    /// Rounded half up; zero when there are no records
    pub average_per_service: u64,
}

pub fn attendance_summary(records: &[AttendanceRecord]) -> AttendanceSummary {
    let total_attendance: u64 = records.iter().map(AttendanceRecord::total).sum();
    let service_count = records.len();
    let average_per_service = match service_count as u64 {
        0 => 0,
        n => (total_attendance + n / 2) / n,
    };

    AttendanceSummary {
        total_attendance,
        service_count,
        average_per_service,
    }
}

/// The most recently registered members, newest first
pub fn newest_members(members: &[Member]) -> Vec<Member> {
    most_recent(members)
}

/// The most recent audit log entries, newest first
pub fn activity_feed(logs: &[ActivityLog]) -> Vec<ActivityLog> {
    most_recent(logs)
}

fn most_recent<T: Record>(records: &[T]) -> Vec<T> {
    let mut sorted = records.to_vec();
    sort_records(&mut sorted, &T::default_sort());
    sorted.truncate(RECENT_LIMIT);
    sorted
}

/// Members a message with this audience would reach
///
/// Groups that need a narrowing value (`center`, `unit`, `gender`) reach
/// nobody until that value is chosen.
pub fn select_audience<'a>(
    members: &'a [Member],
    group: RecipientGroup,
    filters: &AudienceFilters,
    today: NaiveDate,
) -> Vec<&'a Member> {
    members
        .iter()
        .filter(|m| is_targeted(m, group, filters, today))
        .collect()
}

/// Number of members a message with this audience would reach
pub fn estimate_reach(
    members: &[Member],
    group: RecipientGroup,
    filters: &AudienceFilters,
    today: NaiveDate,
) -> usize {
    select_audience(members, group, filters, today).len()
}

fn is_targeted(
    member: &Member,
    group: RecipientGroup,
    filters: &AudienceFilters,
    today: NaiveDate,
) -> bool {
    match group {
        RecipientGroup::All => true,
        RecipientGroup::Center => equals(&member.center_id, filters.center_id.as_deref()),
        RecipientGroup::Unit => equals(&member.service_unit, filters.service_unit.as_deref()),
        RecipientGroup::Gender => equals(&member.gender, filters.gender.as_deref()),
        RecipientGroup::Security => {
            member.service_unit == "Security"
                && optional_equals(&member.center_id, filters.center_id.as_deref())
        }
        RecipientGroup::Birthday => has_birthday_in(member, filters, today),
        RecipientGroup::NewMembers => joined_within(member, filters.period, today),
        RecipientGroup::Custom => {
            optional_equals(&member.center_id, filters.center_id.as_deref())
                && optional_equals(&member.service_unit, filters.service_unit.as_deref())
                && optional_equals(&member.gender, filters.gender.as_deref())
        }
    }
}

fn equals(actual: &str, wanted: Option<&str>) -> bool {
    wanted.is_some_and(|w| !w.is_empty() && w == actual)
}

fn optional_equals(actual: &str, wanted: Option<&str>) -> bool {
    match wanted {
        Some(w) if !w.is_empty() => w == actual,
        _ => true,
    }
}

fn has_birthday_in(member: &Member, filters: &AudienceFilters, today: NaiveDate) -> bool {
    let Some(dob) = member.dob else {
        return false;
    };

    match (filters.period, filters.month) {
        (Some(Period::Today), _) => days_until_birthday(dob, today) == Some(0),
        (Some(Period::Week), _) => days_until_birthday(dob, today)
            .is_some_and(|days| days <= UPCOMING_BIRTHDAY_DAYS),
        (None, Some(month)) => dob.month() == month,
        (Some(Period::Month), _) | (None, None) => dob.month() == today.month(),
    }
}

fn joined_within(member: &Member, period: Option<Period>, today: NaiveDate) -> bool {
    let joined = member.created_at.date_naive();
    let since = match period.unwrap_or(Period::Week) {
        Period::Today => today,
        Period::Week => today - Duration::days(7),
        Period::Month => today - Duration::days(30),
    };
    joined >= since && joined <= today
}
