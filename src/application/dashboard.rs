//! Aggregated figures for the home dashboard.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::{Date, Duration, Month, OffsetDateTime, Time};
use uuid::Uuid;

use crate::application::repos::{
    DashboardRepo, DashboardStats, EventActivity, MonthRevenue, NotificationsRepo, RepoError,
    StatusCount, VisitActivity,
};
use crate::domain::entities::{EventRecord, NotificationRecord, TechnicalVisitRecord};

const RECENT_LIMIT: i64 = 5;
const WINDOW_MONTHS_BACK: i32 = 3;
const WINDOW_MONTHS_AHEAD: i32 = 6;
const REVENUE_MONTHS: i32 = 6;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentActivity {
    pub events: Vec<EventActivity>,
    pub visits: Vec<VisitActivity>,
    pub notifications: Vec<NotificationRecord>,
}

#[derive(Clone)]
pub struct DashboardService {
    repo: Arc<dyn DashboardRepo>,
    notifications: Arc<dyn NotificationsRepo>,
}

impl DashboardService {
    pub fn new(repo: Arc<dyn DashboardRepo>, notifications: Arc<dyn NotificationsRepo>) -> Self {
        Self {
            repo,
            notifications,
        }
    }

    pub async fn stats(&self) -> Result<DashboardStats, DashboardError> {
        Ok(self.repo.dashboard_stats(OffsetDateTime::now_utc()).await?)
    }

    /// Latest events and visits overall, plus the caller's own latest notifications.
    pub async fn recent_activity(&self, user_id: Uuid) -> Result<RecentActivity, DashboardError> {
        let events = self.repo.recent_events(RECENT_LIMIT).await?;
        let visits = self.repo.recent_visits(RECENT_LIMIT).await?;
        let notifications = self
            .notifications
            .recent_for_user(user_id, RECENT_LIMIT)
            .await?;
        Ok(RecentActivity {
            events,
            visits,
            notifications,
        })
    }

    pub async fn upcoming_events(&self) -> Result<Vec<EventRecord>, DashboardError> {
        let (from, to) = calendar_window(OffsetDateTime::now_utc());
        Ok(self.repo.events_in_window(from, to).await?)
    }

    pub async fn upcoming_visits(&self) -> Result<Vec<TechnicalVisitRecord>, DashboardError> {
        let (from, to) = calendar_window(OffsetDateTime::now_utc());
        Ok(self.repo.visits_in_window(from, to).await?)
    }

    pub async fn events_by_status(&self) -> Result<Vec<StatusCount>, DashboardError> {
        Ok(self.repo.events_by_status().await?)
    }

    /// Revenue of completed events per month, oldest first, with empty months filled in.
    pub async fn monthly_revenue(&self) -> Result<Vec<MonthRevenue>, DashboardError> {
        let now = OffsetDateTime::now_utc();
        let since = month_start(shift_months(now.date(), -(REVENUE_MONTHS - 1)));
        let rows = self.repo.revenue_by_month(since).await?;
        Ok(fill_months(since.date(), REVENUE_MONTHS, rows))
    }
}

/// The calendar range shown on the dashboard: three months back to six ahead.
pub fn calendar_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    let today = now.date();
    let from = shift_months(today, -WINDOW_MONTHS_BACK).midnight().assume_utc();
    let to = shift_months(today, WINDOW_MONTHS_AHEAD)
        .with_time(Time::MIDNIGHT)
        .assume_utc()
        + Duration::days(1)
        - Duration::nanoseconds(1);
    (from, to)
}

/// Move a date by whole months, clamping the day to the target month's length.
pub fn shift_months(date: Date, months: i32) -> Date {
    let index = date.year() * 12 + (date.month() as i32 - 1) + months;
    let year = index.div_euclid(12);
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8).unwrap_or(Month::January);
    let day = date.day().min(month.length(year));
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}

fn month_start(date: Date) -> OffsetDateTime {
    date.replace_day(1)
        .unwrap_or(date)
        .midnight()
        .assume_utc()
}

pub fn month_key(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), date.month() as u8)
}

fn fill_months(first: Date, months: i32, rows: Vec<MonthRevenue>) -> Vec<MonthRevenue> {
    (0..months)
        .map(|offset| {
            let month = month_key(shift_months(first, offset));
            let revenue = rows
                .iter()
                .filter(|row| row.month == month)
                .map(|row| row.revenue)
                .sum();
            MonthRevenue { month, revenue }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn shifting_clamps_to_month_end() {
        assert_eq!(shift_months(date!(2025 - 01 - 31), 1), date!(2025 - 02 - 28));
        assert_eq!(shift_months(date!(2025 - 02 - 15), -3), date!(2024 - 11 - 15));
        assert_eq!(shift_months(date!(2025 - 10 - 01), 6), date!(2026 - 04 - 01));
    }

    #[test]
    fn window_spans_three_months_back_and_six_ahead() {
        let (from, to) = calendar_window(datetime!(2025-06-15 10:30 UTC));
        assert_eq!(from, datetime!(2025-03-15 00:00 UTC));
        assert_eq!(to.date(), date!(2025 - 12 - 15));
        assert!(to < datetime!(2025-12-16 00:00 UTC));
    }

    #[test]
    fn revenue_series_fills_missing_months() {
        let rows = vec![
            MonthRevenue {
                month: "2025-02".into(),
                revenue: 900_000,
            },
            MonthRevenue {
                month: "2025-04".into(),
                revenue: 1_500_000,
            },
        ];
        let series = fill_months(date!(2025 - 01 - 01), 4, rows);
        let keys: Vec<&str> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, vec!["2025-01", "2025-02", "2025-03", "2025-04"]);
        let revenue: Vec<i64> = series.iter().map(|m| m.revenue).collect();
        assert_eq!(revenue, vec![0, 900_000, 0, 1_500_000]);
    }
}
