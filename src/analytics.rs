// src/analytics.rs
//
// Dashboard aggregates. Revenue and gallons prefer the typed columns and
// fall back to normalizing the legacy strings, so one malformed record
// never sinks the whole dashboard.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{DashboardKpis, JobStatus, TimeSeriesPoint};
use crate::normalize;
use crate::store::TrapStore;

/// Filters for KPI computation; the same conjunctive semantics as job
/// listing, without pagination.
#[derive(Debug, Clone, Default)]
pub struct KpiFilter {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub customer_id: Option<Uuid>,
    pub technician: Option<String>,
}

impl KpiFilter {
    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut params: Vec<Value> = Vec::new();

        if let Some(date_from) = &self.date_from {
            sql.push_str(" AND service_date >= ?");
            params.push(Value::from(date_from.clone()));
        }
        if let Some(date_to) = &self.date_to {
            sql.push_str(" AND service_date <= ?");
            params.push(Value::from(date_to.clone()));
        }
        if let Some(customer_id) = self.customer_id {
            sql.push_str(" AND customer_id = ?");
            params.push(Value::from(customer_id.to_string()));
        }
        if let Some(technician) = &self.technician {
            sql.push_str(" AND technician LIKE ?");
            params.push(Value::from(format!("%{technician}%")));
        }

        (sql, params)
    }
}

/// Time-series bucketing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Day,
    Week,
    Month,
}

impl GroupBy {
    /// SQL expression deriving the bucket key from the ISO service date.
    fn period_expr(self) -> &'static str {
        match self {
            GroupBy::Day => "substr(service_date, 1, 10)",
            GroupBy::Week => "strftime('%Y-W%W', service_date)",
            GroupBy::Month => "substr(service_date, 1, 7)",
        }
    }
}

/// Typed-or-string money cell: prefer cents, else normalize the string.
fn reconcile_cents(cents: Option<i64>, raw: Option<&str>) -> Option<i64> {
    cents.or_else(|| raw.and_then(normalize::money_to_cents))
}

/// Typed-or-string gallons cell.
fn reconcile_gallons(gallons: Option<f64>, raw: Option<&str>) -> Option<f64> {
    gallons.or_else(|| raw.and_then(normalize::gallons_from_str))
}

impl TrapStore {
    /// Compute the dashboard KPI block. The filter applies to the job
    /// counts and sums; missing-docs, overdue-services, and the entity
    /// counts are computed over all records regardless of filter.
    pub fn dashboard_kpis(&self, filter: &KpiFilter) -> Result<DashboardKpis> {
        let (where_sql, params) = filter.where_clause();
        let mut kpis = DashboardKpis::default();

        let completed_sql = format!(
            "SELECT COUNT(*) FROM jobs{where_sql} \
             AND status IN ('Completed', 'Verified', 'Invoiced', 'Exported')"
        );
        kpis.jobs_completed = self.conn.query_row(
            &completed_sql,
            params_from_iter(params.clone()),
            |row| row.get(0),
        )?;

        let scheduled_sql = format!("SELECT COUNT(*) FROM jobs{where_sql} AND status = 'Scheduled'");
        kpis.jobs_scheduled = self.conn.query_row(
            &scheduled_sql,
            params_from_iter(params.clone()),
            |row| row.get(0),
        )?;

        let in_progress_sql =
            format!("SELECT COUNT(*) FROM jobs{where_sql} AND status = 'In Progress'");
        kpis.jobs_in_progress = self.conn.query_row(
            &in_progress_sql,
            params_from_iter(params.clone()),
            |row| row.get(0),
        )?;

        let values_sql = format!(
            "SELECT invoice_total_cents, invoice_total_str, gallons_pumped, gallons_pumped_str \
             FROM jobs{where_sql}"
        );
        let mut stmt = self.conn.prepare(&values_sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok((
                row.get::<_, Option<i64>>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut job_count: i64 = 0;
        for row in rows {
            let (cents, money_raw, gallons, gallons_raw) = row?;
            job_count += 1;
            if let Some(cents) = reconcile_cents(cents, money_raw.as_deref()) {
                kpis.total_revenue_cents += cents;
            }
            if let Some(gallons) = reconcile_gallons(gallons, gallons_raw.as_deref()) {
                kpis.total_gallons += gallons;
            }
        }
        if job_count > 0 {
            kpis.avg_revenue_per_job_cents = kpis.total_revenue_cents / job_count;
            kpis.avg_gallons_per_job = kpis.total_gallons / job_count as f64;
        }

        kpis.docs_missing_count = self.conn.query_row(
            "SELECT COUNT(*) FROM jobs j
             WHERE NOT EXISTS (
                 SELECT 1 FROM documents d
                 WHERE d.job_id = j.job_id
                   AND d.doc_type IN ('invoice', 'manifest')
             )",
            [],
            |row| row.get(0),
        )?;

        let today = normalize::date_to_iso(Utc::now().date_naive());
        kpis.overdue_services = self.conn.query_row(
            "SELECT COUNT(*) FROM sites
             WHERE is_active = 1
               AND next_service_date IS NOT NULL
               AND next_service_date < ?1",
            rusqlite::params![today],
            |row| row.get(0),
        )?;

        kpis.customer_count = self.count_customers(true)?;
        kpis.site_count = self.count_sites(true)?;

        Ok(kpis)
    }

    /// Job counts bucketed by period; empty buckets are omitted.
    pub fn jobs_by_date(
        &self,
        date_from: &str,
        date_to: &str,
        group_by: GroupBy,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let sql = format!(
            "SELECT {period} AS period, COUNT(*) AS count
             FROM jobs
             WHERE service_date >= ?1 AND service_date <= ?2
             GROUP BY period
             ORDER BY period",
            period = group_by.period_expr()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params![date_from, date_to], |row| {
            Ok(TimeSeriesPoint {
                date: row.get(0)?,
                value: row.get::<_, i64>(1)? as f64,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Revenue (dollars) per period over the date range.
    pub fn revenue_by_date(
        &self,
        date_from: &str,
        date_to: &str,
        group_by: GroupBy,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let sql = format!(
            "SELECT {period} AS period, invoice_total_cents, invoice_total_str
             FROM jobs
             WHERE service_date >= ?1 AND service_date <= ?2",
            period = group_by.period_expr()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params![date_from, date_to], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
        for row in rows {
            let (period, cents, raw) = row?;
            let entry = buckets.entry(period).or_default();
            if let Some(cents) = reconcile_cents(cents, raw.as_deref()) {
                *entry += cents;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(date, cents)| TimeSeriesPoint {
                date,
                value: cents as f64 / 100.0,
            })
            .collect())
    }

    /// Gallons pumped per period over the date range.
    pub fn gallons_by_date(
        &self,
        date_from: &str,
        date_to: &str,
        group_by: GroupBy,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let sql = format!(
            "SELECT {period} AS period, gallons_pumped, gallons_pumped_str
             FROM jobs
             WHERE service_date >= ?1 AND service_date <= ?2",
            period = group_by.period_expr()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params![date_from, date_to], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<f64>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
        for row in rows {
            let (period, gallons, raw) = row?;
            let entry = buckets.entry(period).or_default();
            if let Some(gallons) = reconcile_gallons(gallons, raw.as_deref()) {
                *entry += gallons;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(date, value)| TimeSeriesPoint { date, value })
            .collect())
    }

    /// Job counts per status within the optional date range.
    pub fn jobs_by_status(
        &self,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<HashMap<JobStatus, i64>> {
        let mut sql = String::from("SELECT status, COUNT(*) FROM jobs WHERE 1=1");
        let mut params: Vec<Value> = Vec::new();
        if let Some(date_from) = date_from {
            sql.push_str(" AND service_date >= ?");
            params.push(Value::from(date_from.to_string()));
        }
        if let Some(date_to) = date_to {
            sql.push_str(" AND service_date <= ?");
            params.push(Value::from(date_to.to_string()));
        }
        sql.push_str(" GROUP BY status");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok((row.get::<_, JobStatus>(0)?, row.get::<_, i64>(1)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<HashMap<_, _>>>()?)
    }

    /// Job counts per technician, busiest first. Jobs without a technician
    /// are excluded.
    pub fn jobs_by_technician(
        &self,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<Vec<(String, i64)>> {
        let mut sql = String::from(
            "SELECT technician, COUNT(*) AS count FROM jobs
             WHERE technician IS NOT NULL AND technician != ''",
        );
        let mut params: Vec<Value> = Vec::new();
        if let Some(date_from) = date_from {
            sql.push_str(" AND service_date >= ?");
            params.push(Value::from(date_from.to_string()));
        }
        if let Some(date_to) = date_to {
            sql.push_str(" AND service_date <= ?");
            params.push(Value::from(date_to.to_string()));
        }
        sql.push_str(" GROUP BY technician ORDER BY count DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Top customers by summed revenue (dollars), grouped by the job's
    /// denormalized customer name.
    pub fn top_customers_by_revenue(
        &self,
        limit: usize,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<Vec<(String, f64)>> {
        let mut sql = String::from(
            "SELECT customer_name, invoice_total_cents, invoice_total_str
             FROM jobs WHERE customer_name IS NOT NULL",
        );
        let mut params: Vec<Value> = Vec::new();
        if let Some(date_from) = date_from {
            sql.push_str(" AND service_date >= ?");
            params.push(Value::from(date_from.to_string()));
        }
        if let Some(date_to) = date_to {
            sql.push_str(" AND service_date <= ?");
            params.push(Value::from(date_to.to_string()));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<i64>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut totals: HashMap<String, i64> = HashMap::new();
        for row in rows {
            let (name, cents, raw) = row?;
            let entry = totals.entry(name).or_default();
            if let Some(cents) = reconcile_cents(cents, raw.as_deref()) {
                *entry += cents;
            }
        }

        let mut ranked: Vec<(String, i64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);

        Ok(ranked
            .into_iter()
            .map(|(name, cents)| (name, cents as f64 / 100.0))
            .collect())
    }
}
