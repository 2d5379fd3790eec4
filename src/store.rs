// src/store.rs

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Type, Value, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params, params_from_iter};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError, UnknownLabel};
use crate::models::{
    Customer, CustomerPatch, Document, DocumentType, Job, JobPatch, JobStatus, ServiceFrequency,
    Site,
};
use crate::normalize;

/// Durable store for customers, sites, jobs, and documents, with the
/// attachment files kept next to the database. One store owns one SQLite
/// connection; every operation is a single implicit transaction.
pub struct TrapStore {
    pub(crate) conn: Connection,
    documents_dir: PathBuf,
}

/// Conjunctive filters for job listing and counting. `search` matches a
/// substring of the customer name or the invoice number.
#[derive(Debug, Clone)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub customer_id: Option<Uuid>,
    pub technician: Option<String>,
    pub search: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for JobFilter {
    fn default() -> Self {
        JobFilter {
            status: None,
            customer_id: None,
            technician: None,
            search: None,
            date_from: None,
            date_to: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl JobFilter {
    /// WHERE fragment plus bound params, shared by list and count.
    pub(crate) fn where_clause(&self) -> (String, Vec<Value>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut params: Vec<Value> = Vec::new();

        if let Some(status) = self.status {
            sql.push_str(" AND status = ?");
            params.push(Value::from(status.as_str().to_string()));
        }
        if let Some(customer_id) = self.customer_id {
            sql.push_str(" AND customer_id = ?");
            params.push(Value::from(customer_id.to_string()));
        }
        if let Some(technician) = &self.technician {
            sql.push_str(" AND technician LIKE ?");
            params.push(Value::from(format!("%{technician}%")));
        }
        if let Some(search) = &self.search {
            sql.push_str(" AND (customer_name LIKE ? OR invoice_number LIKE ?)");
            let pattern = format!("%{search}%");
            params.push(Value::from(pattern.clone()));
            params.push(Value::from(pattern));
        }
        if let Some(date_from) = &self.date_from {
            sql.push_str(" AND service_date >= ?");
            params.push(Value::from(date_from.clone()));
        }
        if let Some(date_to) = &self.date_to {
            sql.push_str(" AND service_date <= ?");
            params.push(Value::from(date_to.clone()));
        }

        (sql, params)
    }
}

impl TrapStore {
    /// Open (or create) the database and the attachment directory.
    pub fn open(db_path: impl AsRef<Path>, documents_dir: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let documents_dir = documents_dir.as_ref().to_path_buf();
        fs::create_dir_all(&documents_dir)?;

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "foreign_keys", true)?;

        let store = TrapStore {
            conn,
            documents_dir,
        };
        store.init_schema()?;
        info!("Database initialized");
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS customers (
                customer_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                legal_name TEXT,
                phone TEXT,
                email TEXT,
                billing_address TEXT,
                service_address TEXT,
                city TEXT,
                state TEXT,
                zip_code TEXT,
                notes TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS sites (
                site_id TEXT PRIMARY KEY,
                customer_id TEXT,
                name TEXT NOT NULL,
                address TEXT,
                city TEXT,
                state TEXT,
                zip_code TEXT,
                municipality TEXT,
                sewer_authority TEXT,
                permit_number TEXT,
                service_frequency TEXT,
                service_frequency_days INTEGER,
                last_service_date TEXT,
                next_service_date TEXT,
                access_notes TEXT,
                notes TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (customer_id) REFERENCES customers(customer_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS jobs (
                job_id TEXT PRIMARY KEY,
                customer_id TEXT,
                site_id TEXT,
                asset_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                scheduled_date TEXT,
                service_date TEXT,
                service_date_str TEXT,
                source_filename TEXT,
                confidence_score INTEGER NOT NULL DEFAULT 0,
                extracted_fields TEXT,
                missing_fields TEXT,
                status TEXT NOT NULL DEFAULT 'Draft',
                invoice_number TEXT,
                manifest_number TEXT,
                customer_name TEXT,
                customer_address TEXT,
                phone TEXT,
                trap_size TEXT,
                gallons_pumped REAL,
                gallons_pumped_str TEXT,
                invoice_total_cents INTEGER,
                invoice_total_str TEXT,
                technician TEXT,
                truck_id TEXT,
                disposal_facility TEXT,
                notes TEXT,
                FOREIGN KEY (customer_id) REFERENCES customers(customer_id),
                FOREIGN KEY (site_id) REFERENCES sites(site_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                doc_id TEXT PRIMARY KEY,
                job_id TEXT,
                doc_type TEXT NOT NULL DEFAULT 'other',
                filename TEXT NOT NULL,
                original_filename TEXT,
                file_size INTEGER NOT NULL DEFAULT 0,
                mime_type TEXT,
                stored_path TEXT,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (job_id) REFERENCES jobs(job_id)
            )",
            [],
        )?;

        for index_sql in [
            "CREATE INDEX IF NOT EXISTS idx_customers_name ON customers(name)",
            "CREATE INDEX IF NOT EXISTS idx_customers_active ON customers(is_active)",
            "CREATE INDEX IF NOT EXISTS idx_sites_customer ON sites(customer_id)",
            "CREATE INDEX IF NOT EXISTS idx_sites_next_service ON sites(next_service_date)",
            "CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status)",
            "CREATE INDEX IF NOT EXISTS idx_jobs_customer ON jobs(customer_id)",
            "CREATE INDEX IF NOT EXISTS idx_jobs_service_date ON jobs(service_date)",
            "CREATE INDEX IF NOT EXISTS idx_jobs_created ON jobs(created_at DESC)",
            "CREATE INDEX IF NOT EXISTS idx_docs_job ON documents(job_id)",
        ] {
            self.conn.execute(index_sql, [])?;
        }

        Ok(())
    }

    /// Drops and recreates every table, wiping all data. Irreversible —
    /// callers own the confirmation step.
    pub fn reset(&self) -> Result<()> {
        self.conn.execute_batch(
            "DROP TABLE IF EXISTS documents;
             DROP TABLE IF EXISTS jobs;
             DROP TABLE IF EXISTS sites;
             DROP TABLE IF EXISTS customers;",
        )?;
        self.init_schema()?;
        warn!("Database reset: all records wiped");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Customers
    // -----------------------------------------------------------------------

    fn row_to_customer(row: &Row<'_>) -> rusqlite::Result<Customer> {
        Ok(Customer {
            customer_id: parse_uuid(&row.get::<_, String>("customer_id")?)?,
            name: row.get("name")?,
            legal_name: row.get("legal_name")?,
            phone: row.get("phone")?,
            email: row.get("email")?,
            billing_address: row.get("billing_address")?,
            service_address: row.get("service_address")?,
            city: row.get("city")?,
            state: row.get("state")?,
            zip_code: row.get("zip_code")?,
            notes: row.get("notes")?,
            is_active: row.get("is_active")?,
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?)?,
            updated_at: parse_timestamp(&row.get::<_, String>("updated_at")?)?,
        })
    }

    /// Insert or update a customer, refreshing `updated_at`.
    pub fn save_customer(&self, customer: &mut Customer) -> Result<()> {
        customer.updated_at = Utc::now();
        self.conn.execute(
            "INSERT OR REPLACE INTO customers (
                customer_id, name, legal_name, phone, email,
                billing_address, service_address, city, state, zip_code,
                notes, is_active, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                customer.customer_id.to_string(),
                customer.name,
                customer.legal_name,
                customer.phone,
                customer.email,
                customer.billing_address,
                customer.service_address,
                customer.city,
                customer.state,
                customer.zip_code,
                customer.notes,
                customer.is_active,
                customer.created_at.to_rfc3339(),
                customer.updated_at.to_rfc3339(),
            ],
        )?;
        info!(customer_id = %customer.customer_id, "Customer saved");
        Ok(())
    }

    pub fn get_customer(&self, customer_id: &Uuid) -> Result<Option<Customer>> {
        let customer = self
            .conn
            .query_row(
                "SELECT * FROM customers WHERE customer_id = ?1",
                params![customer_id.to_string()],
                Self::row_to_customer,
            )
            .optional()?;
        Ok(customer)
    }

    /// List customers alphabetically; soft-deleted rows are excluded unless
    /// `active_only` is false.
    pub fn list_customers(
        &self,
        search: Option<&str>,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Customer>> {
        let mut sql = String::from("SELECT * FROM customers WHERE 1=1");
        let mut params: Vec<Value> = Vec::new();

        if active_only {
            sql.push_str(" AND is_active = 1");
        }
        if let Some(search) = search {
            sql.push_str(" AND (name LIKE ? OR legal_name LIKE ? OR email LIKE ?)");
            let pattern = format!("%{search}%");
            params.push(Value::from(pattern.clone()));
            params.push(Value::from(pattern.clone()));
            params.push(Value::from(pattern));
        }
        sql.push_str(" ORDER BY name ASC LIMIT ? OFFSET ?");
        params.push(Value::from(limit));
        params.push(Value::from(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), Self::row_to_customer)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn update_customer(
        &self,
        customer_id: &Uuid,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>> {
        let Some(mut customer) = self.get_customer(customer_id)? else {
            return Ok(None);
        };
        customer.apply(patch);
        self.save_customer(&mut customer)?;
        Ok(Some(customer))
    }

    /// Soft delete: flips the active flag so job history stays intact.
    pub fn delete_customer(&self, customer_id: &Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE customers SET is_active = 0, updated_at = ?1 WHERE customer_id = ?2",
            params![Utc::now().to_rfc3339(), customer_id.to_string()],
        )?;
        if changed > 0 {
            info!(customer_id = %customer_id, "Customer deactivated");
        }
        Ok(changed > 0)
    }

    pub fn count_customers(&self, active_only: bool) -> Result<i64> {
        let sql = if active_only {
            "SELECT COUNT(*) FROM customers WHERE is_active = 1"
        } else {
            "SELECT COUNT(*) FROM customers"
        };
        Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
    }

    // -----------------------------------------------------------------------
    // Sites
    // -----------------------------------------------------------------------

    fn row_to_site(row: &Row<'_>) -> rusqlite::Result<Site> {
        Ok(Site {
            site_id: parse_uuid(&row.get::<_, String>("site_id")?)?,
            customer_id: parse_uuid_opt(row.get("customer_id")?)?,
            name: row.get("name")?,
            address: row.get("address")?,
            city: row.get("city")?,
            state: row.get("state")?,
            zip_code: row.get("zip_code")?,
            municipality: row.get("municipality")?,
            sewer_authority: row.get("sewer_authority")?,
            permit_number: row.get("permit_number")?,
            service_frequency: row.get("service_frequency")?,
            service_frequency_days: row.get("service_frequency_days")?,
            last_service_date: parse_day_opt(row.get("last_service_date")?)?,
            next_service_date: parse_day_opt(row.get("next_service_date")?)?,
            access_notes: row.get("access_notes")?,
            notes: row.get("notes")?,
            is_active: row.get("is_active")?,
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?)?,
            updated_at: parse_timestamp(&row.get::<_, String>("updated_at")?)?,
        })
    }

    /// Insert or update a site, refreshing `updated_at`.
    pub fn save_site(&self, site: &mut Site) -> Result<()> {
        site.updated_at = Utc::now();
        self.conn.execute(
            "INSERT OR REPLACE INTO sites (
                site_id, customer_id, name, address, city, state, zip_code,
                municipality, sewer_authority, permit_number,
                service_frequency, service_frequency_days,
                last_service_date, next_service_date,
                access_notes, notes, is_active, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                site.site_id.to_string(),
                site.customer_id.map(|id| id.to_string()),
                site.name,
                site.address,
                site.city,
                site.state,
                site.zip_code,
                site.municipality,
                site.sewer_authority,
                site.permit_number,
                site.service_frequency,
                site.service_frequency_days,
                site.last_service_date.map(normalize::date_to_iso),
                site.next_service_date.map(normalize::date_to_iso),
                site.access_notes,
                site.notes,
                site.is_active,
                site.created_at.to_rfc3339(),
                site.updated_at.to_rfc3339(),
            ],
        )?;
        info!(site_id = %site.site_id, "Site saved");
        Ok(())
    }

    pub fn get_site(&self, site_id: &Uuid) -> Result<Option<Site>> {
        let site = self
            .conn
            .query_row(
                "SELECT * FROM sites WHERE site_id = ?1",
                params![site_id.to_string()],
                Self::row_to_site,
            )
            .optional()?;
        Ok(site)
    }

    pub fn list_sites(
        &self,
        customer_id: Option<&Uuid>,
        active_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Site>> {
        let mut sql = String::from("SELECT * FROM sites WHERE 1=1");
        let mut params: Vec<Value> = Vec::new();

        if active_only {
            sql.push_str(" AND is_active = 1");
        }
        if let Some(customer_id) = customer_id {
            sql.push_str(" AND customer_id = ?");
            params.push(Value::from(customer_id.to_string()));
        }
        sql.push_str(" ORDER BY name ASC LIMIT ? OFFSET ?");
        params.push(Value::from(limit));
        params.push(Value::from(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), Self::row_to_site)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Active sites whose next service date is strictly before today,
    /// soonest-overdue first.
    pub fn list_overdue_sites(&self) -> Result<Vec<Site>> {
        let today = normalize::date_to_iso(Utc::now().date_naive());
        let mut stmt = self.conn.prepare(
            "SELECT * FROM sites
             WHERE is_active = 1
               AND next_service_date IS NOT NULL
               AND next_service_date < ?1
             ORDER BY next_service_date ASC",
        )?;
        let rows = stmt.query_map(params![today], Self::row_to_site)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Soft delete, as for customers.
    pub fn delete_site(&self, site_id: &Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE sites SET is_active = 0, updated_at = ?1 WHERE site_id = ?2",
            params![Utc::now().to_rfc3339(), site_id.to_string()],
        )?;
        if changed > 0 {
            info!(site_id = %site_id, "Site deactivated");
        }
        Ok(changed > 0)
    }

    pub fn count_sites(&self, active_only: bool) -> Result<i64> {
        let sql = if active_only {
            "SELECT COUNT(*) FROM sites WHERE is_active = 1"
        } else {
            "SELECT COUNT(*) FROM sites"
        };
        Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
    }

    // -----------------------------------------------------------------------
    // Jobs
    // -----------------------------------------------------------------------

    pub(crate) fn row_to_job(row: &Row<'_>) -> rusqlite::Result<Job> {
        Ok(Job {
            job_id: parse_uuid(&row.get::<_, String>("job_id")?)?,
            customer_id: parse_uuid_opt(row.get("customer_id")?)?,
            site_id: parse_uuid_opt(row.get("site_id")?)?,
            asset_id: parse_uuid_opt(row.get("asset_id")?)?,
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?)?,
            updated_at: parse_timestamp(&row.get::<_, String>("updated_at")?)?,
            scheduled_date: parse_day_opt(row.get("scheduled_date")?)?,
            service_date: parse_day_opt(row.get("service_date")?)?,
            source_filename: row.get("source_filename")?,
            confidence_score: row.get("confidence_score")?,
            extracted_fields: parse_field_list(row.get("extracted_fields")?)?,
            missing_fields: parse_field_list(row.get("missing_fields")?)?,
            status: row.get("status")?,
            invoice_number: row.get("invoice_number")?,
            manifest_number: row.get("manifest_number")?,
            service_date_str: row.get("service_date_str")?,
            customer_name: row.get("customer_name")?,
            customer_address: row.get("customer_address")?,
            phone: row.get("phone")?,
            trap_size: row.get("trap_size")?,
            gallons_pumped: row.get("gallons_pumped")?,
            gallons_pumped_str: row.get("gallons_pumped_str")?,
            invoice_total_cents: row.get("invoice_total_cents")?,
            invoice_total_str: row.get("invoice_total_str")?,
            technician: row.get("technician")?,
            truck_id: row.get("truck_id")?,
            disposal_facility: row.get("disposal_facility")?,
            notes: row.get("notes")?,
        })
    }

    /// Insert or update a job. Typed values are backfilled from any
    /// hand-entered strings, then the stored strings are re-derived from
    /// the typed values — a typed value always wins over a stale string.
    pub fn save_job(&self, job: &mut Job) -> Result<()> {
        job.updated_at = Utc::now();

        if job.service_date.is_none() {
            job.service_date = job.service_date_str.as_deref().and_then(normalize::parse_date);
        }
        if let Some(date) = job.service_date {
            job.service_date_str = Some(normalize::date_to_iso(date));
        }
        if job.gallons_pumped.is_none() {
            job.gallons_pumped = job
                .gallons_pumped_str
                .as_deref()
                .and_then(normalize::gallons_from_str);
        }
        if let Some(gallons) = job.gallons_pumped {
            job.gallons_pumped_str = Some(normalize::gallons_to_display(gallons));
        }
        if job.invoice_total_cents.is_none() {
            job.invoice_total_cents = job
                .invoice_total_str
                .as_deref()
                .and_then(normalize::money_to_cents);
        }
        if let Some(cents) = job.invoice_total_cents {
            job.invoice_total_str = Some(normalize::cents_to_display(cents));
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO jobs (
                job_id, customer_id, site_id, asset_id,
                created_at, updated_at, scheduled_date,
                service_date, service_date_str,
                source_filename, confidence_score, extracted_fields, missing_fields,
                status, invoice_number, manifest_number,
                customer_name, customer_address, phone, trap_size,
                gallons_pumped, gallons_pumped_str,
                invoice_total_cents, invoice_total_str,
                technician, truck_id, disposal_facility, notes
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                       ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)",
            params![
                job.job_id.to_string(),
                job.customer_id.map(|id| id.to_string()),
                job.site_id.map(|id| id.to_string()),
                job.asset_id.map(|id| id.to_string()),
                job.created_at.to_rfc3339(),
                job.updated_at.to_rfc3339(),
                job.scheduled_date.map(normalize::date_to_iso),
                job.service_date.map(normalize::date_to_iso),
                job.service_date_str,
                job.source_filename,
                job.confidence_score,
                serde_json::to_string(&job.extracted_fields)?,
                serde_json::to_string(&job.missing_fields)?,
                job.status,
                job.invoice_number,
                job.manifest_number,
                job.customer_name,
                job.customer_address,
                job.phone,
                job.trap_size,
                job.gallons_pumped,
                job.gallons_pumped_str,
                job.invoice_total_cents,
                job.invoice_total_str,
                job.technician,
                job.truck_id,
                job.disposal_facility,
                job.notes,
            ],
        )?;
        info!(job_id = %job.job_id, status = %job.status, "Job saved");
        Ok(())
    }

    pub fn load_job(&self, job_id: &Uuid) -> Result<Option<Job>> {
        let job = self
            .conn
            .query_row(
                "SELECT * FROM jobs WHERE job_id = ?1",
                params![job_id.to_string()],
                Self::row_to_job,
            )
            .optional()?;
        Ok(job)
    }

    /// List jobs newest-created first, with all filters AND-composed.
    pub fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>> {
        let (where_sql, mut params) = filter.where_clause();
        let sql = format!("SELECT * FROM jobs{where_sql} ORDER BY created_at DESC LIMIT ? OFFSET ?");
        params.push(Value::from(filter.limit));
        params.push(Value::from(filter.offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), Self::row_to_job)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Cardinality under the same filter semantics as `list_jobs`
    /// (limit/offset are ignored).
    pub fn count_jobs(&self, filter: &JobFilter) -> Result<i64> {
        let (where_sql, params) = filter.where_clause();
        let sql = format!("SELECT COUNT(*) FROM jobs{where_sql}");
        Ok(self
            .conn
            .query_row(&sql, params_from_iter(params), |row| row.get(0))?)
    }

    pub fn update_job(&self, job_id: &Uuid, patch: &JobPatch) -> Result<Option<Job>> {
        let Some(mut job) = self.load_job(job_id)? else {
            return Ok(None);
        };
        job.apply(patch);
        self.save_job(&mut job)?;
        Ok(Some(job))
    }

    /// Transition a job to Verified. Rejects with the specific missing
    /// fields when the required set is incomplete.
    pub fn verify_job(&self, job_id: &Uuid) -> Result<Option<Job>> {
        let Some(mut job) = self.load_job(job_id)? else {
            return Ok(None);
        };
        let missing = job.missing_required_fields();
        if !missing.is_empty() {
            return Err(StoreError::MissingRequiredFields(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }
        job.status = JobStatus::Verified;
        self.save_job(&mut job)?;
        Ok(Some(job))
    }

    /// Hard delete. Documents attached to the job are left in place and
    /// become orphans.
    pub fn delete_job(&self, job_id: &Uuid) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM jobs WHERE job_id = ?1", params![job_id.to_string()])?;
        if changed > 0 {
            info!(job_id = %job_id, "Job deleted");
        }
        Ok(changed > 0)
    }

    /// Distinct non-empty technician names, alphabetical.
    pub fn unique_technicians(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT technician FROM jobs
             WHERE technician IS NOT NULL AND technician != ''
             ORDER BY technician",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        Ok(Document {
            doc_id: parse_uuid(&row.get::<_, String>("doc_id")?)?,
            job_id: parse_uuid_opt(row.get("job_id")?)?,
            doc_type: row.get("doc_type")?,
            filename: row.get("filename")?,
            original_filename: row.get("original_filename")?,
            file_size: row.get("file_size")?,
            mime_type: row.get("mime_type")?,
            stored_path: row.get("stored_path")?,
            notes: row.get("notes")?,
            created_at: parse_timestamp(&row.get::<_, String>("created_at")?)?,
        })
    }

    /// Store an attachment: the file is written first (id-prefixed name so
    /// uploads can't collide), then the record. A crash in between leaves
    /// an orphaned file, never a record pointing at nothing.
    pub fn save_document(
        &self,
        job_id: &Uuid,
        doc_type: DocumentType,
        file_bytes: &[u8],
        filename: &str,
        mime_type: Option<&str>,
    ) -> Result<Document> {
        let doc_id = Uuid::new_v4();
        let stored_path = self.documents_dir.join(format!("{doc_id}_{filename}"));
        fs::write(&stored_path, file_bytes)?;

        let doc = Document {
            doc_id,
            job_id: Some(*job_id),
            doc_type,
            filename: filename.to_string(),
            original_filename: Some(filename.to_string()),
            file_size: file_bytes.len() as i64,
            mime_type: mime_type.map(str::to_string),
            stored_path: Some(stored_path.to_string_lossy().into_owned()),
            notes: None,
            created_at: Utc::now(),
        };

        self.conn.execute(
            "INSERT INTO documents (
                doc_id, job_id, doc_type, filename, original_filename,
                file_size, mime_type, stored_path, notes, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                doc.doc_id.to_string(),
                doc.job_id.map(|id| id.to_string()),
                doc.doc_type,
                doc.filename,
                doc.original_filename,
                doc.file_size,
                doc.mime_type,
                doc.stored_path,
                doc.notes,
                doc.created_at.to_rfc3339(),
            ],
        )?;
        info!(doc_id = %doc.doc_id, filename = %doc.filename, doc_type = %doc.doc_type, "Document stored");
        Ok(doc)
    }

    pub fn get_document(&self, doc_id: &Uuid) -> Result<Option<Document>> {
        let doc = self
            .conn
            .query_row(
                "SELECT * FROM documents WHERE doc_id = ?1",
                params![doc_id.to_string()],
                Self::row_to_document,
            )
            .optional()?;
        Ok(doc)
    }

    pub fn list_documents(
        &self,
        job_id: Option<&Uuid>,
        doc_type: Option<DocumentType>,
    ) -> Result<Vec<Document>> {
        let mut sql = String::from("SELECT * FROM documents WHERE 1=1");
        let mut params: Vec<Value> = Vec::new();

        if let Some(job_id) = job_id {
            sql.push_str(" AND job_id = ?");
            params.push(Value::from(job_id.to_string()));
        }
        if let Some(doc_type) = doc_type {
            sql.push_str(" AND doc_type = ?");
            params.push(Value::from(doc_type.as_str().to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), Self::row_to_document)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Remove the stored file and the record. Returns false for unknown ids.
    pub fn delete_document(&self, doc_id: &Uuid) -> Result<bool> {
        let Some(doc) = self.get_document(doc_id)? else {
            return Ok(false);
        };

        if let Some(stored_path) = &doc.stored_path {
            let path = Path::new(stored_path);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }

        let changed = self
            .conn
            .execute("DELETE FROM documents WHERE doc_id = ?1", params![doc_id.to_string()])?;
        if changed > 0 {
            info!(doc_id = %doc_id, "Document deleted");
        }
        Ok(changed > 0)
    }
}

// ---------------------------------------------------------------------------
// SQL conversions
// ---------------------------------------------------------------------------

impl ToSql for JobStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for JobStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let label = value.as_str()?;
        JobStatus::from_label(label)
            .ok_or_else(|| FromSqlError::Other(Box::new(UnknownLabel::new("job status", label))))
    }
}

impl ToSql for DocumentType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DocumentType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let label = value.as_str()?;
        DocumentType::from_label(label)
            .ok_or_else(|| FromSqlError::Other(Box::new(UnknownLabel::new("document type", label))))
    }
}

impl ToSql for ServiceFrequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ServiceFrequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let label = value.as_str()?;
        ServiceFrequency::from_label(label).ok_or_else(|| {
            FromSqlError::Other(Box::new(UnknownLabel::new("service frequency", label)))
        })
    }
}

fn parse_uuid(raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn parse_uuid_opt(raw: Option<String>) -> rusqlite::Result<Option<Uuid>> {
    raw.as_deref().map(parse_uuid).transpose()
}

fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn parse_day_opt(raw: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    raw.as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
        })
        .transpose()
}

fn parse_field_list(raw: Option<String>) -> rusqlite::Result<Vec<String>> {
    match raw {
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use tempfile::TempDir;

    fn test_store() -> (TrapStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TrapStore::open(dir.path().join("test.db"), dir.path().join("documents"))
            .unwrap();
        (store, dir)
    }

    fn job_with_invoice(invoice_number: &str) -> Job {
        Job {
            invoice_number: Some(invoice_number.to_string()),
            ..Job::new()
        }
    }

    #[test]
    fn save_and_load_job_is_a_fixed_point() {
        let (store, _dir) = test_store();

        let mut job = Job::new();
        job.invoice_number = Some("FULL-001".to_string());
        job.service_date_str = Some("2026-01-15".to_string());
        job.customer_name = Some("Full Test Co".to_string());
        job.customer_address = Some("123 Main St, City, ST 12345".to_string());
        job.phone = Some("555-123-4567".to_string());
        job.trap_size = Some("1,500 gallons".to_string());
        job.gallons_pumped_str = Some("1,200 gallons".to_string());
        job.technician = Some("John Smith".to_string());
        job.truck_id = Some("T-41".to_string());
        job.disposal_facility = Some("City Treatment Plant".to_string());
        job.invoice_total_str = Some("$500.00".to_string());
        job.notes = Some("Test notes".to_string());
        job.source_filename = Some("test.txt".to_string());
        job.confidence_score = 85;
        job.extracted_fields = vec!["invoice_number".to_string(), "customer_name".to_string()];
        job.missing_fields = vec!["phone".to_string()];

        store.save_job(&mut job).unwrap();
        let loaded = store.load_job(&job.job_id).unwrap().unwrap();
        assert_eq!(loaded, job);
    }

    #[test]
    fn load_unknown_job_is_none() {
        let (store, _dir) = test_store();
        assert!(store.load_job(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn save_backfills_typed_values_from_strings() {
        let (store, _dir) = test_store();

        let mut job = Job::new();
        job.service_date_str = Some("January 8, 2026".to_string());
        job.gallons_pumped_str = Some("1,320".to_string());
        job.invoice_total_str = Some("$568.40".to_string());
        store.save_job(&mut job).unwrap();

        assert_eq!(job.service_date, NaiveDate::from_ymd_opt(2026, 1, 8));
        assert_eq!(job.service_date_str.as_deref(), Some("2026-01-08"));
        assert_eq!(job.gallons_pumped, Some(1320.0));
        assert_eq!(job.gallons_pumped_str.as_deref(), Some("1,320 gallons"));
        assert_eq!(job.invoice_total_cents, Some(56840));
        assert_eq!(job.invoice_total_str.as_deref(), Some("$568.40"));
    }

    #[test]
    fn typed_value_wins_over_stale_string() {
        let (store, _dir) = test_store();

        let mut job = Job::new();
        job.invoice_total_cents = Some(50000);
        job.invoice_total_str = Some("$9.99".to_string());
        store.save_job(&mut job).unwrap();

        let loaded = store.load_job(&job.job_id).unwrap().unwrap();
        assert_eq!(loaded.invoice_total_str.as_deref(), Some("$500.00"));
        assert_eq!(loaded.invoice_total_cents, Some(50000));
    }

    #[test]
    fn unparseable_strings_survive_round_trip() {
        let (store, _dir) = test_store();

        let mut job = Job::new();
        job.invoice_total_str = Some("call for pricing".to_string());
        job.service_date_str = Some("next Tuesday".to_string());
        store.save_job(&mut job).unwrap();

        let loaded = store.load_job(&job.job_id).unwrap().unwrap();
        assert_eq!(loaded.invoice_total_cents, None);
        assert_eq!(loaded.invoice_total_str.as_deref(), Some("call for pricing"));
        assert_eq!(loaded.service_date, None);
        assert_eq!(loaded.service_date_str.as_deref(), Some("next Tuesday"));
    }

    #[test]
    fn list_jobs_newest_created_first() {
        let (store, _dir) = test_store();

        let mut first = job_with_invoice("FIRST");
        let mut second = job_with_invoice("SECOND");
        second.created_at = first.created_at + chrono::Duration::milliseconds(5);

        store.save_job(&mut first).unwrap();
        store.save_job(&mut second).unwrap();

        let jobs = store.list_jobs(&JobFilter::default()).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].invoice_number.as_deref(), Some("SECOND"));
    }

    #[test]
    fn pagination_pages_are_disjoint_and_cover_everything() {
        let (store, _dir) = test_store();

        let base = Utc::now();
        let mut all_ids = std::collections::HashSet::new();
        for i in 0..5 {
            let mut job = job_with_invoice(&format!("JOB-{i:03}"));
            job.created_at = base + chrono::Duration::milliseconds(i);
            store.save_job(&mut job).unwrap();
            all_ids.insert(job.job_id);
        }

        let mut seen = std::collections::HashSet::new();
        let mut offset = 0;
        loop {
            let page = store
                .list_jobs(&JobFilter {
                    limit: 2,
                    offset,
                    ..JobFilter::default()
                })
                .unwrap();
            if page.is_empty() {
                break;
            }
            for job in &page {
                assert!(seen.insert(job.job_id), "duplicate across pages");
            }
            offset += 2;
        }
        assert_eq!(seen, all_ids);
    }

    #[test]
    fn job_filters_are_conjunctive() {
        let (store, _dir) = test_store();

        let mut customer = Customer::new("Tony's Restaurant");
        store.save_customer(&mut customer).unwrap();

        let mut a = job_with_invoice("INV-001");
        a.customer_id = Some(customer.customer_id);
        a.customer_name = Some("Tony's Restaurant".to_string());
        a.technician = Some("John Smith".to_string());
        a.service_date_str = Some("2026-01-05".to_string());
        a.status = JobStatus::Verified;
        store.save_job(&mut a).unwrap();

        let mut b = job_with_invoice("INV-002");
        b.customer_name = Some("Joe's Diner".to_string());
        b.technician = Some("Jane Doe".to_string());
        b.service_date_str = Some("2026-01-25".to_string());
        store.save_job(&mut b).unwrap();

        let by_status = store
            .list_jobs(&JobFilter {
                status: Some(JobStatus::Verified),
                ..JobFilter::default()
            })
            .unwrap();
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].invoice_number.as_deref(), Some("INV-001"));

        let by_customer = store
            .list_jobs(&JobFilter {
                customer_id: Some(customer.customer_id),
                ..JobFilter::default()
            })
            .unwrap();
        assert_eq!(by_customer.len(), 1);

        let by_technician = store
            .list_jobs(&JobFilter {
                technician: Some("Smith".to_string()),
                ..JobFilter::default()
            })
            .unwrap();
        assert_eq!(by_technician.len(), 1);

        let by_search_name = store
            .list_jobs(&JobFilter {
                search: Some("Tony".to_string()),
                ..JobFilter::default()
            })
            .unwrap();
        assert_eq!(by_search_name.len(), 1);

        let by_search_invoice = store
            .list_jobs(&JobFilter {
                search: Some("002".to_string()),
                ..JobFilter::default()
            })
            .unwrap();
        assert_eq!(by_search_invoice[0].invoice_number.as_deref(), Some("INV-002"));

        let by_date = store
            .list_jobs(&JobFilter {
                date_from: Some("2026-01-01".to_string()),
                date_to: Some("2026-01-10".to_string()),
                ..JobFilter::default()
            })
            .unwrap();
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].invoice_number.as_deref(), Some("INV-001"));

        let combined = store
            .list_jobs(&JobFilter {
                status: Some(JobStatus::Verified),
                technician: Some("Doe".to_string()),
                ..JobFilter::default()
            })
            .unwrap();
        assert!(combined.is_empty());
    }

    #[test]
    fn patch_update_changes_only_named_fields() {
        let (store, _dir) = test_store();

        let mut job = job_with_invoice("STATUS-001");
        job.customer_name = Some("Keep Me".to_string());
        store.save_job(&mut job).unwrap();

        let updated = store
            .update_job(
                &job.job_id,
                &JobPatch {
                    status: Some(JobStatus::Verified),
                    ..JobPatch::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, JobStatus::Verified);

        let reloaded = store.load_job(&job.job_id).unwrap().unwrap();
        assert_eq!(reloaded.status, JobStatus::Verified);
        assert_eq!(reloaded.invoice_number.as_deref(), Some("STATUS-001"));
        assert_eq!(reloaded.customer_name.as_deref(), Some("Keep Me"));
    }

    #[test]
    fn update_unknown_job_is_none() {
        let (store, _dir) = test_store();
        let result = store
            .update_job(&Uuid::new_v4(), &JobPatch::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn verify_job_rejects_with_missing_fields() {
        let (store, _dir) = test_store();

        let mut job = job_with_invoice("VER-001");
        store.save_job(&mut job).unwrap();

        let err = store.verify_job(&job.job_id).unwrap_err();
        match err {
            StoreError::MissingRequiredFields(missing) => {
                assert_eq!(missing, vec!["service_date", "customer_name"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        store
            .update_job(
                &job.job_id,
                &JobPatch {
                    service_date_str: Some("2026-01-01".to_string()),
                    customer_name: Some("Test Customer".to_string()),
                    ..JobPatch::default()
                },
            )
            .unwrap();

        let verified = store.verify_job(&job.job_id).unwrap().unwrap();
        assert_eq!(verified.status, JobStatus::Verified);
    }

    #[test]
    fn delete_job_leaves_documents_orphaned() {
        let (store, _dir) = test_store();

        let mut job = job_with_invoice("DEL-001");
        store.save_job(&mut job).unwrap();
        store
            .save_document(&job.job_id, DocumentType::Invoice, b"pdf", "inv.pdf", None)
            .unwrap();

        assert!(store.delete_job(&job.job_id).unwrap());
        assert!(store.load_job(&job.job_id).unwrap().is_none());
        assert!(!store.delete_job(&job.job_id).unwrap());

        let orphans = store.list_documents(Some(&job.job_id), None).unwrap();
        assert_eq!(orphans.len(), 1);
    }

    #[test]
    fn count_jobs_honors_filters() {
        let (store, _dir) = test_store();

        for status in [JobStatus::Draft, JobStatus::Draft, JobStatus::Verified] {
            let mut job = Job::new();
            job.status = status;
            store.save_job(&mut job).unwrap();
        }

        assert_eq!(store.count_jobs(&JobFilter::default()).unwrap(), 3);
        let drafts = JobFilter {
            status: Some(JobStatus::Draft),
            ..JobFilter::default()
        };
        assert_eq!(store.count_jobs(&drafts).unwrap(), 2);
        let exported = JobFilter {
            status: Some(JobStatus::Exported),
            ..JobFilter::default()
        };
        assert_eq!(store.count_jobs(&exported).unwrap(), 0);
    }

    #[test]
    fn malformed_status_label_fails_loudly() {
        let (store, _dir) = test_store();

        let mut job = job_with_invoice("BAD-STATUS");
        store.save_job(&mut job).unwrap();
        store
            .conn
            .execute(
                "UPDATE jobs SET status = 'Bogus' WHERE job_id = ?1",
                params![job.job_id.to_string()],
            )
            .unwrap();

        assert!(store.load_job(&job.job_id).is_err());
    }

    #[test]
    fn customer_crud_and_soft_delete() {
        let (store, _dir) = test_store();

        let mut customer = Customer::new("Tony's Pizza");
        customer.legal_name = Some("Tony's Pizza LLC".to_string());
        customer.phone = Some("555-123-4567".to_string());
        customer.city = Some("Chicago".to_string());
        customer.state = Some("IL".to_string());
        store.save_customer(&mut customer).unwrap();

        let loaded = store.get_customer(&customer.customer_id).unwrap().unwrap();
        assert_eq!(loaded, customer);
        assert!(store.get_customer(&Uuid::new_v4()).unwrap().is_none());

        let updated = store
            .update_customer(
                &customer.customer_id,
                &CustomerPatch {
                    name: Some("Updated Name".to_string()),
                    phone: Some("555-999-0000".to_string()),
                    ..CustomerPatch::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Updated Name");
        assert_eq!(updated.legal_name.as_deref(), Some("Tony's Pizza LLC"));

        assert!(store.delete_customer(&customer.customer_id).unwrap());
        assert!(store.list_customers(None, true, 100, 0).unwrap().is_empty());
        let all = store.list_customers(None, false, 100, 0).unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_active);

        assert!(!store.delete_customer(&Uuid::new_v4()).unwrap());
    }

    #[test]
    fn customers_list_sorted_and_searchable() {
        let (store, _dir) = test_store();

        for name in ["Zoe's Diner", "Alice's Cafe", "Mike's Grill"] {
            store.save_customer(&mut Customer::new(name)).unwrap();
        }

        let customers = store.list_customers(None, true, 100, 0).unwrap();
        let names: Vec<_> = customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alice's Cafe", "Mike's Grill", "Zoe's Diner"]);

        let hits = store.list_customers(Some("Mike"), true, 100, 0).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Mike's Grill");
    }

    #[test]
    fn count_customers_respects_active_flag() {
        let (store, _dir) = test_store();

        store.save_customer(&mut Customer::new("A")).unwrap();
        store.save_customer(&mut Customer::new("B")).unwrap();
        let mut inactive = Customer::new("C");
        inactive.is_active = false;
        store.save_customer(&mut inactive).unwrap();

        assert_eq!(store.count_customers(true).unwrap(), 2);
        assert_eq!(store.count_customers(false).unwrap(), 3);
    }

    #[test]
    fn site_crud_with_frequency_enum() {
        let (store, _dir) = test_store();

        let mut customer = Customer::new("Test Customer");
        store.save_customer(&mut customer).unwrap();

        let mut site = Site::new("Main Kitchen");
        site.customer_id = Some(customer.customer_id);
        site.address = Some("123 Main St".to_string());
        site.municipality = Some("Chicago".to_string());
        site.permit_number = Some("FOG-2231".to_string());
        site.service_frequency = Some(ServiceFrequency::Monthly);
        site.service_frequency_days = Some(30);
        store.save_site(&mut site).unwrap();

        let loaded = store.get_site(&site.site_id).unwrap().unwrap();
        assert_eq!(loaded, site);
        assert_eq!(loaded.service_frequency, Some(ServiceFrequency::Monthly));
        assert!(store.get_site(&Uuid::new_v4()).unwrap().is_none());

        let mut other = Site::new("Annex");
        store.save_site(&mut other).unwrap();
        let for_customer = store
            .list_sites(Some(&customer.customer_id), true, 100, 0)
            .unwrap();
        assert_eq!(for_customer.len(), 1);
        assert_eq!(for_customer[0].name, "Main Kitchen");

        assert!(store.delete_site(&other.site_id).unwrap());
        assert_eq!(store.count_sites(true).unwrap(), 1);
        assert_eq!(store.count_sites(false).unwrap(), 2);
    }

    #[test]
    fn overdue_sites_are_strictly_past_due() {
        let (store, _dir) = test_store();
        let today = Utc::now().date_naive();

        let mut overdue = Site::new("Overdue");
        overdue.next_service_date = Some(today - Days::new(1));
        store.save_site(&mut overdue).unwrap();

        let mut due_today = Site::new("Due Today");
        due_today.next_service_date = Some(today);
        store.save_site(&mut due_today).unwrap();

        let mut upcoming = Site::new("Upcoming");
        upcoming.next_service_date = Some(today + Days::new(1));
        store.save_site(&mut upcoming).unwrap();

        let mut no_date = Site::new("No Date");
        store.save_site(&mut no_date).unwrap();

        let result = store.list_overdue_sites().unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Overdue");
    }

    #[test]
    fn document_file_is_written_then_deleted_with_record() {
        let (store, _dir) = test_store();

        let mut job = job_with_invoice("DOC-001");
        store.save_job(&mut job).unwrap();

        let doc = store
            .save_document(
                &job.job_id,
                DocumentType::Manifest,
                b"manifest body",
                "manifest.pdf",
                Some("application/pdf"),
            )
            .unwrap();

        let stored_path = PathBuf::from(doc.stored_path.clone().unwrap());
        assert!(stored_path.exists());
        assert!(
            stored_path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(&doc.doc_id.to_string())
        );
        assert_eq!(doc.file_size, 13);

        let listed = store
            .list_documents(Some(&job.job_id), Some(DocumentType::Manifest))
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], doc);

        assert!(store.delete_document(&doc.doc_id).unwrap());
        assert!(!stored_path.exists());
        assert!(store.get_document(&doc.doc_id).unwrap().is_none());
        assert!(!store.delete_document(&doc.doc_id).unwrap());
    }

    #[test]
    fn unique_technicians_are_distinct_and_sorted() {
        let (store, _dir) = test_store();

        for technician in [Some("John"), Some("Jane"), Some("John"), None] {
            let mut job = Job::new();
            job.technician = technician.map(str::to_string);
            store.save_job(&mut job).unwrap();
        }

        assert_eq!(store.unique_technicians().unwrap(), vec!["Jane", "John"]);
    }

    #[test]
    fn reset_wipes_every_table() {
        let (store, _dir) = test_store();

        store.save_customer(&mut Customer::new("A")).unwrap();
        store.save_site(&mut Site::new("S")).unwrap();
        let mut job = job_with_invoice("R-1");
        store.save_job(&mut job).unwrap();

        store.reset().unwrap();

        assert_eq!(store.count_customers(false).unwrap(), 0);
        assert_eq!(store.count_sites(false).unwrap(), 0);
        assert_eq!(store.count_jobs(&JobFilter::default()).unwrap(), 0);
    }
}
