// src/models.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::normalize;
use crate::parse::ParseResult;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Workflow status for a job. The display labels round-trip through storage
/// and JSON export, so they must stay exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Verified,
    Invoiced,
    #[serde(rename = "Needs Docs")]
    NeedsDocs,
    Rejected,
    // Legacy statuses still present in stored data
    Draft,
    Exported,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Scheduled => "Scheduled",
            JobStatus::InProgress => "In Progress",
            JobStatus::Completed => "Completed",
            JobStatus::Verified => "Verified",
            JobStatus::Invoiced => "Invoiced",
            JobStatus::NeedsDocs => "Needs Docs",
            JobStatus::Rejected => "Rejected",
            JobStatus::Draft => "Draft",
            JobStatus::Exported => "Exported",
        }
    }

    pub fn from_label(label: &str) -> Option<JobStatus> {
        Some(match label {
            "Scheduled" => JobStatus::Scheduled,
            "In Progress" => JobStatus::InProgress,
            "Completed" => JobStatus::Completed,
            "Verified" => JobStatus::Verified,
            "Invoiced" => JobStatus::Invoiced,
            "Needs Docs" => JobStatus::NeedsDocs,
            "Rejected" => JobStatus::Rejected,
            "Draft" => JobStatus::Draft,
            "Exported" => JobStatus::Exported,
            _ => return None,
        })
    }

    /// Whether this status lands in the "completed" KPI bucket. `Exported`
    /// is a legacy alias treated like `Verified` there.
    pub fn counts_as_completed(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Verified | JobStatus::Invoiced | JobStatus::Exported
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of files that can be attached to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Invoice,
    Manifest,
    Inspection,
    Photo,
    Signature,
    Other,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Manifest => "manifest",
            DocumentType::Inspection => "inspection",
            DocumentType::Photo => "photo",
            DocumentType::Signature => "signature",
            DocumentType::Other => "other",
        }
    }

    pub fn from_label(label: &str) -> Option<DocumentType> {
        Some(match label {
            "invoice" => DocumentType::Invoice,
            "manifest" => DocumentType::Manifest,
            "inspection" => DocumentType::Inspection,
            "photo" => DocumentType::Photo,
            "signature" => DocumentType::Signature,
            "other" => DocumentType::Other,
            _ => return None,
        })
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common service cadences for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceFrequency {
    Weekly,
    #[serde(rename = "Bi-Weekly")]
    BiWeekly,
    Monthly,
    Quarterly,
    #[serde(rename = "Semi-Annual")]
    SemiAnnual,
    Annual,
    #[serde(rename = "On Call")]
    OnCall,
}

impl ServiceFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceFrequency::Weekly => "Weekly",
            ServiceFrequency::BiWeekly => "Bi-Weekly",
            ServiceFrequency::Monthly => "Monthly",
            ServiceFrequency::Quarterly => "Quarterly",
            ServiceFrequency::SemiAnnual => "Semi-Annual",
            ServiceFrequency::Annual => "Annual",
            ServiceFrequency::OnCall => "On Call",
        }
    }

    pub fn from_label(label: &str) -> Option<ServiceFrequency> {
        Some(match label {
            "Weekly" => ServiceFrequency::Weekly,
            "Bi-Weekly" => ServiceFrequency::BiWeekly,
            "Monthly" => ServiceFrequency::Monthly,
            "Quarterly" => ServiceFrequency::Quarterly,
            "Semi-Annual" => ServiceFrequency::SemiAnnual,
            "Annual" => ServiceFrequency::Annual,
            "On Call" => ServiceFrequency::OnCall,
            _ => return None,
        })
    }
}

impl fmt::Display for ServiceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

/// A business that receives grease-trap service. Customers are soft-deleted
/// so job history stays readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: Uuid,
    pub name: String,
    pub legal_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub billing_address: Option<String>,
    pub service_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Customer {
            customer_id: Uuid::new_v4(),
            name: name.into(),
            legal_name: None,
            phone: None,
            email: None,
            billing_address: None,
            service_address: None,
            city: None,
            state: None,
            zip_code: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.legal_name.as_deref().unwrap_or("Unnamed Customer")
        }
    }

    pub fn full_address(&self) -> String {
        join_address(&[
            self.service_address.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.zip_code.as_deref(),
        ])
    }
}

/// Partial update for a customer; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub billing_address: Option<String>,
    pub service_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl Customer {
    pub fn apply(&mut self, patch: &CustomerPatch) {
        if let Some(v) = &patch.name {
            self.name = v.clone();
        }
        if let Some(v) = &patch.legal_name {
            self.legal_name = Some(v.clone());
        }
        if let Some(v) = &patch.phone {
            self.phone = Some(v.clone());
        }
        if let Some(v) = &patch.email {
            self.email = Some(v.clone());
        }
        if let Some(v) = &patch.billing_address {
            self.billing_address = Some(v.clone());
        }
        if let Some(v) = &patch.service_address {
            self.service_address = Some(v.clone());
        }
        if let Some(v) = &patch.city {
            self.city = Some(v.clone());
        }
        if let Some(v) = &patch.state {
            self.state = Some(v.clone());
        }
        if let Some(v) = &patch.zip_code {
            self.zip_code = Some(v.clone());
        }
        if let Some(v) = &patch.notes {
            self.notes = Some(v.clone());
        }
        if let Some(v) = patch.is_active {
            self.is_active = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

/// A service location belonging to a customer. Carries the regulatory
/// identifiers and the schedule used for overdue tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub site_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub municipality: Option<String>,
    pub sewer_authority: Option<String>,
    pub permit_number: Option<String>,
    pub service_frequency: Option<ServiceFrequency>,
    pub service_frequency_days: Option<i64>,
    pub last_service_date: Option<NaiveDate>,
    pub next_service_date: Option<NaiveDate>,
    pub access_notes: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Site {
            site_id: Uuid::new_v4(),
            customer_id: None,
            name: name.into(),
            address: None,
            city: None,
            state: None,
            zip_code: None,
            municipality: None,
            sewer_authority: None,
            permit_number: None,
            service_frequency: None,
            service_frequency_days: None,
            last_service_date: None,
            next_service_date: None,
            access_notes: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_address(&self) -> String {
        join_address(&[
            self.address.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.zip_code.as_deref(),
        ])
    }

    pub fn is_service_overdue(&self) -> bool {
        match self.next_service_date {
            Some(next) => Utc::now().date_naive() > next,
            None => false,
        }
    }
}

fn join_address(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .copied()
        .filter_map(|p| p.filter(|s| !s.is_empty()))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One service visit. Ambiguous fields (date, money, gallons) keep both a
/// typed value and the original string; the typed value is authoritative
/// when present and the string is the display fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scheduled_date: Option<NaiveDate>,
    pub service_date: Option<NaiveDate>,

    pub source_filename: Option<String>,
    pub confidence_score: u8,
    pub extracted_fields: Vec<String>,
    pub missing_fields: Vec<String>,

    pub status: JobStatus,

    pub invoice_number: Option<String>,
    pub manifest_number: Option<String>,
    pub service_date_str: Option<String>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub phone: Option<String>,
    pub trap_size: Option<String>,

    pub gallons_pumped: Option<f64>,
    pub gallons_pumped_str: Option<String>,
    pub invoice_total_cents: Option<i64>,
    pub invoice_total_str: Option<String>,

    pub technician: Option<String>,
    pub truck_id: Option<String>,
    pub disposal_facility: Option<String>,
    pub notes: Option<String>,
}

impl Job {
    pub fn new() -> Self {
        let now = Utc::now();
        Job {
            job_id: Uuid::new_v4(),
            customer_id: None,
            site_id: None,
            asset_id: None,
            created_at: now,
            updated_at: now,
            scheduled_date: None,
            service_date: None,
            source_filename: None,
            confidence_score: 0,
            extracted_fields: Vec::new(),
            missing_fields: Vec::new(),
            status: JobStatus::Draft,
            invoice_number: None,
            manifest_number: None,
            service_date_str: None,
            customer_name: None,
            customer_address: None,
            phone: None,
            trap_size: None,
            gallons_pumped: None,
            gallons_pumped_str: None,
            invoice_total_cents: None,
            invoice_total_str: None,
            technician: None,
            truck_id: None,
            disposal_facility: None,
            notes: None,
        }
    }

    /// Bind a fresh job to extraction provenance. Typed values are derived
    /// from the record's raw strings; unparseable values stay `None` with
    /// the string kept for display.
    pub fn from_parse_result(result: &ParseResult, source_filename: Option<&str>) -> Self {
        let record = &result.record;
        let mut job = Job::new();

        job.source_filename = source_filename.map(str::to_string);
        job.confidence_score = result.confidence_score;
        job.extracted_fields = result.extracted_fields.clone();
        job.missing_fields = result.missing_fields.clone();

        job.invoice_number = record.invoice_number.clone();
        job.service_date_str = record.service_date.clone();
        job.customer_name = record.customer_name.clone();
        job.customer_address = record.customer_address.clone();
        job.phone = record.phone.clone();
        job.trap_size = record.trap_size.clone();
        job.gallons_pumped_str = record.gallons_pumped.clone();
        job.invoice_total_str = record.invoice_total.clone();
        job.technician = record.technician.clone();
        job.disposal_facility = record.disposal_facility.clone();
        job.notes = record.notes.clone();

        job.gallons_pumped = record.gallons_pumped.as_deref().and_then(normalize::gallons_from_str);
        job.invoice_total_cents = record.invoice_total.as_deref().and_then(normalize::money_to_cents);
        job.service_date = record.service_date.as_deref().and_then(normalize::parse_date);

        job
    }

    pub fn can_verify(&self) -> bool {
        self.missing_required_fields().is_empty()
    }

    /// Required fields that are still blank: invoice number, a service date
    /// (typed or string), and a customer name.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.invoice_number) {
            missing.push("invoice_number");
        }
        if self.service_date.is_none() && is_blank(&self.service_date_str) {
            missing.push("service_date");
        }
        if is_blank(&self.customer_name) {
            missing.push("customer_name");
        }
        missing
    }

    pub fn gallons_display(&self) -> String {
        match self.gallons_pumped {
            Some(g) => normalize::gallons_to_display(g),
            None => self.gallons_pumped_str.clone().unwrap_or_else(|| "—".to_string()),
        }
    }

    pub fn invoice_total_display(&self) -> String {
        match self.invoice_total_cents {
            Some(c) => normalize::cents_to_display(c),
            None => self.invoice_total_str.clone().unwrap_or_else(|| "—".to_string()),
        }
    }

    pub fn service_date_display(&self) -> String {
        match self.service_date {
            Some(d) => normalize::date_to_display(d),
            None => self.service_date_str.clone().unwrap_or_else(|| "—".to_string()),
        }
    }

    /// JSON-safe view including the derived display strings.
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let serde_json::Value::Object(map) = &mut value {
            map.insert("invoice_total_display".into(), json!(self.invoice_total_display()));
            map.insert("gallons_display".into(), json!(self.gallons_display()));
            map.insert("service_date_display".into(), json!(self.service_date_display()));
        }
        value
    }

    pub fn apply(&mut self, patch: &JobPatch) {
        if let Some(v) = patch.customer_id {
            self.customer_id = Some(v);
        }
        if let Some(v) = patch.site_id {
            self.site_id = Some(v);
        }
        if let Some(v) = patch.asset_id {
            self.asset_id = Some(v);
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.scheduled_date {
            self.scheduled_date = Some(v);
        }
        if let Some(v) = patch.service_date {
            self.service_date = Some(v);
        }
        if let Some(v) = &patch.service_date_str {
            self.service_date_str = Some(v.clone());
        }
        if let Some(v) = &patch.invoice_number {
            self.invoice_number = Some(v.clone());
        }
        if let Some(v) = &patch.manifest_number {
            self.manifest_number = Some(v.clone());
        }
        if let Some(v) = &patch.customer_name {
            self.customer_name = Some(v.clone());
        }
        if let Some(v) = &patch.customer_address {
            self.customer_address = Some(v.clone());
        }
        if let Some(v) = &patch.phone {
            self.phone = Some(v.clone());
        }
        if let Some(v) = &patch.trap_size {
            self.trap_size = Some(v.clone());
        }
        if let Some(v) = patch.gallons_pumped {
            self.gallons_pumped = Some(v);
        }
        if let Some(v) = &patch.gallons_pumped_str {
            self.gallons_pumped_str = Some(v.clone());
        }
        if let Some(v) = patch.invoice_total_cents {
            self.invoice_total_cents = Some(v);
        }
        if let Some(v) = &patch.invoice_total_str {
            self.invoice_total_str = Some(v.clone());
        }
        if let Some(v) = &patch.technician {
            self.technician = Some(v.clone());
        }
        if let Some(v) = &patch.truck_id {
            self.truck_id = Some(v.clone());
        }
        if let Some(v) = &patch.disposal_facility {
            self.disposal_facility = Some(v.clone());
        }
        if let Some(v) = &patch.notes {
            self.notes = Some(v.clone());
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Job::new()
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

/// Field-by-field update for `update_job`; `None` leaves the field alone.
/// Clearing a stored value back to NULL is deliberately not expressible.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub customer_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub status: Option<JobStatus>,
    pub scheduled_date: Option<NaiveDate>,
    pub service_date: Option<NaiveDate>,
    pub service_date_str: Option<String>,
    pub invoice_number: Option<String>,
    pub manifest_number: Option<String>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub phone: Option<String>,
    pub trap_size: Option<String>,
    pub gallons_pumped: Option<f64>,
    pub gallons_pumped_str: Option<String>,
    pub invoice_total_cents: Option<i64>,
    pub invoice_total_str: Option<String>,
    pub technician: Option<String>,
    pub truck_id: Option<String>,
    pub disposal_facility: Option<String>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A file attached to a job (scanned invoice, manifest, photo, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: Uuid,
    pub job_id: Option<Uuid>,
    pub doc_type: DocumentType,
    pub filename: String,
    pub original_filename: Option<String>,
    pub file_size: i64,
    pub mime_type: Option<String>,
    pub stored_path: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Analytics views
// ---------------------------------------------------------------------------

/// Dashboard KPI metrics, recomputed on every query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardKpis {
    pub jobs_completed: i64,
    pub jobs_scheduled: i64,
    pub jobs_in_progress: i64,
    pub total_revenue_cents: i64,
    pub total_gallons: f64,
    pub avg_revenue_per_job_cents: i64,
    pub avg_gallons_per_job: f64,
    pub docs_missing_count: i64,
    pub overdue_services: i64,
    pub customer_count: i64,
    pub site_count: i64,
}

impl DashboardKpis {
    pub fn total_revenue(&self) -> f64 {
        self.total_revenue_cents as f64 / 100.0
    }

    pub fn avg_revenue_per_job(&self) -> f64 {
        self.avg_revenue_per_job_cents as f64 / 100.0
    }
}

/// One point on a dashboard time-series chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::extract_and_score;

    #[test]
    fn status_labels_round_trip() {
        for status in [
            JobStatus::Scheduled,
            JobStatus::InProgress,
            JobStatus::Completed,
            JobStatus::Verified,
            JobStatus::Invoiced,
            JobStatus::NeedsDocs,
            JobStatus::Rejected,
            JobStatus::Draft,
            JobStatus::Exported,
        ] {
            assert_eq!(JobStatus::from_label(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::from_label("Archived"), None);
    }

    #[test]
    fn completed_bucket_includes_legacy_exported() {
        assert!(JobStatus::Exported.counts_as_completed());
        assert!(JobStatus::Verified.counts_as_completed());
        assert!(!JobStatus::Scheduled.counts_as_completed());
        assert!(!JobStatus::Draft.counts_as_completed());
    }

    #[test]
    fn job_from_parse_result_derives_typed_values() {
        let result = extract_and_score(
            "INVOICE #: TEST-001\nService Date: January 8, 2026\nGallons Pumped: 1,320\nTOTAL DUE: $568.40",
        );
        let job = Job::from_parse_result(&result, Some("invoice.txt"));

        assert_eq!(job.invoice_number.as_deref(), Some("TEST-001"));
        assert_eq!(job.source_filename.as_deref(), Some("invoice.txt"));
        assert_eq!(job.status, JobStatus::Draft);
        assert_eq!(job.invoice_total_str.as_deref(), Some("$568.40"));
        assert_eq!(job.invoice_total_cents, Some(56840));
        assert_eq!(job.gallons_pumped, Some(1320.0));
        assert_eq!(job.service_date, NaiveDate::from_ymd_opt(2026, 1, 8));
        assert_eq!(job.service_date_str.as_deref(), Some("January 8, 2026"));
        assert_eq!(job.confidence_score, result.confidence_score);
    }

    #[test]
    fn unparseable_values_keep_string_fallback() {
        let mut job = Job::new();
        job.invoice_total_str = Some("invoice to follow".to_string());
        job.service_date_str = Some("sometime next week".to_string());

        assert_eq!(job.invoice_total_cents, None);
        assert_eq!(job.invoice_total_display(), "invoice to follow");
        assert_eq!(job.service_date_display(), "sometime next week");
    }

    #[test]
    fn verify_requires_invoice_date_and_customer() {
        let mut job = Job::new();
        assert!(!job.can_verify());
        assert_eq!(
            job.missing_required_fields(),
            vec!["invoice_number", "service_date", "customer_name"]
        );

        job.invoice_number = Some("INV-1".to_string());
        job.service_date_str = Some("2026-01-01".to_string());
        job.customer_name = Some("Test Customer".to_string());
        assert!(job.can_verify());

        // A typed date alone also satisfies the date requirement
        job.service_date_str = None;
        job.service_date = NaiveDate::from_ymd_opt(2026, 1, 1);
        assert!(job.can_verify());
    }

    #[test]
    fn blank_strings_do_not_satisfy_verification() {
        let mut job = Job::new();
        job.invoice_number = Some("   ".to_string());
        assert!(job.missing_required_fields().contains(&"invoice_number"));
    }

    #[test]
    fn job_json_includes_display_fields_and_label_statuses() {
        let mut job = Job::new();
        job.invoice_number = Some("SERIAL-001".to_string());
        job.status = JobStatus::Verified;
        job.invoice_total_cents = Some(56840);
        job.gallons_pumped = Some(1320.0);

        let value = job.to_json();
        assert_eq!(value["invoice_number"], "SERIAL-001");
        assert_eq!(value["status"], "Verified");
        assert_eq!(value["invoice_total_display"], "$568.40");
        assert_eq!(value["gallons_display"], "1,320 gallons");
        assert!(value["job_id"].is_string());
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn patch_leaves_unset_fields_alone() {
        let mut job = Job::new();
        job.invoice_number = Some("KEEP".to_string());

        job.apply(&JobPatch {
            customer_name: Some("New Customer".to_string()),
            status: Some(JobStatus::Verified),
            ..JobPatch::default()
        });

        assert_eq!(job.invoice_number.as_deref(), Some("KEEP"));
        assert_eq!(job.customer_name.as_deref(), Some("New Customer"));
        assert_eq!(job.status, JobStatus::Verified);
    }

    #[test]
    fn customer_display_name_falls_back() {
        let mut customer = Customer::new("");
        assert_eq!(customer.display_name(), "Unnamed Customer");
        customer.legal_name = Some("Tony's Pizza LLC".to_string());
        assert_eq!(customer.display_name(), "Tony's Pizza LLC");
        customer.name = "Tony's Pizza".to_string();
        assert_eq!(customer.display_name(), "Tony's Pizza");
    }

    #[test]
    fn site_overdue_uses_next_service_date() {
        let mut site = Site::new("Main Kitchen");
        assert!(!site.is_service_overdue());

        site.next_service_date = Some(Utc::now().date_naive() - chrono::Days::new(1));
        assert!(site.is_service_overdue());

        site.next_service_date = Some(Utc::now().date_naive() + chrono::Days::new(1));
        assert!(!site.is_service_overdue());
    }

    #[test]
    fn full_address_skips_missing_parts() {
        let mut customer = Customer::new("Tony's");
        customer.service_address = Some("123 Main St".to_string());
        customer.state = Some("IL".to_string());
        assert_eq!(customer.full_address(), "123 Main St, IL");
    }

    #[test]
    fn kpi_dollar_accessors_divide_cents() {
        let kpis = DashboardKpis {
            total_revenue_cents: 150000,
            avg_revenue_per_job_cents: 50000,
            ..DashboardKpis::default()
        };
        assert_eq!(kpis.total_revenue(), 1500.0);
        assert_eq!(kpis.avg_revenue_per_job(), 500.0);
    }
}
