//! Base personnel record: identity, compensation, contact, attendance, leave.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::{RecordError, Result};

/// Record identity: a number or a non-empty text code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

/// Hire date kept in its ISO-8601 string form.
///
/// Date values convert at the boundary, so the stored form round-trips
/// byte-for-byte through a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HireDate(String);

impl HireDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HireDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NaiveDate> for HireDate {
    fn from(date: NaiveDate) -> Self {
        HireDate(date.format("%Y-%m-%d").to_string())
    }
}

impl From<NaiveDateTime> for HireDate {
    fn from(moment: NaiveDateTime) -> Self {
        HireDate(moment.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

impl From<DateTime<Utc>> for HireDate {
    fn from(moment: DateTime<Utc>) -> Self {
        HireDate(moment.to_rfc3339())
    }
}

impl From<&str> for HireDate {
    fn from(s: &str) -> Self {
        HireDate(s.to_string())
    }
}

impl From<String> for HireDate {
    fn from(s: String) -> Self {
        HireDate(s)
    }
}

/// One attendance interval. Open until `clock_out` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub clock_in: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
}

/// Leave request status. Only `Pending` is ever written by this crate;
/// approval and denial belong to a workflow collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Denied,
}

/// A single leave request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
    pub status: LeaveStatus,
}

/// Parameters for creating a fresh personnel record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersonnel {
    pub id: RecordId,
    pub name: String,
    pub role: String,
    pub salary: f64,
    pub hire_date: HireDate,
    pub contact_info: BTreeMap<String, String>,
    pub active: bool,
}

/// A personnel record with validated state.
///
/// All mutation goes through named operations; every operation checks its
/// preconditions before touching state, so a failed call leaves the record
/// in its prior consistent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonnelRecord {
    id: RecordId,
    name: String,
    role: String,
    salary: f64,
    hire_date: HireDate,
    contact_info: BTreeMap<String, String>,
    active: bool,
    attendance_log: Vec<AttendanceEntry>,
    leave_requests: Vec<LeaveRequest>,
    meta: BTreeMap<String, String>,
}

impl PersonnelRecord {
    /// Create a record with empty attendance, leave, and meta state.
    ///
    /// Fails with a single combined `Validation` error naming every
    /// violated rule.
    pub fn new(input: NewPersonnel) -> Result<Self> {
        let record = Self {
            id: input.id,
            name: input.name,
            role: input.role,
            salary: input.salary,
            hire_date: input.hire_date,
            contact_info: input.contact_info,
            active: input.active,
            attendance_log: Vec::new(),
            leave_requests: Vec::new(),
            meta: BTreeMap::new(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub fn hire_date(&self) -> &HireDate {
        &self.hire_date
    }

    pub fn contact_info(&self) -> &BTreeMap<String, String> {
        &self.contact_info
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn attendance_log(&self) -> &[AttendanceEntry] {
        &self.attendance_log
    }

    pub fn leave_requests(&self) -> &[LeaveRequest] {
        &self.leave_requests
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    /// Replace the stored salary. Fails unless `new_salary > 0`.
    pub fn update_salary(&mut self, new_salary: f64) -> Result<()> {
        if !(new_salary > 0.0 && new_salary.is_finite()) {
            return Err(RecordError::validation("salary must be a positive number"));
        }
        self.salary = new_salary;
        Ok(())
    }

    /// Merge `new_contact` into the stored contact info.
    ///
    /// Keys absent from `new_contact` are preserved; overlapping keys are
    /// overwritten. The merged candidate is validated before commit, so a
    /// failure leaves the prior contact info untouched.
    pub fn update_contact(&mut self, new_contact: BTreeMap<String, String>) -> Result<()> {
        let mut merged = self.contact_info.clone();
        merged.extend(new_contact);

        let mut errors = Vec::new();
        contact_rule_errors(&merged, &mut errors);
        if !errors.is_empty() {
            return Err(RecordError::Validation(errors.join("\n")));
        }

        self.contact_info = merged;
        Ok(())
    }

    /// Whether the last attendance entry is still open.
    pub fn is_clocked_in(&self) -> bool {
        self.attendance_log
            .last()
            .is_some_and(|entry| entry.clock_out.is_none())
    }

    /// Open a new attendance entry at `timestamp` (or now).
    ///
    /// Fails with an `Attendance` error when an entry is already open.
    pub fn clock_in(&mut self, timestamp: Option<DateTime<Utc>>) -> Result<()> {
        if self.is_clocked_in() {
            return Err(RecordError::attendance(
                "already clocked in; cannot clock in again without clocking out",
            ));
        }

        let clock_in = timestamp.unwrap_or_else(Utc::now);
        self.attendance_log.push(AttendanceEntry {
            clock_in,
            clock_out: None,
            duration_minutes: None,
        });

        debug!(id = %self.id, %clock_in, "clocked in");
        Ok(())
    }

    /// Close the open attendance entry at `timestamp` (or now) and store
    /// its duration in minutes, rounded to two decimals.
    ///
    /// Fails with an `Attendance` error when no entry is open.
    pub fn clock_out(&mut self, timestamp: Option<DateTime<Utc>>) -> Result<()> {
        if !self.is_clocked_in() {
            return Err(RecordError::attendance("no open clock-in to clock out from"));
        }

        let clock_out = timestamp.unwrap_or_else(Utc::now);
        // is_clocked_in guarantees an open last entry
        if let Some(entry) = self.attendance_log.last_mut() {
            let minutes = (clock_out - entry.clock_in).num_milliseconds() as f64 / 60_000.0;
            entry.clock_out = Some(clock_out);
            entry.duration_minutes = Some((minutes * 100.0).round() / 100.0);
        }

        debug!(id = %self.id, %clock_out, "clocked out");
        Ok(())
    }

    /// File a pending leave request and return its identifier.
    ///
    /// Dates compare lexicographically, which is correct for ISO-8601
    /// strings. Identifiers are timestamp-derived with millisecond
    /// precision.
    pub fn request_leave(&mut self, start_date: &str, end_date: &str, reason: &str) -> Result<String> {
        if start_date > end_date {
            return Err(RecordError::validation("start date cannot be after end date"));
        }

        let request_id = Utc::now().format("%Y-%m-%d,%H:%M:%S%.3f").to_string();
        self.leave_requests.push(LeaveRequest {
            id: request_id.clone(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            reason: reason.to_string(),
            status: LeaveStatus::Pending,
        });

        debug!(id = %self.id, %request_id, "leave requested");
        Ok(request_id)
    }

    /// Mark the record active. Idempotent.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Mark the record inactive, optionally recording the reason under
    /// `meta["termination_reason"]`. Idempotent.
    pub fn deactivate(&mut self, reason: Option<&str>) {
        self.active = false;
        if let Some(reason) = reason {
            self.meta
                .insert("termination_reason".to_string(), reason.to_string());
        }
    }

    /// Render the record as a plain key-value snapshot.
    ///
    /// Dates and timestamps appear in their canonical string form; empty
    /// sequences appear as `[]`, never omitted.
    pub fn to_snapshot(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| RecordError::validation(format!("snapshot encoding failed: {e}")))
    }

    /// Reconstruct a record from a snapshot, re-running full validation.
    pub fn from_snapshot(snapshot: serde_json::Value) -> Result<Self> {
        let record: Self = serde_json::from_value(snapshot)
            .map_err(|e| RecordError::validation(format!("invalid personnel snapshot: {e}")))?;
        record.validate()?;
        Ok(record)
    }

    /// Check every structural rule, collecting all violations into one
    /// combined error.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if let RecordId::Text(id) = &self.id {
            if id.trim().is_empty() {
                errors.push("id must be a non-empty string or integer".to_string());
            }
        }

        if !(self.salary.is_finite() && self.salary >= 0.0) {
            errors.push("salary must be a non-negative number".to_string());
        }

        if self.name.trim().is_empty() {
            errors.push("name must be a non-empty string".to_string());
        }

        if self.role.trim().is_empty() {
            errors.push("role must be a non-empty string".to_string());
        }

        contact_rule_errors(&self.contact_info, &mut errors);

        // Only the last attendance entry may be open.
        let closed_prefix = self.attendance_log.len().saturating_sub(1);
        if self.attendance_log[..closed_prefix]
            .iter()
            .any(|entry| entry.clock_out.is_none())
        {
            errors.push("attendance log may only have an open entry in last position".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RecordError::Validation(errors.join("\n")))
        }
    }
}

/// Contact rules shared by construction validation and `update_contact`.
fn contact_rule_errors(contact: &BTreeMap<String, String>, errors: &mut Vec<String>) {
    if let Some(phone) = contact.get("phone") {
        if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
            errors.push("phone number in contact info must contain only digits".to_string());
        }
    }
    if let Some(email) = contact.get("email") {
        if !email.contains('@') {
            errors.push("email in contact info must contain '@'".to_string());
        }
    }
}
