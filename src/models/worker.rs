//! Production-worker record: unit/shift assignment, skills, task tracking,
//! and the productivity ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{RecordError, Result};
use crate::models::personnel::{NewPersonnel, PersonnelRecord};

/// Wage type tags. Descriptive only; not enforced by this crate.
pub mod wage_type {
    pub const SALARY: &str = "salary";
    pub const PIECE_RATE: &str = "piece_rate";
}

/// Caller-supplied task details; the record stamps the start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: String,
    pub name: String,
}

/// The single in-flight task of a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTask {
    pub id: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
}

/// A finished task in the productivity ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub id: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A recorded output quantity in the productivity ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub quantity: f64,
    pub timestamp: DateTime<Utc>,
}

/// Ledger entry: either a completed task or an output record. The two
/// shapes share no required fields, so the untagged form is unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductivityEntry {
    Task(CompletedTask),
    Output(OutputEntry),
}

/// A personnel record specialized for production-floor work.
///
/// Composes a [`PersonnelRecord`] rather than shadowing it; base state is
/// reached through [`base`](Self::base) and [`base_mut`](Self::base_mut),
/// and the snapshot flattens base and extension fields into one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionWorkerRecord {
    #[serde(flatten)]
    base: PersonnelRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_unit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shift: Option<String>,
    skills: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_task: Option<ActiveTask>,
    productivity_records: Vec<ProductivityEntry>,
    wage_type: String,
}

impl ProductionWorkerRecord {
    /// Create a worker with no assignment, skills, or productivity history
    /// and the default `"salary"` wage type.
    pub fn new(base: NewPersonnel) -> Result<Self> {
        Ok(Self {
            base: PersonnelRecord::new(base)?,
            assigned_unit_id: None,
            shift: None,
            skills: BTreeSet::new(),
            current_task: None,
            productivity_records: Vec::new(),
            wage_type: wage_type::SALARY.to_string(),
        })
    }

    pub fn base(&self) -> &PersonnelRecord {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut PersonnelRecord {
        &mut self.base
    }

    pub fn assigned_unit_id(&self) -> Option<&str> {
        self.assigned_unit_id.as_deref()
    }

    pub fn shift(&self) -> Option<&str> {
        self.shift.as_deref()
    }

    pub fn skills(&self) -> &BTreeSet<String> {
        &self.skills
    }

    pub fn current_task(&self) -> Option<&ActiveTask> {
        self.current_task.as_ref()
    }

    pub fn productivity_records(&self) -> &[ProductivityEntry] {
        &self.productivity_records
    }

    pub fn wage_type(&self) -> &str {
        &self.wage_type
    }

    pub fn set_wage_type(&mut self, tag: impl Into<String>) {
        self.wage_type = tag.into();
    }

    /// Record the worker's production unit. Fails with a `Validation`
    /// error while the worker is inactive.
    pub fn assign_to_unit(&mut self, unit_id: impl Into<String>) -> Result<()> {
        if !self.base.active() {
            return Err(RecordError::validation(
                "cannot assign a unit to an inactive worker",
            ));
        }
        let unit_id = unit_id.into();
        debug!(id = %self.base.id(), %unit_id, "assigned to unit");
        self.assigned_unit_id = Some(unit_id);
        Ok(())
    }

    /// Record the worker's shift label.
    pub fn assign_shift(&mut self, label: impl Into<String>) {
        self.shift = Some(label.into());
    }

    /// Add a skill. Adding an existing skill is a no-op.
    pub fn add_skill(&mut self, name: impl Into<String>) {
        self.skills.insert(name.into());
    }

    /// Remove a skill. Removing an absent skill is a no-op.
    pub fn remove_skill(&mut self, name: &str) {
        self.skills.remove(name);
    }

    /// Whether a task is currently in flight.
    pub fn is_working(&self) -> bool {
        self.current_task.is_some()
    }

    /// Start a task, stamping its start time with the current instant.
    ///
    /// Fails with an `Attendance` error while a task is already in flight.
    pub fn start_task(&mut self, task: TaskInfo) -> Result<()> {
        if self.is_working() {
            return Err(RecordError::attendance("already working on a task"));
        }

        debug!(id = %self.base.id(), task_id = %task.id, "task started");
        self.current_task = Some(ActiveTask {
            id: task.id,
            name: task.name,
            start_time: Utc::now(),
        });
        Ok(())
    }

    /// Finish the in-flight task: stamp its end time, append it to the
    /// productivity ledger, and clear the current task.
    ///
    /// Fails with an `Attendance` error when no task is in flight.
    pub fn stop_task(&mut self) -> Result<()> {
        let Some(task) = self.current_task.take() else {
            return Err(RecordError::attendance("no active task to stop"));
        };

        debug!(id = %self.base.id(), task_id = %task.id, "task stopped");
        self.productivity_records
            .push(ProductivityEntry::Task(CompletedTask {
                id: task.id,
                name: task.name,
                start_time: task.start_time,
                end_time: Utc::now(),
            }));
        Ok(())
    }

    /// Append an output entry and return the cumulative output total.
    ///
    /// Fails with a `Validation` error unless `quantity` is a positive
    /// finite number.
    pub fn record_output(&mut self, quantity: f64) -> Result<f64> {
        if !(quantity > 0.0 && quantity.is_finite()) {
            return Err(RecordError::validation("quantity must be a positive number"));
        }

        self.productivity_records
            .push(ProductivityEntry::Output(OutputEntry {
                quantity,
                timestamp: Utc::now(),
            }));

        let total = self.cumulative_output();
        debug!(id = %self.base.id(), quantity, total, "output recorded");
        Ok(total)
    }

    /// Sum of every recorded output quantity, folded from the full ledger
    /// on each call. Completed tasks contribute nothing.
    pub fn cumulative_output(&self) -> f64 {
        self.productivity_records
            .iter()
            .map(|entry| match entry {
                ProductivityEntry::Output(output) => output.quantity,
                ProductivityEntry::Task(_) => 0.0,
            })
            .sum()
    }

    /// Render the worker as a plain key-value snapshot: base fields plus
    /// the production extension fields in one object.
    pub fn to_snapshot(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| RecordError::validation(format!("snapshot encoding failed: {e}")))
    }

    /// Reconstruct a worker from a snapshot, re-running full validation.
    pub fn from_snapshot(snapshot: serde_json::Value) -> Result<Self> {
        let record: Self = serde_json::from_value(snapshot)
            .map_err(|e| RecordError::validation(format!("invalid worker snapshot: {e}")))?;
        record.base.validate()?;
        Ok(record)
    }
}
