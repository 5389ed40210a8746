//! Data models for personnel and production-worker records.

pub mod personnel;
pub mod worker;


pub use personnel::{
    AttendanceEntry, HireDate, LeaveRequest, LeaveStatus, NewPersonnel, PersonnelRecord, RecordId,
};
pub use worker::{
    ActiveTask, CompletedTask, OutputEntry, ProductionWorkerRecord, ProductivityEntry, TaskInfo,
    wage_type,
};
