pub mod attendance;
pub mod employee;
pub mod error;
pub mod presence;
pub mod report;
pub mod sheet;
pub mod timesheet;
