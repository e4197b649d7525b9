pub mod dashboard;
pub mod list_modal;
pub mod quick_add;
pub mod report;
