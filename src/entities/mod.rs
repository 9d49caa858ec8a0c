pub mod activity_logs;
pub mod approval_requests;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod user_groups;
pub mod user_requests;
pub mod users;

pub use activity_logs as activity_log_entity;
pub use approval_requests as approval_request_entity;
pub use journal_entries as journal_entry_entity;
pub use journal_entry_lines as journal_entry_line_entity;
pub use user_groups as user_group_entity;
pub use user_requests as user_request_entity;
pub use users as user_entity;
