pub mod checklist;
pub mod duty;
pub mod remote;

pub use checklist::ChecklistItem;
pub use duty::{Duty, DutyColor, DutyDraft};
pub use remote::DutyRow;
