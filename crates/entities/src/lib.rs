pub mod app;
pub mod domain;

pub use app::{chat_event, entity, memory, memory_summary, session_user};
pub use domain::{customer, invoice, payment, sales_order, task, work_order};
