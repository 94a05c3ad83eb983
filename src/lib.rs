pub mod ai;
pub mod api;
pub mod cli;
pub mod core;
pub mod identity;
pub mod notify;
pub mod openai;
pub mod recurrence;
