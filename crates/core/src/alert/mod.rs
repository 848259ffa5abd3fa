pub mod alert_gate;
pub mod domain;
pub mod infrastructure;
