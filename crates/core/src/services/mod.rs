pub mod actions;
pub mod aligner;
pub mod fetch;
pub mod scheduler;
pub mod view_state;
