mod stats;
mod task;
pub mod timestamp;

pub use stats::TaskStats;
pub use task::Task;
