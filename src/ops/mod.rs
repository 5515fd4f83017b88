pub mod board;
pub mod bucket;
pub mod import;
pub mod reorder;
pub mod suggest;
pub mod task_ops;
