pub mod commands;
pub mod palette;
pub mod service;

pub use palette::{random_color, TASK_COLORS};
pub use service::{
    create_task, delete_task, recompute_task_totals, register_user, update_task, TotalCorrection,
};
