pub mod task;
pub mod time_entry;
pub mod user;

pub use task::{NewTask, Task, TaskUpdate};
pub use time_entry::TimeEntry;
pub use user::User;
