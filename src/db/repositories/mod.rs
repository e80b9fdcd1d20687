mod tasks;
mod time_entries;
mod timer_states;
mod users;

pub(crate) use tasks::row_to_task;
