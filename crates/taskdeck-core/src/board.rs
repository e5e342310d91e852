use crate::task::{Task, TaskStatus};

/// Label of the overflow column holding tasks with a status outside the
/// three board values.
pub const OTHER_COLUMN: &str = "Other";

/// Splits tasks into the fixed board columns (To Do, In Progress, Done) by
/// exact status match, keeping server order inside each column.
///
/// Tasks with any other status land in a trailing `Other` column, which is
/// only present when it has members.
pub fn partition_by_status(tasks: &[Task]) -> Vec<(TaskStatus, Vec<Task>)> {
    let mut columns: Vec<(TaskStatus, Vec<Task>)> = TaskStatus::BOARD_COLUMNS
        .iter()
        .map(|status| {
            let members = tasks.iter().filter(|t| &t.status == status).cloned().collect();
            (status.clone(), members)
        })
        .collect();

    let overflow: Vec<Task> = tasks
        .iter()
        .filter(|t| !t.status.is_known())
        .cloned()
        .collect();
    if !overflow.is_empty() {
        columns.push((TaskStatus::Other(OTHER_COLUMN.to_string()), overflow));
    }
    columns
}
