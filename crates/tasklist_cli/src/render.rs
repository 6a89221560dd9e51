use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_core::config::Palette;
use tasklist_core::model::{Task, TaskStats, timestamp};
use time::UtcOffset;

pub fn status_label(task: &Task) -> &'static str {
    if task.completed { "completed" } else { "pending" }
}

fn status_marker(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Completed")]
    completed: String,
}

pub fn task_table(tasks: &[Task], offset: UtcOffset) -> String {
    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id,
        title: task.title.clone(),
        status: status_label(task),
        created: timestamp::display(&task.created_at, offset),
        completed: task
            .completed_at
            .as_deref()
            .map(|value| timestamp::display(value, offset))
            .unwrap_or_else(|| "-".to_string()),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

/// Multi-line listing entry used by the interactive menu.
pub fn task_block(task: &Task, offset: UtcOffset, palette: &Palette) -> String {
    let mut lines = vec![format!(
        "{} ID: {} | {}",
        status_marker(task),
        task.id,
        palette.accentize(&task.title)
    )];

    if !task.description.is_empty() {
        lines.push(format!("    Description: {}", task.description));
    }

    lines.push(palette.mutedize(&format!(
        "    Created: {}",
        timestamp::display(&task.created_at, offset)
    )));

    if let Some(completed_at) = task.completed_at.as_deref() {
        lines.push(palette.mutedize(&format!(
            "    Completed: {}",
            timestamp::display(completed_at, offset)
        )));
    }

    lines.join("\n")
}

pub fn stats_lines(stats: &TaskStats) -> Vec<String> {
    vec![
        format!("Total tasks: {}", stats.total),
        format!("Completed: {}", stats.completed),
        format!("Pending: {}", stats.pending),
        format!("Completion rate: {:.1}%", stats.completion_percent()),
    ]
}

/// Same shape as an entry in the task file.
pub fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!(task)
}

pub fn tasks_json(tasks: &[Task]) -> serde_json::Value {
    serde_json::Value::Array(tasks.iter().map(task_json).collect())
}

pub fn stats_json(stats: &TaskStats) -> serde_json::Value {
    serde_json::json!({
        "total": stats.total,
        "completed": stats.completed,
        "pending": stats.pending,
        "completion_rate": stats.completion_rate,
    })
}
