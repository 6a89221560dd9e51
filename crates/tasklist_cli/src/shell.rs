use crate::render;
use std::io::{self, BufRead, Write};
use tasklist_core::config::Palette;
use tasklist_core::error::AppError;
use tasklist_core::model::Task;
use tasklist_core::service::TaskService;
use time::UtcOffset;
use tracing::debug;

const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Add,
    ListAll,
    ListPending,
    Update,
    Complete,
    Uncomplete,
    Delete,
    Stats,
    Exit,
}

impl MenuChoice {
    const ALL: [(MenuChoice, &'static str); 9] = [
        (MenuChoice::Add, "Add Task"),
        (MenuChoice::ListAll, "View All Tasks"),
        (MenuChoice::ListPending, "View Pending Tasks"),
        (MenuChoice::Update, "Update Task"),
        (MenuChoice::Complete, "Complete Task"),
        (MenuChoice::Uncomplete, "Uncomplete Task"),
        (MenuChoice::Delete, "Delete Task"),
        (MenuChoice::Stats, "View Statistics"),
        (MenuChoice::Exit, "Exit"),
    ];

    fn parse(raw: &str) -> Option<Self> {
        let number: usize = raw.trim().parse().ok()?;
        Self::ALL
            .get(number.checked_sub(1)?)
            .map(|(choice, _)| *choice)
    }
}

enum Flow {
    Continue,
    Exit,
}

pub struct Shell<R> {
    service: TaskService,
    input: R,
    palette: Palette,
    offset: UtcOffset,
}

impl<R: BufRead> Shell<R> {
    pub fn new(service: TaskService, input: R, palette: Palette, offset: UtcOffset) -> Self {
        Self {
            service,
            input,
            palette,
            offset,
        }
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        println!("{}", self.palette.accentize("Welcome to your task list!"));

        loop {
            self.print_menu();
            let choice = match self.prompt("Choose an option (1-9): ")? {
                Some(line) => line,
                None => break,
            };

            let Some(choice) = MenuChoice::parse(&choice) else {
                println!("Invalid option! Please choose a number between 1-9.");
                continue;
            };

            debug!(?choice, "menu choice");
            match self.dispatch(choice) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(err) => eprintln!("ERROR: {}", err.user_message()),
            }

            if self.service.has_unsaved_changes() {
                eprintln!(
                    "WARNING: changes are not saved to {} yet",
                    self.service.store().storage_description()
                );
            }
        }

        self.finish()
    }

    fn finish(&mut self) -> Result<(), AppError> {
        self.service.flush()?;
        println!("Goodbye! All tasks are saved.");
        Ok(())
    }

    fn dispatch(&mut self, choice: MenuChoice) -> Result<Flow, AppError> {
        match choice {
            MenuChoice::Add => self.add()?,
            MenuChoice::ListAll => self.print_tasks(&self.service.list_all(), "tasks"),
            MenuChoice::ListPending => {
                self.print_tasks(&self.service.list_pending(), "pending tasks")
            }
            MenuChoice::Update => self.update()?,
            MenuChoice::Complete => self.complete()?,
            MenuChoice::Uncomplete => self.uncomplete()?,
            MenuChoice::Delete => self.delete()?,
            MenuChoice::Stats => self.stats(),
            MenuChoice::Exit => return Ok(Flow::Exit),
        }

        Ok(Flow::Continue)
    }

    fn add(&mut self) -> Result<(), AppError> {
        println!("\nADD NEW TASK");
        let Some(title) = self.prompt_required("Enter task title: ")? else {
            return Ok(());
        };
        let description = self
            .prompt("Enter task description (optional): ")?
            .unwrap_or_default();

        let task = self.service.add(&title, &description)?;
        println!("Task '{}' added (ID: {})", task.title, task.id);
        Ok(())
    }

    fn update(&mut self) -> Result<(), AppError> {
        println!("\nUPDATE TASK");
        self.print_tasks(&self.service.list_pending(), "pending tasks");
        let Some(id) = self.prompt_required("Enter task ID to update: ")? else {
            return Ok(());
        };
        let current = self.service.show(&id)?;
        println!("Updating '{}'", current.title);
        let title = self.prompt_optional("Enter new title (press Enter to keep current): ")?;
        let description =
            self.prompt_optional("Enter new description (press Enter to keep current): ")?;

        let task = self
            .service
            .update(&id, title.as_deref(), description.as_deref())?;
        println!("Task {} updated", task.id);
        Ok(())
    }

    fn complete(&mut self) -> Result<(), AppError> {
        println!("\nCOMPLETE TASK");
        self.print_tasks(&self.service.list_pending(), "pending tasks");
        let Some(id) = self.prompt_required("Enter task ID to complete: ")? else {
            return Ok(());
        };

        let change = self.service.complete(&id)?;
        if change.changed {
            println!("Task '{}' marked as completed!", change.task.title);
        } else {
            println!("Task '{}' is already completed", change.task.title);
        }
        Ok(())
    }

    fn uncomplete(&mut self) -> Result<(), AppError> {
        println!("\nUNCOMPLETE TASK");
        let completed = self.service.list_completed();
        if completed.is_empty() {
            println!("No completed tasks found!");
            return Ok(());
        }

        println!("\nCompleted tasks:");
        for task in &completed {
            println!("[x] ID: {} | {}", task.id, task.title);
        }
        let Some(id) = self.prompt_required("Enter task ID to mark as pending: ")? else {
            return Ok(());
        };

        let change = self.service.uncomplete(&id)?;
        if change.changed {
            println!("Task '{}' marked as pending", change.task.title);
        } else {
            println!("Task '{}' is already pending", change.task.title);
        }
        Ok(())
    }

    fn delete(&mut self) -> Result<(), AppError> {
        println!("\nDELETE TASK");
        self.print_tasks(&self.service.list_all(), "tasks");
        let Some(id) = self.prompt_required("Enter task ID to delete: ")? else {
            return Ok(());
        };

        let task = self.service.show(&id)?;
        let answer = self
            .prompt(&format!(
                "Are you sure you want to delete '{}'? (y/N): ",
                task.title
            ))?
            .unwrap_or_default();
        if !answer.eq_ignore_ascii_case("y") {
            println!("Task deletion cancelled.");
            return Ok(());
        }

        let removed = self.service.delete(&id)?;
        println!("Task '{}' deleted", removed.title);
        Ok(())
    }

    fn stats(&self) {
        let stats = self.service.stats();
        println!("\n{}", self.palette.accentize("TASK STATISTICS"));
        println!("{}", "=".repeat(30));
        for line in render::stats_lines(&stats) {
            println!("{line}");
        }
        println!("{}", "=".repeat(30));
    }

    fn print_menu(&self) {
        let rule = "=".repeat(RULE_WIDTH);
        println!("\n{rule}");
        println!("{}", self.palette.accentize("TASK LIST MANAGER"));
        println!("{rule}");
        for (number, (_, label)) in MenuChoice::ALL.iter().enumerate() {
            println!("{}. {}", number + 1, label);
        }
        println!("{rule}");
    }

    fn print_tasks(&self, tasks: &[Task], kind: &str) {
        if tasks.is_empty() {
            println!("No {kind} found.");
            return;
        }

        let rule = "=".repeat(RULE_WIDTH + 10);
        println!("\n{rule}");
        for task in tasks {
            println!("\n{}", render::task_block(task, self.offset, &self.palette));
        }
        println!("\n{rule}");
    }

    /// Reads one trimmed line. `None` means the input is exhausted.
    fn prompt(&mut self, message: &str) -> Result<Option<String>, AppError> {
        print!("{message}");
        io::stdout()
            .flush()
            .map_err(|err| AppError::io(err.to_string()))?;

        let mut line = String::new();
        let bytes = self
            .input
            .read_line(&mut line)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            println!();
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }

    /// Like [`Self::prompt`] but asks again until something is entered.
    fn prompt_required(&mut self, message: &str) -> Result<Option<String>, AppError> {
        loop {
            match self.prompt(message)? {
                Some(value) if value.is_empty() => {
                    println!("This field cannot be empty. Please try again.");
                }
                other => return Ok(other),
            }
        }
    }

    /// Blank input means "keep the current value".
    fn prompt_optional(&mut self, message: &str) -> Result<Option<String>, AppError> {
        Ok(self.prompt(message)?.filter(|value| !value.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::MenuChoice;

    #[test]
    fn menu_choice_maps_numbers() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Add));
        assert_eq!(MenuChoice::parse(" 8 "), Some(MenuChoice::Stats));
        assert_eq!(MenuChoice::parse("9"), Some(MenuChoice::Exit));
    }

    #[test]
    fn menu_choice_rejects_out_of_range_and_text() {
        for raw in ["0", "10", "", "add", "-1"] {
            assert_eq!(MenuChoice::parse(raw), None, "input {raw:?}");
        }
    }
}
