use clap::Parser;
use std::io;
use tasklist_cli::cli::{self, Cli, Command};
use tasklist_cli::render;
use tasklist_cli::shell::Shell;
use tasklist_core::config::{self, Config, palette_for_theme};
use tasklist_core::error::AppError;
use tasklist_core::model::{Task, timestamp};
use tasklist_core::service::{StatusChange, TaskService};
use tasklist_core::storage::JsonFileStorage;
use tasklist_core::store::TaskStore;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV_VAR: &str = "TASKLIST_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false),
        )
        .init();
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn resolve_config(cli: &Cli) -> Result<(Config, std::path::PathBuf), AppError> {
    let overrides = cli::collect_overrides(&cli.config_override)?;
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: using default configuration ({})", err);
    }

    let config = config::merge_overrides(&loaded.config, &overrides);
    let flag = cli.store.clone().or_else(|| overrides.store_path.clone());
    let store_path = config::resolve_store_path(&config, flag.as_deref())?;
    Ok((config, store_path))
}

fn open_service(cli: &Cli) -> Result<(TaskService, Config), AppError> {
    let (config, store_path) = resolve_config(cli)?;
    info!(path = %store_path.display(), policy = ?config.on_corrupt, "opening task file");

    let storage = JsonFileStorage::new(&store_path);
    let (store, recovery) = TaskStore::open(Box::new(storage), config.on_corrupt)?;

    if let Some(recovery) = recovery {
        let backup = recovery
            .backup
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        eprintln!(
            "WARNING: {} could not be loaded ({}). It was moved to {} and an empty list was started.",
            store_path.display(),
            recovery.reason.message(),
            backup
        );
    }

    Ok((TaskService::new(store), config))
}

fn print_task(task: &Task, verb: &str, json: bool) {
    if json {
        println!("{}", render::task_json(task));
    } else {
        println!("{} task: {} ({})", verb, task.title, task.id);
    }
}

fn print_status_change(change: &StatusChange, state: &str, json: bool) {
    if json {
        let mut payload = render::task_json(&change.task);
        payload["changed"] = serde_json::Value::Bool(change.changed);
        println!("{payload}");
    } else if change.changed {
        println!(
            "Marked task {}: {} ({})",
            state, change.task.title, change.task.id
        );
    } else {
        println!(
            "Task already {}: {} ({})",
            state, change.task.title, change.task.id
        );
    }
}

fn print_tasks(tasks: &[Task], json: bool) {
    if json {
        println!("{}", render::tasks_json(tasks));
    } else if tasks.is_empty() {
        println!("No tasks found.");
    } else {
        println!("{}", render::task_table(tasks, timestamp::local_offset()));
    }
}

fn run_command(service: &mut TaskService, command: Command, json: bool) -> Result<(), AppError> {
    match command {
        Command::Add { title, description } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };
            let task = service.add(&title, &description)?;
            print_task(&task, "Added", json);
        }
        Command::List { pending, completed } => {
            let tasks = if pending {
                service.list_pending()
            } else if completed {
                service.list_completed()
            } else {
                service.list_all()
            };
            print_tasks(&tasks, json);
        }
        Command::Show { id } => {
            let task = service.show(&id)?;
            if json {
                println!("{}", render::task_json(&task));
            } else {
                let palette = palette_for_theme(None);
                println!(
                    "{}",
                    render::task_block(&task, timestamp::local_offset(), &palette)
                );
            }
        }
        Command::Update {
            id,
            title,
            description,
        } => {
            let task = service.update(&id, title.as_deref(), description.as_deref())?;
            print_task(&task, "Updated", json);
        }
        Command::Done { id } => {
            let change = service.complete(&id)?;
            print_status_change(&change, "completed", json);
        }
        Command::Undo { id } => {
            let change = service.uncomplete(&id)?;
            print_status_change(&change, "pending", json);
        }
        Command::Delete { id } => {
            let task = service.delete(&id)?;
            print_task(&task, "Deleted", json);
        }
        Command::Stats => {
            let stats = service.stats();
            if json {
                println!("{}", render::stats_json(&stats));
            } else {
                for line in render::stats_lines(&stats) {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let (mut service, config) = open_service(&cli)?;

    match cli.command {
        Some(command) => run_command(&mut service, command, cli.json),
        None => {
            let palette = palette_for_theme(config.theme.as_deref());
            let stdin = io::stdin();
            let mut shell = Shell::new(service, stdin.lock(), palette, timestamp::local_offset());
            shell.run()
        }
    }
}

fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        if err.is_fatal() {
            eprintln!(
                "The task file was left untouched. Repair or move it, or rerun with --config-override on_corrupt=start_empty."
            );
        }
        std::process::exit(1);
    }
}
