use clap::{CommandFactory, Parser};
use flowstate_cli::cli::{Cli, Command, TimerCommand, collect_config_overrides};
use flowstate_cli::display::{render_tasks, timer_label};
use flowstate_core::board::{DropTarget, MoveOutcome, format_remaining};
use flowstate_core::config::{
    Config, Palette, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use flowstate_core::error::AppError;
use flowstate_core::model::{Task, TaskPatch, TaskStatus};
use flowstate_core::task_api::{self, TimerPoll};
use std::io::{self, BufRead};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "FLOWSTATE_LOG";
const ACTION_WINDOW: Duration = Duration::from_secs(30);

struct Settings {
    config: Config,
    palette: Palette,
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_settings(cli: &Cli) -> Result<Settings, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        warn!(%err, "using default configuration");
    }

    let overrides = collect_config_overrides(&cli.config_override).map_err(AppError::validation)?;
    let config = merge_overrides(&loaded.config, &overrides);
    let palette = palette_for_theme(config.theme.as_deref());

    Ok(Settings {
        config,
        palette,
        json: cli.json,
    })
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    println!("{}", serde_json::to_string(task)?);
    Ok(())
}

fn print_task_line(settings: &Settings, verb: &str, task: &Task) {
    println!(
        "{}: {} ({})",
        verb,
        settings.palette.accentize(&task.title),
        task.id
    );
}

fn print_task_details(settings: &Settings, task: &Task, active_timer_task_id: Option<&str>) {
    let palette = &settings.palette;
    println!("{}", palette.accentize(&task.title));
    println!("{} {}", palette.mutedize("id:"), task.id);
    println!(
        "{} {} (position {})",
        palette.mutedize("column:"),
        task.status.title(),
        task.order
    );
    println!(
        "{} {}",
        palette.mutedize("description:"),
        task.description.as_deref().unwrap_or("-")
    );
    println!(
        "{} {}",
        palette.mutedize("timer:"),
        timer_label(task, active_timer_task_id)
    );
    println!("{} {}", palette.mutedize("created:"), task.created_at);
    println!("{} {}", palette.mutedize("updated:"), task.updated_at);
}

fn print_column(settings: &Settings, status: TaskStatus, tasks: &[Task], active: Option<&str>) {
    println!(
        "{} ({})",
        settings.palette.accentize(status.title()),
        tasks.len()
    );
    println!("{}", render_tasks(tasks, active));
}

fn print_move_outcome(settings: &Settings, outcome: &MoveOutcome) -> Result<(), AppError> {
    if settings.json {
        return print_task_json(outcome.task());
    }
    match outcome {
        MoveOutcome::Moved(task) => println!(
            "Moved task: {} ({}) to {} at position {}",
            settings.palette.accentize(&task.title),
            task.id,
            task.status.title(),
            task.order
        ),
        MoveOutcome::Deleted(task) => print_task_line(settings, "Deleted task", task),
    }
    Ok(())
}

fn report_poll(settings: &Settings, poll: &TimerPoll) -> Result<(), AppError> {
    if let Some(failure) = poll.failure.as_ref() {
        eprintln!(
            "WARNING: notification failed for {}: {}",
            failure.task_id, failure.error
        );
    }

    if settings.json {
        let payload = serde_json::json!({
            "task_id": poll.tick.task_id,
            "remaining_ms": poll.tick.remaining_ms,
            "remaining": format_remaining(poll.tick.remaining_ms),
            "expired": poll.tick.expired,
            "notified": poll.notified,
        });
        println!("{payload}");
        return Ok(());
    }

    match poll.expired.as_ref() {
        Some(task) => print_task_line(settings, "Timer complete", task),
        None => {
            let task = task_api::get_task(&poll.tick.task_id)?;
            println!(
                "Timer running: {} ({}) {} remaining",
                settings.palette.accentize(&task.title),
                task.id,
                format_remaining(poll.tick.remaining_ms)
            );
        }
    }
    Ok(())
}

/// Keeps the process alive so a clicked alert can still re-launch `show`.
fn hold_for_action(poll: &TimerPoll) {
    if poll.action_pending {
        info!(task_id = %poll.tick.task_id, "waiting for notification action");
        std::thread::sleep(ACTION_WINDOW);
    }
}

fn print_no_timer(settings: &Settings) {
    if settings.json {
        println!("null");
    } else {
        println!("No timer running");
    }
}

fn run_timer_command(settings: &Settings, command: TimerCommand) -> Result<(), AppError> {
    match command {
        TimerCommand::Start { id } => {
            let task = task_api::start_timer(&id)?;
            if settings.json {
                print_task_json(&task)?;
            } else {
                println!(
                    "Started timer: {} ({}) for {}",
                    settings.palette.accentize(&task.title),
                    task.id,
                    timer_label(&task, None)
                );
            }
        }
        TimerCommand::Stop { id } => {
            let task = task_api::stop_timer(&id)?;
            if settings.json {
                print_task_json(&task)?;
            } else {
                print_task_line(settings, "Stopped timer", &task);
            }
        }
        TimerCommand::Status => match task_api::poll_timer(settings.config.timer_alerts)? {
            Some(poll) => {
                report_poll(settings, &poll)?;
                hold_for_action(&poll);
            }
            None => print_no_timer(settings),
        },
        TimerCommand::Watch => {
            let interval = Duration::from_millis(settings.config.poll_interval_ms);
            loop {
                let Some(poll) = task_api::poll_timer(settings.config.timer_alerts)? else {
                    print_no_timer(settings);
                    break;
                };
                report_poll(settings, &poll)?;
                if poll.expired.is_some() {
                    hold_for_action(&poll);
                    break;
                }
                std::thread::sleep(interval);
            }
        }
    }

    Ok(())
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let settings = resolve_settings(&cli)?;

    match cli.command {
        Command::Add {
            title,
            description,
            timer_minutes,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::validation("title is required")),
            };
            let minutes = timer_minutes.or(settings.config.default_timer_minutes);

            let task = task_api::add_task(&title, description.as_deref(), minutes)?;
            if settings.json {
                print_task_json(&task)?;
            } else {
                print_task_line(&settings, "Added task", &task);
            }
        }
        Command::Edit {
            id,
            title,
            description,
            clear_description,
            timer_minutes,
            clear_timer,
        } => {
            let patch = TaskPatch {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                timer_minutes: if clear_timer {
                    Some(None)
                } else {
                    timer_minutes.map(Some)
                },
            };

            let task = task_api::edit_task(&id, patch)?;
            if settings.json {
                print_task_json(&task)?;
            } else {
                print_task_line(&settings, "Updated task", &task);
            }
        }
        Command::Delete { id } => {
            let task = task_api::delete_task(&id)?;
            if settings.json {
                print_task_json(&task)?;
            } else {
                print_task_line(&settings, "Deleted task", &task);
            }
        }
        Command::Move {
            id,
            column,
            index,
            onto,
        } => {
            let outcome = match (onto, column) {
                (Some(over_id), _) => task_api::drop_task(&id, &DropTarget::Task(over_id))?,
                (None, Some(status)) => {
                    MoveOutcome::Moved(task_api::move_task(&id, status, index)?)
                }
                (None, None) => return Err(AppError::validation("column is required")),
            };
            print_move_outcome(&settings, &outcome)?;
        }
        Command::Drop { id } => {
            let outcome = task_api::drop_task(&id, &DropTarget::DeleteZone)?;
            print_move_outcome(&settings, &outcome)?;
        }
        Command::Show { id } => {
            let task = task_api::get_task(&id)?;
            if settings.json {
                print_task_json(&task)?;
            } else {
                let view = task_api::board_view()?;
                print_task_details(&settings, &task, view.active_timer_task_id.as_deref());
            }
        }
        Command::List { column } => {
            let view = task_api::board_view()?;
            let active = view.active_timer_task_id.as_deref();
            match (column, settings.json) {
                (Some(status), true) => println!("{}", serde_json::to_string(view.column(status))?),
                (None, true) => println!("{}", serde_json::to_string(&view)?),
                (Some(status), false) => {
                    print_column(&settings, status, view.column(status), active);
                }
                (None, false) => {
                    for status in TaskStatus::ALL {
                        print_column(&settings, status, view.column(status), active);
                    }
                }
            }
        }
        Command::Timer { timer } => run_timer_command(&settings, timer)?,
        Command::Import { path } => {
            let view = task_api::import_legacy(&path)?;
            if settings.json {
                println!("{}", serde_json::to_string(&view)?);
            } else {
                let count = view.todo.len() + view.doing.len() + view.done.len();
                println!("Imported {count} tasks from {}", path.display());
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::validation("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("flowstate".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) {
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
