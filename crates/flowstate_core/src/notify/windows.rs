use crate::error::AppError;
use crate::model::Task;
use crate::notify::{Notifier, TIMER_SUMMARY, launch_show, parse_activation_argument, timer_body};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, task: &Task) -> Result<(), AppError> {
        self.notify_with_action(task, "")
    }

    fn notify_with_action(&self, task: &Task, action: &str) -> Result<(), AppError> {
        let task_id = task.id.clone();
        let action_value = action.to_string();
        let mut toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title(TIMER_SUMMARY)
            .text1(&timer_body(task))
            .text2(&task.id);

        if !action_value.trim().is_empty() {
            toast = toast.add_button("Open", &action_value);
        }

        let action_match = action_value.clone();
        toast
            .on_activated(move |args| {
                let target = match args {
                    Some(args) if !action_match.is_empty() && args == action_match => {
                        Some(task_id.clone())
                    }
                    Some(args) if args.trim().is_empty() => Some(task_id.clone()),
                    Some(args) => parse_activation_argument(&args),
                    None => Some(task_id.clone()),
                };
                if let Some(id) = target {
                    let _ = launch_show(&id);
                }
                Ok(())
            })
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }

    fn awaits_action(&self) -> bool {
        true
    }
}
