//! Inspect command - prints every user, task and category in the store

use std::fmt::Write;

use crate::config::AppConfig;
use crate::domain::{Category, Task, User};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let state = crate::create_app_state(&config).await?;

    let users = state.users.list().await?;
    let tasks = state.tasks.list_all().await?;
    let categories = state.categories.list_all().await?;

    print!("{}", render_report(&users, &tasks, &categories));
    Ok(())
}

fn render_report(users: &[User], tasks: &[Task], categories: &[Category]) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "=== USERS ({}) ===", users.len());
    for user in users {
        let _ = writeln!(
            out,
            "ID: {}, Email: {}, Active: {}, Created: {}",
            user.id(),
            user.email(),
            user.is_active(),
            user.created_at().to_rfc3339()
        );
    }

    let _ = writeln!(out, "\n=== TASKS ({}) ===", tasks.len());
    for task in tasks {
        let _ = writeln!(
            out,
            "ID: {}, Title: {}, User: {}, Completed: {}, Priority: {}",
            task.id,
            task.title,
            task.user_id,
            task.completed,
            task.priority.as_str()
        );
    }

    let _ = writeln!(out, "\n=== CATEGORIES ({}) ===", categories.len());
    for category in categories {
        let _ = writeln!(
            out,
            "ID: {}, Name: {}, Color: {}, User: {}",
            category.id, category.name, category.color, category.user_id
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::{CategoryId, NewCategory};
    use crate::domain::task::{NewTask, TaskId, TaskPriority};
    use crate::domain::UserId;

    #[test]
    fn test_report_lists_every_record() {
        let owner = UserId::new(1);
        let users = vec![User::new(owner, "alice@example.com", "hash")];
        let tasks = vec![Task::new(
            TaskId::new(7),
            NewTask {
                title: "Write report".to_string(),
                description: None,
                priority: TaskPriority::High,
                due_date: None,
                user_id: owner,
                category_id: None,
            },
        )];
        let categories = vec![Category::new(
            CategoryId::new(3),
            NewCategory {
                name: "Work".to_string(),
                color: "#667eea".to_string(),
                user_id: owner,
            },
        )];

        let report = render_report(&users, &tasks, &categories);

        assert!(report.contains("=== USERS (1) ==="));
        assert!(report.contains("Email: alice@example.com"));
        assert!(report.contains("ID: 7, Title: Write report, User: 1, Completed: false"));
        assert!(report.contains("Priority: high"));
        assert!(report.contains("ID: 3, Name: Work"));
    }

    #[test]
    fn test_empty_store() {
        let report = render_report(&[], &[], &[]);
        assert!(report.contains("=== TASKS (0) ==="));
        assert!(report.contains("=== CATEGORIES (0) ==="));
    }
}
