//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::auth::{SessionState, User, UserRole};
use crate::notify::{Notification, Severity};
use crate::router::{Navigation, ViewRoute};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Print a toast the way the dashboard would show it
pub fn toast(notification: &Notification) {
    match notification.severity {
        Severity::Success => success(&notification.message),
        Severity::Info => info(&notification.message),
        Severity::Warning => warn(&notification.message),
        Severity::Error => error(&notification.message),
    }
}

fn role_color(role: UserRole) -> Color {
    match role {
        UserRole::Admin => Color::Red,
        UserRole::Maker => Color::Green,
        UserRole::Checker => Color::Yellow,
        UserRole::Finance | UserRole::Regulatory => Color::Blue,
    }
}

/// Print a table of users
pub fn print_user_table(users: &[User]) {
    if users.is_empty() {
        info("No users found");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Username").fg(Color::Cyan),
            Cell::new("Name").fg(Color::Cyan),
            Cell::new("Role").fg(Color::Cyan),
            Cell::new("Regions").fg(Color::Cyan),
            Cell::new("Product lines").fg(Color::Cyan),
        ]);

    for user in users {
        table.add_row(vec![
            Cell::new(user.id),
            Cell::new(&user.username),
            Cell::new(&user.full_name),
            Cell::new(user.role).fg(role_color(user.role)),
            Cell::new(user.regions.join(", ")),
            Cell::new(user.product_lines.join(", ")),
        ]);
    }

    println!("{table}");
}

/// Print detailed session status
pub fn print_session_detail(state: &SessionState) {
    println!("{}", "Session".bold().underline());
    println!();
    println!("  {} {}", "Status:".bold(), state.status());

    let Some(user) = &state.user else {
        return;
    };

    println!("  {} {}", "User:".bold(), user.username);
    println!("  {} {}", "Name:".bold(), user.full_name);
    println!("  {} {}", "Email:".bold(), user.email);
    println!("  {} {}", "Role:".bold(), user.role.to_string().cyan());
    println!("  {} {}", "Regions:".bold(), user.regions.join(", "));
    println!("  {} {}", "Product lines:".bold(), user.product_lines.join(", "));

    if let Some(exp) = state
        .token
        .as_deref()
        .and_then(|t| crate::auth::token::decode_payload(t).ok())
        .and_then(|p| chrono::DateTime::from_timestamp_millis(p.exp))
    {
        println!(
            "  {} {}",
            "Expires:".bold(),
            exp.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    if !user.permissions.is_empty() {
        println!();
        println!("  {}", "Permissions:".bold());
        for permission in &user.permissions {
            println!("    - {}", permission);
        }
    }
}

/// Print the view table with the current session's outcome per view
pub fn print_route_table(routes: &[(ViewRoute, Navigation)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Path").fg(Color::Cyan),
            Cell::new("View").fg(Color::Cyan),
            Cell::new("Access").fg(Color::Cyan),
            Cell::new("Outcome").fg(Color::Cyan),
        ]);

    for (route, navigation) in routes {
        let (outcome, color) = describe_navigation(navigation);
        table.add_row(vec![
            Cell::new(&route.path),
            Cell::new(&route.title),
            Cell::new(route.access.describe()),
            Cell::new(outcome).fg(color),
        ]);
    }

    println!("{table}");
}

/// One-line description of a navigation outcome
pub fn describe_navigation(navigation: &Navigation) -> (String, Color) {
    match navigation {
        Navigation::Render { .. } => ("open".to_string(), Color::Green),
        Navigation::Redirect { to, from: Some(from) } => {
            (format!("→ {} (return to {})", to, from), Color::Yellow)
        }
        Navigation::Redirect { to, from: None } => (format!("→ {}", to), Color::Red),
        Navigation::NotFound { .. } => ("not found".to_string(), Color::Red),
    }
}
