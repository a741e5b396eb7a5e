//! Table output for users and groups

use adauth_core::{Group, User};
use colored::Colorize;

/// Print one user as a field list, followed by its groups
pub fn print_user(user: &User) {
    let fields = [
        ("Login", user.login.as_str()),
        ("Name", user.name.as_str()),
        ("DN", user.distinguished_name.as_str()),
        ("Mail", user.mail.as_str()),
        ("Phone", user.telephone_number.as_str()),
        ("Company", user.company.as_str()),
    ];

    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in fields {
        println!("  {}: {}", pad(label, width).cyan(), value);
    }

    println!();
    println!("  {} ({})", "Groups".cyan(), user.groups.len());
    for group in &user.groups {
        println!("    {}  {}", group.code, group.name.dimmed());
    }
}

pub fn print_users(users: &[User]) {
    let rows: Vec<Vec<&str>> = users
        .iter()
        .map(|u| vec![u.login.as_str(), u.name.as_str(), u.mail.as_str()])
        .collect();
    print_table(&["LOGIN", "NAME", "MAIL"], &rows);
}

pub fn print_groups(groups: &[Group]) {
    let rows: Vec<Vec<&str>> = groups
        .iter()
        .map(|g| vec![g.code.as_str(), g.name.as_str()])
        .collect();
    print_table(&["CODE", "NAME"], &rows);
}

/// Number of pages needed for `total` entries, at least 1
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

fn print_table(headers: &[&str], rows: &[Vec<&str>]) {
    let widths = column_widths(headers, rows);

    let header = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header.trim_end().bold());

    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

fn column_widths(headers: &[&str], rows: &[Vec<&str>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}
