//! search command - one page of users matching a text

use adauth_core::User;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use super::CommandContext;
use crate::output;

#[derive(Serialize)]
struct SearchResult {
    users: Vec<User>,
    total: usize,
    page: usize,
    page_size: usize,
}

pub async fn execute(
    ctx: &CommandContext,
    text: &str,
    page: usize,
    page_size: usize,
    by_name: bool,
) -> Result<()> {
    let (users, total) = if by_name {
        ctx.authenticator
            .users_by_name_filter(text, page, page_size)
            .await?
    } else {
        ctx.authenticator.users_by_filter(text, page, page_size).await?
    };

    let page = page.max(1);
    let page_size = page_size.max(1);

    if ctx.is_json() {
        let result = SearchResult {
            users,
            total,
            page,
            page_size,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_users(&users);
        println!();
        println!(
            "{} {} of {} ({} matching)",
            "Page".cyan(),
            page,
            output::page_count(total, page_size),
            total
        );
    }

    Ok(())
}
