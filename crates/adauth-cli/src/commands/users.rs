//! users command - list every user

use anyhow::Result;
use colored::Colorize;

use super::CommandContext;
use crate::output;

pub async fn execute(ctx: &CommandContext) -> Result<()> {
    let users = ctx.authenticator.all_users().await?;

    if ctx.is_json() {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else {
        output::print_users(&users);
        println!();
        println!("{}: {}", "Total".cyan(), users.len());
    }

    Ok(())
}
