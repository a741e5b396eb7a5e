//! auth command - verify credentials and show the user

use anyhow::Result;
use colored::Colorize;

use super::CommandContext;
use crate::output;

pub async fn execute(ctx: &CommandContext, login: &str, password: &str) -> Result<()> {
    let user = ctx
        .authenticator
        .authenticate_and_return_user(login, password)
        .await?;

    if ctx.is_json() {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("{} {}", "Authenticated".green().bold(), user.login);
        println!();
        output::print_user(&user);
    }

    Ok(())
}
