//! user command - look up one user

use anyhow::Result;

use super::CommandContext;
use crate::output;

pub async fn execute(ctx: &CommandContext, login: &str) -> Result<()> {
    let user = ctx.authenticator.user_by_login(login).await?;

    if ctx.is_json() {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        output::print_user(&user);
    }

    Ok(())
}
