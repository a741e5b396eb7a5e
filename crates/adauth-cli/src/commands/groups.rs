//! groups command - list groups, optionally by member

use anyhow::Result;
use colored::Colorize;

use super::CommandContext;
use crate::output;

pub async fn execute(ctx: &CommandContext, member: Option<&str>) -> Result<()> {
    let groups = ctx.authenticator.groups(member).await?;

    if ctx.is_json() {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        output::print_groups(&groups);
        println!();
        println!("{}: {}", "Total".cyan(), groups.len());
    }

    Ok(())
}
