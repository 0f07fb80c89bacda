//! `pluck npm` command implementation.

use pluck_config::ConfigLayering;
use pluck_core::error::PluckResult;

use super::CommandContext;

/// Execute the `pluck npm` command
pub async fn execute(args: Vec<String>, ctx: &CommandContext) -> PluckResult<()> {
    let loaded = ctx.load_config(ConfigLayering::new()).await?;
    let runner = loaded.npm_runner()?;

    ctx.output.step("🚀", &format!("npm {}", args.join(" ")));
    runner.execute(&args).await?;
    ctx.output.success("npm finished");

    Ok(())
}
