use crate::commands::{print_json, Context};
use anyhow::Result;
use chatfilter_core::tokenize;
use clap::Args;

#[derive(Debug, Args)]
pub struct TokensArgs {
    pub filter: String,
}

pub fn print_tokens(ctx: &Context<'_>, args: TokensArgs) -> Result<()> {
    let tokens = tokenize(&args.filter);

    if ctx.json {
        print_json(&tokens)?;
        return Ok(());
    }

    for token in &tokens {
        println!(
            "{:>4}  {:<14}  {}",
            token.position,
            token.kind.name(),
            token.lexeme
        );
    }
    Ok(())
}
