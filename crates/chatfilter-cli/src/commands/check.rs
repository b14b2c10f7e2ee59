use crate::commands::{print_json, Context};
use crate::util::error_marker;
use anyhow::Result;
use chatfilter_core::{Expression, Filter};
use clap::Args;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Args)]
pub struct CheckArgs {
    pub filter: String,
}

#[derive(Debug, Serialize)]
struct CompiledDto<'a> {
    ok: bool,
    canonical: String,
    attributes: Vec<&'static str>,
    ast: &'a Expression,
}

#[derive(Debug, Serialize)]
struct CompileErrorDto {
    ok: bool,
    kind: &'static str,
    position: usize,
    message: String,
}

pub fn check_filter(ctx: &Context<'_>, args: CheckArgs) -> Result<()> {
    let filter = match Filter::compile(&args.filter) {
        Ok(filter) => filter,
        Err(err) => {
            if ctx.json {
                print_json(&CompileErrorDto {
                    ok: false,
                    kind: err.kind().as_str(),
                    position: err.position(),
                    message: err.to_string(),
                })?;
            } else {
                eprintln!("{}", error_marker(&args.filter, err.position()));
            }
            return Err(err.into());
        }
    };

    let expr = filter.expression();
    let attributes: Vec<&'static str> = expr
        .attributes()
        .into_iter()
        .map(|attribute| attribute.name())
        .collect();
    debug!(?attributes, "filter compiled");

    if ctx.json {
        print_json(&CompiledDto {
            ok: true,
            canonical: expr.to_string(),
            attributes,
            ast: expr,
        })?;
    } else {
        println!("{expr}");
    }
    Ok(())
}
