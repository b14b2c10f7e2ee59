use crate::commands::Context;
use crate::error::invalid_input;
use crate::util::open_input;
use anyhow::{Context as _, Result};
use chatfilter_config::InvalidFilterPolicy;
use chatfilter_core::{FilterSet, Message};
use clap::Args;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Filter expression; repeat to require several filters
    #[arg(long = "filter", short = 'f', required = true)]
    pub filters: Vec<String>,
    /// JSON-lines message file (defaults to stdin)
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Print the messages the filters hide instead
    #[arg(long)]
    pub invert: bool,
}

pub fn run_filters(ctx: &Context<'_>, args: RunArgs) -> Result<()> {
    let set = build_filter_set(ctx, &args.filters)?;
    let reader = open_input(args.input.as_deref())?;
    let mut stdout = BufWriter::new(io::stdout().lock());

    let mut shown = 0usize;
    let mut hidden = 0usize;
    let mut skipped = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("read input line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let message: Message = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(err) if ctx.config.input.strict => {
                return Err(invalid_input(format!("line {line_no}: {err}")));
            }
            Err(err) => {
                warn!(line = line_no, error = %err, "skipping malformed message");
                skipped += 1;
                continue;
            }
        };

        let rejected_by = set.first_rejecting(&message);
        match rejected_by {
            None => shown += 1,
            Some(name) => {
                debug!(line = line_no, filter = name, "message hidden");
                hidden += 1;
            }
        }
        if rejected_by.is_none() != args.invert {
            writeln!(stdout, "{line}")?;
        }
    }
    stdout.flush()?;

    debug!(shown, hidden, skipped, "run finished");
    Ok(())
}

fn build_filter_set(ctx: &Context<'_>, filters: &[String]) -> Result<FilterSet> {
    let mut set = FilterSet::new();
    for (idx, text) in filters.iter().enumerate() {
        let name = format!("filter {}", idx + 1);
        match set.insert(&name, text) {
            Ok(()) => debug!(filter = %name, source = %text, "filter compiled"),
            Err(err) => match ctx.config.invalid_filter {
                InvalidFilterPolicy::Reject => {
                    return Err(invalid_input(format!("{name} does not compile: {err}")));
                }
                InvalidFilterPolicy::Show => {
                    warn!(filter = %name, error = %err, "dropping filter that failed to compile");
                }
            },
        }
    }
    Ok(set)
}
