//! Implementation of the `mdxgen generate` command.

use super::merge_required;
use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::context::RunContext;
use crate::error::{GenError, Result};
use crate::log::RunLog;
use crate::model::{HttpTransport, ModelClient};
use crate::pipeline::Pipeline;
use crate::prompt::HttpFetcher;

/// Execute the `mdxgen generate` command.
pub fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let mut config = Config::resolve(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let source = config.prompt_source.clone().ok_or_else(|| {
        GenError::UserError(
            "no prompt source configured\n\
             Fix: pass --source <url|path> or set prompt_source in mdxgen.yaml."
                .to_string(),
        )
    })?;

    let ctx = RunContext::resolve(&config, args.out.as_deref())?;
    let log = RunLog::to_file(ctx.log_file(), true)?;

    let client = ModelClient::new(HttpTransport::from_config(&config));
    let fetcher = HttpFetcher::new(config.fetch_timeout());

    let run = Pipeline::new(&config, &ctx, &client, &fetcher, &log)
        .run(&source)
        .map_err(|failure| failure.error)?;

    println!("Generated {} file(s) in {}", run.files.len(), run.output_root.display());
    println!();
    for file in &run.files {
        println!("  {}", file);
    }
    println!();
    println!("Run:      {}", run.run_id);
    println!("Attempts: {}", run.attempts);
    for warning in &run.report.warnings {
        println!("Warning:  {}", warning.lines().next().unwrap_or(""));
    }

    Ok(())
}

/// Fold command-line flags into the loaded config.
pub(super) fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(source) = &args.source {
        config.prompt_source = Some(source.clone());
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(max_attempts) = args.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(timeout) = args.timeout_secs {
        config.attempt_timeout_secs = timeout;
    }
    if args.type_check {
        config.type_check.enabled = true;
    }
    merge_required(&mut config.required_paths, &args.require);
}
