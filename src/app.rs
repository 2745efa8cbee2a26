use colored::Colorize;
use tracing::debug;

use crate::cli::Args;
use crate::config::{self, Config};
use crate::error::Result;
use crate::reconcile::{Correlator, Reconciliation};
use crate::ui;

/// Main application entry point
pub async fn run(args: Args) -> Result<()> {
    ui::init_render_config();

    if args.debug {
        println!("[ debug enabled ]");
    }

    let path = match args.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let config = Config::load(&path)?;
    debug!("Loaded configuration from {}", path.display());

    let correlator = Correlator::new(config)?;
    let credentials = ui::prompt_credentials(args.username)?;

    let passes = correlator
        .run_until_declined(&credentials, |result| {
            let lines = summary_lines(
                correlator.config(),
                &credentials.username,
                result,
                args.debug,
            );
            for line in lines {
                println!("{}", line);
            }

            if args.once {
                return Ok(false);
            }
            ui::prompt_check_again()
        })
        .await?;

    debug!("{} pass(es) completed", passes);
    Ok(())
}

/// Lines reporting one pass, raw sets first when `verbose`
fn summary_lines(
    config: &Config,
    username: &str,
    result: &Reconciliation,
    verbose: bool,
) -> Vec<String> {
    let mut lines = Vec::new();

    if verbose {
        for ticket in &result.tracker {
            lines.push(format!("Jira ticket: {}", ticket));
        }
        for ticket in &result.builds {
            lines.push(format!("CI ticket: {}", ticket));
        }
        lines.push("[ end of CI tickets ]".to_string());
    }

    if result.tracker.is_empty() {
        lines.push(format!(
            "{} No tickets assigned to \"{}\" by that query",
            ">".bright_green(),
            username
        ));
        return lines;
    }

    lines.push(format!(
        "{} {} assigned tickets found",
        ">".bright_green(),
        result.tracker.len()
    ));

    if result.builds.is_empty() {
        lines.push(format!(
            "{} No tickets found on CI. Are the jobs up?",
            "x".bright_red()
        ));
    } else {
        lines.push(format!(
            "{} {} tickets found on CI",
            ">".bright_green(),
            result.builds.len()
        ));
    }

    if result.ready.is_empty() {
        lines.push(format!("{} Nothing ready yet", ">".bright_green()));
    }
    for ticket in &result.ready {
        lines.push(format!(
            "{} Ready: {}",
            "+".bright_green(),
            config.browse_url(ticket).bright_cyan()
        ));
    }

    lines
}
