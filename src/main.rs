mod app;
mod cli;
mod state;
mod terminal;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use env_logger::{Builder, Env, Target};
use std::fs::File;
use std::path::Path;

/// Log filter used when `RUST_LOG` is unset. stderr shares the alternate
/// screen with the frame, so nothing is logged there unless asked for.
fn default_filter(log_file: Option<&Path>) -> &'static str {
    match log_file {
        Some(_) => "info",
        None => "off",
    }
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let env = Env::default().default_filter_or(default_filter(args.log_file.as_deref()));
    let mut builder = Builder::from_env(env);
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut app = app::App::new(&args)?;
    let _guard = terminal::TerminalGuard::enter().context("failed to set up the terminal")?;
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_stays_quiet_without_a_log_file() {
        assert_eq!(default_filter(None), "off");
        assert_eq!(default_filter(Some(Path::new("euler3d.log"))), "info");
    }
}
