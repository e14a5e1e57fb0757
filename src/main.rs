// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use nfvkit::config::Config;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, PackageCommands, TranslateCommands};

/// `RUST_LOG` wins; otherwise `-v` raises the default `warn` level
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<u8> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "nfvkit", &mut std::io::stdout());
        return Ok(0);
    }

    let config = Config::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Lint {
            compile,
            targets,
            files,
            max_line_length,
            linter,
            no_linter,
            exclude,
            jobs,
        } => commands::cmd_lint(
            &config,
            commands::LintArgs {
                compile,
                targets,
                files,
                max_line_length,
                linter,
                no_linter,
                exclude,
                jobs,
            },
            quiet,
        ),
        Commands::Validate { files } => commands::cmd_validate(&files),
        Commands::Translate(TranslateCommands::ToscaToNative {
            template,
            output,
            format,
            archive,
            strict,
            inputs,
            check,
        }) => commands::cmd_tosca_to_native(
            &config,
            commands::ToscaToNativeArgs {
                template,
                output,
                format,
                archive,
                strict,
                inputs,
                check,
            },
        ),
        Commands::Translate(TranslateCommands::NativeToTosca { files, output }) => {
            commands::cmd_native_to_tosca(&files, output.as_deref()).map(|()| 0)
        }
        Commands::Package(PackageCommands::Build {
            descriptor,
            name,
            output,
            image,
            cloud_init,
            script,
            icon,
        }) => commands::cmd_package_build(commands::PackageBuildArgs {
            descriptor,
            name,
            output,
            images: image,
            cloud_init,
            scripts: script,
            icons: icon,
        })
        .map(|()| 0),
        Commands::Package(PackageCommands::Inspect { package }) => commands::cmd_package_inspect(&package),
        Commands::Onboard {
            file,
            url,
            username,
            password,
            insecure,
            update,
            no_wait,
            force,
            timeout,
        } => commands::cmd_onboard(
            &config,
            commands::OnboardArgs {
                file,
                url,
                username,
                password,
                insecure,
                update,
                no_wait,
                force,
                timeout,
            },
            quiet,
        )
        .map(|()| 0),
        Commands::Cleanup {
            account,
            name,
            all,
            exclude,
            kind,
            dry_run,
        } => commands::cmd_cleanup(
            &config,
            commands::CleanupArgs {
                account,
                name,
                all,
                exclude,
                kinds: kind,
                dry_run,
            },
            quiet,
        ),
        Commands::Completions { .. } => Ok(0),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
