//! srvctl - administration CLI for the containerized server

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "srvctl")]
#[command(about = "Administration tool for the containerized server")]
#[command(version)]
struct Cli {
    /// Backend used to reach the container: 'podman' or 'kubectl'.
    /// Defaults to podman.
    #[arg(long, global = true, default_value = "")]
    backend: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a command inside the server container using 'sh -c'
    Exec {
        /// Environment variables to pass to the command, NAME or NAME=VALUE
        #[arg(short = 'e', long = "env")]
        env: Vec<String>,

        /// Pass stdin to the container
        #[arg(short, long)]
        interactive: bool,

        /// Stdin is a TTY
        #[arg(short, long)]
        tty: bool,

        /// The command to run, with its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Open an interactive shell inside the server container
    Term,

    /// Copy files to and from the server container
    ///
    /// Prefix one of the paths with 'server:' to designate the path inside
    /// the container.
    Cp {
        /// User or UID to set on the destination file
        #[arg(long, default_value = "")]
        user: String,

        /// Group or GID to set on the destination file
        #[arg(long, default_value = "")]
        group: String,

        /// Source path
        src: String,

        /// Destination path
        dst: String,
    },

    /// Show or follow server log files
    Logs {
        /// Follow log output
        #[arg(short, long)]
        follow: bool,

        /// Log paths or globs inside the container
        paths: Vec<String>,
    },

    /// Start a service inside the server container
    Start {
        /// The service to start
        service: String,

        /// Instance suffix for a templated service
        #[arg(long)]
        instance: Option<String>,
    },

    /// Stop a service, or the whole server when no service is given
    Stop {
        /// The service to stop (default: every known service)
        service: Option<String>,

        /// Instance suffix for a templated service
        #[arg(long)]
        instance: Option<String>,
    },

    /// Restart a service inside the server container
    Restart {
        /// The service to restart
        service: String,

        /// Instance suffix for a templated service
        #[arg(long)]
        instance: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match smol::block_on(run(cli)) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            failure_code(&err)
        }
    };
    std::process::exit(code);
}

/// Exit code for a failed invocation.
///
/// A remote command that was actually attempted and failed exits this
/// process with the remote exit code; everything else exits 1.
fn failure_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<backend_connection::Error>() {
        Some(backend_connection::Error::CommandFailed { exit_code, .. }) => *exit_code,
        _ => 1,
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let backend = cli.backend;
    match cli.command {
        Commands::Exec {
            env,
            interactive,
            tty,
            command,
        } => commands::exec::run(&backend, env, interactive, tty, command).await,
        Commands::Term => commands::term::run(&backend).await,
        Commands::Cp {
            user,
            group,
            src,
            dst,
        } => commands::cp::run(&backend, &src, &dst, &user, &group).await,
        Commands::Logs { follow, paths } => commands::logs::run(&backend, paths, follow).await,
        Commands::Start { service, instance } => {
            commands::service::start(&backend, &service, instance.as_deref()).await
        }
        Commands::Stop { service, instance } => {
            commands::service::stop(&backend, service.as_deref(), instance.as_deref()).await
        }
        Commands::Restart { service, instance } => {
            commands::service::restart(&backend, &service, instance.as_deref()).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_exit_code_survives_context_wrapping() {
        let err = anyhow::Error::from(backend_connection::Error::CommandFailed {
            exit_code: 23,
            output: String::new(),
        })
        .context("Failed to copy a to b");

        assert_eq!(failure_code(&err), 23);
    }

    #[test]
    fn test_other_errors_exit_one() {
        let err = anyhow::anyhow!("no usable backend");
        assert_eq!(failure_code(&err), 1);
    }
}
