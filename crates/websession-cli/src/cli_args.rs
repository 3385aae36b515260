use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "websession")]
#[command(about = "Log in to a session-based web backend and exercise its CSRF protection")]
pub struct Cli {
    #[arg(long, env = "WEBSESSION_ADDR")]
    pub addr: Option<String>,
    #[arg(long, env = "WEBSESSION_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(long, help = "Accept invalid TLS certificates")]
    pub insecure: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Log in and print the profile and CSRF header")]
    Login(LoginArgs),
    #[command(
        about = "Check whether the server already has a session for this client",
        long_about = "Check whether the server already has a session for this client.\n\n\
            Cookies are not persisted between runs, so each invocation starts with an empty \
            cookie jar. Against a cookie-based server this only finds sessions that do not \
            depend on a cookie from an earlier run."
    )]
    Check,
    #[command(about = "Log in, send one request with the session's default headers, log off")]
    Call(CallArgs),
}

#[derive(Args, Clone)]
pub struct Credentials {
    #[arg(long, env = "WEBSESSION_USERNAME")]
    pub username: String,
    #[arg(long, env = "WEBSESSION_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct LoginArgs {
    #[command(flatten)]
    pub credentials: Credentials,
    #[arg(long, help = "Log off again after printing the session")]
    pub logout: bool,
}

#[derive(Args)]
pub struct CallArgs {
    #[command(flatten)]
    pub credentials: Credentials,
    pub method: String,
    pub path: String,
    #[arg(long, help = "JSON request body")]
    pub body: Option<String>,
}
