//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the wireprobe binary.

use clap::{Parser, Subcommand};

use crate::error::{Error, Result};

/// Send HTTP requests and compose their responses.
#[derive(Parser, Debug)]
#[command(name = "wireprobe", about = "HTTP probe CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of text.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Request timeout in milliseconds.
    #[arg(long, global = true, env = "WIREPROBE_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Log dispatch details to stderr.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a single request and print the response.
    Send {
        /// Target URL.
        url: String,

        /// HTTP method.
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Header in `Name: value` form. May be repeated.
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body.
        #[arg(short = 'd', long)]
        data: Option<String>,

        /// Basic credentials in `user:password` form.
        #[arg(long)]
        basic: Option<String>,
    },

    /// Fetch all URLs concurrently and join their bodies in argument order.
    Combine {
        /// URLs to fetch. Each must answer 200.
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,

        /// Text placed between bodies.
        #[arg(long, default_value = "")]
        separator: String,
    },

    /// Fetch an anchor URL and race two others; print anchor + winner.
    Race {
        /// URL whose body comes first.
        anchor: String,

        /// First racer.
        first: String,

        /// Second racer.
        second: String,

        /// Text placed between the anchor and the winner.
        #[arg(long, default_value = " ")]
        separator: String,
    },
}

/// Split a `Name: value` header argument.
///
/// # Errors
///
/// Returns an error if there is no colon or the name is empty.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::InvalidRequest(format!("header '{raw}' must look like 'Name: value'")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidRequest(format!("header '{raw}' has no name")));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Split a `user:password` credential argument.
///
/// # Errors
///
/// Returns an error if there is no colon.
pub fn parse_basic(raw: &str) -> Result<(String, String)> {
    raw.split_once(':')
        .map(|(user, password)| (user.to_string(), password.to_string()))
        .ok_or_else(|| Error::InvalidRequest("--basic must look like 'user:password'".to_string()))
}
