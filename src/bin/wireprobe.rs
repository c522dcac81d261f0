//! wireprobe CLI binary.
//!
//! Sends requests and composes their responses from the command line.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use wireprobe::cli::{parse_basic, parse_header, Cli, Command};
use wireprobe::{
    combine_all, extract, race_then_combine, ClientBuilder, HttpClient, PrettyPrint, Request,
    ResponseView,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let client = match build_client(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Check WIREPROBE_* environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_client(cli: &Cli) -> wireprobe::Result<HttpClient> {
    let mut builder = ClientBuilder::from_env()?;
    if let Some(ms) = cli.timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    builder.build()
}

async fn run(client: &HttpClient, cli: Cli) -> wireprobe::Result<()> {
    match cli.command {
        Command::Send {
            url,
            method,
            headers,
            data,
            basic,
        } => handle_send(client, &url, &method, &headers, data, basic.as_deref(), cli.json).await,
        Command::Combine { urls, separator } => {
            handle_combine(client, &urls, separator, cli.json).await
        }
        Command::Race {
            anchor,
            first,
            second,
            separator,
        } => handle_race(client, &anchor, &first, &second, separator, cli.json).await,
    }
}

async fn handle_send(
    client: &HttpClient,
    url: &str,
    method: &str,
    headers: &[String],
    data: Option<String>,
    basic: Option<&str>,
    json: bool,
) -> wireprobe::Result<()> {
    let mut builder = Request::builder(method, url);
    for raw in headers {
        let (name, value) = parse_header(raw)?;
        builder = builder.header(&name, &value);
    }
    if let Some((user, password)) = basic.map(parse_basic).transpose()? {
        builder = builder.basic_auth(&user, &password);
    }
    if let Some(body) = data {
        builder = builder.body(body);
    }

    let response = client.send(&builder.build()?).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ResponseView::from(&response))?);
    } else {
        println!("{}", response.pretty_print());
    }
    Ok(())
}

async fn handle_combine(
    client: &HttpClient,
    urls: &[String],
    separator: String,
    json: bool,
) -> wireprobe::Result<()> {
    let mut pending = Vec::with_capacity(urls.len());
    for url in urls {
        let request = Request::get(url).build()?;
        pending.push(client.send_async(request).and_then(extract::body_if_ok));
    }

    let combined = combine_all(pending, move |a, b| format!("{a}{separator}{b}")).await?;
    output_text(&combined, json)
}

async fn handle_race(
    client: &HttpClient,
    anchor: &str,
    first: &str,
    second: &str,
    separator: String,
    json: bool,
) -> wireprobe::Result<()> {
    let anchor = client
        .send_async(Request::get(anchor).build()?)
        .and_then(extract::body_if_ok);
    let first = client
        .send_async(Request::get(first).build()?)
        .and_then(extract::body_if_ok);
    let second = client
        .send_async(Request::get(second).build()?)
        .and_then(extract::body_if_ok);

    let result = race_then_combine(anchor, first, second, move |a, winner| {
        format!("{a}{separator}{winner}")
    })
    .await?;
    output_text(&result, json)
}

#[derive(Serialize)]
struct TextResult<'a> {
    result: &'a str,
}

fn output_text(text: &str, json: bool) -> wireprobe::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&TextResult { result: text })?);
    } else {
        println!("{text}");
    }
    Ok(())
}
