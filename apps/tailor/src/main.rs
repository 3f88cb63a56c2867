use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tailor::config::Config;
use tailor::service_client::ServiceClient;
use tailor::pipeline::{ActionResult, ActionSet};
use tailor::state::{ActionKind, ExportTarget};
use tailor::view::{AnsiLatex, Highlighter, PlainText, Tab};
use tailor::{Controller, Session};

/// Tailor a resume to a job description using the generation service.
#[derive(Debug, Parser)]
#[command(name = "tailor", version)]
struct Cli {
    /// Base URL of the generation service.
    #[arg(long)]
    service_url: Option<String>,

    /// Model API key forwarded with generation requests.
    #[arg(long)]
    api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// File holding the source resume.
    #[arg(long)]
    resume: Option<PathBuf>,

    /// File holding the job description.
    #[arg(long)]
    job: Option<PathBuf>,

    #[arg(long)]
    company: Option<String>,

    /// Disable LaTeX syntax colouring.
    #[arg(long)]
    plain: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.service_url {
            config.service_url = url.trim_end_matches('/').to_string();
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }
    }
}

const HELP: &str = "\
Commands:
  resume <file>      load the source resume from a file
  job <file>         load the job description from a file
  company <name>     set the company name (blank clears it)
  key [value]        set or clear the model API key
  generate           generate a tailored resume
  reoptimize         re-optimize the generated resume
  reanalyze          re-analyze skills of the generated resume
  regen-skills       regenerate the LaTeX skills section
  save               save the source resume on the service
  tab <name>         show code, feedback or skills
  show               print the page
  copy [file]        copy the LaTeX code to a file, or print it
  copy-skills [file] copy the LaTeX skills section to a file, or print it
  download [file]    fetch the generated .tex (default resume.tex)
  new                hide the result and the log
  quit";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.apply(&mut config);

    // Traces go to stderr so they never interleave with the page on stdout.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting tailor v{}", env!("CARGO_PKG_VERSION"));

    let client = ServiceClient::new(&config.service_url, config.request_timeout_secs)?;
    info!(
        "Service client initialized ({}, timeout {}s)",
        client.base_url(),
        config.request_timeout_secs
    );

    if let Some(passcode) = &config.passcode {
        match client.login(passcode).await {
            Ok(()) => info!("Logged in to service"),
            Err(e) => warn!("Login failed: {e}"),
        }
    }

    let service = Arc::new(client.clone());
    let controller = Controller::new(Session::new(client.base_url()), service.clone(), service);
    controller.set_api_key(config.api_key.clone()).await;

    match &cli.resume {
        Some(path) => controller.set_source_document(read_text(path).await?).await,
        None => controller.load_source().await,
    }
    if let Some(path) = &cli.job {
        controller.set_target_description(read_text(path).await?).await;
    }
    if let Some(company) = &cli.company {
        controller.set_company_name(company.clone()).await;
    }

    let highlighter: Arc<dyn Highlighter> = if cli.plain || !std::io::stdout().is_terminal() {
        Arc::new(PlainText)
    } else {
        Arc::new(AnsiLatex)
    };

    run_shell(controller, client, highlighter).await
}

async fn run_shell(
    controller: Controller,
    client: ServiceClient,
    highlighter: Arc<dyn Highlighter>,
) -> Result<()> {
    println!("{}", controller.render(highlighter.as_ref()).await);
    println!("Type 'help' for commands.");

    let mut actions = ActionSet::new(controller.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            Some(finished) = actions.next_finished() => {
                report(&controller, highlighter.as_ref(), finished).await;
                continue;
            }
        };

        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "help" => println!("{HELP}"),
            "resume" => match read_text(Path::new(arg)).await {
                Ok(text) => controller.set_source_document(text).await,
                Err(e) => eprintln!("{e:#}"),
            },
            "job" => match read_text(Path::new(arg)).await {
                Ok(text) => controller.set_target_description(text).await,
                Err(e) => eprintln!("{e:#}"),
            },
            "company" => {
                controller.set_company_name(arg.to_string()).await;
                println!("{}", controller.snapshot().await.title().title);
            }
            "key" => controller.set_api_key(Some(arg.to_string())).await,
            "generate" => actions.spawn(ActionKind::Generate),
            "reoptimize" => actions.spawn(ActionKind::Reoptimize),
            "reanalyze" => actions.spawn(ActionKind::ReanalyzeSkills),
            "regen-skills" => actions.spawn(ActionKind::RegenerateSkillsSection),
            "save" => actions.spawn(ActionKind::SaveSource),
            "tab" => match arg.parse::<Tab>() {
                Ok(tab) => {
                    controller.select_tab(tab).await;
                    println!("{}", controller.render(highlighter.as_ref()).await);
                }
                Err(e) => eprintln!("{e}"),
            },
            "show" => println!("{}", controller.render(highlighter.as_ref()).await),
            "copy" => copy(&controller, ExportTarget::Code, arg).await,
            "copy-skills" => copy(&controller, ExportTarget::SkillsSection, arg).await,
            "download" => {
                let path = if arg.is_empty() { "resume.tex" } else { arg };
                if let Err(e) = download(&controller, &client, Path::new(path)).await {
                    eprintln!("{e:#}");
                }
            }
            "new" => {
                controller.reset().await;
                println!("{}", controller.render(highlighter.as_ref()).await);
            }
            "quit" | "exit" => break,
            other => eprintln!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }

    if !actions.is_empty() {
        info!("Waiting for {} running action(s)", actions.len());
    }
    while let Some(finished) = actions.next_finished().await {
        report(&controller, highlighter.as_ref(), finished).await;
    }
    Ok(())
}

/// Prints the page once a background action settles.
async fn report(controller: &Controller, highlighter: &dyn Highlighter, finished: ActionResult) {
    let (kind, result) = finished;
    match result {
        Ok(completion) => debug!("{kind:?} finished: {completion:?}"),
        Err(e) => debug!("{kind:?} rejected: {e}"),
    }
    println!("{}", controller.render(highlighter).await);
}

/// Writes the generated code to `arg`, or to stdout when no file is given.
async fn copy(controller: &Controller, target: ExportTarget, arg: &str) {
    let copied = match controller.export_text(target).await {
        Some(text) if arg.is_empty() => {
            println!("{text}");
            true
        }
        Some(text) => match tokio::fs::write(arg, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not write {arg}: {e}");
                false
            }
        },
        None => false,
    };
    controller.record_export(target, copied).await;
    if let Some(line) = controller.snapshot().await.log().last() {
        println!("{}", line.text);
    }
}

async fn download(controller: &Controller, client: &ServiceClient, path: &Path) -> Result<()> {
    let session = controller.snapshot().await;
    let Some(href) = session.view().download_href() else {
        bail!("Nothing to download yet. Generate a resume first.");
    };
    let body = client.download(href).await?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

async fn read_text(path: &Path) -> Result<String> {
    if path.as_os_str().is_empty() {
        bail!("A file path is required.");
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}
