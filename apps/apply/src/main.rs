mod client;
mod feedback;
mod form;
mod prompt;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::client::{ClientError, IntakeClient, SubmissionSummary};
use crate::feedback::Dialog;
use crate::form::{FieldError, FormController, FormData, SubmitBlocked};
use crate::prompt::ReviewChoice;

#[derive(Parser)]
#[command(name = "apply")]
#[command(about = "Fill in the recruitment form and browse submissions", long_about = None)]
struct Cli {
    /// Base URL of the intake service
    #[arg(
        long,
        global = true,
        env = "INTAKE_URL",
        default_value = "http://localhost:3000"
    )]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the three-step form and submit it
    Submit(SubmitArgs),

    /// List every submission (resumes excluded)
    List,

    /// Show one submission
    Show { id: String },

    /// Download the resume attached to a submission
    Download {
        id: String,

        /// Where to write the file (defaults to the server-provided name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SubmitArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    currentyear: Option<String>,
    #[arg(long = "scholar-no")]
    scholar_no: Option<String>,
    #[arg(long)]
    branch: Option<String>,
    #[arg(long)]
    pref1: Option<String>,
    #[arg(long)]
    pref2: Option<String>,
    /// Path to the resume PDF (350KB max)
    #[arg(long)]
    resume: Option<PathBuf>,
    #[arg(long)]
    message: Option<String>,

    /// Fail instead of prompting for missing or invalid fields
    #[arg(long)]
    non_interactive: bool,
}

impl SubmitArgs {
    fn form_data(&self) -> FormData {
        FormData {
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            currentyear: self.currentyear.clone().unwrap_or_default(),
            scholar_no: self.scholar_no.clone().unwrap_or_default(),
            branch: self.branch.clone().unwrap_or_default(),
            pref1: self.pref1.clone().unwrap_or_default(),
            pref2: self.pref2.clone().unwrap_or_default(),
            resume: self.resume.clone(),
            message: self.message.clone().unwrap_or_default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("apply=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = IntakeClient::new(&cli.server)?;

    match cli.command {
        Commands::Submit(args) => run_submit(&client, &args).await,
        Commands::List => run_list(&client).await,
        Commands::Show { id } => run_show(&client, &id).await,
        Commands::Download { id, output } => run_download(&client, &id, output).await,
    }
}

fn report(errors: &[FieldError]) {
    for error in errors {
        eprintln!("  ✗ [{}] {error}", error.field().wire_name());
    }
}

async fn run_submit(client: &IntakeClient, args: &SubmitArgs) -> Result<()> {
    let interactive = !args.non_interactive;
    let mut controller = FormController::new(args.form_data());
    let mut revisit = false;

    loop {
        if interactive {
            prompt::fill_step(&mut controller, revisit)?;
        }
        revisit = false;

        if !controller.step().is_last() {
            if let Err(errors) = controller.next() {
                report(&errors);
                if !interactive {
                    bail!("Step {} of the form is incomplete", controller.step().number());
                }
            }
            continue;
        }

        match controller.submission() {
            Ok(_) => {}
            Err(SubmitBlocked::Invalid(errors)) => {
                report(&errors);
                if !interactive {
                    bail!("The resume step is incomplete");
                }
                continue;
            }
            Err(blocked @ SubmitBlocked::NotOnFinalStep(_)) => bail!(blocked),
        }

        if interactive {
            match prompt::review(controller.data())? {
                ReviewChoice::Submit => {}
                ReviewChoice::Back => {
                    controller.prev();
                    revisit = true;
                    continue;
                }
                ReviewChoice::Cancel => {
                    println!("Submission cancelled.");
                    return Ok(());
                }
            }
        }
        break;
    }

    let result = client.submit(controller.data()).await;
    let dialog = Dialog::for_submission(&result);
    println!("{dialog}");

    match result {
        Ok(created) => {
            info!("Submission {} accepted: {}", created.id, created.message);
            Ok(())
        }
        Err(ClientError::Rejected { status, .. }) => {
            bail!("Submission rejected with status {}", status.as_u16())
        }
        Err(err) => Err(err.into()),
    }
}

fn print_summary(s: &SubmissionSummary) {
    println!("{}", s.id);
    println!("  Name:         {}", s.name);
    println!("  Email:        {}", s.email);
    println!("  Year:         {}", s.currentyear);
    println!("  Scholar no:   {}", s.scholar_no);
    println!("  Branch:       {}", s.branch);
    println!("  Preferences:  {} / {}", s.pref1, s.pref2);
    if let Some(message) = s.message.as_deref().filter(|m| !m.is_empty()) {
        println!("  Message:      {message}");
    }
    if let Some(created_at) = s.created_at {
        println!("  Submitted:    {}", created_at.format("%Y-%m-%d %H:%M UTC"));
    }
}

async fn run_list(client: &IntakeClient) -> Result<()> {
    let submissions = client.list().await?;
    if submissions.is_empty() {
        println!("No submissions yet.");
        return Ok(());
    }
    for submission in &submissions {
        print_summary(submission);
    }
    println!();
    println!("{} submission(s)", submissions.len());
    Ok(())
}

async fn run_show(client: &IntakeClient, id: &str) -> Result<()> {
    let submission = client.get(id).await?;
    print_summary(&submission);
    Ok(())
}

async fn run_download(client: &IntakeClient, id: &str, output: Option<PathBuf>) -> Result<()> {
    let resume = client.download_resume(id).await?;
    // The server-supplied name is already reduced to one path component.
    let path = output.unwrap_or_else(|| PathBuf::from(&resume.file_name));
    tokio::fs::write(&path, &resume.data)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Saved {} ({} bytes)", path.display(), resume.data.len());
    Ok(())
}
