//! Application assistant: job application follow-ups and cover letters from a job description

use application_assistant::cli::{self, AuthAction, Cli, Commands, ConfigAction, ResumeAction};
use application_assistant::config::{Config, AVAILABLE_MODELS};
use application_assistant::error::{AppError, Result};
use application_assistant::llm::client::OpenAiClient;
use application_assistant::llm::credentials::CredentialStore;
use application_assistant::processing::messages::PLACEHOLDERS;
use application_assistant::processing::records::Generation;
use application_assistant::session::Session;
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let credentials = CredentialStore::new(&cli.env_file);

    if let Err(e) = run_command(cli.command, &config_path, &credentials).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config_path: &Path, credentials: &CredentialStore) -> Result<()> {
    match command {
        Commands::Generate {
            job,
            resume,
            model,
            out_dir,
        } => {
            let job_description = read_job_description(&job).await?;
            let mut session = Session::open(config_path)?;

            if let Some(resume) = resume {
                import_resume(&mut session, &resume).await?;
            }
            if let Some(model) = model {
                session.use_model(&model)?;
            }

            let client = OpenAiClient::from_credentials(credentials)?;
            info!("Generating with model {}", session.model());

            let spinner = spinner("Analyzing the job description and writing your cover letter...");
            let result = session.generate(&client, &job_description).await;
            spinner.finish_and_clear();
            let generation = result?.clone();

            print_notices(session.notices());
            print_generation(&generation);

            std::fs::create_dir_all(&out_dir)?;
            write_messages(&generation, &out_dir)?;
            let session_file = out_dir.join("session.json");
            session.save_generation(&session_file)?;
            let letter = out_dir.join("cover_letter.pdf");
            session.export_document(&letter, Local::now().date_naive())?;

            println!("\n{} {}", "✅ Cover letter:".green().bold(), letter.display());
            println!("💾 Session saved to {}", session_file.display());
            println!(
                "💡 Edit cv_content in the session file, then run: application-assistant render --session {}",
                session_file.display()
            );
        }

        Commands::Render { session: session_file, out } => {
            let mut session = Session::open(config_path)?;
            session.load_generation(&session_file)?;
            session.rerender_messages()?;
            print_notices(session.notices());

            session.save_generation(&session_file)?;
            if let Some(generation) = session.generation() {
                print_generation(generation);
                let out_dir = out.parent().unwrap_or_else(|| Path::new(""));
                write_messages(generation, out_dir)?;
            }
            session.export_document(&out, Local::now().date_naive())?;
            println!("\n{} {}", "✅ Cover letter:".green().bold(), out.display());
        }

        Commands::Resume { action } => {
            let mut session = Session::open(config_path)?;
            match action {
                ResumeAction::Set { file } => {
                    let length = import_resume(&mut session, &file).await?;
                    println!("✅ Stored {} characters of resume text in {}", length, session.resume_path().display());
                }
                ResumeAction::Show => match session.resume_text() {
                    Some(text) => println!("{}", text),
                    None => {
                        println!("⚠️  No resume stored yet.");
                        println!("💡 Add one with: application-assistant resume set <file>");
                    }
                },
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let session = Session::open(config_path)?;
                print_config(session.config(), config_path);
            }

            Some(ConfigAction::Path) => println!("{}", config_path.display()),

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset successfully!");
            }

            Some(ConfigAction::Set { key, value }) => {
                let mut session = Session::open(config_path)?;
                let mut config = session.config().clone();
                config.set_value(&key, &cli::unescape_newlines(&value))?;
                session.save_config(config)?;
                println!("✅ Set {}", key.bold());
            }
        },

        Commands::Auth { action } => match action {
            AuthAction::SetKey { key } => {
                credentials.save_api_key(key.trim())?;
                println!("✅ API key saved to {}", credentials.env_path().display());
            }
            AuthAction::Status => match credentials.api_key()? {
                Some(key) => println!("🔑 API key found: {}", cli::mask_key(&key)),
                None => {
                    println!("⚠️  No API key found in the environment or {}", credentials.env_path().display());
                    println!("💡 Save one with: application-assistant auth set-key <KEY>");
                }
            },
        },

        Commands::Placeholders => {
            println!("📝 Template placeholders\n");
            for (name, description) in PLACEHOLDERS {
                println!("  {:<22} {}", format!("{{{}}}", name).cyan(), description);
            }
            println!("\nUse {{{{ and }}}} for literal braces.");
        }
    }

    Ok(())
}

async fn read_job_description(job: &Path) -> Result<String> {
    if job == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read job description from stdin")?;
        return Ok(text);
    }

    cli::validate_file_extension(job, &["txt", "md"])
        .map_err(|e| AppError::InvalidInput(format!("Job description file: {}", e)))?;
    let text = tokio::fs::read_to_string(job)
        .await
        .with_context(|| format!("Failed to read job description {}", job.display()))?;
    Ok(text)
}

async fn import_resume(session: &mut Session, file: &Path) -> Result<usize> {
    cli::validate_file_extension(file, &["pdf", "txt", "md"])
        .map_err(|e| AppError::InvalidInput(format!("Resume file: {}", e)))?;

    let spinner = spinner("Extracting resume text...");
    let result = session.upload_resume(file).await.map(str::len);
    spinner.finish_and_clear();
    result
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_notices(notices: &[String]) {
    for notice in notices {
        println!("{} {}", "⚠️ ".yellow(), notice.yellow());
    }
}

fn print_generation(generation: &Generation) {
    let job = &generation.job_info;
    println!("\n{}", "💼 Job".bold());
    println!("  Company: {}", job.company_name);
    println!("  Position: {}", job.position_title);
    println!("  Hiring manager: {}", job.hiring_manager_name);

    println!("\n{}", "📧 Follow-up email".bold());
    println!("{} {}", "Subject:".bold(), generation.outputs.email.subject);
    println!("{}", generation.outputs.email.body);

    let message = &generation.outputs.short_message;
    println!(
        "\n{} ({}/200)",
        "💬 LinkedIn message".bold(),
        message.chars().count()
    );
    println!("{}", message);
}

fn write_messages(generation: &Generation, dir: &Path) -> Result<()> {
    let email = generation.outputs.email.clone();
    std::fs::write(
        dir.join("email.txt"),
        format!("Subject: {}\n\n{}\n", email.subject, email.body),
    )?;
    std::fs::write(dir.join("linkedin.txt"), format!("{}\n", generation.outputs.short_message))?;
    Ok(())
}

fn print_config(config: &Config, path: &Path) {
    println!("⚙️  Current Configuration ({})\n", path.display());

    println!("{}", "Personal info".bold());
    for (name, value) in config.personal_info.fields() {
        println!("  {:<12} {}", name, value);
    }

    let resume: PathBuf = config.resume_file(path);
    println!("\n{} {}", "Resume file:".bold(), resume.display());

    let model_name = AVAILABLE_MODELS
        .iter()
        .find(|(_, id)| *id == config.model)
        .map(|(name, _)| *name)
        .unwrap_or("custom");
    println!("{} {} ({})", "Model:".bold(), config.model, model_name);

    println!("\n{}", "Email template".bold());
    println!("  Subject: {}", config.templates.email.subject);
    for line in config.templates.email.body.lines() {
        println!("  | {}", line);
    }
    println!("\n{}", "LinkedIn template".bold());
    println!("  {}", config.templates.linkedin);
}
