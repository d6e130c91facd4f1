mod client;
mod models;
mod output;
mod session;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::client::{ApiClient, JobQuery};
use crate::models::{AuthResponse, JobUpdate, NewJob, ProfileUpdate, Salary};
use crate::session::{Session, SessionStore};

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Command-line client for the job board API", long_about = None)]
struct Cli {
    #[arg(long, global = true, env = "JOBBOARD_API_URL", default_value = "http://localhost:5000/api")]
    api_url: String,

    #[arg(long, global = true, env = "JOBBOARD_SESSION_FILE", default_value = ".jobboard-session.json")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum JobTypeArg {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl JobTypeArg {
    fn wire_name(self) -> &'static str {
        match self {
            JobTypeArg::FullTime => "Full-time",
            JobTypeArg::PartTime => "Part-time",
            JobTypeArg::Contract => "Contract",
            JobTypeArg::Internship => "Internship",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Reviewing,
    Accepted,
    Rejected,
}

impl StatusArg {
    fn wire_name(self) -> &'static str {
        match self {
            StatusArg::Pending => "pending",
            StatusArg::Reviewing => "reviewing",
            StatusArg::Accepted => "accepted",
            StatusArg::Rejected => "rejected",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create an account and log in")]
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    #[command(about = "Log in and remember the session")]
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    #[command(about = "Forget the stored session")]
    Logout,

    #[command(about = "Show your profile")]
    Profile,

    #[command(about = "Update your profile")]
    UpdateProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, help = "Free-text experience summary")]
        experience: Option<String>,
    },

    #[command(about = "Replace your skill list")]
    Skills {
        #[arg(value_delimiter = ',', help = "Comma-separated skills, e.g. Rust,SQL")]
        skills: Vec<String>,
    },

    #[command(about = "Search job postings")]
    Jobs {
        #[arg(short, long, help = "Text in title, company or description")]
        search: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short = 't', long = "type", value_enum)]
        job_type: Option<JobTypeArg>,
        #[arg(long, value_delimiter = ',', help = "Any of these skills")]
        skills: Vec<String>,
    },

    #[command(about = "Jobs that share a skill with your profile")]
    Matched,

    #[command(about = "Show one job posting")]
    Job { id: Uuid },

    #[command(about = "Post a new job")]
    PostJob {
        #[arg(long)]
        title: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        description: String,
        #[arg(long = "requirement", help = "Repeat for each requirement")]
        requirements: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        #[arg(long)]
        salary_min: Option<i64>,
        #[arg(long)]
        salary_max: Option<i64>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(short = 't', long = "type", value_enum, default_value = "full-time")]
        job_type: JobTypeArg,
    },

    #[command(about = "Edit one of your job postings; only the given fields change")]
    UpdateJob {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "requirement", help = "Repeat for each requirement; replaces the list")]
        requirements: Option<Vec<String>>,
        #[arg(long, value_delimiter = ',', help = "Replaces the skill list")]
        skills: Option<Vec<String>>,
        #[arg(long)]
        salary_min: Option<i64>,
        #[arg(long)]
        salary_max: Option<i64>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(short = 't', long = "type", value_enum)]
        job_type: Option<JobTypeArg>,
    },

    #[command(about = "Delete one of your job postings")]
    DeleteJob { id: Uuid },

    #[command(about = "Applications received by one of your jobs")]
    JobApplications { job_id: Uuid },

    #[command(about = "Apply to a job")]
    Apply {
        job_id: Uuid,
        #[arg(short, long)]
        cover_letter: Option<String>,
    },

    #[command(about = "List your applications")]
    Applications,

    #[command(about = "Show one application")]
    Application { id: Uuid },

    #[command(about = "Set the status of an application to your job")]
    SetStatus {
        id: Uuid,
        #[arg(value_enum)]
        status: StatusArg,
    },

    #[command(about = "Withdraw one of your applications")]
    Withdraw { id: Uuid },

    #[command(about = "Upload a resume (.pdf, .doc, .docx; max 5MB)")]
    UploadResume { file: PathBuf },

    #[command(about = "Show your resume on file")]
    Resume,

    #[command(about = "Delete your resume")]
    DeleteResume,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn require_session(sessions: &SessionStore) -> Result<Session> {
    sessions
        .load()?
        .ok_or_else(|| anyhow!("Not logged in. Run `jobboard login` first."))
}

async fn run(cli: Cli) -> Result<()> {
    let api = ApiClient::new(&cli.api_url);
    let sessions = SessionStore::new(&cli.session_file);

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => {
            let auth = api.register(&name, &email, &password).await?;
            println!("Registered and logged in as {} <{}>", auth.user.name, auth.user.email);
            remember(&sessions, auth)?;
        }

        Commands::Login { email, password } => {
            let auth = api.login(&email, &password).await?;
            println!("Logged in as {} <{}>", auth.user.name, auth.user.email);
            remember(&sessions, auth)?;
        }

        Commands::Logout => {
            if sessions.clear()? {
                println!("Logged out");
            } else {
                println!("No active session");
            }
        }

        Commands::Profile => {
            let session = require_session(&sessions)?;
            output::print_profile(&api.profile(&session).await?);
        }

        Commands::UpdateProfile {
            name,
            email,
            password,
            experience,
        } => {
            let session = require_session(&sessions)?;
            let update = ProfileUpdate {
                name,
                email,
                password,
                experience,
                skills: None,
            };
            remember(&sessions, api.update_profile(&session, &update).await?)?;
            println!("Profile updated");
        }

        Commands::Skills { skills } => {
            let session = require_session(&sessions)?;
            let update = ProfileUpdate {
                skills: Some(skills),
                ..ProfileUpdate::default()
            };
            let auth = api.update_profile(&session, &update).await?;
            let shown = if auth.user.skills.is_empty() {
                "(none)".to_string()
            } else {
                auth.user.skills.join(", ")
            };
            remember(&sessions, auth)?;
            println!("Skills: {shown}");
        }

        Commands::Jobs {
            search,
            location,
            job_type,
            skills,
        } => {
            let query = JobQuery {
                search,
                location,
                job_type: job_type.map(|t| t.wire_name().to_string()),
                skills,
            };
            let list = api.list_jobs(&query).await?;
            if list.jobs.is_empty() {
                println!("No jobs found.");
            } else {
                println!("\n{} job(s)\n", list.count);
                output::print_jobs(&list.jobs);
            }
        }

        Commands::Matched => {
            let session = require_session(&sessions)?;
            let list = api.matched_jobs(&session).await?;
            if let Some(message) = &list.message {
                println!("{message}");
            } else if list.jobs.is_empty() {
                println!("No jobs match your skills yet.");
            } else {
                println!("\n{} matching job(s)\n", list.count);
                output::print_jobs(&list.jobs);
            }
        }

        Commands::Job { id } => output::print_job(&api.get_job(id).await?),

        Commands::PostJob {
            title,
            company,
            location,
            description,
            requirements,
            skills,
            salary_min,
            salary_max,
            currency,
            job_type,
        } => {
            let session = require_session(&sessions)?;
            let job = NewJob {
                title,
                company,
                location,
                description,
                requirements,
                skills,
                salary: Salary {
                    min: salary_min,
                    max: salary_max,
                    currency,
                },
                job_type: job_type.wire_name().to_string(),
            };
            let created = api.create_job(&session, &job).await?;
            println!("Posted job {}", created.id);
        }

        Commands::UpdateJob {
            id,
            title,
            company,
            location,
            description,
            requirements,
            skills,
            salary_min,
            salary_max,
            currency,
            job_type,
        } => {
            let session = require_session(&sessions)?;
            let salary_given = salary_min.is_some() || salary_max.is_some() || currency.is_some();
            let update = JobUpdate {
                title,
                company,
                location,
                description,
                requirements,
                skills,
                salary: salary_given.then_some(Salary {
                    min: salary_min,
                    max: salary_max,
                    currency,
                }),
                job_type: job_type.map(|t| t.wire_name().to_string()),
            };
            let updated = api.update_job(&session, id, &update).await?;
            println!("Updated job {}", updated.id);
            output::print_job(&updated);
        }

        Commands::DeleteJob { id } => {
            let session = require_session(&sessions)?;
            println!("{}", api.delete_job(&session, id).await?.message);
        }

        Commands::JobApplications { job_id } => {
            let session = require_session(&sessions)?;
            let list = api.job_applications(&session, job_id).await?;
            if list.applications.is_empty() {
                println!("No applications yet.");
            } else {
                println!("\n{} application(s)\n", list.count);
                output::print_applications(&list.applications);
            }
        }

        Commands::Apply {
            job_id,
            cover_letter,
        } => {
            let session = require_session(&sessions)?;
            let app = api.apply(&session, job_id, cover_letter.as_deref()).await?;
            println!("Applied: application {} is {}", app.id, app.status);
        }

        Commands::Applications => {
            let session = require_session(&sessions)?;
            let list = api.my_applications(&session).await?;
            if list.applications.is_empty() {
                println!("You have not applied to any jobs.");
            } else {
                println!("\n{} application(s)\n", list.count);
                output::print_applications(&list.applications);
            }
        }

        Commands::Application { id } => {
            let session = require_session(&sessions)?;
            output::print_application(&api.get_application(&session, id).await?);
        }

        Commands::SetStatus { id, status } => {
            let session = require_session(&sessions)?;
            let app = api.set_status(&session, id, status.wire_name()).await?;
            println!("Application {} is now {}", app.id, app.status);
        }

        Commands::Withdraw { id } => {
            let session = require_session(&sessions)?;
            println!("{}", api.withdraw(&session, id).await?.message);
        }

        Commands::UploadResume { file } => {
            let session = require_session(&sessions)?;
            let uploaded = api.upload_resume(&session, &file).await?;
            println!("{}", uploaded.message);
            output::print_resume_line(&uploaded.resume);
        }

        Commands::Resume => {
            let session = require_session(&sessions)?;
            output::print_resume_line(&api.get_resume(&session).await?);
        }

        Commands::DeleteResume => {
            let session = require_session(&sessions)?;
            println!("{}", api.delete_resume(&session).await?.message);
        }
    }

    Ok(())
}

/// Stores the identity from any response that carries a token. Profile
/// updates return a fresh one, so the session is rewritten then too.
fn remember(sessions: &SessionStore, auth: AuthResponse) -> Result<()> {
    sessions.save(&Session {
        token: auth.token,
        user_id: auth.user.id,
        name: auth.user.name,
        email: auth.user.email,
    })
}
