use chrono::{DateTime, Local, Utc};
use prettytable::{Cell, Row, Table};

use crate::models::{Application, Job, Resume, Salary, User};

pub fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn salary_range(salary: &Salary) -> String {
    let currency = salary.currency.as_deref().unwrap_or("USD");
    match (salary.min, salary.max) {
        (Some(min), Some(max)) => format!("{min}-{max} {currency}"),
        (Some(min), None) => format!("from {min} {currency}"),
        (None, Some(max)) => format!("up to {max} {currency}"),
        (None, None) => "-".to_string(),
    }
}

/// Shortens `text` to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn header(cells: &[&str]) -> Row {
    Row::new(cells.iter().map(|c| Cell::new(c)).collect())
}

pub fn print_jobs(jobs: &[Job]) {
    let mut table = Table::new();
    table.add_row(header(&["ID", "Title", "Company", "Location", "Type", "Salary", "Skills", "Posted"]));
    for job in jobs {
        table.add_row(Row::new(vec![
            Cell::new(&job.id.to_string()),
            Cell::new(&truncate(&job.title, 32)),
            Cell::new(&truncate(&job.company, 24)),
            Cell::new(&truncate(&job.location, 20)),
            Cell::new(&job.job_type),
            Cell::new(&salary_range(&job.salary)),
            Cell::new(&truncate(&job.skills.join(", "), 30)),
            Cell::new(&local_time(job.created_at)),
        ]));
    }
    table.printstd();
}

pub fn print_job(job: &Job) {
    println!("{} at {}", job.title, job.company);
    println!("   ID:       {}", job.id);
    println!("   Location: {}", job.location);
    println!("   Type:     {}", job.job_type);
    println!("   Salary:   {}", salary_range(&job.salary));
    if !job.skills.is_empty() {
        println!("   Skills:   {}", job.skills.join(", "));
    }
    println!("   Posted:   {} by {}", local_time(job.created_at), job.posted_by);
    println!();
    println!("{}", job.description);
    if !job.requirements.is_empty() {
        println!();
        println!("Requirements:");
        for req in &job.requirements {
            println!("  - {req}");
        }
    }
}

/// Lists applications; the second column shows the job or the applicant,
/// whichever the endpoint embedded.
pub fn print_applications(applications: &[Application]) {
    let mut table = Table::new();
    table.add_row(header(&["ID", "For", "Status", "Applied"]));
    for app in applications {
        let subject = match (&app.job, &app.applicant) {
            (Some(job), _) => format!("{} @ {}", truncate(&job.title, 28), truncate(&job.company, 20)),
            (None, Some(applicant)) => format!("{} <{}>", applicant.name, applicant.email),
            (None, None) => app.job_id.to_string(),
        };
        table.add_row(Row::new(vec![
            Cell::new(&app.id.to_string()),
            Cell::new(&subject),
            Cell::new(&app.status),
            Cell::new(&local_time(app.applied_at)),
        ]));
    }
    table.printstd();
}

pub fn print_application(app: &Application) {
    println!("Application {}", app.id);
    println!("   Status:  {}", app.status);
    println!("   Applied: {} by {}", local_time(app.applied_at), app.user_id);
    if let Some(job) = &app.job {
        println!("   Job:     {} at {} ({})", job.title, job.company, job.id);
    }
    if let Some(applicant) = &app.applicant {
        println!(
            "   By:      {} <{}> ({})",
            applicant.name, applicant.email, applicant.id
        );
        if !applicant.skills.is_empty() {
            println!("   Skills:  {}", applicant.skills.join(", "));
        }
        if let Some(resume) = &applicant.resume {
            println!("   Resume:  {}", resume.filename);
        }
    }
    if let Some(letter) = &app.cover_letter {
        println!();
        println!("{letter}");
    }
}

pub fn print_profile(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("   ID:         {}", user.id);
    let skills = if user.skills.is_empty() {
        "-".to_string()
    } else {
        user.skills.join(", ")
    };
    println!("   Skills:     {skills}");
    println!(
        "   Experience: {}",
        user.experience.as_deref().unwrap_or("-")
    );
    match &user.resume {
        Some(resume) => print_resume_line(resume),
        None => println!("   Resume:     none"),
    }
}

pub fn print_resume_line(resume: &Resume) {
    println!(
        "   Resume:     {} (uploaded {})",
        resume.filename,
        local_time(resume.upload_date)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_range() {
        let s = |min, max| Salary {
            min,
            max,
            currency: Some("EUR".into()),
        };
        assert_eq!(salary_range(&s(Some(50), Some(80))), "50-80 EUR");
        assert_eq!(salary_range(&s(Some(50), None)), "from 50 EUR");
        assert_eq!(salary_range(&s(None, Some(80))), "up to 80 EUR");
        assert_eq!(salary_range(&Salary::default()), "-");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title", 10), "a very ...");
        assert_eq!(truncate("ünïcödé text", 6), "ünï...");
    }
}
