//! Operator-facing summaries.

use serde::Serialize;

use crate::app::api::{
    DeploymentReport, LinkReport, Readiness, ReconfigureOutcome, ResetOutcome, UninstallOutcome,
};
use crate::domain::{AdminCredentials, LinkView};

pub fn print_deployment(verb: &str, report: &DeploymentReport) {
    for notice in &report.notices {
        println!("⚠️  {}", notice);
    }
    println!("✅ {} {} installation at {}", verb, mode_label(report), report.directory.display());
    if !report.commit.written.is_empty() {
        println!("  Wrote {} file(s)", report.commit.written.len());
    }
    for removed in &report.commit.removed {
        println!("  Removed {}", removed);
    }
    match report.deploy.readiness {
        Readiness::Ready => println!("✅ Admin panel is up"),
        Readiness::TimedOut | Readiness::NotApplicable => {}
    }
    for warning in &report.deploy.warnings {
        println!("⚠️  {}", warning);
    }
    if let Some(count) = report.deploy.users_imported {
        println!("✅ Imported {} proxy user(s) into the panel", count);
    }
    if let Some(username) = &report.deploy.admin_created {
        println!("✅ Panel admin '{}' ready", username);
    }
    if let Some(admin) = &report.generated_admin {
        print_credentials(admin);
    }
    print_links(&report.links);
}

fn mode_label(report: &DeploymentReport) -> &'static str {
    if report.mode.has_panel() { "proxy + panel" } else { "proxy" }
}

pub fn print_reconfigure(outcome: &ReconfigureOutcome) {
    println!(
        "✅ Masquerade domain changed from {} to {}",
        outcome.previous_domain, outcome.domain
    );
    println!("  Restarted: {}", outcome.restarted.join(", "));
    print_links(&outcome.links);
}

pub fn print_uninstall(outcome: &UninstallOutcome) {
    match outcome {
        UninstallOutcome::Removed { directory, stopped } => {
            if *stopped {
                println!("✅ Stopped containers and removed volumes");
            }
            println!("✅ Removed {}", directory.display());
        }
        UninstallOutcome::Cancelled => println!("ℹ️ Uninstall cancelled"),
    }
}

pub fn print_reset(outcome: &ResetOutcome) {
    match outcome {
        ResetOutcome::SecretRotated { links } => {
            println!("✅ Proxy secret rotated. Previous links no longer work.");
            print_links(links);
        }
        ResetOutcome::AdminReset { credentials, generated } => {
            println!("✅ Panel admin '{}' reset", credentials.username);
            if *generated {
                print_credentials(credentials);
            }
        }
    }
}

fn print_credentials(admin: &AdminCredentials) {
    println!("🔑 Panel login: {} / {}", admin.username, admin.password);
    println!("   Store it now; it is not saved anywhere.");
}

pub fn print_links(report: &LinkReport) {
    if let Some(warning) = &report.warning {
        println!("⚠️  {}", warning);
    }
    if report.links.is_empty() {
        return;
    }
    println!("🔗 Connection links:");
    for link in &report.links {
        println!("  {}", link.tg_url());
        println!("  {}", link.https_url());
    }
}

#[derive(Serialize)]
struct LinksJson {
    links: Vec<LinkView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

pub fn links_json(report: &LinkReport) -> Result<String, serde_json::Error> {
    let body = LinksJson {
        links: report.links.iter().map(|link| link.to_view()).collect(),
        warning: report.warning.clone(),
    };
    serde_json::to_string_pretty(&body)
}
