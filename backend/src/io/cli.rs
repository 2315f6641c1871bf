use anyhow::{bail, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use serde::Serialize;
use shared::{AddCertificationRequest, CertificationFilter, UpdateNotificationSettingsRequest};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::render;
use crate::config::resolve_data_directory;
use crate::notifier::{ConsoleNotifier, DisabledNotifier, NotificationCapability};
use crate::Backend;

#[derive(Parser, Debug)]
#[command(
    name = "cert-allowance",
    version,
    about = "Track certifications, the monthly allowance they earn and their renewals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Directory holding certifications.csv and the settings files
    #[arg(long, global = true, env = "CERT_ALLOWANCE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,
    /// Log at info level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
    /// Skip notification delivery entirely
    #[arg(long, global = true)]
    pub no_notify: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every known certification, marking the acquired ones
    Catalog,
    /// Register an acquired certification
    Add {
        cert_id: String,
        /// Date the certification was acquired (YYYY-MM-DD)
        acquired_date: NaiveDate,
    },
    /// Remove an acquired certification
    Remove { cert_id: String },
    /// Delete every acquired certification
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// List acquired certifications with their expiry status
    List {
        /// all, expiring or valid
        #[arg(long, default_value = "all")]
        filter: CertificationFilter,
    },
    /// Monthly allowance and certifications needing attention
    Summary,
    /// Show or change notification settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsCommand>,
    },
    /// Run today's notification check once
    Check,
    /// Send a test notification
    TestNotification,
    /// Show the notification permission, optionally requesting it
    Permission {
        #[arg(long)]
        request: bool,
    },
    /// Keep running the daily check until interrupted
    Watch,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    Set(SettingsArgs),
}

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    pub enabled: Option<bool>,
    #[arg(long)]
    pub salary_day_enabled: Option<bool>,
    /// Day of the month, 1-31
    #[arg(long)]
    pub salary_day: Option<u32>,
    #[arg(long)]
    pub renewal_enabled: Option<bool>,
    #[arg(long)]
    pub daily_check_enabled: Option<bool>,
}

impl From<SettingsArgs> for UpdateNotificationSettingsRequest {
    fn from(args: SettingsArgs) -> Self {
        Self {
            enabled: args.enabled,
            salary_day_enabled: args.salary_day_enabled,
            salary_day: args.salary_day,
            renewal_enabled: args.renewal_enabled,
            daily_check_enabled: args.daily_check_enabled,
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let data_directory = resolve_data_directory(cli.data_dir.clone())?;
    let notifier: Arc<dyn NotificationCapability> = if cli.no_notify {
        Arc::new(DisabledNotifier)
    } else {
        Arc::new(ConsoleNotifier::stdout())
    };
    let backend = Backend::new(&data_directory, notifier)?;

    match cli.command {
        Command::Watch => watch(&backend, cli.today).await,
        command => {
            let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
            let output = execute(&backend, command, today, cli.json)?;
            print!("{}", output);
            Ok(())
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

/// Run one non-interactive command and return what should be printed
pub fn execute(backend: &Backend, command: Command, today: NaiveDate, json: bool) -> Result<String> {
    let certifications = &backend.certification_service;
    let notifications = &backend.notification_service;

    match command {
        Command::Catalog => {
            let entries = certifications.get_catalog()?;
            if json {
                to_json(&entries)
            } else {
                Ok(render::catalog(&entries))
            }
        }
        Command::Add {
            cert_id,
            acquired_date,
        } => {
            let response = certifications.add_certification(AddCertificationRequest {
                cert_id,
                acquired_date,
            })?;
            if json {
                to_json(&response)
            } else {
                Ok(format!(
                    "{} (expires {})\n",
                    response.success_message, response.certification.expiry_date
                ))
            }
        }
        Command::Remove { cert_id } => {
            let response = certifications.remove_certification(&cert_id)?;
            if json {
                to_json(&response)
            } else {
                Ok(format!("{}\n", response.success_message))
            }
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("Refusing to delete all certifications without --yes");
            }
            certifications.reset_all()?;
            Ok("All certification data deleted\n".to_string())
        }
        Command::List { filter } => {
            let views = certifications.list_certifications(filter, today)?;
            if json {
                to_json(&views)
            } else {
                Ok(render::certification_list(&views))
            }
        }
        Command::Summary => {
            let summary = certifications.get_summary(today)?;
            if json {
                to_json(&summary)
            } else {
                Ok(render::summary(&summary))
            }
        }
        Command::Settings { action } => {
            let settings = match action {
                None | Some(SettingsCommand::Show) => notifications.get_settings()?,
                Some(SettingsCommand::Set(args)) => {
                    notifications.update_settings(args.into())?.settings
                }
            };
            if json {
                to_json(&settings)
            } else {
                Ok(render::settings(&settings))
            }
        }
        Command::Check => {
            let response = notifications.run_daily_check(today)?;
            if json {
                to_json(&response)
            } else {
                Ok(render::daily_check(&response))
            }
        }
        Command::TestNotification => {
            let outcome = notifications.send_test_notification();
            if json {
                to_json(&outcome)
            } else {
                Ok(format!("Test notification {}\n", render::delivery_outcome(&outcome)))
            }
        }
        Command::Permission { request } => {
            let state = if request {
                notifications.request_permission()
            } else {
                notifications.permission_status()
            };
            if json {
                to_json(&state)
            } else {
                Ok(render::permission(state))
            }
        }
        Command::Watch => bail!("watch needs the async runtime, use run()"),
    }
}

/// Local time used for a watch tick; `--today` replaces the date only
fn tick_time(fixed_today: Option<NaiveDate>, now: NaiveDateTime) -> NaiveDateTime {
    match fixed_today {
        Some(today) => today.and_time(now.time()),
        None => now,
    }
}

/// Run the daily check now and then on every interval tick until Ctrl-C.
///
/// Each tick also keeps the salary-day alarm armed; the salary notice goes
/// out through either the alarm or the check, never both. Scheduled alarms
/// are cancelled on the way out.
async fn watch(backend: &Backend, fixed_today: Option<NaiveDate>) -> Result<()> {
    let notifications = &backend.notification_service;
    let minutes = backend.config.check_interval_minutes;
    let mut interval = tokio::time::interval(Duration::from_secs(minutes.saturating_mul(60)));
    let mut armed: Option<NaiveDateTime> = None;

    info!("Watching: daily check every {} minute(s)", minutes);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = tick_time(fixed_today, Local::now().naive_local());

                match notifications.run_watch_tick(now, backend.config.reminder_hour, armed) {
                    Ok(tick) => {
                        if tick.check.ran {
                            info!(
                                "Daily check for {} fired {} notification(s)",
                                tick.check.date,
                                tick.check.notifications.len()
                            );
                        }
                        if let Some(at) = tick.salary_reminder.filter(|at| Some(*at) != armed) {
                            info!("Next salary-day reminder at {}", at);
                        }
                        armed = tick.salary_reminder;
                    }
                    Err(e) => error!("Watch tick failed: {:#}", e),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Interrupted, stopping watch");
                break;
            }
        }
    }

    notifications.cancel_all();
    Ok(())
}
