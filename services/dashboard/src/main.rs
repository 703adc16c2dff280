use std::{ffi::OsString, path::PathBuf};

use anyhow::{Context, Result, bail};
use auth::{RegisterData, Role};
use common::{config::DashboardConfig, telemetry::init_tracing};
use dashboard::{Dashboard, ImageUpload, PhraseMode, SubmitOutcome};
use tracing::info;

const HELP: &str = "\
Video dashboard client

USAGE:
  dashboard <COMMAND> [OPTIONS]

COMMANDS:
  login --email <EMAIL> --password <PASSWORD>
  register --name <NAME> --email <EMAIL> --password <PASSWORD> --role <artist|manager>
           [--artistic-name <NAME>] [--genre <GENRE>]
           [--company <NAME>] [--managed-artists <COUNT>]
  logout
  whoami
  submit [--phrase <PHRASE>] <IMAGE>...
  gallery
  toggle <VIDEO_ID>
  download <VIDEO_ID>
  highlights <YOUTUBE_URL>
  watch

Configuration is read from dashboard.toml (or $DASHBOARD_CONFIG) and
DASHBOARD_* environment variables.
";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn,dashboard=info");

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }
    let Some(command) = args.subcommand()? else {
        print!("{HELP}");
        return Ok(());
    };

    let config = DashboardConfig::load().context("Failed to load configuration")?;
    let dashboard = Dashboard::open(config)?;

    let result = run(&dashboard, &command, args).await;
    dashboard.shutdown().await;
    result
}

async fn run(dashboard: &Dashboard, command: &str, mut args: pico_args::Arguments) -> Result<()> {
    match command {
        "login" => {
            let email: String = args.value_from_str("--email")?;
            let password: String = args.value_from_str("--password")?;
            finish(args)?;

            let session = dashboard.login(&email, &password).await?;
            println!("Signed in as {} <{}>", session.display_name, session.email);
        }
        "register" => {
            let role: Role = args
                .value_from_fn("--role", |value| value.parse::<Role>())
                .context("--role must be artist or manager")?;
            let mut data = RegisterData::new(
                args.value_from_str::<_, String>("--name")?,
                args.value_from_str::<_, String>("--email")?,
                args.value_from_str::<_, String>("--password")?,
                role,
            );
            data.artistic_name = args.opt_value_from_str("--artistic-name")?;
            data.musical_genre = args.opt_value_from_str("--genre")?;
            data.company_name = args.opt_value_from_str("--company")?;
            data.managed_artists_count = args.opt_value_from_str("--managed-artists")?;
            finish(args)?;

            match dashboard.register(data).await? {
                Some(session) => println!("Account created; signed in as {}", session.email),
                None => println!("Account created; sign in with `dashboard login`"),
            }
        }
        "logout" => {
            finish(args)?;
            dashboard.restore().await;
            dashboard.logout();
            println!("Signed out");
        }
        "whoami" => {
            finish(args)?;
            match dashboard.restore().await {
                Some(session) => {
                    let role = session.role.as_deref().unwrap_or("unknown role");
                    println!("{} <{}> ({})", session.display_name, session.email, role);
                }
                None => println!("Not signed in"),
            }
        }
        "submit" => {
            let phrase: Option<String> = args.opt_value_from_str("--phrase")?;
            let paths = free_paths(args)?;
            if paths.is_empty() {
                bail!("Select at least one image");
            }
            require_restore(dashboard).await?;

            let submitter = dashboard.submitter();
            for path in &paths {
                let image = ImageUpload::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                submitter.add_image(image).await;
            }
            if let Some(phrase) = phrase {
                submitter.set_mode(PhraseMode::Manual).await;
                submitter.set_phrase(phrase).await;
            }

            match dashboard.submit().await? {
                SubmitOutcome::Succeeded(request) => {
                    println!("Video request {} created ({})", request.id, request.status);
                }
                SubmitOutcome::Rejected(reason) => bail!("Submission refused: {reason:?}"),
                SubmitOutcome::Failed(e) => {
                    bail!("{}", e.detail().unwrap_or("Could not create the video request"))
                }
            }
        }
        "gallery" => {
            finish(args)?;
            require_restore(dashboard).await?;

            if dashboard.refresh_gallery().await? == 0 {
                println!("The gallery is empty");
            }
            for item in dashboard.gallery().snapshot().await {
                let posted = if item.is_posted { "posted" } else { "-" };
                let downloaded = if dashboard.downloads().contains(&item.id) {
                    "downloaded"
                } else {
                    ""
                };
                println!(
                    "{}\t{}\t{}\t{} bytes\t{}\t{}",
                    item.id,
                    item.name,
                    item.created_at.format("%Y-%m-%d %H:%M"),
                    item.size_bytes,
                    posted,
                    downloaded
                );
            }
        }
        "toggle" => {
            let id: String = args.free_from_str()?;
            finish(args)?;
            require_restore(dashboard).await?;

            let posted = dashboard.toggle_posted(&id).await?;
            println!("{id} is now {}", if posted { "posted" } else { "not posted" });
        }
        "download" => {
            let id: String = args.free_from_str()?;
            finish(args)?;
            require_restore(dashboard).await?;

            let path = dashboard.download(&id).await?;
            println!("Saved to {}", path.display());
        }
        "highlights" => {
            let url: String = args.free_from_str()?;
            finish(args)?;
            require_restore(dashboard).await?;

            for clip in dashboard.highlights(&url).await? {
                println!("{clip}");
            }
        }
        "watch" => {
            finish(args)?;
            watch(dashboard).await?;
        }
        other => bail!("Unknown command: {other}\n\n{HELP}"),
    }
    Ok(())
}

async fn require_restore(dashboard: &Dashboard) -> Result<()> {
    if dashboard.restore().await.is_none() {
        bail!("Not signed in; run `dashboard login` first");
    }
    Ok(())
}

fn free_paths(args: pico_args::Arguments) -> Result<Vec<PathBuf>> {
    Ok(args.finish().into_iter().map(PathBuf::from).collect())
}

fn finish(args: pico_args::Arguments) -> Result<()> {
    let rest: Vec<OsString> = args.finish();
    if !rest.is_empty() {
        bail!("Unexpected arguments: {rest:?}");
    }
    Ok(())
}

/// Poll the gallery and print notifications until Ctrl-C or sign-out
async fn watch(dashboard: &Dashboard) -> Result<()> {
    require_restore(dashboard).await?;
    let mut notifications = dashboard.notifications().subscribe();
    let mut sessions = dashboard.sessions().subscribe();
    dashboard.start_polling();
    info!("Watching the gallery; press Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = notifications.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(notification) = notifications.borrow_and_update().clone() {
                    println!("{notification}");
                }
            }
            changed = sessions.changed() => {
                if changed.is_err() || sessions.borrow_and_update().is_none() {
                    println!("Session ended");
                    break;
                }
            }
        }
    }
    Ok(())
}
