mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tokio_util::sync::CancellationToken;
use vf_core::config::Config;
use vf_core::{JobStatus, VideoId};
use vodforge::App;

fn load_config(path: Option<&Path>) -> Config {
    let config = Config::load_or_default(path);
    for warning in config.validate() {
        tracing::warn!("Config: {warning}");
    }
    config
}

async fn run_worker(config: Config) -> Result<()> {
    let app = App::open(config)?;
    for tool in app.ctx.tools.check_all().iter().filter(|t| !t.available) {
        tracing::warn!("{} not found; jobs that need it will fail", tool.name);
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received");
            shutdown.cancel();
        }
    });

    vf_pipeline::run_worker(app.ctx.clone(), cancel).await;
    Ok(())
}

async fn drain(config: Config) -> Result<()> {
    let app = App::open(config)?;
    let count = vf_pipeline::run_until_idle(&app.ctx).await?;
    println!("Ran {count} job(s)");
    Ok(())
}

fn add_video(
    config: Config,
    source: &Path,
    title: Option<String>,
    thumbnail: Option<&Path>,
) -> Result<()> {
    if !source.exists() {
        anyhow::bail!("Source file does not exist: {:?}", source);
    }
    let source = source.canonicalize()?;
    let title = match title {
        Some(t) => t,
        None => source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string()),
    };

    let app = App::open(config)?;
    let (video, handles) = app.add_video(&title, &source, thumbnail)?;

    println!("Video {} created: {}", video.id, video.title);
    match handles {
        Some(h) => {
            println!("  Probe job:     {}", h.probe);
            println!("  Transcode job: {}", h.transcode);
        }
        None => println!("  Failed to queue processing; see log"),
    }
    Ok(())
}

fn remove_video(config: Config, id: i64) -> Result<()> {
    let app = App::open(config)?;
    let (video, job) = app.remove_video(VideoId::new(id))?;

    println!("Video {} deleted: {}", video.id, video.title);
    match job {
        Some(job_id) => println!("  Cleanup job: {job_id}"),
        None => println!("  Failed to queue cleanup; see log"),
    }
    Ok(())
}

async fn probe_video(config: Config, id: i64, force: bool) -> Result<()> {
    let app = App::open(config)?;
    let seconds = vf_pipeline::steps::run_probe(&app.ctx, VideoId::new(id), force).await?;

    let secs = seconds as u64;
    let mins = secs / 60;
    let hours = mins / 60;
    println!(
        "Duration: {seconds} s ({:02}:{:02}:{:02})",
        hours,
        mins % 60,
        secs % 60
    );
    Ok(())
}

fn list_jobs(config: Config, status: Option<String>, limit: u32, json: bool) -> Result<()> {
    let status = status.map(|s| s.parse::<JobStatus>()).transpose()?;

    let app = App::open(config)?;
    let conn = vf_db::pool::get_conn(&app.db)?;
    let jobs = vf_db::queries::jobs::list_jobs(&conn, status, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("No jobs");
        return Ok(());
    }
    for job in &jobs {
        print!(
            "{}  video {:<6} {:<10} {:<10}",
            job.id, job.video_id, job.kind, job.status
        );
        if let Some(ref error) = job.error {
            print!("  {error}");
        }
        println!();
    }
    Ok(())
}

fn check_tools(config: &Config) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = vf_av::ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Jobs will fail until they are installed.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let contents = std::fs::read_to_string(p)?;
            Config::from_json(&contents)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for w in &warnings {
            println!("  ! {w}");
        }
    }

    println!("  Media root: {}", config.media_root.display());
    println!("  Database: {}", config.db_path.display());
    println!("  Tiers: {}", config.transcode.tiers.len());
    for tier in &config.transcode.tiers {
        match tier.bitrate_kbps {
            Some(kbps) => println!("    {}x{} @ {kbps}k", tier.width, tier.height),
            None => println!("    {}x{} @ crf {}", tier.width, tier.height, config.transcode.crf),
        }
    }
    println!("  Worker: {}", config.worker.worker_id);

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vodforge=debug,vf_pipeline=debug,vf_av=debug,vf_media=debug,vf_db=debug,vf_core=debug"
                .to_string()
        } else {
            "vodforge=info,vf_pipeline=info,vf_av=info,vf_media=info,vf_db=warn,vf_core=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Worker => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_worker(load_config(config_path)))
        }
        Commands::Drain => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(drain(load_config(config_path)))
        }
        Commands::Add {
            source,
            title,
            thumbnail,
        } => add_video(load_config(config_path), &source, title, thumbnail.as_deref()),
        Commands::Remove { id } => remove_video(load_config(config_path), id),
        Commands::Probe { id, force } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_video(load_config(config_path), id, force))
        }
        Commands::Jobs {
            status,
            limit,
            json,
        } => list_jobs(load_config(config_path), status, limit, json),
        Commands::CheckTools => check_tools(&load_config(config_path)),
        Commands::Validate {
            config: validate_path,
        } => {
            validate_config(validate_path.as_deref().or(config_path))
        }
        Commands::Version => {
            println!("vodforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
