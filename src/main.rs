use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use launcher_controller::{
    Action, Backend, Direction, LauncherConfig, LauncherController, LauncherRemote, LauncherWorker,
    MoveMode, DEFAULT_MOVE_SECS,
};
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "launcher", about = "Drive a USB missile launcher")]
struct Cli {
    /// USB access method
    #[arg(long, env = "LAUNCHER_BACKEND")]
    backend: Option<Backend>,
    /// Control transfer timeout in milliseconds, 0 blocks indefinitely
    #[arg(long, env = "LAUNCHER_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Move for a fixed time, then stop
    Move {
        direction: Direction,
        #[arg(long, default_value_t = DEFAULT_MOVE_SECS)]
        seconds: f64,
    },
    /// Move until Enter is pressed
    Hold { direction: Direction },
    /// Fire 1 to 4 missiles
    Fire {
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        count: i32,
    },
    Stop,
    /// Read commands from stdin, one per line
    Interactive,
}

fn load_config(cli: &Cli) -> LauncherConfig {
    let mut config = LauncherConfig::from_env();
    if let Some(backend) = cli.backend {
        config.transport.backend = backend;
    }
    if let Some(ms) = cli.timeout_ms {
        config.transport.timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }
    config
}

fn parse_line(line: &str) -> Result<Option<Action>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let action = match verb.to_ascii_lowercase().as_str() {
        "stop" => Action::Stop,
        "fire" => Action::Fire {
            count: arg
                .map(|n| n.parse().map_err(|_| format!("bad missile count: {}", n)))
                .transpose()?
                .unwrap_or(1),
        },
        "start" => {
            let name = arg.ok_or("start needs a direction")?;
            let direction =
                Direction::from_str(name).map_err(|_| format!("unknown direction: {}", name))?;
            Action::Press {
                direction,
                mode: MoveMode::Start,
            }
        }
        other => {
            let direction =
                Direction::from_str(other).map_err(|_| format!("unknown command: {}", other))?;
            let seconds = arg
                .map(|s| s.parse().map_err(|_| format!("bad duration: {}", s)))
                .transpose()?
                .unwrap_or(DEFAULT_MOVE_SECS);
            Action::Move { direction, seconds }
        }
    };
    Ok(Some(action))
}

async fn run_lines<R>(remote: &LauncherRemote, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        match parse_line(line) {
            Ok(Some(action)) => {
                if let Err(e) = remote.dispatch(action).await {
                    eprintln!("error: {}", e);
                }
            }
            Ok(None) => {}
            Err(msg) => eprintln!("{}", msg),
        }
    }
    Ok(())
}

async fn interactive<R>(remote: &LauncherRemote, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("Commands: up|down|left|right [secs], start <dir>, stop, fire [n], quit");
    let outcome = run_lines(remote, input).await;
    // Leave the launcher still on the way out, even when input broke.
    remote.stop().await?;
    outcome
}

async fn hold_until_enter<R>(
    remote: &LauncherRemote,
    direction: Direction,
    mut input: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    remote.press(direction, MoveMode::Start).await?;
    println!("Moving {}, press Enter to stop", direction);
    let mut line = String::new();
    let read = input.read_line(&mut line).await;
    // Release before reporting a broken stdin so the launcher never keeps moving.
    remote.press(direction, MoveMode::Stop).await?;
    read?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = load_config(&cli);

    let controller =
        tokio::task::spawn_blocking(move || LauncherController::connect_with(&config))
            .await?
            .context("could not connect to the launcher")?;
    let (worker, remote) = LauncherWorker::spawn(controller)?;
    let stdin = BufReader::new(tokio::io::stdin());

    match cli.command {
        Cmd::Move { direction, seconds } => remote.move_for(direction, seconds).await?,
        Cmd::Hold { direction } => hold_until_enter(&remote, direction, stdin).await?,
        Cmd::Fire { count } => remote.fire(count).await?,
        Cmd::Stop => remote.stop().await?,
        Cmd::Interactive => interactive(&remote, stdin).await?,
    }

    drop(remote);
    tokio::task::spawn_blocking(move || worker.join()).await?;
    Ok(())
}
