use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    config::LauncherConfig,
    constants::{DEFAULT_MOVE_SECS, HOLD},
    encoder::encode,
    error::LauncherResult,
    transport::{CommandSink, Transport},
    types::{clamp_fire_count, Command, Direction, MoveMode},
};

/// Blocking wait between a movement and its stop, or between shots.
pub trait Sleeper: Send {
    fn sleep(&mut self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Stateless command relay in front of one launcher. Every call blocks for the
/// real-time length of the action it performs.
///
/// # Examples
///
/// ```no_run
/// use launcher_controller::{Direction, LauncherController};
///
/// let mut launcher = LauncherController::connect()?;
/// launcher.move_for(Direction::Right, 1.0)?; // move right for one second
/// launcher.fire(2)?;                         // fire two missiles
/// # Ok::<(), launcher_controller::LauncherError>(())
/// ```
pub struct LauncherController<S = Transport, P = ThreadSleeper> {
    sink: S,
    sleeper: P,
    missile_capacity: u8,
    reload_delay: Duration,
}

impl LauncherController {
    pub fn connect() -> LauncherResult<Self> {
        Self::connect_with(&LauncherConfig::default())
    }

    pub fn connect_with(config: &LauncherConfig) -> LauncherResult<Self> {
        let transport = Transport::discover(&config.identity, &config.transport)?;
        Ok(Self::with_sink(transport, config))
    }
}

impl<S: CommandSink> LauncherController<S, ThreadSleeper> {
    pub fn with_sink(sink: S, config: &LauncherConfig) -> Self {
        Self::with_parts(sink, ThreadSleeper, config)
    }
}

impl<S: CommandSink, P: Sleeper> LauncherController<S, P> {
    pub fn with_parts(sink: S, sleeper: P, config: &LauncherConfig) -> Self {
        LauncherController {
            sink,
            sleeper,
            missile_capacity: config.missile_capacity,
            reload_delay: config.reload_delay,
        }
    }

    /// Starts moving in `direction`. A positive `seconds` waits that long and then
    /// stops; zero or negative (see [`HOLD`]) returns at once and leaves the launcher
    /// moving until [`stop`](Self::stop).
    pub fn move_for(&mut self, direction: Direction, seconds: f64) -> LauncherResult<()> {
        self.send(Command::from(direction))?;

        if seconds > 0.0 {
            match Duration::try_from_secs_f64(seconds) {
                Ok(duration) => {
                    self.sleeper.sleep(duration);
                    self.stop()?;
                }
                Err(_) => warn!(
                    "Duration {} is not representable, holding {} until stopped",
                    seconds, direction
                ),
            }
        }
        Ok(())
    }

    pub fn up(&mut self, seconds: f64) -> LauncherResult<()> {
        self.move_for(Direction::Up, seconds)
    }

    pub fn down(&mut self, seconds: f64) -> LauncherResult<()> {
        self.move_for(Direction::Down, seconds)
    }

    pub fn left(&mut self, seconds: f64) -> LauncherResult<()> {
        self.move_for(Direction::Left, seconds)
    }

    pub fn right(&mut self, seconds: f64) -> LauncherResult<()> {
        self.move_for(Direction::Right, seconds)
    }

    pub fn nudge(&mut self, direction: Direction) -> LauncherResult<()> {
        self.move_for(direction, DEFAULT_MOVE_SECS)
    }

    pub fn hold(&mut self, direction: Direction) -> LauncherResult<()> {
        self.move_for(direction, HOLD)
    }

    /// Press starts an open-ended movement, release stops it.
    pub fn press(&mut self, direction: Direction, mode: MoveMode) -> LauncherResult<()> {
        match mode {
            MoveMode::Start => self.hold(direction),
            MoveMode::Stop => self.stop(),
        }
    }

    pub fn stop(&mut self) -> LauncherResult<()> {
        self.send(Command::Stop)
    }

    /// Fires `count` missiles, waiting out the reload delay after each one, including
    /// the last. Counts outside `1..=capacity` fire a single missile.
    pub fn fire(&mut self, count: i32) -> LauncherResult<()> {
        let shots = clamp_fire_count(count, self.missile_capacity);
        if shots as i32 != count {
            debug!("Fire count {} out of range, firing {}", count, shots);
        }

        info!("Firing {} missile(s)", shots);
        for _ in 0..shots {
            self.send(Command::Fire)?;
            self.sleeper.sleep(self.reload_delay);
        }
        Ok(())
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn send(&mut self, command: Command) -> LauncherResult<()> {
        debug!("Sending {} (0x{:02x})", command, command.opcode());
        self.sink.send(&encode(command))?;
        Ok(())
    }
}
