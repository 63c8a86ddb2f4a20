//! Dedicated device thread.
//!
//! The controller blocks for the full length of every movement and volley, so front
//! ends hand it to a worker thread and talk to it through a [`LauncherRemote`].
//! Requests are applied strictly in the order they were submitted.

use std::io;
use std::thread::{self, JoinHandle};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::controller::{LauncherController, Sleeper};
use crate::error::{LauncherError, LauncherResult};
use crate::transport::CommandSink;
use crate::types::{Direction, MoveMode};

const QUEUE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Move { direction: Direction, seconds: f64 },
    Press {
        direction: Direction,
        mode: MoveMode,
    },
    Fire { count: i32 },
    Stop,
}

struct Request {
    action: Action,
    reply: oneshot::Sender<LauncherResult<()>>,
}

/// Cloneable handle for submitting actions to the worker.
#[derive(Clone)]
pub struct LauncherRemote {
    tx: mpsc::Sender<Request>,
}

pub struct LauncherWorker {
    thread: JoinHandle<()>,
}

impl LauncherWorker {
    /// Moves `controller` onto a new thread. The thread exits, closing the device,
    /// once every remote has been dropped and the queue is drained.
    pub fn spawn<S, P>(controller: LauncherController<S, P>) -> io::Result<(Self, LauncherRemote)>
    where
        S: CommandSink + 'static,
        P: Sleeper + 'static,
    {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let thread = thread::Builder::new()
            .name("launcher-worker".into())
            .spawn(move || run(controller, rx))?;

        Ok((LauncherWorker { thread }, LauncherRemote { tx }))
    }

    pub fn join(self) {
        if self.thread.join().is_err() {
            warn!("Launcher worker panicked");
        }
    }
}

fn run<S: CommandSink, P: Sleeper>(
    mut controller: LauncherController<S, P>,
    mut rx: mpsc::Receiver<Request>,
) {
    info!("Launcher worker started");
    while let Some(Request { action, reply }) = rx.blocking_recv() {
        debug!("Applying {:?}", action);
        let result = apply(&mut controller, action);
        if let Err(e) = &result {
            warn!("{:?} failed: {}", action, e);
        }
        // The submitter may have stopped waiting; the action still ran.
        let _ = reply.send(result);
    }
    info!("Launcher worker stopped");
}

fn apply<S: CommandSink, P: Sleeper>(
    controller: &mut LauncherController<S, P>,
    action: Action,
) -> LauncherResult<()> {
    match action {
        Action::Move { direction, seconds } => controller.move_for(direction, seconds),
        Action::Press { direction, mode } => controller.press(direction, mode),
        Action::Fire { count } => controller.fire(count),
        Action::Stop => controller.stop(),
    }
}

impl LauncherRemote {
    /// Queues `action` and waits until the worker has finished applying it.
    pub async fn dispatch(&self, action: Action) -> LauncherResult<()> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(Request { action, reply })
            .await
            .map_err(|_| LauncherError::WorkerGone)?;
        done.await.map_err(|_| LauncherError::WorkerGone)?
    }

    /// Same as [`dispatch`](Self::dispatch) for synchronous callers. Panics if called
    /// from inside an async runtime.
    pub fn blocking_dispatch(&self, action: Action) -> LauncherResult<()> {
        let (reply, done) = oneshot::channel();
        self.tx
            .blocking_send(Request { action, reply })
            .map_err(|_| LauncherError::WorkerGone)?;
        done.blocking_recv().map_err(|_| LauncherError::WorkerGone)?
    }

    pub async fn move_for(&self, direction: Direction, seconds: f64) -> LauncherResult<()> {
        self.dispatch(Action::Move { direction, seconds }).await
    }

    pub async fn press(&self, direction: Direction, mode: MoveMode) -> LauncherResult<()> {
        self.dispatch(Action::Press { direction, mode }).await
    }

    pub async fn fire(&self, count: i32) -> LauncherResult<()> {
        self.dispatch(Action::Fire { count }).await
    }

    pub async fn stop(&self) -> LauncherResult<()> {
        self.dispatch(Action::Stop).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LauncherConfig;
    use crate::error::TransportError;
    use crate::transport::mock::RecordingSink;
    use crate::types::Command;
    use std::time::Duration;

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&mut self, _duration: Duration) {}
    }

    fn spawn_recording() -> (LauncherWorker, LauncherRemote, RecordingSink) {
        let sink = RecordingSink::new();
        let controller =
            LauncherController::with_parts(sink.clone(), NoSleep, &LauncherConfig::default());
        let (worker, remote) = LauncherWorker::spawn(controller).unwrap();
        (worker, remote, sink)
    }

    #[tokio::test]
    async fn actions_arrive_in_order() {
        let (worker, remote, sink) = spawn_recording();

        remote.press(Direction::Up, MoveMode::Start).await.unwrap();
        remote.press(Direction::Up, MoveMode::Stop).await.unwrap();
        remote.move_for(Direction::Left, 0.5).await.unwrap();
        remote.fire(2).await.unwrap();
        remote.stop().await.unwrap();

        assert_eq!(
            sink.commands(),
            vec![
                Command::Up,
                Command::Stop,
                Command::Left,
                Command::Stop,
                Command::Fire,
                Command::Fire,
                Command::Stop,
            ]
        );

        drop(remote);
        tokio::task::spawn_blocking(move || worker.join()).await.unwrap();
    }

    #[tokio::test]
    async fn clones_share_one_queue() {
        let (_worker, remote, sink) = spawn_recording();
        let other = remote.clone();

        remote.press(Direction::Right, MoveMode::Start).await.unwrap();
        other.stop().await.unwrap();

        assert_eq!(sink.commands(), vec![Command::Right, Command::Stop]);
    }

    #[tokio::test]
    async fn errors_come_back_to_the_caller() {
        let (_worker, remote, sink) = spawn_recording();
        sink.disconnect();

        let err = remote.fire(1).await.unwrap_err();
        assert!(matches!(err, LauncherError::Transport(TransportError::Disconnected)));

        sink.reconnect();
        remote.fire(1).await.unwrap();
        assert_eq!(sink.commands(), vec![Command::Fire]);
    }

    struct PanickingSleeper;

    impl Sleeper for PanickingSleeper {
        fn sleep(&mut self, _duration: Duration) {
            panic!("reload interrupted");
        }
    }

    #[tokio::test]
    async fn dead_worker_reports_gone() {
        let controller = LauncherController::with_parts(
            RecordingSink::new(),
            PanickingSleeper,
            &LauncherConfig::default(),
        );
        let (_worker, remote) = LauncherWorker::spawn(controller).unwrap();

        assert!(matches!(remote.fire(1).await, Err(LauncherError::WorkerGone)));
        assert!(matches!(remote.stop().await, Err(LauncherError::WorkerGone)));
    }

    #[test]
    fn blocking_dispatch_from_plain_thread() {
        let (worker, remote, sink) = spawn_recording();
        remote
            .blocking_dispatch(Action::Move {
                direction: Direction::Down,
                seconds: 1.0,
            })
            .unwrap();
        drop(remote);
        worker.join();
        assert_eq!(sink.commands(), vec![Command::Down, Command::Stop]);
    }
}
