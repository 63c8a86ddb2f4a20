//! Wire-level behavior of the controller against a recording sink.

use launcher_controller::mock::RecordingSink;
use launcher_controller::{
    encode, Backend, Command, DeviceIdentity, Direction, LauncherConfig, LauncherController,
    LauncherError, Sleeper, TransportConfig, HOLD,
};
use std::time::{Duration, Instant};

fn fast_config(reload_delay: Duration) -> LauncherConfig {
    LauncherConfig {
        reload_delay,
        ..LauncherConfig::default()
    }
}

#[test]
fn timed_move_sends_direction_then_stop_after_duration() {
    let sink = RecordingSink::new();
    let mut launcher = LauncherController::with_sink(sink.clone(), &LauncherConfig::default());

    let started = Instant::now();
    launcher.move_for(Direction::Right, 1.0).unwrap();
    assert!(started.elapsed() >= Duration::from_secs(1));

    let transfers = sink.transfers();
    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0].payload, [0x02, 0x08, 0, 0, 0, 0, 0, 0]);
    assert_eq!(transfers[1].payload, [0x02, 0x20, 0, 0, 0, 0, 0, 0]);
    assert!(transfers[1].at.duration_since(transfers[0].at) >= Duration::from_secs(1));
}

#[test]
fn hold_returns_immediately_without_stop() {
    let sink = RecordingSink::new();
    let mut launcher = LauncherController::with_sink(sink.clone(), &LauncherConfig::default());

    let started = Instant::now();
    launcher.move_for(Direction::Up, HOLD).unwrap();
    assert!(started.elapsed() < Duration::from_millis(200));
    assert_eq!(sink.payloads(), vec![encode(Command::Up)]);
}

#[test]
fn volley_blocks_for_every_reload() {
    let reload = Duration::from_millis(100);
    let sink = RecordingSink::new();
    let mut launcher = LauncherController::with_sink(sink.clone(), &fast_config(reload));

    let started = Instant::now();
    launcher.fire(2).unwrap();
    let finished = Instant::now();
    assert!(finished - started >= reload * 2);

    let transfers = sink.transfers();
    assert_eq!(sink.commands(), vec![Command::Fire, Command::Fire]);
    assert!(transfers[1].at - transfers[0].at >= reload);
    // The reload wait follows the last shot too.
    assert!(finished - transfers[1].at >= reload);
}

#[test]
fn out_of_range_counts_match_single_shot() {
    let config = fast_config(Duration::ZERO);
    let mut baseline = Vec::new();
    for count in [1, 0, 10] {
        let sink = RecordingSink::new();
        let mut launcher = LauncherController::with_sink(sink.clone(), &config);
        launcher.fire(count).unwrap();
        baseline.push(sink.payloads());
    }
    assert_eq!(baseline[0], vec![encode(Command::Fire)]);
    assert_eq!(baseline[1], baseline[0]);
    assert_eq!(baseline[2], baseline[0]);
}

#[test]
fn stop_sends_exactly_one_stop() {
    let sink = RecordingSink::new();
    let mut launcher = LauncherController::with_sink(sink.clone(), &LauncherConfig::default());
    launcher.stop().unwrap();
    assert_eq!(sink.payloads(), vec![encode(Command::Stop)]);

    launcher.hold(Direction::Left).unwrap();
    sink.clear();
    launcher.stop().unwrap();
    assert_eq!(sink.payloads(), vec![encode(Command::Stop)]);
}

struct CountingSleeper(u32);

impl Sleeper for CountingSleeper {
    fn sleep(&mut self, _duration: Duration) {
        self.0 += 1;
    }
}

#[test]
fn failure_mid_volley_stops_the_volley() {
    let sink = RecordingSink::new();
    let mut launcher = LauncherController::with_parts(
        sink.clone(),
        CountingSleeper(0),
        &LauncherConfig::default(),
    );
    launcher.fire(1).unwrap();
    sink.disconnect();
    assert!(matches!(launcher.fire(4), Err(LauncherError::Transport(_))));
    assert_eq!(sink.commands(), vec![Command::Fire]);
}

#[test]
fn into_sink_hands_back_the_handle() {
    let sink = RecordingSink::new();
    let mut launcher = LauncherController::with_sink(sink, &LauncherConfig::default());
    launcher.stop().unwrap();
    let sink = launcher.into_sink();
    assert_eq!(sink.commands(), vec![Command::Stop]);
}

#[test]
fn absent_device_is_not_found() {
    // Nothing ships with this identity. Hosts where libusb or hidapi cannot
    // enumerate count as not having seen it.
    let config = LauncherConfig {
        identity: DeviceIdentity {
            vendor_id: 0xfffe,
            product_id: 0xfffd,
        },
        transport: TransportConfig {
            backend: Backend::Auto,
            ..TransportConfig::default()
        },
        ..LauncherConfig::default()
    };
    match LauncherController::connect_with(&config) {
        Err(LauncherError::DeviceNotFound(identity)) => assert_eq!(identity, config.identity),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("connected to a device that should not exist"),
    }
}
