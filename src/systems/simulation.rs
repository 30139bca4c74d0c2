//! Background simulation loop
//!
//! One thread owns the [`Simulation`] and is the only writer of the world and
//! its trails. Each pass it:
//! 1. Applies queued commands (scene replacement, clear, explosions)
//! 2. Steps the simulation by `1 / frequency` (or 0 when the frequency is 0)
//! 3. Publishes an immutable [`FrameSnapshot`]
//! 4. Hands the snapshot to the render trigger
//!
//! Other threads control the loop through [`SimulationControl`] and read
//! frames from the [`SnapshotSlot`].

use std::fmt;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info};
use testbed_core::{ExplosionParams, FrameSnapshot, Simulation};

/// Step frequencies offered by the testbed menus
pub const STANDARD_FREQUENCIES: [f64; 4] = [30.0, 60.0, 90.0, 120.0];

/// Lifecycle state of the loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
    /// Terminal
    Stopped,
}

/// Work handed to the simulation thread
#[derive(Debug)]
pub enum SimCommand {
    /// Swap in a freshly loaded scene
    Replace(Box<Simulation>),
    /// Remove every body, joint, trail and particle group
    Clear,
    /// Spawn a tracked particle explosion
    ParticleExplosion(ExplosionParams),
}

/// Settings fixed when the loop is spawned
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopSettings {
    /// Steps per second
    pub frequency: f64,
    /// Minimum time between frames
    pub frame_interval: Option<Duration>,
    pub start_paused: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            frequency: 60.0,
            frame_interval: None,
            start_paused: false,
        }
    }
}

/// Error spawning or joining the simulation thread
#[derive(Debug)]
pub enum LoopError {
    /// The operating system refused to start the thread
    Spawn(io::Error),
    /// The simulation thread panicked
    Panicked,
}

impl From<io::Error> for LoopError {
    fn from(e: io::Error) -> Self {
        LoopError::Spawn(e)
    }
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Spawn(e) => write!(f, "Failed to spawn simulation thread: {}", e),
            LoopError::Panicked => write!(f, "Simulation thread panicked"),
        }
    }
}

impl std::error::Error for LoopError {}

/// Called on the simulation thread after every published frame
///
/// Blocking in `frame_ready` holds back the next step, so the trigger sets
/// the stepping cadence.
pub trait RenderTrigger: Send + 'static {
    fn frame_ready(&mut self, snapshot: &Arc<FrameSnapshot>);
}

impl<F> RenderTrigger for F
where
    F: FnMut(&Arc<FrameSnapshot>) + Send + 'static,
{
    fn frame_ready(&mut self, snapshot: &Arc<FrameSnapshot>) {
        self(snapshot)
    }
}

/// Latest published frame, shared with readers
#[derive(Clone, Debug, Default)]
pub struct SnapshotSlot(Arc<Mutex<Arc<FrameSnapshot>>>);

impl SnapshotSlot {
    /// Most recent frame
    pub fn latest(&self) -> Arc<FrameSnapshot> {
        Arc::clone(&self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, snapshot: FrameSnapshot) -> Arc<FrameSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        snapshot
    }
}

#[derive(Debug)]
struct LoopShared {
    state: LoopState,
    frequency: f64,
    /// Commands sent but not yet picked up
    pending: usize,
}

impl LoopShared {
    fn dt(&self) -> f64 {
        if self.frequency > 0.0 {
            1.0 / self.frequency
        } else {
            0.0
        }
    }
}

type Shared = Arc<(Mutex<LoopShared>, Condvar)>;

fn lock(shared: &Shared) -> MutexGuard<'_, LoopShared> {
    shared.0.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable handle for pausing, resuming, stopping and feeding the loop
#[derive(Clone, Debug)]
pub struct SimulationControl {
    shared: Shared,
    commands: Sender<SimCommand>,
}

impl SimulationControl {
    pub fn state(&self) -> LoopState {
        lock(&self.shared).state
    }

    /// Running -> Paused, cutting any frame throttle short
    pub fn pause(&self) {
        let mut shared = lock(&self.shared);
        if shared.state == LoopState::Running {
            shared.state = LoopState::Paused;
            info!("Simulation paused");
            self.shared.1.notify_all();
        }
    }

    /// Paused -> Running, waking the loop
    pub fn resume(&self) {
        let mut shared = lock(&self.shared);
        if shared.state == LoopState::Paused {
            shared.state = LoopState::Running;
            info!("Simulation resumed");
            self.shared.1.notify_all();
        }
    }

    /// Pause a running loop or resume a paused one; returns the new state
    pub fn toggle_pause(&self) -> LoopState {
        match self.state() {
            LoopState::Running => self.pause(),
            LoopState::Paused => self.resume(),
            LoopState::Stopped => {}
        }
        self.state()
    }

    /// Stop the loop for good, waking it if it is waiting
    pub fn stop(&self) {
        let mut shared = lock(&self.shared);
        if shared.state != LoopState::Stopped {
            shared.state = LoopState::Stopped;
            info!("Simulation stopping");
        }
        self.shared.1.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == LoopState::Stopped
    }

    pub fn frequency(&self) -> f64 {
        lock(&self.shared).frequency
    }

    /// Change the step frequency; negative or NaN values freeze time
    pub fn set_frequency(&self, hz: f64) {
        let hz = hz.max(0.0);
        lock(&self.shared).frequency = hz;
        debug!("Simulation frequency set to {} Hz", hz);
    }

    /// Timestep the next step will use
    pub fn dt(&self) -> f64 {
        lock(&self.shared).dt()
    }

    /// Queue a command for the simulation thread
    ///
    /// Returns `false` if the loop has already exited. A paused loop applies
    /// the command and republishes its frame without stepping.
    pub fn send(&self, command: SimCommand) -> bool {
        if self.commands.send(command).is_err() {
            return false;
        }
        let mut shared = lock(&self.shared);
        shared.pending += 1;
        self.shared.1.notify_all();
        true
    }
}

/// Handle to the running simulation thread
pub struct SimulationLoop {
    control: SimulationControl,
    snapshots: SnapshotSlot,
    handle: Option<JoinHandle<Simulation>>,
}

impl SimulationLoop {
    /// Start stepping `simulation` on a new thread
    pub fn spawn<T: RenderTrigger>(
        simulation: Simulation,
        settings: LoopSettings,
        trigger: T,
    ) -> Result<Self, LoopError> {
        let state = if settings.start_paused {
            LoopState::Paused
        } else {
            LoopState::Running
        };
        let shared: Shared = Arc::new((
            Mutex::new(LoopShared {
                state,
                frequency: settings.frequency.max(0.0),
                pending: 0,
            }),
            Condvar::new(),
        ));
        let (commands, receiver) = mpsc::channel();
        let snapshots = SnapshotSlot::default();
        snapshots.publish(simulation.snapshot());

        let worker = Worker {
            simulation,
            shared: Arc::clone(&shared),
            commands: receiver,
            snapshots: snapshots.clone(),
            frame_interval: settings.frame_interval,
            trigger,
        };
        let handle = thread::Builder::new()
            .name("simulation".to_string())
            .spawn(move || worker.run())?;

        info!(
            "Simulation loop started at {} Hz ({:?})",
            settings.frequency, state
        );
        Ok(Self {
            control: SimulationControl { shared, commands },
            snapshots,
            handle: Some(handle),
        })
    }

    /// A handle for controlling the loop from other threads
    pub fn control(&self) -> SimulationControl {
        self.control.clone()
    }

    /// Where published frames can be read
    pub fn snapshots(&self) -> SnapshotSlot {
        self.snapshots.clone()
    }

    /// Wait for the loop to be stopped and return the final simulation
    pub fn join(mut self) -> Result<Simulation, LoopError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| LoopError::Panicked),
            None => Err(LoopError::Panicked),
        }
    }

    /// Stop the loop and return the final simulation
    pub fn shutdown(self) -> Result<Simulation, LoopError> {
        self.control.stop();
        self.join()
    }
}

impl Drop for SimulationLoop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.control.stop();
            let _ = handle.join();
        }
    }
}

/// Work waiting for the simulation thread after a wake-up
enum Pass {
    Step(f64),
    /// Paused, but commands arrived
    Refresh,
    Exit,
}

struct Worker<T> {
    simulation: Simulation,
    shared: Shared,
    commands: Receiver<SimCommand>,
    snapshots: SnapshotSlot,
    frame_interval: Option<Duration>,
    trigger: T,
}

impl<T: RenderTrigger> Worker<T> {
    fn run(mut self) -> Simulation {
        loop {
            let pass = self.wait_for_work();
            let dt = match pass {
                Pass::Exit => break,
                Pass::Refresh => None,
                Pass::Step(dt) => Some(dt),
            };

            for command in self.commands.try_iter() {
                apply_command(&mut self.simulation, command);
            }
            if let Some(dt) = dt {
                self.simulation.step(dt);
            }

            let snapshot = self.snapshots.publish(self.simulation.snapshot());
            self.trigger.frame_ready(&snapshot);

            if dt.is_some() {
                self.throttle();
            }
        }

        info!(
            "Simulation loop exited after {} steps",
            self.simulation.step_count()
        );
        self.simulation
    }

    /// Block while paused, unless commands arrive or the loop is stopped
    fn wait_for_work(&self) -> Pass {
        let mut shared = lock(&self.shared);
        while shared.state == LoopState::Paused && shared.pending == 0 {
            shared = self
                .shared
                .1
                .wait(shared)
                .unwrap_or_else(PoisonError::into_inner);
        }
        shared.pending = 0;
        match shared.state {
            LoopState::Stopped => Pass::Exit,
            LoopState::Paused => Pass::Refresh,
            LoopState::Running => Pass::Step(shared.dt()),
        }
    }

    /// Wait out the rest of the frame interval; pause and stop cut it short
    fn throttle(&self) {
        let Some(interval) = self.frame_interval else {
            return;
        };
        let deadline = Instant::now() + interval;
        let mut shared = lock(&self.shared);
        while shared.state == LoopState::Running {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (guard, _) = self
                .shared
                .1
                .wait_timeout(shared, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            shared = guard;
        }
    }
}

fn apply_command(simulation: &mut Simulation, command: SimCommand) {
    match command {
        SimCommand::Replace(next) => {
            info!("Scene replaced ({} bodies)", next.world().body_count());
            *simulation = *next;
        }
        SimCommand::Clear => {
            simulation.clear();
            debug!("Scene cleared");
        }
        SimCommand::ParticleExplosion(params) => {
            simulation.explode(params);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dt_from_frequency() {
        let shared = LoopShared {
            state: LoopState::Running,
            frequency: 60.0,
            pending: 0,
        };
        assert_eq!(shared.dt(), 1.0 / 60.0);

        let frozen = LoopShared {
            frequency: 0.0,
            ..shared
        };
        assert_eq!(frozen.dt(), 0.0);
    }

    #[test]
    fn test_closure_is_a_render_trigger() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&frames);
        let mut trigger = move |snapshot: &Arc<FrameSnapshot>| {
            seen.lock().unwrap().push(snapshot.step);
        };

        trigger.frame_ready(&Arc::new(FrameSnapshot::default()));
        trigger.frame_ready(&Arc::new(FrameSnapshot {
            step: 3,
            ..FrameSnapshot::default()
        }));
        assert_eq!(*frames.lock().unwrap(), vec![0, 3]);
    }

    #[test]
    fn test_snapshot_slot_publishes_latest() {
        let slot = SnapshotSlot::default();
        assert_eq!(slot.latest().step, 0);
        slot.publish(FrameSnapshot {
            step: 7,
            ..FrameSnapshot::default()
        });
        assert_eq!(slot.latest().step, 7);
    }

    #[test]
    fn test_pause_cuts_throttle_short() {
        let shared: Shared = Arc::new((
            Mutex::new(LoopShared {
                state: LoopState::Running,
                frequency: 60.0,
                pending: 0,
            }),
            Condvar::new(),
        ));
        let (commands, receiver) = mpsc::channel();
        let control = SimulationControl {
            shared: Arc::clone(&shared),
            commands,
        };
        let worker = Worker {
            simulation: Simulation::default(),
            shared,
            commands: receiver,
            snapshots: SnapshotSlot::default(),
            frame_interval: Some(Duration::from_secs(30)),
            trigger: |_: &Arc<FrameSnapshot>| {},
        };

        let started = Instant::now();
        let throttling = thread::spawn(move || worker.throttle());
        thread::sleep(Duration::from_millis(50));
        control.pause();
        throttling.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_stop_is_terminal() {
        let settings = LoopSettings {
            start_paused: true,
            ..LoopSettings::default()
        };
        let sim_loop =
            SimulationLoop::spawn(Simulation::default(), settings, |_: &Arc<FrameSnapshot>| {}).unwrap();
        let control = sim_loop.control();
        assert_eq!(control.state(), LoopState::Paused);

        control.stop();
        control.resume();
        control.pause();
        assert_eq!(control.toggle_pause(), LoopState::Stopped);
        assert!(sim_loop.join().is_ok());
        assert!(!control.send(SimCommand::Clear));
    }
}
