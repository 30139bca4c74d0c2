//! Systems running alongside the demo session

mod simulation;

pub use simulation::{
    LoopError, LoopSettings, LoopState, RenderTrigger, SimCommand, SimulationControl,
    SimulationLoop, SnapshotSlot, STANDARD_FREQUENCIES,
};
