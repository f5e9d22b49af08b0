pub mod geometry;
pub mod simulator;

pub use geometry::{Cell, CellRect, Rotation};

// Gate protocol (dial → transit → close)
pub use simulator::{
    designation_string, Address, AddressRegistry, DialFailure, EndpointId, EntityId, GateConfig,
    GateCue, GateError, GateEvent, GateEventKind, GateHost, GateJournal, GateKernel, GateScenario,
    GateSite, GateSnapshot, GateState, InMemoryGateHost, PersistError, RegionId,
};
