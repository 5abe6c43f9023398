mod circulation_pump;
mod heat_source;
mod solar_panel;
mod storage_tank;
mod thermal_pipe;

pub use circulation_pump::{CirculationPump, CirculationPumpConfig, PumpMode};
pub use heat_source::{HeatSource, HeatSourceConfig};
pub use solar_panel::{SolarPanel, SolarPanelConfig};
pub use storage_tank::{StorageTank, StorageTankConfig};
pub use thermal_pipe::{PipeKind, ThermalPipe, ThermalPipeConfig};
