/// Run state machine around the driver and the capture pipeline.
pub mod generator;
