//! kexp driver - runs the build pipeline.
//!
//! - **`pipeline`**: the stage table and the loop that walks it
//! - **`sink`**: where status lines and pane contents go
//! - **`explorer`**: owns tool paths and the scratch directory, one build at a time
//!
//! ```text
//!   source ──► Explorer::build ──► Pipeline::run ──► ProcessRunner (per stage)
//!                                        │
//!                                        ├─► BuildSink::status
//!                                        ├─► BuildSink::bytecode     (dexdump, filtered)
//!                                        └─► BuildSink::native_code  (oatdump, filtered)
//! ```

pub mod error;
pub mod explorer;
pub mod pipeline;
pub mod sink;

#[cfg(test)]
mod testing;

pub use error::DriverError;
pub use explorer::Explorer;
pub use pipeline::{BuildOptions, BuildOutcome, Pipeline};
pub use sink::{BuildEvent, BuildSink, ChannelSink, READY};
