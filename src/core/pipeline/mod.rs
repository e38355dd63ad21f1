//! # Pipeline Module
//!
//! Orchestrates a full run.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover all pictures under the inputs
//! 2. **Hash** - Digest every picture on a worker pool and group by content
//! 3. **Plan** - Turn each group into copy and sidecar actions
//! 4. **Execute** - Perform the actions on a second worker pool
//!
//! In verify mode stages 3 and 4 are replaced by a digest label check.

mod executor;

pub use executor::{
    default_workers, output_inside_inputs, Pipeline, PipelineBuilder, PipelineConfig,
    SortOutcome, VerifyOutcome,
};
