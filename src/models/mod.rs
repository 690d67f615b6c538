//! Data transfer objects (DTOs) produced by the timeline pipeline.
//!
//! These structs are serialized to JSON for the rendering layer.
//! - `commit`: Revision metadata for a commit touching the file
//! - `blame`: Blamelet, one attributed source line
//! - `timeline`: Snapshot and Timeline
//! - `repository`: RepositoryInfo for the repository endpoint

pub mod blame;
pub mod commit;
pub mod repository;
pub mod timeline;

pub use blame::*;
pub use commit::*;
pub use repository::*;
pub use timeline::*;
