pub mod analyzer;
pub mod capability;
pub mod coverage;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod spec;
pub mod spec_url;

pub use analyzer::{Analyzer, MatrixRequest};
pub use capability::extract_capabilities;
pub use coverage::{CapabilityMatrix, MatrixRow, Overall};
pub use error::{CliError, Error};
pub use loader::{SpecLoader, SpecLocation};
pub use matcher::{Coverage, Evidence, Matcher, ScoringWeights};
pub use spec::{AuthRequirement, AuthScheme, Endpoint, HttpMethod, SurfaceMap, SurfaceMapReport};
pub use spec_url::find_spec_url;
