pub mod brief;
pub mod checker;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod parser;
pub mod scan;
pub mod score;

pub use brief::BriefGenerator;
pub use config::Config;
pub use error::{BriefError, QueryError, ScanError};
pub use model::{Ecosystem, ManifestKind, PackageResult, ScanOutcome, ScanReport, VulnerabilityRecord};
pub use scan::ScanPipeline;
