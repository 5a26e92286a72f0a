pub mod bias_aligner;
pub mod bias_applicator;
pub mod breakpoints;
pub mod correction_pipeline;
pub mod hemispheric;
pub mod zonal_aggregator;

pub use bias_aligner::{AlignedBiasSeries, BiasAligner};
pub use bias_applicator::{BiasApplicator, CorrectionTables};
pub use breakpoints::{summarize_breakpoints, Breakpoint, BreakpointDetector, SourceBreakpointStats};
pub use correction_pipeline::{CorrectionOutput, CorrectionPipeline, CorrectionSummary};
pub use hemispheric::{hemispheric_means, Hemisphere, HemisphericMean};
pub use zonal_aggregator::{ZonalAggregator, ZonalBin, ZonalCurve, ZonalWeight, ZonalWeights};
