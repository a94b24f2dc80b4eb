pub mod calculator;
pub mod conversion;
pub mod persona;

pub use conversion::{detect as detect_conversion, ConversionAssessment, ConversionSignals, Urgency};
pub use persona::{rank_candidates, target_personality};
