pub mod completion;
pub mod recommend;
pub mod report;
pub mod sanitize;

pub use recommend::SpecialistRecommender;
pub use report::ReportGenerator;
