pub mod clinical_record;
pub mod id;
pub mod patient;

pub use clinical_record::*;
pub use id::*;
pub use patient::*;
