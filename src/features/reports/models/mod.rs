mod report;
mod report_update;
mod summary;

pub use report::*;
pub use report_update::*;
pub use summary::*;
