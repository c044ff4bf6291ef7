pub mod analyze;
pub mod dispatch;
pub mod purge;
pub mod reanalyze;
pub mod show;
pub mod versions;
