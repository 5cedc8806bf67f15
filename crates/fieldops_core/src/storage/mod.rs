pub mod job_store;
pub mod seed;

pub use job_store::JobStore;
pub use seed::SeedData;
