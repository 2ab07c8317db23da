pub mod pipeline;
pub mod recruitment;
