// Recruiter-facing dashboards and bulk screening.
pub mod handlers;
pub mod screening;
