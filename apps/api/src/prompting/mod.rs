// Prompt composition. Everything here is pure and synchronous.
pub mod budget;
pub mod builders;
pub mod fields;
pub mod prompts;
