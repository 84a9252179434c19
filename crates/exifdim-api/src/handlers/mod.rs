pub mod health;
pub mod rewrite;
