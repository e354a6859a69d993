pub mod optimizer;
pub mod sensitivity;
