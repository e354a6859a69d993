pub mod analysis;
pub mod credit;
pub mod forecast;
pub mod scenarios;
pub mod tax;
pub mod working_capital;
pub mod workflows;
