pub mod compliance;
pub mod gst;
pub mod rules;
