pub mod full_analysis;
