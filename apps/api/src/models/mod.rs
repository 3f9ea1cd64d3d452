pub mod investor;
pub mod startup;
