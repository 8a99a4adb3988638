pub mod breakpoints;
pub mod carousel;
pub mod config;
pub mod run;
