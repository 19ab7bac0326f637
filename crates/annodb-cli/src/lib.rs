pub mod demo;
pub mod inspect;
pub mod logging;
pub mod types;
