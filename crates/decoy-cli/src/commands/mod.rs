pub mod defaults;
pub mod replay;
