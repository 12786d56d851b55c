pub mod convert;
pub mod play;
pub mod schemas;
pub mod topics;
