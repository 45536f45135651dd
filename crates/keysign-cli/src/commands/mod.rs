pub mod schemes;
pub mod sign;
