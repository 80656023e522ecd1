pub mod crypto;
pub mod flash;
pub mod time;
pub mod token;
pub mod validation;
