pub mod channels;
pub mod messaging;
pub mod repositories;
