pub mod caller;
pub mod cart;
pub mod errors;
pub mod notification;
pub mod order;
pub mod ports;
pub mod report;
