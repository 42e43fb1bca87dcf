pub mod cart_service;
pub mod notifier;
pub mod order_service;
pub mod report_service;
