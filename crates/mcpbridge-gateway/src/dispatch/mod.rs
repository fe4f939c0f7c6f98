//! Request routing between controllers and the host executor.

pub mod dispatcher;

pub use dispatcher::Dispatcher;
