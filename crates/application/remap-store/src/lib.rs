pub mod app_core;
pub mod persistence;
pub mod ports;
mod save_worker;
pub mod subscription;

pub use app_core::*;
pub use persistence::{default_profiles_path, FileGatewayOptions, FileProfileGateway};
pub use ports::*;
pub use subscription::Subscription;
