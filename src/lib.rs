mod error;
mod config;
mod device;
mod cmd;

// 功能模块
pub mod action;
pub mod app;
pub mod bugreport;
pub mod dumpsys;
pub mod locator;
pub mod matcher;
pub mod media;
pub mod packages;
pub mod resource;
pub mod utils;

#[cfg(test)]
mod testing;

// 导出主要类型
pub use action::{ActionOptions, ActionResult, Mode};
pub use bugreport::{BugReport, BugReportOptions, IntentCommand};
pub use cmd::{CommandResult, CommandRunner};
pub use config::{ADBConfig, ADBConfigBuilder};
pub use device::{parse_devices, ADBDevice, DeviceStatus, ADB};
pub use dumpsys::PackageInfo;
pub use error::{ADBError, ADBResult};
pub use matcher::{PackageFilter, PackageMatcher};

// 便利的预导出模块
pub mod prelude {
    pub use super::app::PackageCommands;
    pub use super::media::MediaCommands;
    pub use super::{
        ActionOptions, ActionResult, ADBConfig, ADBDevice, ADBError, ADBResult, BugReportOptions,
        CommandRunner, Mode, PackageFilter, ADB,
    };
}
