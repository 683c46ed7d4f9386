use crate::cmd::{CommandResult, CommandRunner};
use crate::dumpsys::{parse_dumpsys_package, PackageInfo};
use crate::error::{ADBError, ADBResult};
use crate::packages::parse_installed_packages;
use log::{debug, warn};

/// 面向单个应用包的设备命令
///
/// 对所有 `CommandRunner` 自动实现。
pub trait PackageCommands: CommandRunner {
    /// 唤醒屏幕
    fn wake_screen(&self, serial: &str) -> ADBResult<CommandResult> {
        self.shell(serial, &["input", "keyevent", "KEYCODE_WAKEUP"])
    }

    /// 读取包信息，失败时返回默认值
    fn package_info(&self, serial: &str, package_name: &str) -> PackageInfo {
        match self.shell(serial, &["dumpsys", "package", package_name]) {
            Ok(result) => parse_dumpsys_package(package_name, &result.stdout),
            Err(e) => {
                warn!("无法读取包 {} 的信息: {}", package_name, e);
                PackageInfo::new(package_name)
            }
        }
    }

    /// 卸载应用；`keep_data` 时保留数据和缓存目录
    fn uninstall_package(
        &self,
        serial: &str,
        package_name: &str,
        keep_data: bool,
    ) -> ADBResult<CommandResult> {
        if keep_data {
            self.shell(serial, &["cmd", "package", "uninstall", "-k", package_name])
        } else {
            self.shell(serial, &["pm", "uninstall", package_name])
        }
    }

    /// 强制停止应用
    fn force_stop(&self, serial: &str, package_name: &str) -> ADBResult<CommandResult> {
        self.shell(serial, &["am", "force-stop", package_name])
    }

    /// 清除应用数据
    fn clear_data(&self, serial: &str, package_name: &str) -> ADBResult<CommandResult> {
        self.shell(serial, &["pm", "clear", package_name])
    }

    /// 通过 monkey 启动应用的 launcher activity
    fn launch_app(&self, serial: &str, package_name: &str) -> ADBResult<CommandResult> {
        self.shell(
            serial,
            &[
                "monkey",
                "-p",
                package_name,
                "-c",
                "android.intent.category.LAUNCHER",
                "1",
            ],
        )
    }

    /// 获取设备上已安装的应用列表
    fn installed_packages(&self, serial: &str) -> ADBResult<Vec<String>> {
        let result = self.shell(serial, &["pm", "list", "packages"])?;

        if !result.succeeded() {
            return Err(ADBError::DeviceError(format!(
                "无法列出设备 {} 上的应用: {}",
                serial,
                result.stderr.trim()
            )));
        }

        let packages = parse_installed_packages(&result.stdout);
        debug!("设备 {} 上共有 {} 个应用", serial, packages.len());
        Ok(packages)
    }
}

impl<T: CommandRunner + ?Sized> PackageCommands for T {}
