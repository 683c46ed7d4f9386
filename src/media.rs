use crate::cmd::{CommandResult, CommandRunner};
use crate::error::{ADBError, ADBResult};
use log::{debug, info};
use std::path::Path;

/// 截图、日志和文件传输相关的设备命令
///
/// 对所有 `CommandRunner` 自动实现。
pub trait MediaCommands: CommandRunner {
    /// 在设备上截图并保存到 `device_path`
    fn screencap(&self, serial: &str, device_path: &str) -> ADBResult<CommandResult> {
        self.shell(serial, &["screencap", device_path])
    }

    /// 将当前 logcat 缓冲区转储到设备上的 `device_path`
    fn logcat_dump(&self, serial: &str, device_path: &str) -> ADBResult<CommandResult> {
        self.run_on(serial, &["logcat", "-d", "-f", device_path])
    }

    /// 从设备拉取文件
    fn pull(&self, serial: &str, device_path: &str, local_path: &Path) -> ADBResult<CommandResult> {
        let local = local_path.to_string_lossy();

        info!("开始从设备拉取文件: {} -> {}", device_path, local);
        let result = self.run_on(serial, &["pull", device_path, &*local])?;

        if !result.succeeded() {
            return Err(ADBError::CommandError(format!(
                "ADB pull 命令失败: {}",
                result.stderr.trim()
            )));
        }

        debug!("成功拉取文件 {} 到 {}", device_path, local);
        Ok(result)
    }

    /// 删除设备上的文件
    fn remove_remote(&self, serial: &str, device_path: &str) -> ADBResult<CommandResult> {
        self.shell(serial, &["rm", "-f", device_path])
    }

    /// 执行 `am` 子命令，例如 `start -a android.intent.action.VIEW`
    fn activity_manager(&self, serial: &str, args: &[String]) -> ADBResult<CommandResult> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("am");
        full.extend(args.iter().map(String::as_str));
        self.shell(serial, &full)
    }
}

impl<T: CommandRunner + ?Sized> MediaCommands for T {}
