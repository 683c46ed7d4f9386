use crate::device::{parse_devices, ADBDevice, ADB};
use crate::error::{ADBError, ADBResult};
use log::{debug, info, trace, warn};
use std::fmt;
use std::process::Command;

/// 一次 ADB 调用的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// 原始参数（不含 adb 路径本身）
    pub args: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandResult {
    /// 进程是否以 0 退出
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adb {}", self.args.join(" "))?;
        match self.exit_code {
            Some(code) => write!(f, " (exit {})", code),
            None => write!(f, " (terminated)"),
        }
    }
}

/// 执行 ADB 命令的抽象
///
/// 实现者只需提供 `run`；非零退出码不视为错误，由调用方检查输出，
/// 只有进程无法启动时才返回 `Err`。没有超时，也没有重试。
pub trait CommandRunner {
    /// 以给定参数执行一次 ADB
    fn run(&self, args: &[String]) -> ADBResult<CommandResult>;

    /// 针对某个设备执行命令 (`-s <serial> ...`)
    fn run_on(&self, serial: &str, args: &[&str]) -> ADBResult<CommandResult> {
        let mut full = Vec::with_capacity(args.len() + 2);

        // 空序列号时交给 adb 自己选择唯一设备
        if !serial.is_empty() {
            full.push("-s".to_string());
            full.push(serial.to_string());
        }
        full.extend(args.iter().map(|arg| arg.to_string()));

        self.run(&full)
    }

    /// 在设备上执行 shell 命令 (`-s <serial> shell ...`)
    fn shell(&self, serial: &str, args: &[&str]) -> ADBResult<CommandResult> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("shell");
        full.extend_from_slice(args);
        self.run_on(serial, &full)
    }

    /// 检查 ADB 是否可用并获取版本
    fn check_adb(&self) -> ADBResult<String> {
        let result = self.run(&["version".to_string()])?;

        if !result.succeeded() {
            return Err(ADBError::CommandError(format!(
                "ADB version 命令失败: {}",
                result.stderr.trim()
            )));
        }

        let version_line = result
            .stdout
            .lines()
            .next()
            .ok_or_else(|| ADBError::CommandError("无法解析 ADB 版本".to_string()))?;

        debug!("ADB 版本检查成功: {}", version_line);
        Ok(version_line.to_string())
    }

    /// 列出连接的设备，缺失型号时通过 getprop 补全
    fn list_devices(&self) -> ADBResult<Vec<ADBDevice>> {
        let result = self.run(&["devices".to_string(), "-l".to_string()])?;

        if !result.succeeded() {
            return Err(ADBError::CommandError(format!(
                "ADB devices 命令失败: {}",
                result.stderr.trim()
            )));
        }

        trace!("ADB devices 输出: {}", result.stdout);

        let mut devices = parse_devices(&result.stdout);
        for device in devices.iter_mut() {
            if device.has_model() || !device.is_online() {
                continue;
            }

            match self.shell(&device.serial, &["getprop", "ro.product.model"]) {
                Ok(model) => *device = device.clone().with_model(&model.stdout),
                Err(e) => warn!("无法读取设备 {} 的型号: {}", device.serial, e),
            }
        }

        info!("发现 {} 个 ADB 设备", devices.len());
        Ok(devices)
    }
}

impl CommandRunner for ADB {
    fn run(&self, args: &[String]) -> ADBResult<CommandResult> {
        let mut cmd = Command::new(&self.config.path);

        // 添加全局附加参数（如果有）
        if let Some(additional_args) = &self.config.additional_args {
            cmd.args(additional_args);
        }
        cmd.args(args);

        if self.config.log_commands {
            info!("执行: {} {}", self.config.path.display(), args.join(" "));
        } else {
            debug!("执行: {} {}", self.config.path.display(), args.join(" "));
        }

        let output = cmd
            .output()
            .map_err(|e| ADBError::CommandError(format!("无法执行 ADB: {}", e)))?;

        let result = CommandResult {
            args: args.to_vec(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        };

        if !result.succeeded() {
            debug!("{} 非零退出: {}", result, result.stderr.trim());
        }
        trace!("命令输出: {}", result.stdout);

        Ok(result)
    }
}
