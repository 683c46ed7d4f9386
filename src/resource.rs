use crate::cmd::{CommandResult, CommandRunner};
use crate::error::{ADBError, ADBResult};
use crate::media::MediaCommands;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// 资源管理器结构体
///
/// 跟踪设备上和本地的临时文件，`cleanup` 或超出作用域时删除。
pub struct ResourceManager<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    serial: String,
    remote_files: Vec<String>,
    local_files: Vec<PathBuf>,
    start_time: Instant,
}

impl<'a, R: CommandRunner + ?Sized> ResourceManager<'a, R> {
    /// 创建新的资源管理器
    pub fn new(runner: &'a R, serial: &str) -> Self {
        Self {
            runner,
            serial: serial.to_string(),
            remote_files: Vec::new(),
            local_files: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// 添加设备上的临时文件到跟踪列表
    pub fn track_remote(&mut self, path: &str) {
        self.remote_files.push(path.to_string());
        debug!("添加设备临时文件到跟踪: {}", path);
    }

    /// 添加本地临时文件到跟踪列表
    pub fn track_local(&mut self, path: &Path) {
        self.local_files.push(path.to_path_buf());
        debug!("添加本地临时文件到跟踪: {}", path.display());
    }

    /// 删除设备上跟踪的临时文件，返回执行过的删除命令
    pub fn cleanup_remote(&mut self) -> ADBResult<Vec<CommandResult>> {
        let mut executed = Vec::new();
        let mut errors = Vec::new();

        for file in self.remote_files.drain(..) {
            match self.runner.remove_remote(&self.serial, &file) {
                Ok(result) => {
                    debug!("已删除设备临时文件: {}", file);
                    executed.push(result);
                }
                Err(e) => {
                    warn!("删除设备临时文件 {} 失败: {}", file, e);
                    errors.push(format!("文件 {}: {}", file, e));
                }
            }
        }

        if errors.is_empty() {
            Ok(executed)
        } else {
            Err(ADBError::FileError(format!(
                "清理设备临时文件时发生错误: {}",
                errors.join(", ")
            )))
        }
    }

    /// 删除本地跟踪的临时文件，不存在的文件直接跳过
    pub fn cleanup_local(&mut self) -> ADBResult<()> {
        let mut errors = Vec::new();

        for file in self.local_files.drain(..) {
            if !file.exists() {
                continue;
            }
            match fs::remove_file(&file) {
                Ok(_) => debug!("已删除本地临时文件: {}", file.display()),
                Err(e) => {
                    warn!("删除本地临时文件 {} 失败: {}", file.display(), e);
                    errors.push(format!("文件 {}: {}", file.display(), e));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ADBError::FileError(format!(
                "清理本地临时文件时发生错误: {}",
                errors.join(", ")
            )))
        }
    }

    /// 获取操作持续时间
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// 超出作用域时自动清理仍在跟踪的文件
impl<R: CommandRunner + ?Sized> Drop for ResourceManager<'_, R> {
    fn drop(&mut self) {
        if !self.remote_files.is_empty() || !self.local_files.is_empty() {
            info!(
                "自动清理设备 {} 的 {} 个设备临时文件和 {} 个本地临时文件",
                self.serial,
                self.remote_files.len(),
                self.local_files.len()
            );

            // Drop 中忽略错误
            let _ = self.cleanup_remote();
            let _ = self.cleanup_local();
        }
    }
}
