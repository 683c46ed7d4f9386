use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ADB 配置结构体
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ADBConfig {
    /// ADB 可执行文件路径
    pub path: PathBuf,
    /// 额外的命令行参数，插在每条命令的最前面
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_args: Option<Vec<String>>,
    /// 以 info 级别记录每一条 ADB 调用
    #[serde(default)]
    pub log_commands: bool,
}

impl Default for ADBConfig {
    fn default() -> Self {
        ADBConfig {
            path: PathBuf::from("adb"),
            additional_args: None,
            log_commands: false,
        }
    }
}

impl ADBConfig {
    /// 创建配置构建器
    pub fn builder() -> ADBConfigBuilder {
        ADBConfigBuilder::default()
    }
}

/// ADB 配置构建器
#[derive(Default)]
pub struct ADBConfigBuilder {
    path: Option<PathBuf>,
    additional_args: Option<Vec<String>>,
    log_commands: Option<bool>,
}

impl ADBConfigBuilder {
    /// 设置 ADB 可执行文件路径
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// 添加额外命令行参数
    pub fn add_arg(mut self, arg: &str) -> Self {
        self.additional_args
            .get_or_insert_with(Vec::new)
            .push(arg.to_string());
        self
    }

    /// 是否记录每条 ADB 调用
    pub fn log_commands(mut self, enabled: bool) -> Self {
        self.log_commands = Some(enabled);
        self
    }

    /// 构建 ADB 配置
    pub fn build(self) -> ADBConfig {
        let default = ADBConfig::default();

        ADBConfig {
            path: self.path.unwrap_or(default.path),
            additional_args: self.additional_args,
            log_commands: self.log_commands.unwrap_or(default.log_commands),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_falls_back_to_defaults() {
        let config = ADBConfig::builder().build();
        assert_eq!(config.path, PathBuf::from("adb"));
        assert!(config.additional_args.is_none());
        assert!(!config.log_commands);
    }

    #[test]
    fn builder_collects_additional_args() {
        let config = ADBConfig::builder()
            .path("/opt/platform-tools/adb")
            .add_arg("-H")
            .add_arg("127.0.0.1")
            .log_commands(true)
            .build();

        assert_eq!(config.path, PathBuf::from("/opt/platform-tools/adb"));
        assert_eq!(
            config.additional_args,
            Some(vec!["-H".to_string(), "127.0.0.1".to_string()])
        );
        assert!(config.log_commands);
    }
}
