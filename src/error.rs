use thiserror::Error;

/// uber-adb 操作相关的错误类型
#[derive(Debug, Error)]
pub enum ADBError {
    /// ADB 命令执行错误
    #[error("ADB 命令错误: {0}")]
    CommandError(String),

    /// 设备通信错误
    #[error("设备通信错误: {0}")]
    DeviceError(String),

    /// 设备不存在
    #[error("设备不存在: {0}")]
    DeviceNotFound(String),

    /// 找不到 ADB 可执行文件
    #[error("找不到 ADB 可执行文件: {0}")]
    AdbNotFound(String),

    /// 文件操作错误
    #[error("文件操作错误: {0}")]
    FileError(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// bug report 生成失败
    #[error("bug report 生成失败: {0}")]
    BugReportError(String),
}

// 为标准错误类型实现 From trait，简化错误处理
impl From<std::io::Error> for ADBError {
    fn from(error: std::io::Error) -> Self {
        ADBError::FileError(error.to_string())
    }
}

impl From<zip::result::ZipError> for ADBError {
    fn from(error: zip::result::ZipError) -> Self {
        ADBError::FileError(format!("zip 写入错误: {}", error))
    }
}

impl From<glob::PatternError> for ADBError {
    fn from(error: glob::PatternError) -> Self {
        ADBError::ParseError(format!("包名过滤表达式错误: {}", error))
    }
}

// 添加结果类型别名简化使用
pub type ADBResult<T> = Result<T, ADBError>;
