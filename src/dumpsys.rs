use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// `Package [com.example] (a1b2c3d):`
static PACKAGE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*Package \[([^\]]+)\] \(([^)]*)\):").expect("包头正则表达式无效")
});

/// 从 `dumpsys package` 中提取的包信息
///
/// 所有字段在找不到时保持默认值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub package_name: String,
    pub version_name: String,
    pub version_code: u64,
    pub first_install_time: String,
    pub last_update_time: String,
    pub code_path: String,
    /// dumpsys 包头中的标识哈希，仅用于展示
    pub pkg_hash: String,
}

impl PackageInfo {
    /// 创建新的包信息实例
    pub fn new(package_name: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            ..Self::default()
        }
    }

    /// 是否解析到了任何字段
    pub fn is_empty(&self) -> bool {
        self.version_name.is_empty()
            && self.version_code == 0
            && self.first_install_time.is_empty()
            && self.code_path.is_empty()
    }

    /// 简短描述，例如 ` (v1.2.3)`；没有版本名时为空
    pub fn short_description(&self) -> String {
        if self.version_name.is_empty() {
            return String::new();
        }

        let prefix = if self.version_name.starts_with('v') { "" } else { "v" };
        format!(" ({}{})", prefix, self.version_name)
    }

    /// info 模式下输出的完整描述
    pub fn full_description(&self) -> String {
        if self.is_empty() {
            return "\t\tcould not read package info".to_string();
        }

        format!(
            "\t\tversionCode: {} ({})\n\t\tpath: {}\n\t\tinstallTime: {}",
            self.version_code, self.pkg_hash, self.code_path, self.first_install_time
        )
    }
}

/// 解析 `dumpsys package <package>` 的输出
///
/// 优先只看目标包自己的块（直到下一个 `Package [` 头）；找不到包头时扫描全文。
/// 同名字段以第一次出现为准。输入为空或格式不对时返回默认值，从不报错。
pub fn parse_dumpsys_package(package_name: &str, output: &str) -> PackageInfo {
    let mut info = PackageInfo::new(package_name);
    let lines: Vec<&str> = output.lines().collect();

    let header = lines.iter().position(|line| {
        PACKAGE_HEADER
            .captures(line)
            .map_or(false, |caps| &caps[1] == package_name)
    });

    let block: &[&str] = match header {
        Some(index) => {
            if let Some(caps) = PACKAGE_HEADER.captures(lines[index]) {
                info.pkg_hash = caps[2].to_string();
            }

            let rest = &lines[index + 1..];
            let end = rest
                .iter()
                .position(|line| PACKAGE_HEADER.is_match(line))
                .unwrap_or(rest.len());
            &rest[..end]
        }
        None => &lines,
    };

    for line in block {
        let line = line.trim();

        if let Some(value) = line.strip_prefix("versionName=") {
            set_once(&mut info.version_name, value);
        } else if let Some(value) = line.strip_prefix("versionCode=") {
            if info.version_code == 0 {
                info.version_code = value
                    .split_whitespace()
                    .next()
                    .and_then(|code| code.parse().ok())
                    .unwrap_or(0);
            }
        } else if let Some(value) = line.strip_prefix("firstInstallTime=") {
            set_once(&mut info.first_install_time, value);
        } else if let Some(value) = line.strip_prefix("lastUpdateTime=") {
            set_once(&mut info.last_update_time, value);
        } else if let Some(value) = line.strip_prefix("codePath=") {
            set_once(&mut info.code_path, value);
        }
    }

    info
}

fn set_once(field: &mut String, value: &str) {
    if field.is_empty() {
        *field = value.trim().to_string();
    }
}
