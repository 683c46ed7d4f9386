use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ADBConfig;

/// 设备型号未知时使用的占位名
pub const UNKNOWN_MODEL: &str = "unknown";

/// ADB 设备状态枚举
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Online,
    Offline,
    Unauthorized,
    Recovery,
    Sideload,
    Bootloader,
    Other(String),
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Online => write!(f, "online"),
            DeviceStatus::Offline => write!(f, "offline"),
            DeviceStatus::Unauthorized => write!(f, "unauthorized"),
            DeviceStatus::Recovery => write!(f, "recovery"),
            DeviceStatus::Sideload => write!(f, "sideload"),
            DeviceStatus::Bootloader => write!(f, "bootloader"),
            DeviceStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for DeviceStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "device" | "online" => DeviceStatus::Online,
            "offline" => DeviceStatus::Offline,
            "unauthorized" => DeviceStatus::Unauthorized,
            "recovery" => DeviceStatus::Recovery,
            "sideload" => DeviceStatus::Sideload,
            "bootloader" | "fastboot" => DeviceStatus::Bootloader,
            _ => DeviceStatus::Other(s.to_string()),
        }
    }
}

/// ADB 设备结构体
///
/// 每次调用时通过 `adb devices -l` 重新发现，不做持久化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ADBDevice {
    pub serial: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub status: DeviceStatus,
}

impl ADBDevice {
    /// 创建新设备实例
    pub fn new(serial: &str, status: impl Into<DeviceStatus>) -> Self {
        Self {
            serial: serial.to_string(),
            model: UNKNOWN_MODEL.to_string(),
            product: None,
            status: status.into(),
        }
    }

    /// 检查设备是否在线
    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }

    /// 型号是否已知
    pub fn has_model(&self) -> bool {
        self.model != UNKNOWN_MODEL
    }

    /// 设置设备型号
    pub fn with_model(mut self, model: &str) -> Self {
        let model = model.trim();
        if !model.is_empty() {
            self.model = model.to_string();
        }
        self
    }

    /// 设置设备产品信息
    pub fn with_product(mut self, product: &str) -> Self {
        self.product = Some(product.to_string());
        self
    }
}

impl fmt::Display for ADBDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.model, self.serial)
    }
}

/// 解析 `adb devices -l` 的输出
///
/// 跳过标题行和 daemon 提示行；`model:` 与 `product:` 字段可选。
pub fn parse_devices(output: &str) -> Vec<ADBDevice> {
    let mut devices = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("List of devices") || line.starts_with('*') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let mut device = ADBDevice::new(parts[0], parts[1]);

        if let Some(model_part) = parts.iter().find(|p| p.starts_with("model:")) {
            device = device.with_model(model_part.trim_start_matches("model:"));
        }

        if let Some(product_part) = parts.iter().find(|p| p.starts_with("product:")) {
            device = device.with_product(product_part.trim_start_matches("product:"));
        }

        devices.push(device);
    }

    devices
}

/// ADB 主结构体
#[derive(Clone, Debug, Default)]
pub struct ADB {
    pub config: ADBConfig,
}

impl ADB {
    /// 创建新的 ADB 实例
    pub fn new(config: Option<ADBConfig>) -> Self {
        Self {
            config: config.unwrap_or_default(),
        }
    }

    /// 获取 ADB 路径
    pub fn adb_path(&self) -> &std::path::Path {
        &self.config.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_device_listing() {
        let output = "List of devices attached\n\
            emulator-5554          device product:sdk_gphone64 model:sdk_gphone64_arm64 device:emu64a transport_id:1\n\
            0A1B2C3D               unauthorized usb:1-1 transport_id:2\n\
            \n";

        let devices = parse_devices(output);
        assert_eq!(devices.len(), 2);

        assert_eq!(devices[0].serial, "emulator-5554");
        assert_eq!(devices[0].model, "sdk_gphone64_arm64");
        assert_eq!(devices[0].product.as_deref(), Some("sdk_gphone64"));
        assert!(devices[0].is_online());

        assert_eq!(devices[1].serial, "0A1B2C3D");
        assert_eq!(devices[1].status, DeviceStatus::Unauthorized);
        assert!(!devices[1].has_model());
    }

    #[test]
    fn skips_daemon_banner_lines() {
        let output = "* daemon not running; starting now at tcp:5037\n\
            * daemon started successfully\n\
            List of devices attached\n\
            X\tdevice\n";

        let devices = parse_devices(output);
        assert_eq!(devices, vec![ADBDevice::new("X", "device")]);
    }

    #[test]
    fn blank_model_keeps_placeholder() {
        let device = ADBDevice::new("X", DeviceStatus::Online).with_model("  ");
        assert_eq!(device.model, UNKNOWN_MODEL);
        assert_eq!(device.to_string(), "unknown [X]");
    }
}
