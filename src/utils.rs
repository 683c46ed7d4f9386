use crate::error::ADBResult;
use chrono::{DateTime, Local};
use log::debug;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// intent 参数中的包名占位符
pub const PACKAGE_PLACEHOLDER: &str = "${package}";

/// bug report 文件名中的时间戳，精确到毫秒
pub fn report_timestamp(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d_%H-%M-%S-%3f").to_string()
}

/// 以 kB 为单位格式化大小，保留两位小数
pub fn format_kb(size_bytes: u64) -> String {
    format!("{:.2}kB", size_bytes as f64 / 1024.0)
}

/// 本地文件大小，文件不存在时为 0
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

/// 将参数中的 `${package}` 替换为实际包名
pub fn substitute_package(args: &[String], package_name: &str) -> Vec<String> {
    args.iter()
        .map(|arg| arg.replace(PACKAGE_PLACEHOLDER, package_name))
        .collect()
}

/// 将若干本地文件打包为 zip，条目名为文件名
pub fn zip_files(zip_path: &Path, files: &[PathBuf]) -> ADBResult<()> {
    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        zip.start_file(name.as_str(), options)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut zip)?;
        debug!("已写入 zip 条目: {}", name);
    }

    zip.finish()?;
    Ok(())
}
