//! 查找 ADB 可执行文件
//!
//! 顺序：显式路径 → `ANDROID_HOME` / `ANDROID_SDK_ROOT` 下的 platform-tools → `PATH`。

use crate::error::{ADBError, ADBResult};
use log::debug;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// 用于定位 SDK 的环境变量
const SDK_ENV_VARS: [&str; 2] = ["ANDROID_HOME", "ANDROID_SDK_ROOT"];

#[cfg(windows)]
const ADB_EXECUTABLE: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_EXECUTABLE: &str = "adb";

/// 去掉包裹路径的引号和空白
pub fn normalize_command_path(value: &str) -> String {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|candidate| candidate.strip_suffix(quote))
        {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// 使用当前进程环境定位 ADB
pub fn locate_adb(explicit: Option<&str>) -> ADBResult<PathBuf> {
    let sdk_roots: Vec<PathBuf> = SDK_ENV_VARS
        .iter()
        .filter_map(|var| env::var_os(var))
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .collect();

    locate_adb_in(explicit, &sdk_roots, env::var_os("PATH"))
}

/// 在给定的 SDK 根目录和 PATH 中定位 ADB
pub fn locate_adb_in(
    explicit: Option<&str>,
    sdk_roots: &[PathBuf],
    path_var: Option<OsString>,
) -> ADBResult<PathBuf> {
    if let Some(explicit) = explicit {
        let normalized = normalize_command_path(explicit);
        if !normalized.is_empty() {
            return validate_explicit(Path::new(&normalized));
        }
    }

    for root in sdk_roots {
        let candidate = root.join("platform-tools").join(ADB_EXECUTABLE);
        if candidate.is_file() {
            debug!("在 SDK 目录中找到 ADB: {}", candidate.display());
            return Ok(candidate);
        }
    }

    if let Some(path_var) = path_var {
        let cwd = env::current_dir()?;
        match which::which_in(ADB_EXECUTABLE, Some(path_var), cwd) {
            Ok(candidate) => {
                debug!("在 PATH 中找到 ADB: {}", candidate.display());
                return Ok(candidate);
            }
            Err(e) => debug!("PATH 中没有可执行的 ADB: {}", e),
        }
    }

    Err(ADBError::AdbNotFound(
        "请安装 Android platform-tools，设置 ANDROID_HOME，或通过 --adb-path 指定".to_string(),
    ))
}

fn validate_explicit(path: &Path) -> ADBResult<PathBuf> {
    if path.is_dir() {
        return Err(ADBError::AdbNotFound(format!(
            "{} 是目录而不是可执行文件",
            path.display()
        )));
    }
    if !path.exists() {
        return Err(ADBError::AdbNotFound(format!("{} 不存在", path.display())));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_executable(path: &Path) {
        fs::write(path, b"#!/bin/sh\n").expect("write");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
        }
    }

    #[test]
    fn strips_wrapping_quotes() {
        assert_eq!(
            normalize_command_path("  \"/opt/android/platform-tools/adb\"  "),
            "/opt/android/platform-tools/adb"
        );
        assert_eq!(
            normalize_command_path("'/opt/android/platform-tools/adb'"),
            "/opt/android/platform-tools/adb"
        );
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = locate_adb_in(Some("/this/path/should/not/exist/adb"), &[], None).unwrap_err();
        assert!(matches!(err, ADBError::AdbNotFound(_)));
    }

    #[test]
    fn explicit_directory_is_rejected() {
        let dir = TempDir::new().expect("tmp");
        let path = dir.path().to_string_lossy().to_string();
        assert!(locate_adb_in(Some(&path), &[], None).is_err());
    }

    #[test]
    fn explicit_file_wins() {
        let dir = TempDir::new().expect("tmp");
        let adb = dir.path().join("my-adb");
        fs::write(&adb, b"").expect("write");

        let found = locate_adb_in(Some(&adb.to_string_lossy()), &[], None).unwrap();
        assert_eq!(found, adb);
    }

    #[test]
    fn finds_adb_under_sdk_root() {
        let sdk = TempDir::new().expect("tmp");
        let tools = sdk.path().join("platform-tools");
        fs::create_dir_all(&tools).expect("mkdir");
        fs::write(tools.join(ADB_EXECUTABLE), b"").expect("write");

        let found = locate_adb_in(None, &[sdk.path().to_path_buf()], None).unwrap();
        assert_eq!(found, tools.join(ADB_EXECUTABLE));
    }

    #[test]
    fn falls_back_to_path_variable() {
        let empty = TempDir::new().expect("tmp");
        let bin = TempDir::new().expect("tmp");
        write_executable(&bin.path().join(ADB_EXECUTABLE));

        let path_var = env::join_paths([empty.path(), bin.path()]).expect("join");
        let found = locate_adb_in(None, &[], Some(path_var)).unwrap();
        assert_eq!(found, bin.path().join(ADB_EXECUTABLE));
    }

    #[cfg(unix)]
    #[test]
    fn skips_non_executable_adb_on_path() {
        use std::os::unix::fs::PermissionsExt;

        let plain = TempDir::new().expect("tmp");
        let stale = plain.path().join(ADB_EXECUTABLE);
        fs::write(&stale, b"").expect("write");
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).expect("chmod");

        let bin = TempDir::new().expect("tmp");
        write_executable(&bin.path().join(ADB_EXECUTABLE));

        let path_var = env::join_paths([plain.path(), bin.path()]).expect("join");
        let found = locate_adb_in(None, &[], Some(path_var)).unwrap();
        assert_eq!(found, bin.path().join(ADB_EXECUTABLE));
    }

    #[cfg(unix)]
    #[test]
    fn only_non_executable_adb_is_not_found() {
        use std::os::unix::fs::PermissionsExt;

        let plain = TempDir::new().expect("tmp");
        let stale = plain.path().join(ADB_EXECUTABLE);
        fs::write(&stale, b"").expect("write");
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).expect("chmod");

        let path_var = env::join_paths([plain.path()]).expect("join");
        let err = locate_adb_in(None, &[], Some(path_var)).unwrap_err();
        assert!(matches!(err, ADBError::AdbNotFound(_)));
    }

    #[test]
    fn nothing_found_is_fatal() {
        let empty = TempDir::new().expect("tmp");
        let err = locate_adb_in(None, &[empty.path().to_path_buf()], None).unwrap_err();
        assert!(matches!(err, ADBError::AdbNotFound(_)));
    }
}
