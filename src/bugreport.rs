use crate::app::PackageCommands;
use crate::cmd::{CommandResult, CommandRunner};
use crate::device::ADBDevice;
use crate::error::{ADBError, ADBResult};
use crate::matcher::{PackageFilter, PackageMatcher};
use crate::media::MediaCommands;
use crate::resource::ResourceManager;
use crate::utils::{file_size, format_kb, report_timestamp, substitute_package, zip_files};
use chrono::Local;
use log::{info, warn};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 设备上截图的临时路径
pub const DEVICE_SCREENSHOT_PATH: &str = "/sdcard/bugreport_tempfile_screenshot.png";
/// 设备上 logcat 转储的临时路径
pub const DEVICE_LOGCAT_PATH: &str = "/sdcard/bugreport_tempfile_logcat";
/// 两条 intent 命令之间留给设备的时间
pub const DEFAULT_INTENT_DELAY: Duration = Duration::from_millis(100);

/// 生成 bug report 之前对匹配的包执行的 `am` 命令
///
/// 参数中的 `${package}` 会被替换为包名。
#[derive(Debug, Clone)]
pub struct IntentCommand {
    pub filter: PackageFilter,
    pub args: Vec<String>,
}

impl IntentCommand {
    /// 从命令行值解析：第一个是包名过滤表达式，其余是 `am` 参数
    pub fn parse(values: &[String]) -> ADBResult<Self> {
        match values {
            [filter, args @ ..] if !args.is_empty() => Ok(IntentCommand {
                filter: PackageFilter::parse(filter)?,
                args: args.to_vec(),
            }),
            _ => Err(ADBError::ConfigError(
                "intent 需要一个包名过滤表达式和至少一个 am 参数".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BugReportOptions {
    /// 输出目录，默认为当前工作目录
    pub output_dir: Option<PathBuf>,
    pub intent: Option<IntentCommand>,
    pub intent_delay: Duration,
}

impl Default for BugReportOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            intent: None,
            intent_delay: DEFAULT_INTENT_DELAY,
        }
    }
}

/// 生成的 bug report
#[derive(Debug, Clone)]
pub struct BugReport {
    pub zip_path: PathBuf,
    pub executed_commands: Vec<CommandResult>,
}

/// 为一台设备生成 bug report
///
/// 依次执行 intent 命令、唤醒屏幕、截图、转储 logcat，拉取到本地后打包为
/// `bugreport-<model>-<timestamp>.zip`，并删除设备上和本地的临时文件。
/// 输出目录无法创建或 zip 未生成时返回错误。
pub fn create<R, W>(
    runner: &R,
    options: &BugReportOptions,
    device: &ADBDevice,
    all_packages: &[String],
    out: &mut W,
) -> ADBResult<BugReport>
where
    R: CommandRunner + ?Sized,
    W: Write + ?Sized,
{
    writeln!(out, "create bug report:")?;

    let serial = device.serial.as_str();
    let timestamp = report_timestamp(&Local::now());
    let out_dir = prepare_output_dir(options.output_dir.as_deref())?;
    let mut executed = Vec::new();

    if let Some(intent) = &options.intent {
        for package in PackageMatcher::new(all_packages).find_matches(&intent.filter) {
            let args = substitute_package(&intent.args, &package);
            executed.push(runner.activity_manager(serial, &args)?);
            writeln!(
                out,
                "\texecute command for {} - adb shell am [{}]",
                package,
                args.join(", ")
            )?;
            std::thread::sleep(options.intent_delay);
        }
    }

    let model = file_name_safe(&device.model);
    let local_screenshot = out_dir.join(format!("screen-{}-{}.png", model, timestamp));
    let local_logcat = out_dir.join(format!("logcat-{}-{}.txt", model, timestamp));
    let zip_path = out_dir.join(format!("bugreport-{}-{}.zip", model, timestamp));

    let mut resources = ResourceManager::new(runner, serial);

    writeln!(out, "\twake up screen and take screenshot")?;
    executed.push(runner.wake_screen(serial)?);
    resources.track_remote(DEVICE_SCREENSHOT_PATH);
    executed.push(runner.screencap(serial, DEVICE_SCREENSHOT_PATH)?);
    resources.track_local(&local_screenshot);
    executed.push(runner.pull(serial, DEVICE_SCREENSHOT_PATH, &local_screenshot)?);

    writeln!(out, "\tcreate logcat file and pull from device")?;
    resources.track_remote(DEVICE_LOGCAT_PATH);
    executed.push(runner.logcat_dump(serial, DEVICE_LOGCAT_PATH)?);
    resources.track_local(&local_logcat);
    executed.push(runner.pull(serial, DEVICE_LOGCAT_PATH, &local_logcat)?);

    writeln!(
        out,
        "\t{} screenshot, {} logcat",
        format_kb(file_size(&local_screenshot)),
        format_kb(file_size(&local_logcat))
    )?;

    match resources.cleanup_remote() {
        Ok(results) => executed.extend(results),
        Err(e) => warn!("{}", e),
    }

    zip_files(&zip_path, &[local_screenshot, local_logcat]).map_err(|e| {
        ADBError::BugReportError(format!("could not create zip file {}: {}", zip_path.display(), e))
    })?;

    if let Err(e) = resources.cleanup_local() {
        warn!("{}", e);
    }

    if !zip_path.is_file() {
        return Err(ADBError::BugReportError(format!(
            "could not create zip file {}",
            zip_path.display()
        )));
    }

    writeln!(
        out,
        "\ttemp files removed and zip {} ({}) created",
        zip_path.display(),
        format_kb(file_size(&zip_path))
    )?;
    info!("设备 {} 的 bug report 用时 {:?}", device, resources.elapsed());

    Ok(BugReport {
        zip_path,
        executed_commands: executed,
    })
}

/// 确定输出目录，不存在时创建
fn prepare_output_dir(output_dir: Option<&Path>) -> ADBResult<PathBuf> {
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir()?,
    };

    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|e| {
            ADBError::FileError(format!("could not create directory {}: {}", dir.display(), e))
        })?;
    } else if !dir.is_dir() {
        return Err(ADBError::FileError(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    Ok(dir)
}

// 型号可能包含空格或路径分隔符
fn file_name_safe(model: &str) -> String {
    model
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
