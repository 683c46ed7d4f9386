use crate::app::PackageCommands;
use crate::cmd::{CommandResult, CommandRunner};
use crate::device::ADBDevice;
use crate::dumpsys::PackageInfo;
use crate::error::{ADBError, ADBResult};
use crate::matcher::{PackageFilter, PackageMatcher};
use crate::packages::was_successfully_uninstalled;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::ops::AddAssign;
use std::time::Duration;

/// 启动应用之间的默认间隔
pub const DEFAULT_START_ACTIVITY_DELAY: Duration = Duration::from_secs(5);

/// 一次调用选择的操作模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Uninstall,
    ForceStop,
    Clear,
    Info,
    StartActivity,
    BugReport,
}

impl Mode {
    /// 汇总行中使用的动词
    pub fn past_tense(self) -> &'static str {
        match self {
            Mode::Uninstall => "uninstalled",
            Mode::ForceStop => "stopped",
            Mode::Clear => "cleared",
            Mode::Info => "queried",
            Mode::StartActivity => "started",
            Mode::BugReport => "reported",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Uninstall => "uninstall",
            Mode::ForceStop => "force-stop",
            Mode::Clear => "clear",
            Mode::Info => "info",
            Mode::StartActivity => "start-activity",
            Mode::BugReport => "bugreport",
        };
        write!(f, "{}", name)
    }
}

/// 按包执行的操作参数
#[derive(Debug, Clone)]
pub struct ActionOptions {
    pub mode: Mode,
    pub filter: PackageFilter,
    /// 只列出匹配的包，不执行任何 ADB 命令
    pub dry_run: bool,
    /// 卸载时保留数据和缓存目录
    pub keep_data: bool,
    /// 相邻两次启动应用之间的等待
    pub start_activity_delay: Duration,
}

impl ActionOptions {
    pub fn new(mode: Mode, filter: PackageFilter) -> Self {
        Self {
            mode,
            filter,
            dry_run: false,
            keep_data: false,
            start_activity_delay: DEFAULT_START_ACTIVITY_DELAY,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_keep_data(mut self, keep_data: bool) -> Self {
        self.keep_data = keep_data;
        self
    }

    pub fn with_start_activity_delay(mut self, delay: Duration) -> Self {
        self.start_activity_delay = delay;
        self
    }
}

/// 一次执行的成功/失败计数
///
/// 由 `execute` 按设备返回，调用方累加。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success_count: u32,
    pub failure_count: u32,
}

impl ActionResult {
    pub fn total(&self) -> u32 {
        self.success_count + self.failure_count
    }

    fn record(&mut self, success: bool) {
        if success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
    }
}

impl AddAssign for ActionResult {
    fn add_assign(&mut self, other: Self) {
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
    }
}

/// 单个包的处理结果
struct Outcome {
    success: bool,
    status: String,
}

impl Outcome {
    fn done(status: &str) -> Self {
        Outcome {
            success: true,
            status: status.to_string(),
        }
    }

    fn failed(error: ADBError) -> Self {
        warn!("ADB 调用失败: {}", error);
        Outcome {
            success: false,
            status: format!("\terror: {}", error),
        }
    }
}

type Handler<R> = fn(&R, &ActionOptions, &str, &str, &PackageInfo) -> Outcome;

fn handler_for<R: CommandRunner + ?Sized>(mode: Mode) -> ADBResult<Handler<R>> {
    match mode {
        Mode::Uninstall => Ok(uninstall::<R>),
        Mode::ForceStop => Ok(force_stop::<R>),
        Mode::Clear => Ok(clear::<R>),
        Mode::Info => Ok(info_only::<R>),
        Mode::StartActivity => Ok(start_activity::<R>),
        Mode::BugReport => Err(ADBError::ConfigError(
            "bugreport 不是按包执行的操作".to_string(),
        )),
    }
}

fn uninstall<R: CommandRunner + ?Sized>(
    runner: &R,
    options: &ActionOptions,
    serial: &str,
    package: &str,
    _info: &PackageInfo,
) -> Outcome {
    match runner.uninstall_package(serial, package, options.keep_data) {
        Ok(result) => Outcome {
            success: was_successfully_uninstalled(&result.stdout),
            status: format!("\t{}", result.stdout.trim()),
        },
        Err(e) => Outcome::failed(e),
    }
}

fn force_stop<R: CommandRunner + ?Sized>(
    runner: &R,
    _options: &ActionOptions,
    serial: &str,
    package: &str,
    _info: &PackageInfo,
) -> Outcome {
    completed(runner.force_stop(serial, package), "\tstopped")
}

fn clear<R: CommandRunner + ?Sized>(
    runner: &R,
    _options: &ActionOptions,
    serial: &str,
    package: &str,
    _info: &PackageInfo,
) -> Outcome {
    completed(runner.clear_data(serial, package), "\tdata cleared")
}

fn info_only<R: CommandRunner + ?Sized>(
    _runner: &R,
    _options: &ActionOptions,
    _serial: &str,
    _package: &str,
    info: &PackageInfo,
) -> Outcome {
    Outcome::done(&format!("\n{}", info.full_description()))
}

fn start_activity<R: CommandRunner + ?Sized>(
    runner: &R,
    _options: &ActionOptions,
    serial: &str,
    package: &str,
    _info: &PackageInfo,
) -> Outcome {
    completed(runner.launch_app(serial, package), "\tstarting app")
}

// 进程能启动即视为成功，输出不做检查
fn completed(result: ADBResult<CommandResult>, status: &str) -> Outcome {
    match result {
        Ok(_) => Outcome::done(status),
        Err(e) => Outcome::failed(e),
    }
}

/// 对一台设备上匹配的包执行所选操作
///
/// * `dry_run`：只输出 `skip`，不调用 ADB，也不计数；
/// * `preview`：每个匹配的包都计为成功，不调用 ADB；
/// * 其余情况先读取包信息（失败不影响后续），再按模式执行。
///
/// 单个包的失败只计入 `failure_count`，不会中断；只有写输出失败或
/// 传入 `Mode::BugReport` 时返回错误。
pub fn execute<R, W>(
    runner: &R,
    options: &ActionOptions,
    device: &ADBDevice,
    all_packages: &[String],
    preview: bool,
    out: &mut W,
) -> ADBResult<ActionResult>
where
    R: CommandRunner + ?Sized,
    W: Write + ?Sized,
{
    let handler = handler_for::<R>(options.mode)?;
    let filtered = PackageMatcher::new(all_packages).find_matches(&options.filter);
    let serial = device.serial.as_str();
    let live = !options.dry_run && !preview;

    info!(
        "设备 {} 上有 {} 个应用匹配 '{}'",
        device,
        filtered.len(),
        options.filter
    );

    if live && matches!(options.mode, Mode::StartActivity | Mode::ForceStop) {
        if let Err(e) = runner.wake_screen(serial) {
            warn!("无法唤醒设备 {} 的屏幕: {}", serial, e);
        }
    }

    let mut result = ActionResult::default();

    for (index, package) in filtered.iter().enumerate() {
        if options.dry_run {
            writeln!(out, "\t{}\tskip", package)?;
            continue;
        }

        if preview {
            writeln!(out, "\t{}", package)?;
            result.success_count += 1;
            continue;
        }

        let info = runner.package_info(serial, package);
        let outcome = handler(runner, options, serial, package, &info);
        result.record(outcome.success);
        writeln!(out, "\t{}{}{}", package, info.short_description(), outcome.status)?;

        if options.mode == Mode::StartActivity && index + 1 < filtered.len() {
            debug!("等待 {:?} 后启动下一个应用", options.start_activity_delay);
            std::thread::sleep(options.start_activity_delay);
        }
    }

    if filtered.is_empty() {
        writeln!(out, "\t No apps found for given filter")?;
    }

    Ok(result)
}
