use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use uber_adb::bugreport::{self, DEFAULT_INTENT_DELAY};
use uber_adb::prelude::*;
use uber_adb::{action, locator, IntentCommand};

#[derive(Parser)]
#[command(name = "uber-adb")]
#[command(about = "在一台或多台 Android 设备上批量管理应用，或生成 bug report", long_about = None)]
#[command(version)]
struct Cli {
    /// ADB 可执行文件路径，默认从 ANDROID_HOME 或 PATH 中查找
    #[arg(long, global = true, value_name = "PATH")]
    adb_path: Option<String>,

    /// 只操作指定序列号的设备
    #[arg(short = 's', long, global = true)]
    serial: Option<String>,

    /// 只列出匹配的应用，不执行任何操作
    #[arg(long, global = true)]
    dry_run: bool,

    /// 卸载前不再确认
    #[arg(short, long, global = true)]
    force: bool,

    /// 不输出每个应用的处理结果
    #[arg(short, long, global = true)]
    quiet: bool,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    /// 记录每一条 ADB 调用
    #[arg(long, global = true)]
    log_commands: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 卸载匹配的应用
    Uninstall {
        /// 包名过滤表达式，例如 `com.example.*,!com.example.keep`
        filter: String,
        /// 保留数据和缓存目录
        #[arg(short, long)]
        keep_data: bool,
    },
    /// 强制停止匹配的应用
    ForceStop {
        /// 包名过滤表达式
        filter: String,
    },
    /// 清除匹配应用的数据
    Clear {
        /// 包名过滤表达式
        filter: String,
    },
    /// 显示匹配应用的版本、路径和安装时间
    Info {
        /// 包名过滤表达式
        filter: String,
    },
    /// 依次启动匹配的应用
    Start {
        /// 包名过滤表达式
        filter: String,
        /// 启动两个应用之间等待的秒数
        #[arg(long, default_value_t = 5)]
        delay_sec: u64,
    },
    /// 截图并导出 logcat，打包为 zip
    Bugreport {
        /// 输出目录，默认当前目录
        output_dir: Option<PathBuf>,
        /// 生成前对匹配的应用执行 `adb shell am`：过滤表达式后跟 am 参数，`${package}` 会被替换
        #[arg(long, num_args = 2.., value_name = "FILTER ARGS", allow_hyphen_values = true)]
        intent: Option<Vec<String>>,
    },
}

impl Commands {
    fn mode(&self) -> Mode {
        match self {
            Commands::Uninstall { .. } => Mode::Uninstall,
            Commands::ForceStop { .. } => Mode::ForceStop,
            Commands::Clear { .. } => Mode::Clear,
            Commands::Info { .. } => Mode::Info,
            Commands::Start { .. } => Mode::StartActivity,
            Commands::Bugreport { .. } => Mode::BugReport,
        }
    }

    fn action_options(&self, dry_run: bool) -> ADBResult<Option<ActionOptions>> {
        let (filter, keep_data, delay) = match self {
            Commands::Uninstall { filter, keep_data } => (filter, *keep_data, None),
            Commands::ForceStop { filter }
            | Commands::Clear { filter }
            | Commands::Info { filter } => (filter, false, None),
            Commands::Start { filter, delay_sec } => {
                (filter, false, Some(Duration::from_secs(*delay_sec)))
            }
            Commands::Bugreport { .. } => return Ok(None),
        };

        let mut options = ActionOptions::new(self.mode(), PackageFilter::parse(filter)?)
            .with_dry_run(dry_run)
            .with_keep_data(keep_data);
        if let Some(delay) = delay {
            options = options.with_start_activity_delay(delay);
        }
        Ok(Some(options))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> ADBResult<()> {
    let adb_path = locator::locate_adb(cli.adb_path.as_deref())?;
    let config = ADBConfig::builder()
        .path(adb_path)
        .log_commands(cli.log_commands)
        .build();
    let adb = ADB::new(Some(config));

    info!("使用 {} ({})", adb.adb_path().display(), adb.check_adb()?);

    let devices = select_devices(&adb, cli.serial.as_deref())?;
    let mut out: Box<dyn Write> = if cli.quiet {
        Box::new(io::sink())
    } else {
        Box::new(io::stdout())
    };

    match (&cli.command, cli.command.action_options(cli.dry_run)?) {
        (Commands::Bugreport { output_dir, intent }, _) => {
            let options = BugReportOptions {
                output_dir: output_dir.clone(),
                intent: intent.as_deref().map(IntentCommand::parse).transpose()?,
                intent_delay: DEFAULT_INTENT_DELAY,
            };
            run_bug_reports(&adb, &options, &devices, &mut *out)
        }
        (_, Some(options)) => run_package_action(&adb, &options, &devices, cli.force, &mut *out),
        (_, None) => Err(ADBError::ConfigError("缺少操作参数".to_string())),
    }
}

/// 选出要操作的设备：指定序列号时只取该设备，否则取全部在线设备
fn select_devices(adb: &ADB, serial: Option<&str>) -> ADBResult<Vec<ADBDevice>> {
    let devices = adb.list_devices()?;

    if let Some(serial) = serial {
        return match devices.into_iter().find(|device| device.serial == serial) {
            Some(device) if device.is_online() => Ok(vec![device]),
            Some(device) => Err(ADBError::DeviceError(format!(
                "设备 {} 当前状态为 {}",
                serial, device.status
            ))),
            None => Err(ADBError::DeviceNotFound(serial.to_string())),
        };
    }

    let (online, others): (Vec<ADBDevice>, Vec<ADBDevice>) =
        devices.into_iter().partition(ADBDevice::is_online);

    for device in &others {
        warn!("跳过设备 {}: {}", device.serial, device.status);
    }

    if online.is_empty() {
        return Err(ADBError::DeviceNotFound("没有在线的设备".to_string()));
    }

    Ok(online)
}

fn run_package_action(
    adb: &ADB,
    options: &ActionOptions,
    devices: &[ADBDevice],
    force: bool,
    out: &mut dyn Write,
) -> ADBResult<()> {
    let mut installed = Vec::with_capacity(devices.len());
    for device in devices {
        installed.push(adb.installed_packages(&device.serial)?);
    }

    if options.mode == Mode::Uninstall && !options.dry_run && !force {
        // 确认前总是列出将被卸载的应用，即使指定了 --quiet
        let preview = preview_uninstall(adb, options, devices, &installed, &mut io::stdout())?;

        if preview.success_count == 0 {
            return Ok(());
        }

        let question = format!(
            "{} apps would be uninstalled on {} device(s). Continue? [y/N] ",
            preview.success_count,
            devices.len()
        );
        if !confirm(&question)? {
            writeln!(out, "aborted, nothing was uninstalled")?;
            return Ok(());
        }
    }

    let mut total = ActionResult::default();
    for (device, packages) in devices.iter().zip(&installed) {
        writeln!(out, "{}", device)?;
        total += action::execute(adb, options, device, packages, false, &mut *out)?;
    }

    if options.dry_run {
        writeln!(out, "dry run, nothing was changed")?;
    } else {
        writeln!(
            out,
            "{} apps {}, {} failures",
            total.success_count,
            options.mode.past_tense(),
            total.failure_count
        )?;
    }

    info!("{} 执行完成: {:?}", options.mode, total);
    Ok(())
}

/// 列出每台设备上将被卸载的应用，不调用 ADB
fn preview_uninstall(
    adb: &ADB,
    options: &ActionOptions,
    devices: &[ADBDevice],
    installed: &[Vec<String>],
    out: &mut dyn Write,
) -> ADBResult<ActionResult> {
    let mut preview = ActionResult::default();
    for (device, packages) in devices.iter().zip(installed) {
        writeln!(out, "{}", device)?;
        preview += action::execute(adb, options, device, packages, true, &mut *out)?;
    }
    Ok(preview)
}

fn run_bug_reports(
    adb: &ADB,
    options: &BugReportOptions,
    devices: &[ADBDevice],
    out: &mut dyn Write,
) -> ADBResult<()> {
    let mut reports = Vec::with_capacity(devices.len());

    for device in devices {
        writeln!(out, "{}", device)?;

        // 只有需要执行 intent 时才列出应用
        let packages = if options.intent.is_some() {
            adb.installed_packages(&device.serial)?
        } else {
            Vec::new()
        };

        let report = bugreport::create(adb, options, device, &packages, &mut *out)?;
        reports.push(report.zip_path);
    }

    writeln!(out, "{} bug report(s) created", reports.len())?;
    Ok(())
}

/// 在终端上确认，只有 `y`/`yes` 视为同意
fn confirm(question: &str) -> ADBResult<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", question)?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninstall_preview_lists_matches_per_device() {
        let adb = ADB::new(Some(ADBConfig::builder().path("/nonexistent/adb").build()));
        let options = ActionOptions::new(Mode::Uninstall, PackageFilter::parse("com.*").unwrap());
        let devices = vec![
            ADBDevice::new("A", "device").with_model("Pixel"),
            ADBDevice::new("B", "device").with_model("Nokia"),
        ];
        let installed = vec![
            vec!["com.a".to_string(), "org.c".to_string()],
            vec!["com.b".to_string()],
        ];
        let mut out = Vec::new();

        let preview = preview_uninstall(&adb, &options, &devices, &installed, &mut out).unwrap();

        assert_eq!(preview.success_count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Pixel [A]\n\tcom.a\nNokia [B]\n\tcom.b\n"
        );
    }
}
