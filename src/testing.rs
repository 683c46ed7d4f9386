//! 测试用的脚本化 `CommandRunner`，从不真正启动 adb

use crate::cmd::{CommandResult, CommandRunner};
use crate::error::{ADBError, ADBResult};
use std::cell::RefCell;

#[derive(Default)]
pub(crate) struct FakeRunner {
    calls: RefCell<Vec<Vec<String>>>,
    responses: Vec<(String, String)>,
    failures: Vec<String>,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 命令行包含 `needle` 时返回 `stdout`，先注册的优先
    pub(crate) fn respond(mut self, needle: &str, stdout: &str) -> Self {
        self.responses.push((needle.to_string(), stdout.to_string()));
        self
    }

    /// 命令行包含 `needle` 时模拟进程无法启动
    pub(crate) fn fail_on(mut self, needle: &str) -> Self {
        self.failures.push(needle.to_string());
        self
    }

    /// 以空格拼接的全部调用
    pub(crate) fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|args| args.join(" ")).collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, args: &[String]) -> ADBResult<CommandResult> {
        self.calls.borrow_mut().push(args.to_vec());
        let joined = args.join(" ");

        if self.failures.iter().any(|needle| joined.contains(needle)) {
            return Err(ADBError::CommandError(format!("无法执行 ADB: {}", joined)));
        }

        // pull 时在本地生成文件，模拟从设备拉取
        if let Some(pos) = args.iter().position(|arg| arg == "pull") {
            if let (Some(remote), Some(local)) = (args.get(pos + 1), args.get(pos + 2)) {
                std::fs::write(local, format!("pulled from {}", remote))?;
            }
        }

        let stdout = self
            .responses
            .iter()
            .find(|(needle, _)| joined.contains(needle.as_str()))
            .map(|(_, stdout)| stdout.clone())
            .unwrap_or_default();

        Ok(CommandResult {
            args: args.to_vec(),
            stdout,
            stderr: String::new(),
            exit_code: Some(0),
        })
    }
}
