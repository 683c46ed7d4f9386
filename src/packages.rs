use std::collections::HashSet;

/// `pm list packages` 每行的前缀
const PACKAGE_PREFIX: &str = "package:";

/// 卸载成功时 pm 输出的标记
const SUCCESS_TOKEN: &str = "Success";

/// 解析 `pm list packages` 输出为去重的包名列表，保持首次出现的顺序
///
/// 兼容 `-f` 格式 (`package:/data/app/base.apk=com.example`)。
pub fn parse_installed_packages(output: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for line in output.lines() {
        let Some(entry) = line.trim().strip_prefix(PACKAGE_PREFIX) else {
            continue;
        };

        let package = entry.rsplit('=').next().unwrap_or(entry).trim();
        if package.is_empty() {
            continue;
        }

        if seen.insert(package.to_string()) {
            packages.push(package.to_string());
        }
    }

    packages
}

/// 根据 stdout 判断卸载是否成功
///
/// 只认 `Success`，出现 `Failure`/`Error` 行或其他任何内容都视为失败。
/// 本地化或改写过的成功提示会被误判为失败。
pub fn was_successfully_uninstalled(stdout: &str) -> bool {
    if !stdout.contains(SUCCESS_TOKEN) {
        return false;
    }

    !stdout.lines().map(str::trim).any(|line| {
        line.starts_with("Failure") || line.starts_with("Error") || line.starts_with("Exception")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_and_deduplicates() {
        let output = "package:com.android.chrome\r\npackage:com.example.b\n\npackage:com.android.chrome\nWARNING: linker\npackage:com.example.a\n";
        assert_eq!(
            parse_installed_packages(output),
            vec!["com.android.chrome", "com.example.b", "com.example.a"]
        );
    }

    #[test]
    fn handles_file_listing_format() {
        let output = "package:/data/app/~~x==/com.example-1/base.apk=com.example\n";
        assert_eq!(parse_installed_packages(output), vec!["com.example"]);
    }

    #[test]
    fn empty_listing() {
        assert!(parse_installed_packages("").is_empty());
    }

    #[test]
    fn success_token_means_uninstalled() {
        assert!(was_successfully_uninstalled("Success\n"));
        assert!(was_successfully_uninstalled("  Success  "));
    }

    #[test]
    fn failure_output_is_not_success() {
        assert!(!was_successfully_uninstalled(
            "Failure [DELETE_FAILED_INTERNAL_ERROR]\n"
        ));
        assert!(!was_successfully_uninstalled(
            "Failure [not installed for 0]"
        ));
    }

    #[test]
    fn anything_else_fails_closed() {
        assert!(!was_successfully_uninstalled(""));
        assert!(!was_successfully_uninstalled("Erfolg"));
        assert!(!was_successfully_uninstalled("Success\nError: something went wrong"));
    }
}
