use crate::error::{ADBError, ADBResult};
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// 包名匹配不区分大小写
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// 包名过滤表达式
///
/// 以 `,` 或 `+` 分隔的若干 glob 片段，`!` 开头的片段表示排除。
/// 片段匹配整个包名，`*` 可用于前缀、后缀或子串匹配，例如
/// `com.example.*,*debug*,!com.example.keep`。
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl PackageFilter {
    /// 解析过滤表达式
    pub fn parse(expression: &str) -> ADBResult<Self> {
        let mut filter = PackageFilter::default();

        for token in expression.split([',', '+']).map(str::trim) {
            if token.is_empty() {
                continue;
            }

            match token.strip_prefix('!') {
                Some(excluded) => {
                    let excluded = excluded.trim();
                    if excluded.is_empty() {
                        return Err(ADBError::ParseError(format!(
                            "排除片段为空: {}",
                            expression
                        )));
                    }
                    filter.excludes.push(Pattern::new(excluded)?);
                }
                None => filter.includes.push(Pattern::new(token)?),
            }
        }

        Ok(filter)
    }

    /// 没有任何片段的过滤器不匹配任何包
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// 检查单个包名
    ///
    /// 只有排除片段时，其余所有包都视为包含。
    pub fn matches(&self, package: &str) -> bool {
        if self.is_empty() {
            return false;
        }

        let included = self.includes.is_empty()
            || self
                .includes
                .iter()
                .any(|pattern| pattern.matches_with(package, MATCH_OPTIONS));

        included
            && !self
                .excludes
                .iter()
                .any(|pattern| pattern.matches_with(package, MATCH_OPTIONS))
    }
}

impl FromStr for PackageFilter {
    type Err = ADBError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageFilter::parse(s)
    }
}

impl fmt::Display for PackageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self
            .includes
            .iter()
            .map(|p| p.as_str().to_string())
            .chain(self.excludes.iter().map(|p| format!("!{}", p.as_str())))
            .collect();
        write!(f, "{}", tokens.join(","))
    }
}

/// 在一台设备的已安装包列表上执行过滤
pub struct PackageMatcher<'a> {
    packages: &'a [String],
}

impl<'a> PackageMatcher<'a> {
    pub fn new(packages: &'a [String]) -> Self {
        Self { packages }
    }

    /// 返回满足过滤器的包，保持源列表顺序且不重复
    pub fn find_matches(&self, filter: &PackageFilter) -> Vec<String> {
        let mut seen = HashSet::new();

        self.packages
            .iter()
            .filter(|package| filter.matches(package))
            .filter(|package| seen.insert(*package))
            .cloned()
            .collect()
    }
}
