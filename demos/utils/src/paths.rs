//! 输出路径.

use std::env;
use std::path::PathBuf;

/// 获取 `{用户主目录}/cbct` 目录下给定继续项组成的全路径.
pub fn home_cbct_dir_with<I: IntoIterator<Item = &'static str>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("cbct");
    ans.extend(it);
    Some(ans)
}

/// 获取导出目录.
///
/// 1. 若环境变量 `$CBCT_EXPORT_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/cbct/export`;
/// 3. 找不到用户主目录时返回 `None`.
pub fn export_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var("CBCT_EXPORT_DIR") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_cbct_dir_with(["export"]),
    }
}
