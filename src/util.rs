use chrono::{Local, NaiveDateTime, Timelike};
use log::info;
use std::fs;
use std::io::Write;
use std::path::Path;
use crate::errors::Result;

/// Excel/WPS 识别 UTF-8 所需的字节序标记
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// 数值取整工具
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round0(value: f64) -> f64 {
    value.round()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 当前本地时间，截断到秒
pub fn now_to_second() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// 文件名中使用的时间戳，例如 20250603_093000
pub fn file_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// 行业名称可能包含路径分隔符（如 "AR/VR"），生成文件名前替换掉
pub fn sanitize_file_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect()
}

// 确保目录存在
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        info!("创建目录: {}", dir.display());
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

pub fn write_bom<W: Write>(writer: &mut W) -> Result<()> {
    writer.write_all(UTF8_BOM)?;
    Ok(())
}
