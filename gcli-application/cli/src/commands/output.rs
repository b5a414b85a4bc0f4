//! CLI 通用输出格式化模块
//!
//! 提供 table/json 两种输出格式的通用实现

use anyhow::Result;
use colored::Colorize;
use gcli_gluster::HealthState;
use serde::Serialize;

/// 可输出为表格行的数据 trait
pub trait TableRow {
    /// 返回表格列标题
    fn headers() -> Vec<&'static str>;

    /// 返回该项的表格行数据
    fn row(&self) -> Vec<String>;
}

/// 表格格式输出，列宽按内容自适应
pub fn print_table<T: TableRow>(items: &[T]) {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = items.iter().map(TableRow::row).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    // 打印表头
    let header_line = format_line(headers.iter().map(|h| h.to_string()), &widths);
    println!("{}", header_line.bold());
    println!("{}", "-".repeat(header_line.chars().count()));

    // 打印数据行
    for row in rows {
        println!("{}", format_line(row.into_iter(), &widths));
    }
}

fn format_line(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// JSON 格式输出
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 根据格式参数选择输出方式
pub fn output_formatted<T: TableRow + Serialize>(items: &[T], format: &str) -> Result<()> {
    match format {
        "json" => print_json(items)?,
        _ => {
            if items.is_empty() {
                println!("{}", "(无数据)".yellow());
            } else {
                print_table(items);
            }
        }
    }
    Ok(())
}

/// 操作成功提示
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// 带颜色的健康状态
pub fn health(state: HealthState) -> String {
    let text = state.to_string();
    match state {
        HealthState::Up => text.green().to_string(),
        HealthState::Degraded => text.yellow().to_string(),
        HealthState::Partial => text.bright_red().to_string(),
        HealthState::Down => text.red().bold().to_string(),
    }
}

/// 字节数转为可读形式
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(1023), "1023 B");
        assert_eq!(human_bytes(1536), "1.5 KiB");
        assert_eq!(human_bytes(10 * 1024 * 1024 * 1024), "10.0 GiB");
    }

    #[test]
    fn test_format_line_pads_columns() {
        let line = format_line(
            vec!["a".to_string(), "bb".to_string()].into_iter(),
            &[3, 2],
        );
        assert_eq!(line, "a    bb");
    }
}
