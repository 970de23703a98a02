//! 公共工具模块

/// 四舍五入保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 生成用于日志的 prompt 预览
///
/// 按字符截断，超出 `max_chars` 时追加省略号，不会切断多字节字符
pub fn prompt_preview(prompt: &str, max_chars: usize) -> String {
    match prompt.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &prompt[..end]),
        None => prompt.to_string(),
    }
}
