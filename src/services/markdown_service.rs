//! Markdown 服务 - 业务能力层
//!
//! 只负责解析结果的展示整理，不关心流程

use anyhow::Result;
use regex::{Captures, Regex};

use crate::models::{PageData, Provider, ProviderParseResult};
use crate::utils::truncate_text;

/// Markdown 服务
///
/// 职责：
/// - 清理 LandingAI 输出中的锚点、页码标记与版权行，让各家输出可以公平对比
/// - 规范表格结构（首行提升为表头）
/// - 按页码取出单页内容并生成可读的对比报告
pub struct MarkdownService {
    anchor_re: Regex,
    table_re: Regex,
    table_id_re: Regex,
    row_re: Regex,
    cell_re: Regex,
    page_marker_re: Regex,
    copyright_re: Regex,
    blank_lines_re: Regex,
}

impl MarkdownService {
    /// 创建新的 Markdown 服务
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchor_re: Regex::new(r#"<a id=["'][\w\-]+["']></a>\s*"#)?,
            table_re: Regex::new(r"(?s)<table[^>]*>.*?</table>")?,
            table_id_re: Regex::new(r#"<table[^>]*id=["']([^"']+)["'][^>]*>"#)?,
            row_re: Regex::new(r"(?s)<tr[^>]*>.*?</tr>")?,
            cell_re: Regex::new(r"(?s)<td([^>]*)>(.*?)</td>")?,
            page_marker_re: Regex::new(r"Page \| \d+\s*")?,
            copyright_re: Regex::new(r"Copyright ©\d{4}[^\n]*\n*")?,
            blank_lines_re: Regex::new(r"\n\n\n+")?,
        })
    }

    /// 按 provider 整理 markdown
    ///
    /// 只有 LandingAI 需要完整清理，其余 provider 仅去掉首尾空白。
    pub fn normalize(&self, provider: &str, markdown: &str) -> String {
        match Provider::from_name(provider) {
            Some(Provider::LandingAI) => self.normalize_landingai(markdown),
            _ => markdown.trim().to_string(),
        }
    }

    fn normalize_landingai(&self, markdown: &str) -> String {
        if markdown.is_empty() {
            return String::new();
        }

        let text = self.anchor_re.replace_all(markdown, "");
        let text = self
            .table_re
            .replace_all(&text, |caps: &Captures| self.enhance_table(&caps[0]));
        let text = self.page_marker_re.replace_all(&text, "");
        let text = self.copyright_re.replace_all(&text, "");
        let text = self.blank_lines_re.replace_all(&text, "\n\n");

        text.trim().to_string()
    }

    /// 首行 `<td>` 变为 `<th>` 并包进 `<thead>`，其余行放入 `<tbody>`
    fn enhance_table(&self, table: &str) -> String {
        let rows: Vec<&str> = self.row_re.find_iter(table).map(|m| m.as_str()).collect();
        let Some((first, rest)) = rows.split_first() else {
            return table.to_string();
        };

        let table_id = self
            .table_id_re
            .captures(table)
            .map(|caps| format!(r#" id="{}""#, &caps[1]))
            .unwrap_or_default();

        let header_row = self.cell_re.replace_all(first, "<th$1>$2</th>");

        let mut enhanced = format!("<table{}>\n<thead>\n{}\n</thead>\n<tbody>\n", table_id, header_row);
        enhanced.push_str(&rest.join("\n"));
        enhanced.push_str("\n</tbody>\n</table>");
        enhanced
    }

    /// 取出单页内容（已整理）
    pub fn page_markdown(&self, provider: &str, result: &ProviderParseResult, page_number: u32) -> Option<String> {
        result
            .page(page_number)
            .map(|page| self.normalize(provider, &page.markdown))
    }

    /// 生成单个 provider 的 markdown 报告
    ///
    /// # 参数
    /// - `title`: 标题（对战时为匿名标签，揭晓后为 provider 名称）
    /// - `provider`: provider 接口名称，用于选择整理规则
    /// - `result`: 解析结果
    pub fn render_report(&self, title: &str, provider: &str, result: &ProviderParseResult) -> String {
        let mut report = format!(
            "# {}\n\n> 共 {} 页，耗时 {:.1}s\n\n",
            title, result.total_pages, result.processing_time
        );
        for page in &result.pages {
            report.push_str(&self.render_page(provider, page));
        }
        report
    }

    fn render_page(&self, provider: &str, page: &PageData) -> String {
        let body = self.normalize(provider, &page.markdown);
        let body = if body.is_empty() {
            "*本页无内容*".to_string()
        } else {
            body
        };
        format!("## 第 {} 页\n\n{}\n\n", page.page_number, body)
    }

    /// 单行预览，用于终端输出
    pub fn preview(&self, markdown: &str, max_len: usize) -> String {
        let flat = markdown.split_whitespace().collect::<Vec<_>>().join(" ");
        truncate_text(&flat, max_len)
    }
}
