#![deny(missing_docs)]

//! # Section Pre-Pass
//!
//! Splits a crawled API page into its title line, description and an ordered
//! list of `####` sections. Each section carries the tables (optionally named
//! by a preceding `**Title**` line) and fenced code blocks found in its body.
//!
//! Later stages only ever look at sections by kind, so the page is scanned once.

use crate::markdown::table::Table;
use crate::oas::models::HttpMethod;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

/// Classification of a `####` section by its heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// `请求头`, `请求头参数`
    RequestHeader,
    /// `请求体`
    RequestBody,
    /// `请求参数`, `请求字段`
    RequestParameters,
    /// `请求示例`
    RequestExample,
    /// `响应参数`, `请求响应`, `响应字段`, `返回参数`
    ResponseParameters,
    /// `响应示例`
    ResponseExample,
    /// Anything else.
    Other,
}

impl SectionKind {
    /// Maps a heading (without the leading hashes) to a section kind.
    pub fn classify(heading: &str) -> Self {
        let heading = heading.trim().trim_end_matches([':', '：']).trim();
        match heading {
            "请求头" | "请求头参数" => SectionKind::RequestHeader,
            "请求体" => SectionKind::RequestBody,
            "请求参数" | "请求字段" => SectionKind::RequestParameters,
            "请求示例" => SectionKind::RequestExample,
            "响应参数" | "请求响应" | "响应字段" | "返回参数" => {
                SectionKind::ResponseParameters
            }
            "响应示例" => SectionKind::ResponseExample,
            _ => SectionKind::Other,
        }
    }
}

/// The `### METHOD /path` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleLine {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path exactly as written (may use `:param` or `{param}` placeholders).
    pub raw_path: String,
}

/// A table inside a section. Sub-tables carry the text of their bold title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTable {
    /// e.g. `builds 数组元素`; `None` for the section's main table.
    pub title: Option<String>,
    /// Parsed table.
    pub table: Table,
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info string after the opening fence (`json`), if any.
    pub lang: Option<String>,
    /// Raw content between the fences.
    pub body: String,
}

/// One `####` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading text.
    pub heading: String,
    /// Heading classification.
    pub kind: SectionKind,
    /// Tables in document order.
    pub tables: Vec<NamedTable>,
    /// Code blocks in document order.
    pub code_blocks: Vec<CodeBlock>,
}

impl Section {
    /// The section's main table: the first one without a bold title.
    pub fn root_table(&self) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.title.is_none())
            .map(|t| &t.table)
    }

    /// Titled tables, in document order.
    pub fn sub_tables(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables
            .iter()
            .filter_map(|t| t.title.as_deref().map(|title| (title, &t.table)))
    }

    /// Body of the first code block.
    pub fn first_code_block(&self) -> Option<&str> {
        self.code_blocks.first().map(|b| b.body.as_str())
    }
}

/// A crawled page after the pre-pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownDocument {
    /// The endpoint title line, if found.
    pub title: Option<TitleLine>,
    /// First text line after the title; empty when absent.
    pub description: String,
    /// Sections in document order.
    pub sections: Vec<Section>,
}

impl MarkdownDocument {
    /// First section of the given kind.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Every section of the given kind, in document order.
    pub fn sections_of(&self, kind: SectionKind) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.kind == kind)
    }
}

/// Parses the title line `### METHOD /path`. Non-verb first tokens are rejected.
pub fn parse_title_line(line: &str) -> Option<TitleLine> {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    let re = TITLE_RE
        .get_or_init(|| Regex::new(r"^###\s+([A-Za-z]+)\s+(\S+)").expect("Invalid regex"));

    let caps = re.captures(line.trim())?;
    let method = HttpMethod::from_str(&caps[1]).ok()?;
    Some(TitleLine {
        method,
        raw_path: caps[2].to_string(),
    })
}

/// Runs the pre-pass over a whole page.
pub fn parse_document(text: &str) -> MarkdownDocument {
    let mut doc = MarkdownDocument::default();
    let mut current: Option<SectionBuilder> = None;
    let mut awaiting_description = false;

    for line in text.lines() {
        let trimmed = line.trim();

        // Fences may contain lines starting with '#', so they take priority.
        let in_fence = current.as_ref().is_some_and(|b| b.fence.is_some());

        if !in_fence {
            if let Some((level, heading)) = heading(trimmed) {
                awaiting_description = false;
                if doc.title.is_none() && level == 3 {
                    if let Some(title) = parse_title_line(trimmed) {
                        doc.title = Some(title);
                        awaiting_description = true;
                        continue;
                    }
                }
                if level == 4 {
                    if let Some(done) = current.take() {
                        doc.sections.push(done.finish());
                    }
                    current = Some(SectionBuilder::new(heading));
                    continue;
                }
                if level < 4 {
                    if let Some(done) = current.take() {
                        doc.sections.push(done.finish());
                    }
                    continue;
                }
            }

            if awaiting_description && !trimmed.is_empty() {
                awaiting_description = false;
                if !trimmed.starts_with('|') && !trimmed.starts_with("```") {
                    doc.description = trimmed.to_string();
                    continue;
                }
            }
        }

        if let Some(builder) = current.as_mut() {
            builder.push(line);
        }
    }

    if let Some(done) = current.take() {
        doc.sections.push(done.finish());
    }
    doc
}

/// Returns `(level, text)` for ATX headings (`#` run followed by whitespace).
fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((level, rest.trim()))
}

/// `**Title**` on its own line.
fn bold_title(line: &str) -> Option<String> {
    let inner = line.strip_prefix("**")?.strip_suffix("**")?;
    let inner = inner.trim().trim_end_matches([':', '：']).trim();
    if inner.is_empty() || inner.contains("**") {
        None
    } else {
        Some(inner.to_string())
    }
}

struct SectionBuilder {
    section: Section,
    pending_title: Option<String>,
    table_title: Option<String>,
    table_lines: Vec<String>,
    fence: Option<(Option<String>, Vec<String>)>,
}

impl SectionBuilder {
    fn new(heading: &str) -> Self {
        Self {
            section: Section {
                heading: heading.to_string(),
                kind: SectionKind::classify(heading),
                tables: Vec::new(),
                code_blocks: Vec::new(),
            },
            pending_title: None,
            table_title: None,
            table_lines: Vec::new(),
            fence: None,
        }
    }

    fn push(&mut self, line: &str) {
        let trimmed = line.trim();

        if let Some((_, body)) = self.fence.as_mut() {
            if trimmed.starts_with("```") {
                self.close_fence();
            } else {
                body.push(line.to_string());
            }
            return;
        }

        if trimmed.starts_with('|') {
            if self.table_lines.is_empty() {
                self.table_title = self.pending_title.take();
            }
            self.table_lines.push(trimmed.to_string());
            return;
        }

        self.flush_table();

        if let Some(info) = trimmed.strip_prefix("```") {
            let lang = info.trim_start_matches('`').trim();
            let lang = (!lang.is_empty()).then(|| lang.to_string());
            self.fence = Some((lang, Vec::new()));
            return;
        }

        if let Some(title) = bold_title(trimmed) {
            self.pending_title = Some(title);
        } else if !trimmed.is_empty() {
            self.pending_title = None;
        }
    }

    fn flush_table(&mut self) {
        if self.table_lines.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.table_lines).join("\n");
        let title = self.table_title.take();
        if let Some(table) = Table::parse(&text) {
            self.section.tables.push(NamedTable { title, table });
        }
    }

    fn close_fence(&mut self) {
        if let Some((lang, body)) = self.fence.take() {
            self.section.code_blocks.push(CodeBlock {
                lang,
                body: body.join("\n"),
            });
        }
    }

    fn finish(mut self) -> Section {
        self.flush_table();
        // An unterminated fence still yields its content.
        self.close_fence();
        self.section
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"### GET /executions/:id/builds

获取执行的版本列表

#### 请求头

| 名称 | 类型 | 必填 | 描述 |
| --- | --- | --- | --- |
| Token | String | 是 | 认证凭证 |

#### 响应参数

| 名称 | 类型 | 必填 | 描述 |
| --- | --- | --- | --- |
| total | int | 是 | 版本总数 |
| builds | array | 是 | 版本列表 |

**builds 数组元素**

| 名称 | 类型 | 必填 | 描述 |
| --- | --- | --- | --- |
| id | int | 是 | 版本ID |

#### 响应示例

```json
{
    "total": 1
}
```
"#;

    #[test]
    fn test_title_and_description() {
        let doc = parse_document(PAGE);
        let title = doc.title.expect("title");
        assert_eq!(title.method, HttpMethod::Get);
        assert_eq!(title.raw_path, "/executions/:id/builds");
        assert_eq!(doc.description, "获取执行的版本列表");
    }

    #[test]
    fn test_sections_are_classified_in_order() {
        let doc = parse_document(PAGE);
        let kinds: Vec<_> = doc.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::RequestHeader,
                SectionKind::ResponseParameters,
                SectionKind::ResponseExample
            ]
        );
    }

    #[test]
    fn test_sub_tables_are_named() {
        let doc = parse_document(PAGE);
        let resp = doc.section(SectionKind::ResponseParameters).unwrap();
        assert_eq!(resp.tables.len(), 2);
        assert_eq!(resp.root_table().unwrap().rows.len(), 2);
        let subs: Vec<_> = resp.sub_tables().map(|(t, _)| t).collect();
        assert_eq!(subs, vec!["builds 数组元素"]);
    }

    #[test]
    fn test_code_blocks_collected() {
        let doc = parse_document(PAGE);
        let ex = doc.section(SectionKind::ResponseExample).unwrap();
        assert_eq!(ex.code_blocks[0].lang.as_deref(), Some("json"));
        let value: serde_json::Value =
            serde_json::from_str(ex.first_code_block().unwrap()).unwrap();
        assert_eq!(value["total"], 1);
    }

    #[test]
    fn test_missing_title() {
        let doc = parse_document("## 概述\n\n一些说明\n");
        assert!(doc.title.is_none());
        assert!(doc.description.is_empty());
    }

    #[test]
    fn test_non_verb_level_three_heading_is_not_a_title() {
        assert!(parse_title_line("### Notes /x").is_none());
        assert!(parse_title_line("#### GET /x").is_none());
        let t = parse_title_line("### delete /bugs/{id}").unwrap();
        assert_eq!(t.method, HttpMethod::Delete);
    }

    #[test]
    fn test_description_absent_when_section_follows() {
        let doc = parse_document("### POST /tokens\n\n#### 请求体\n\n| 名称 | 类型 | 必填 | 描述 |\n| --- | --- | --- | --- |\n| account | string | 是 | 用户名 |\n");
        assert_eq!(doc.description, "");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].kind, SectionKind::RequestBody);
    }

    #[test]
    fn test_bold_line_without_table_does_not_title_next_table() {
        let md = "#### 响应参数\n\n**嵌套规则：**\n- 说明文字\n\n| 名称 | 类型 | 必填 | 描述 |\n| --- | --- | --- | --- |\n| id | int | 是 | x |\n";
        let doc = parse_document(md);
        let section = &doc.sections[0];
        assert_eq!(section.tables.len(), 1);
        assert!(section.tables[0].title.is_none());
    }

    #[test]
    fn test_hash_lines_inside_fence_stay_in_block() {
        let md = "#### 请求示例\n\n```\n# not a heading\n```\n";
        let doc = parse_document(md);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].code_blocks[0].body, "# not a heading");
        assert!(doc.sections[0].code_blocks[0].lang.is_none());
    }
}
