//! PDF 生成 - 业务能力层
//!
//! 把生成的文本排版成 A4 PDF：居中粗体标题 + 自动换行、自动分页的正文。
//! 使用 PDF 内置的 Helvetica 字体（WinAnsiEncoding），不支持的字符替换为 `?`。
//!
//! 每次调用得到独立的内存文档和唯一 ID，不共享任何输出文件。

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;
use uuid::Uuid;

use crate::error::PdfError;

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
/// 15 mm
const MARGIN: f32 = 42.52;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;
const TITLE_LEADING: f32 = 20.0;
const BODY_LEADING: f32 = 16.0;
/// 标题与正文之间的空白（10 mm）
const TITLE_GAP: f32 = 28.35;

const BODY_FONT: &str = "F1";
const TITLE_FONT: &str = "F2";

/// 生成好的 PDF 文档
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub id: Uuid,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl RenderedDocument {
    /// 唯一文件名，例如 `assignment-<uuid>.pdf`
    pub fn file_name(&self) -> String {
        format!("assignment-{}.pdf", self.id)
    }

    /// 写入目录，返回文件路径
    pub async fn persist(&self, dir: &Path) -> Result<PathBuf, PdfError> {
        let write_failed = |path: &Path, source| PdfError::WriteFailed {
            path: path.display().to_string(),
            source,
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| write_failed(dir, e))?;

        let path = dir.join(self.file_name());
        tokio::fs::write(&path, &self.bytes)
            .await
            .map_err(|e| write_failed(&path, e))?;

        debug!("PDF 已写入: {}", path.display());
        Ok(path)
    }
}

/// 一行待输出的文本
struct Line {
    text: String,
    font: &'static str,
    size: f32,
    leading: f32,
    centered: bool,
}

/// 渲染 PDF
pub fn render(title: &str, body: &str) -> Result<RenderedDocument, PdfError> {
    let usable_width = PAGE_WIDTH - 2.0 * MARGIN;

    let mut lines: Vec<Line> = wrap_text(&to_latin1(title), TITLE_SIZE * 1.05, usable_width)
        .into_iter()
        .map(|text| Line {
            text,
            font: TITLE_FONT,
            size: TITLE_SIZE,
            leading: TITLE_LEADING,
            centered: true,
        })
        .collect();
    if let Some(last) = lines.last_mut() {
        last.leading = TITLE_LEADING + TITLE_GAP;
    }
    lines.extend(
        wrap_text(&to_latin1(body), BODY_SIZE, usable_width)
            .into_iter()
            .map(|text| Line {
                text,
                font: BODY_FONT,
                size: BODY_SIZE,
                leading: BODY_LEADING,
                centered: false,
            }),
    );

    let pages = paginate(&lines);
    let bytes = build_document(title, &pages)?;

    debug!("PDF 生成完成: {} 页, {} 字节", pages.len(), bytes.len());

    Ok(RenderedDocument {
        id: Uuid::new_v4(),
        bytes,
        page_count: pages.len(),
    })
}

/// 按页分组，每页给出 (行, 基线 y 坐标)
fn paginate(lines: &[Line]) -> Vec<Vec<(&Line, f32)>> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages = vec![Vec::new()];
    let mut y = top;

    for line in lines {
        if y - line.size < MARGIN {
            pages.push(Vec::new());
            y = top;
        }
        if let Some(page) = pages.last_mut() {
            page.push((line, y - line.size));
        }
        y -= line.leading;
    }

    pages
}

fn build_document(title: &str, pages: &[Vec<(&Line, f32)>]) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let body_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let title_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            BODY_FONT => body_font_id,
            TITLE_FONT => title_font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = add_page(&mut doc, pages_id, page)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::from(PAGE_WIDTH),
                Object::from(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_latin1(&to_latin1(title))),
        "Producer" => Object::string_literal("ai_service"),
        "CreationDate" => Object::string_literal(
            chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string(),
        ),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(lopdf::Error::from)?;
    Ok(bytes)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    lines: &[(&Line, f32)],
) -> Result<ObjectId, PdfError> {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    for (line, y) in lines {
        if line.text.is_empty() {
            continue;
        }
        let x = if line.centered {
            let width = text_width(&line.text, line.size * 1.05);
            ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
        } else {
            MARGIN
        };

        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![line.font.into(), line.size.into()]));
        operations.push(Operation::new("Td", vec![x.into(), (*y).into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_latin1(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations };
    let encoded = content.encode().map_err(lopdf::Error::from)?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

/// 转换为 Latin-1 可表示的文本
///
/// 常见排版符号先换成 ASCII，其余无法表示的字符替换为 `?`。
pub fn to_latin1(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2022}' => out.push('\u{B7}'),
            '\u{2026}' => out.push_str("..."),
            c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => out.push(c),
            c if c.is_control() => {}
            _ => out.push('?'),
        }
    }
    out
}

// 输入必须已经过 to_latin1
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u8).collect()
}

/// Helvetica 字宽（千分之一 em），按字符组近似
fn glyph_width(c: char) -> f32 {
    let units = match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '[' | ']' | 'f' | 't' | '\\' => 278,
        '\'' | '|' => 191,
        'i' | 'j' | 'l' => 222,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '"' => 355,
        '*' => 389,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 500,
        '0'..='9' | 'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' | '$' | '_' => 556,
        '+' | '<' | '=' | '>' | '~' => 584,
        'F' | 'T' | 'Z' => 611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' | '&' => 667,
        'w' | 'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'G' | 'O' | 'Q' => 778,
        'm' | 'M' => 833,
        '%' => 889,
        'W' => 944,
        '@' => 1015,
        _ => 667,
    };
    units as f32 / 1000.0
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(glyph_width).sum::<f32>() * size
}

/// 按宽度自动换行；空段落保留为空行，超长单词按字符拆开
fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if text_width(&candidate, size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if text_width(word, size) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    let next_width = text_width(&current, size) + glyph_width(c) * size;
                    if !current.is_empty() && next_width > max_width {
                        lines.push(std::mem::take(&mut current));
                    }
                    current.push(c);
                }
            }
        }

        lines.push(current);
    }

    lines
}
