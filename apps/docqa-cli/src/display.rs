//! Plain-text rendering of view panels.
use std::fmt::{self, Write as _};

use docqa_core::types::SearchResponse;
use docqa_render::{RenderedSnippet, Renderer, Segment, Span};
use docqa_view::{AnswerPanel, ProvenancePanel, SourcePanel};

/// Run `build` against a fresh buffer. Writing into a `String` never fails.
fn render(build: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    if build(&mut out).is_err() {
        out.clear();
    }
    out
}

/// Keywords are wrapped in 【】.
pub fn highlight(renderer: &Renderer, text: &str) -> String {
    renderer
        .highlight(text)
        .into_iter()
        .map(|span| match span {
            Span::Plain(s) => s.to_string(),
            Span::Mark(s) => format!("【{s}】"),
        })
        .collect()
}

pub fn snippet(renderer: &Renderer, rendered: &RenderedSnippet) -> String {
    render(|out| {
        for segment in &rendered.segments {
            match segment {
                Segment::Text(text) => out.push_str(&highlight(renderer, text)),
                Segment::Link { text, url } => write!(out, "{text} <{url}>")?,
                Segment::Structured { .. } => {
                    out.push('\n');
                    for line in segment.pretty_block().unwrap_or_default().lines() {
                        writeln!(out, "    │ {line}")?;
                    }
                }
            }
        }
        Ok(())
    })
}

pub fn results(renderer: &Renderer, response: &SearchResponse, selected: Option<&str>) -> String {
    render(|out| {
        writeln!(
            out,
            "📊 {} results ({} total) in {:.0}ms · {} / {}",
            response.results.len(),
            response.total_count,
            response.query_time,
            response.model,
            response.strategy
        )?;
        for r in &response.results {
            let marker = if selected == Some(r.id.as_str()) { "▶" } else { " " };
            writeln!(
                out,
                "{marker} [{}] {} · {} · 相似度 {} · {}{}",
                r.citation_number,
                r.file_name,
                r.file_type,
                r.similarity,
                r.date,
                r.page.as_deref().map(|p| format!(" · {p}")).unwrap_or_default(),
            )?;
            writeln!(out, "      {}", highlight(renderer, &r.snippet))?;
        }
        Ok(())
    })
}

pub fn provenance(renderer: &Renderer, panel: &ProvenancePanel<'_>) -> String {
    let r = panel.result;
    render(|out| {
        writeln!(out, "📄 [{}] {}", panel.citation(), r.file_name)?;
        writeln!(out, "   路径: {}{}", r.file_path, r.file_name)?;
        writeln!(out, "   版本: {} · 页码: {} · 日期: {}", r.version, panel.page(), r.date)?;
        writeln!(out, "   预览: {}", panel.preview_url)?;
        writeln!(out, "   内容: {}", snippet(renderer, &panel.snippet))?;
        let pairs = panel.structured();
        if !pairs.is_empty() {
            writeln!(out, "   结构化数据:")?;
            for d in pairs {
                writeln!(out, "     {}: {}", d.label, d.value)?;
            }
        }
        for (i, item) in panel.history.iter().enumerate() {
            writeln!(out, "   Q{}: {}", i + 1, item.question)?;
            writeln!(out, "   A{}: {}", i + 1, highlight(renderer, &item.answer))?;
        }
        Ok(())
    })
}

pub fn answer(renderer: &Renderer, panel: &AnswerPanel<'_>) -> String {
    render(|out| {
        writeln!(out, "Q: {}", panel.question)?;
        writeln!(out, "A [{} · 置信度 {}]:", panel.query_type_label(), panel.confidence)?;
        writeln!(out, "{}", highlight(renderer, panel.answer))?;
        if !panel.cited.is_empty() {
            let refs: Vec<String> = panel.cited.iter().map(|n| format!("[{n}]")).collect();
            writeln!(out, "引用: {}", refs.join(" "))?;
        }
        if let Some(advice) = panel.advisory() {
            writeln!(out, "⚠️  {advice}")?;
        }
        Ok(())
    })
}

/// Source rows; rows cited by the answer are marked with `*`.
pub fn sources(renderer: &Renderer, panel: &SourcePanel<'_>) -> String {
    render(|out| {
        writeln!(out, "来源:")?;
        for row in &panel.rows {
            let mark = if row.cited { '*' } else { ' ' };
            writeln!(
                out,
                "{mark} [{}] {} ({}) · 相似度 {}",
                row.citation, row.source.file_name, row.source.file_type, row.similarity
            )?;
            if let Some(chunk) = &row.chunk {
                writeln!(out, "      {}", snippet(renderer, chunk))?;
            }
        }
        Ok(())
    })
}
