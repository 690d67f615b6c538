//! Syntax highlighting seam.
//!
//! Snapshots hand their reconstructed text to a `Highlighter` together with a
//! filename (for guessing the language) and the lines to mark. The returned
//! markup is opaque to the rest of the pipeline.
//!
//! Both implementations emit the same line-numbered table and wrap marked
//! lines in `<span class="hll">`:
//! - `SyntectHighlighter` tokenizes with syntect and colours tokens inline.
//! - `HtmlHighlighter` only escapes, for plain output and as a fallback.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::Path;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::{AppError, Result};

pub trait Highlighter: Send + Sync {
    /// Render `source` as markup, marking every 1-indexed line in `marked_lines`.
    fn highlight(&self, source: &str, filename: &str, marked_lines: &BTreeSet<u32>) -> String;
}

/// Theme used for token colours.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    /// Load syntect's bundled syntaxes and the default theme.
    pub fn new() -> Result<Self> {
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(DEFAULT_THEME)
            .ok_or_else(|| AppError::Internal(format!("Missing highlight theme {}", DEFAULT_THEME)))?;

        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    fn syntax_for(&self, source: &str, filename: &str) -> &SyntaxReference {
        let path = Path::new(filename);
        let by_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| self.syntaxes.find_syntax_by_extension(n));
        let by_extension = || {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(|e| self.syntaxes.find_syntax_by_extension(e))
        };

        by_name
            .or_else(by_extension)
            .or_else(|| self.syntaxes.find_syntax_by_first_line(source))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    fn try_highlight(
        &self,
        source: &str,
        filename: &str,
        marked_lines: &BTreeSet<u32>,
    ) -> std::result::Result<String, syntect::Error> {
        let syntax = self.syntax_for(source, filename);
        let mut lines = HighlightLines::new(syntax, &self.theme);
        let mut table = LineTable::default();

        for line in LinesWithEndings::from(source) {
            let mut regions = lines.highlight_line(line, &self.syntaxes)?;
            // The gutter and hll spans own the line break, not the tokens.
            if let Some((_, text)) = regions.last_mut() {
                let t: &str = *text;
                *text = t.strip_suffix('\n').unwrap_or(t);
            }
            let html = styled_line_to_highlighted_html(&regions, IncludeBackground::No)?;
            table.push_line(&html, marked_lines);
        }

        Ok(table.finish(&syntax.name.to_lowercase()))
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, source: &str, filename: &str, marked_lines: &BTreeSet<u32>) -> String {
        match self.try_highlight(source, filename, marked_lines) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Highlighting {} failed, rendering plain: {}", filename, e);
                HtmlHighlighter.highlight(source, filename, marked_lines)
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlHighlighter;

impl Highlighter for HtmlHighlighter {
    fn highlight(&self, source: &str, filename: &str, marked_lines: &BTreeSet<u32>) -> String {
        let mut table = LineTable::default();

        // An empty file has no lines, not one blank line.
        if !source.is_empty() {
            let mut escaped = String::new();
            for line in source.split('\n') {
                escaped.clear();
                push_escaped(&mut escaped, line);
                table.push_line(&escaped, marked_lines);
            }
        }

        table.finish(guess_language(filename))
    }
}

/// Line-number gutter plus code column, built one rendered line at a time.
#[derive(Default)]
struct LineTable {
    numbers: String,
    code: String,
    count: u32,
}

impl LineTable {
    /// `html` is one line of already-escaped markup without its newline.
    fn push_line(&mut self, html: &str, marked_lines: &BTreeSet<u32>) {
        self.count += 1;
        let _ = writeln!(self.numbers, "{}", self.count);

        if marked_lines.contains(&self.count) {
            self.code.push_str("<span class=\"hll\">");
            self.code.push_str(html);
            self.code.push_str("\n</span>");
        } else {
            self.code.push_str(html);
            self.code.push('\n');
        }
    }

    fn finish(self, language: &str) -> String {
        format!(
            "<div class=\"highlight\" data-language=\"{}\"><table class=\"highlighttable\"><tr>\
             <td class=\"linenos\"><div class=\"linenodiv\"><pre>{}</pre></div></td>\
             <td class=\"code\"><pre><code>{}</code></pre></td>\
             </tr></table></div>",
            language, self.numbers, self.code
        )
    }
}

/// Best-effort language name from a file name, `text` when unknown.
pub fn guess_language(filename: &str) -> &'static str {
    let path = Path::new(filename);

    match path.file_name().and_then(|n| n.to_str()) {
        Some("Makefile") | Some("makefile") | Some("GNUmakefile") => return "make",
        Some("Dockerfile") => return "docker",
        Some("CMakeLists.txt") => return "cmake",
        _ => {}
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("rs") => "rust",
        Some("py") | Some("pyi") => "python",
        Some("js") | Some("mjs") | Some("cjs") => "javascript",
        Some("ts") => "typescript",
        Some("tsx") => "tsx",
        Some("jsx") => "jsx",
        Some("go") => "go",
        Some("c") | Some("h") => "c",
        Some("cc") | Some("cpp") | Some("cxx") | Some("hpp") | Some("hh") => "cpp",
        Some("java") => "java",
        Some("kt") | Some("kts") => "kotlin",
        Some("rb") => "ruby",
        Some("php") => "php",
        Some("cs") => "csharp",
        Some("swift") => "swift",
        Some("sh") | Some("bash") | Some("zsh") => "bash",
        Some("html") | Some("htm") => "html",
        Some("css") => "css",
        Some("scss") => "scss",
        Some("json") => "json",
        Some("toml") => "toml",
        Some("yaml") | Some("yml") => "yaml",
        Some("xml") => "xml",
        Some("md") | Some("markdown") => "markdown",
        Some("sql") => "sql",
        Some("lua") => "lua",
        Some("hs") => "haskell",
        Some("ex") | Some("exs") => "elixir",
        _ => "text",
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}
