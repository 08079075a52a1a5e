//! drawtext filter graph assembly.
//!
//! FFmpeg unescapes a `-vf` value in three passes: the graph parser
//! (`[],;`), the filter option parser (`:`) and drawtext text expansion
//! (`%`). Values are escaped for each pass, innermost first, so no quoting
//! is needed.

use driftmark_models::WatermarkConfig;

use crate::motion::Trajectory;

/// Separator between filters of one chain.
pub const CHAIN_SEPARATOR: &str = ",";

/// Local wall-clock expansion appended when `include_time` is set.
pub const CLOCK_TOKEN: &str = "%{localtime:%X}";

/// Fixed drop shadow applied to every watermark.
pub const SHADOW_STYLE: &str = "shadowcolor=black@0.5:shadowx=2:shadowy=2";

fn backslash_escape(value: &str, specials: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || specials.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape for the graph parser.
fn escape_graph_level(value: &str) -> String {
    backslash_escape(value, &['\'', '[', ']', ',', ';'])
}

/// Escape for the filter option parser.
fn escape_option_level(value: &str) -> String {
    backslash_escape(value, &['\'', ':'])
}

/// Escape for drawtext text expansion.
fn escape_expansion_level(value: &str) -> String {
    backslash_escape(value, &['%'])
}

/// Escape literal text so drawtext renders it verbatim.
pub fn escape_drawtext_text(text: &str) -> String {
    escape_graph_level(&escape_option_level(&escape_expansion_level(text)))
}

/// Escape a file path used as a filter option value.
pub fn escape_filter_path(path: &str) -> String {
    escape_graph_level(&escape_option_level(path))
}

/// Text option value for a config: the escaped literal text, followed by a
/// live clock when `include_time` is set.
pub fn display_text(config: &WatermarkConfig) -> String {
    let literal = escape_drawtext_text(&config.text);
    if config.include_time {
        let clock = escape_graph_level(&escape_option_level(CLOCK_TOKEN));
        format!("{literal} {clock}")
    } else {
        literal
    }
}

/// One drawtext filter.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTextStanza {
    /// Fully escaped text option value
    pub text: String,
    pub x_expr: String,
    pub y_expr: String,
    pub font_size: u32,
    pub color: String,
    pub opacity: f64,
    /// Escaped font file path
    pub font_file: Option<String>,
}

impl DrawTextStanza {
    /// Stanza for one watermark of a config.
    pub fn new(config: &WatermarkConfig, trajectory: &Trajectory) -> Self {
        Self {
            text: display_text(config),
            x_expr: trajectory.x_expr(),
            y_expr: trajectory.y_expr(),
            font_size: config.font_size,
            color: config.color.clone(),
            opacity: config.opacity,
            font_file: config.font_family.as_deref().map(escape_filter_path),
        }
    }

    /// Render as `drawtext=key=value:...`.
    pub fn render(&self) -> String {
        let mut options = Vec::with_capacity(9);
        if let Some(font_file) = &self.font_file {
            options.push(format!("fontfile={}", font_file));
        }
        options.push(format!("text={}", self.text));
        options.push(format!("fontsize={}", self.font_size));
        options.push(format!("fontcolor={}", self.color));
        options.push(format!("alpha={:.2}", self.opacity));
        options.push(SHADOW_STYLE.to_string());
        options.push(format!("x={}", self.x_expr));
        options.push(format!("y={}", self.y_expr));

        format!("drawtext={}", options.join(":"))
    }
}

/// Joins drawtext stanzas, in insertion order, into one `-vf` value.
#[derive(Debug, Clone, Default)]
pub struct FilterGraphBuilder {
    stanzas: Vec<DrawTextStanza>,
}

impl FilterGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stanza (builder style).
    pub fn stanza(mut self, stanza: DrawTextStanza) -> Self {
        self.stanzas.push(stanza);
        self
    }

    /// Append a stanza.
    pub fn push(&mut self, stanza: DrawTextStanza) {
        self.stanzas.push(stanza);
    }

    pub fn len(&self) -> usize {
        self.stanzas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stanzas.is_empty()
    }

    /// Assemble the filter graph. Deterministic for identical stanzas.
    pub fn build(&self) -> String {
        self.stanzas
            .iter()
            .map(DrawTextStanza::render)
            .collect::<Vec<_>>()
            .join(CHAIN_SEPARATOR)
    }
}
