//! Comment delimiter grammars and the extension registry

use facet::Facet;
use std::borrow::Cow;
use std::collections::HashMap;

/// Whether a comment ends at the end of the line or at a terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum StyleKind {
    /// Ends at `\n` or end of file (`//`, `#`, `--`)
    Line,
    /// Ends at its own terminator literal (`/* */`, `<!-- -->`)
    Block,
}

/// One comment delimiter grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentStyle {
    pub kind: StyleKind,
    pub start: Cow<'static, str>,
    /// Per-line continuation marker inside blocks (the `*` of `/** */`)
    pub middle: Option<Cow<'static, str>>,
    /// Terminator for blocks, empty for line comments
    pub end: Cow<'static, str>,
}

impl CommentStyle {
    pub const fn line(start: &'static str) -> Self {
        Self {
            kind: StyleKind::Line,
            start: Cow::Borrowed(start),
            middle: None,
            end: Cow::Borrowed(""),
        }
    }

    pub const fn block(start: &'static str, end: &'static str) -> Self {
        Self {
            kind: StyleKind::Block,
            start: Cow::Borrowed(start),
            middle: None,
            end: Cow::Borrowed(end),
        }
    }

    pub const fn block_with_middle(
        start: &'static str,
        middle: &'static str,
        end: &'static str,
    ) -> Self {
        Self {
            kind: StyleKind::Block,
            start: Cow::Borrowed(start),
            middle: Some(Cow::Borrowed(middle)),
            end: Cow::Borrowed(end),
        }
    }

    /// Build a style from owned delimiters (e.g. from a config file).
    ///
    /// An empty or missing `end` makes it a line style.
    pub fn custom(start: String, middle: Option<String>, end: Option<String>) -> Self {
        match end.filter(|end| !end.is_empty()) {
            Some(end) => Self {
                kind: StyleKind::Block,
                start: Cow::Owned(start),
                middle: middle.filter(|m| !m.is_empty()).map(Cow::Owned),
                end: Cow::Owned(end),
            },
            None => Self {
                kind: StyleKind::Line,
                start: Cow::Owned(start),
                middle: None,
                end: Cow::Borrowed(""),
            },
        }
    }

    /// Permissive "any text" style: every physical line is a comment.
    pub const fn wildcard() -> Self {
        Self::line("")
    }

    pub fn is_wildcard(&self) -> bool {
        self.kind == StyleKind::Line && self.start.is_empty()
    }

    pub fn is_block(&self) -> bool {
        self.kind == StyleKind::Block
    }

    /// Human readable form, e.g. `/* * */` or `//`.
    pub fn describe(&self) -> String {
        match (self.kind, &self.middle) {
            _ if self.is_wildcard() => "<any line>".to_string(),
            (StyleKind::Line, _) => self.start.to_string(),
            (StyleKind::Block, Some(middle)) => format!("{} {} {}", self.start, middle, self.end),
            (StyleKind::Block, None) => format!("{} {}", self.start, self.end),
        }
    }
}

pub const SLASH_SLASH: CommentStyle = CommentStyle::line("//");
pub const TRIPLE_SLASH: CommentStyle = CommentStyle::line("///");
pub const SLASH_BANG: CommentStyle = CommentStyle::line("//!");
pub const HASH: CommentStyle = CommentStyle::line("#");
pub const DASH_DASH: CommentStyle = CommentStyle::line("--");
pub const SEMICOLON: CommentStyle = CommentStyle::line(";");
pub const PERCENT: CommentStyle = CommentStyle::line("%");
pub const APOSTROPHE: CommentStyle = CommentStyle::line("'");
pub const COBOL: CommentStyle = CommentStyle::line("*>");
pub const C_BLOCK: CommentStyle = CommentStyle::block_with_middle("/*", "*", "*/");
pub const DOC_BLOCK: CommentStyle = CommentStyle::block_with_middle("/**", "*", "*/");
pub const HTML_BLOCK: CommentStyle = CommentStyle::block("<!--", "-->");
pub const PY_DOUBLE: CommentStyle = CommentStyle::block("\"\"\"", "\"\"\"");
pub const PY_SINGLE: CommentStyle = CommentStyle::block("'''", "'''");
pub const RUBY_BLOCK: CommentStyle = CommentStyle::block("=begin", "=end");
pub const LUA_BLOCK: CommentStyle = CommentStyle::block("--[[", "]]");
pub const HASKELL_BLOCK: CommentStyle = CommentStyle::block("{-", "-}");
pub const ML_BLOCK: CommentStyle = CommentStyle::block_with_middle("(*", "*", "*)");
pub const JULIA_BLOCK: CommentStyle = CommentStyle::block("#=", "=#");
pub const POWERSHELL_BLOCK: CommentStyle = CommentStyle::block("<#", "#>");
pub const CMAKE_BLOCK: CommentStyle = CommentStyle::block("#[[", "]]");

const C_FAMILY: &[CommentStyle] = &[DOC_BLOCK, C_BLOCK, SLASH_SLASH];
const RUST: &[CommentStyle] = &[DOC_BLOCK, C_BLOCK, TRIPLE_SLASH, SLASH_BANG, SLASH_SLASH];
const ZIG: &[CommentStyle] = &[TRIPLE_SLASH, SLASH_BANG, SLASH_SLASH];
const CSS: &[CommentStyle] = &[DOC_BLOCK, C_BLOCK];
const PHP: &[CommentStyle] = &[DOC_BLOCK, C_BLOCK, SLASH_SLASH, HASH];
const SHELL: &[CommentStyle] = &[HASH];
const PYTHON: &[CommentStyle] = &[HASH, PY_DOUBLE, PY_SINGLE];
const ELIXIR: &[CommentStyle] = &[HASH, PY_DOUBLE];
const RUBY: &[CommentStyle] = &[HASH, RUBY_BLOCK];
const JULIA: &[CommentStyle] = &[HASH, JULIA_BLOCK];
const POWERSHELL: &[CommentStyle] = &[HASH, POWERSHELL_BLOCK];
const CMAKE: &[CommentStyle] = &[HASH, CMAKE_BLOCK];
const SQL: &[CommentStyle] = &[DASH_DASH, DOC_BLOCK, C_BLOCK];
const LUA: &[CommentStyle] = &[DASH_DASH, LUA_BLOCK];
const HASKELL: &[CommentStyle] = &[DASH_DASH, HASKELL_BLOCK];
const ADA: &[CommentStyle] = &[DASH_DASH];
const LISP: &[CommentStyle] = &[SEMICOLON];
const ERLANG: &[CommentStyle] = &[PERCENT];
const ML: &[CommentStyle] = &[ML_BLOCK];
const FSHARP: &[CommentStyle] = &[ML_BLOCK, SLASH_SLASH];
const VB: &[CommentStyle] = &[APOSTROPHE];
const COBOL_STYLES: &[CommentStyle] = &[COBOL];
const MARKUP: &[CommentStyle] = &[HTML_BLOCK];
const COMPONENT: &[CommentStyle] = &[HTML_BLOCK, DOC_BLOCK, C_BLOCK, SLASH_SLASH];

/// Built-in extension table.
const BUILTIN: &[(&[&str], &[CommentStyle])] = &[
    (
        &[
            "c", "h", "cpp", "hpp", "cc", "cxx", "m", "mm", "java", "kt", "kts", "scala",
            "groovy", "cs", "swift", "ts", "tsx", "js", "jsx", "mjs", "cjs", "go", "dart", "d",
            "proto", "sol", "scss", "less",
        ],
        C_FAMILY,
    ),
    (&["rs"], RUST),
    (&["zig"], ZIG),
    (&["css"], CSS),
    (&["php"], PHP),
    (
        &[
            "sh", "bash", "zsh", "fish", "pl", "pm", "r", "toml", "yaml", "yml", "nix", "tf", "mk",
        ],
        SHELL,
    ),
    (&["py", "pyi"], PYTHON),
    (&["ex", "exs"], ELIXIR),
    (&["rb"], RUBY),
    (&["jl"], JULIA),
    (&["ps1", "psm1", "psd1"], POWERSHELL),
    (&["cmake"], CMAKE),
    (&["sql"], SQL),
    (&["lua"], LUA),
    (&["hs", "lhs", "elm"], HASKELL),
    (&["adb", "ads"], ADA),
    (
        &["clj", "cljs", "cljc", "edn", "el", "lisp", "scm", "asm", "s"],
        LISP,
    ),
    (&["erl", "hrl", "tex"], ERLANG),
    (&["ml", "mli"], ML),
    (&["fs", "fsi", "fsx"], FSHARP),
    (&["vb", "vbs"], VB),
    (&["cob", "cbl", "cpy"], COBOL_STYLES),
    (&["html", "htm", "xml", "svg", "md"], MARKUP),
    (&["vue", "svelte"], COMPONENT),
];

/// What an extension with no mapping resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// No styles: files of unknown type are not scanned
    #[default]
    Skip,
    /// The [`CommentStyle::wildcard`] style: every line is scanned
    Wildcard,
}

/// Maps file extensions to ordered comment style lists.
///
/// Built once and then only read, so one registry can back any number of
/// concurrent scans. Different registries can coexist in one process.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    by_extension: HashMap<String, Vec<CommentStyle>>,
    fallback: Fallback,
}

const WILDCARD: &[CommentStyle] = &[CommentStyle::wildcard()];

impl StyleRegistry {
    /// A registry with no mappings at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table covering common languages.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (extensions, styles) in BUILTIN {
            registry = registry.with_styles(extensions.iter().copied(), styles.iter().cloned());
        }
        registry
    }

    /// Map each extension to `styles`, replacing any existing mapping.
    pub fn with_styles(
        mut self,
        extensions: impl IntoIterator<Item = impl Into<String>>,
        styles: impl IntoIterator<Item = CommentStyle>,
    ) -> Self {
        let styles: Vec<CommentStyle> = styles.into_iter().collect();
        for ext in extensions {
            self.by_extension.insert(ext.into(), styles.clone());
        }
        self
    }

    /// Append `style` to the styles of each extension, creating mappings as needed.
    pub fn with_extra_style(
        mut self,
        extensions: impl IntoIterator<Item = impl Into<String>>,
        style: CommentStyle,
    ) -> Self {
        for ext in extensions {
            let styles = self.by_extension.entry(ext.into()).or_default();
            if !styles.contains(&style) {
                styles.push(style.clone());
            }
        }
        self
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> Fallback {
        self.fallback
    }

    /// Styles for an extension (without the leading dot).
    ///
    /// Never fails: unknown extensions resolve to the fallback, which is
    /// either empty or the wildcard style.
    pub fn styles_for(&self, extension: &str) -> &[CommentStyle] {
        if let Some(styles) = self.lookup(extension) {
            return styles;
        }
        match self.fallback {
            Fallback::Skip => &[],
            Fallback::Wildcard => WILDCARD,
        }
    }

    /// Styles for an optional extension; files without one use the fallback.
    pub fn styles_for_file(&self, extension: Option<&str>) -> &[CommentStyle] {
        self.styles_for(extension.unwrap_or(""))
    }

    /// Whether `extension` has an explicit mapping.
    pub fn knows(&self, extension: &str) -> bool {
        self.lookup(extension).is_some()
    }

    /// Whether files with this extension would be scanned at all.
    pub fn scans(&self, extension: Option<&str>) -> bool {
        !self.styles_for_file(extension).is_empty()
    }

    /// All mapped extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    fn lookup(&self, extension: &str) -> Option<&[CommentStyle]> {
        if extension.is_empty() {
            return None;
        }
        self.by_extension
            .get(extension)
            .or_else(|| {
                self.by_extension
                    .get(extension.to_ascii_lowercase().as_str())
            })
            .map(Vec::as_slice)
    }
}

/// The style whose comment starts at `pos`, preferring the longest start
/// literal regardless of list order.
///
/// An immediately closed block wins over longer starts, so `/**/` is an
/// empty `/*` comment rather than an unterminated `/**`.
pub fn longest_match<'s>(
    styles: &'s [CommentStyle],
    text: &str,
    pos: usize,
) -> Option<&'s CommentStyle> {
    let rest = text.get(pos..)?;
    let mut best: Option<&CommentStyle> = None;
    let mut best_closed = false;

    for style in styles.iter().filter(|s| rest.starts_with(&*s.start)) {
        let closed = style.is_block() && rest[style.start.len()..].starts_with(&*style.end);
        let better = match best {
            None => true,
            Some(current) => {
                (closed && !best_closed)
                    || (closed == best_closed && style.start.len() > current.start.len())
            }
        };
        if better {
            best = Some(style);
            best_closed = closed;
        }
    }

    best
}
