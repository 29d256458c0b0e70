//! Markdown to slide model parser.
//!
//! Recognizes a small line-oriented Markdown dialect:
//!
//! - `# Title` starts a title slide; the following non-blank lines up to the
//!   first `##` form its subtitle.
//! - `## Title` starts a content slide.
//! - `###` / `####` headings, bullet and numbered lists, a trailing
//!   `![caption](path)` image, and plain paragraphs fill a content slide.
//! - Inline links, bold, italic, and bold italic spans become styled runs.

use crate::error::{Error, Result};
use crate::types::{ContentItem, HeadingDepth, Image, ListItem, SectionHeading, Slide, TextRun};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Unordered list line: indentation, marker, text.
static BULLET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)[-*+]\s+(.+)$").unwrap());

/// Ordered list line: indentation, number, `.` or `)`, text.
static NUMBERED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)(\d+)[.)]\s+(.+)$").unwrap());

/// An image directive alone on its line.
static IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*!\[([^\]]*)\]\(([^)]+)\)\s*$").unwrap());

/// `###` or `####` section heading.
static SECTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{3,4})\s+(.+)$").unwrap());

/// Links first, then emphasis from the longest delimiter to the shortest.
///
/// Groups: 1 link, 2 caption, 3 url; 4-6 triple; 7-9 double; 10-12 single.
static INLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(\[([^\]]*)\]\(([^)]+)\))",
        r"|(\*\*\*|___)(.+?)(\*\*\*|___)",
        r"|(\*\*|__)(.+?)(\*\*|__)",
        r"|(\*|_)(.+?)(\*|_)",
    ))
    .unwrap()
});

const TITLE_PREFIX: &str = "# ";
const SLIDE_PREFIX: &str = "## ";

/// Parse Markdown into slides.
///
/// Shorthand for `MarkdownParser::new().parse(markdown)`.
pub fn parse(markdown: &str) -> Result<Vec<Slide>> {
    MarkdownParser::new().parse(markdown)
}

/// Parser for the slide Markdown dialect.
///
/// Holds no per-document state, so one parser can be reused for any number
/// of documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse the markdown content into slides.
    ///
    /// Fails with [`Error::Validation`] if the content is blank or contains
    /// no `#` or `##` heading.
    pub fn parse(&self, markdown: &str) -> Result<Vec<Slide>> {
        if markdown.trim().is_empty() {
            return Err(Error::validation("Content cannot be empty"));
        }

        let mut state = ParseState::default();
        for line in markdown.split('\n') {
            state.consume_line(line);
        }
        let slides = state.finish();

        if slides.is_empty() {
            return Err(Error::validation(
                "Document must contain at least one heading (# or ##)",
            ));
        }

        log::debug!("Parsed {} slides", slides.len());
        Ok(slides)
    }
}

/// State carried through the line scan.
#[derive(Debug, Default)]
struct ParseState {
    slides: Vec<Slide>,
    /// Between a `#` heading and the first following `##`.
    collecting_subtitle: bool,
    subtitle_lines: Vec<String>,
}

impl ParseState {
    fn consume_line(&mut self, line: &str) {
        if let Some(title) = line.strip_prefix(TITLE_PREFIX) {
            self.slides.push(Slide::title_slide(title.trim()));
            self.collecting_subtitle = true;
            self.subtitle_lines.clear();
            return;
        }

        if let Some(title) = line.strip_prefix(SLIDE_PREFIX) {
            self.finish_subtitle();
            self.collecting_subtitle = false;
            self.slides.push(Slide::content_slide(title.trim()));
            return;
        }

        let Some(slide) = self.slides.last_mut() else {
            return;
        };

        if self.collecting_subtitle && slide.is_title_slide {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                self.subtitle_lines.push(trimmed.to_string());
            }
        } else if !slide.is_title_slide {
            parse_content_line(line, slide);
        }
    }

    /// Move buffered subtitle lines onto the first slide.
    ///
    /// The subtitle always belongs to slide 0, and only when that slide is a
    /// title slide; otherwise the buffered lines are dropped.
    fn finish_subtitle(&mut self) {
        if !self.collecting_subtitle || self.subtitle_lines.is_empty() {
            return;
        }
        let subtitle = self.subtitle_lines.join("\n").trim().to_string();
        self.subtitle_lines.clear();
        if let Some(first) = self.slides.first_mut().filter(|s| s.is_title_slide) {
            first.subtitle = Some(subtitle);
        }
    }

    fn finish(mut self) -> Vec<Slide> {
        self.finish_subtitle();
        self.slides
    }
}

/// Classify one line of a content slide and append what it produces.
fn parse_content_line(line: &str, slide: &mut Slide) {
    let stripped = line.trim_end();

    if let Some(caps) = SECTION_REGEX.captures(stripped) {
        let depth = if caps[1].len() == 3 {
            HeadingDepth::Three
        } else {
            HeadingDepth::Four
        };
        slide.content.push(ContentItem::Heading(SectionHeading {
            text: caps[2].trim().to_string(),
            depth,
        }));
        return;
    }

    if let Some(caps) = IMAGE_REGEX.captures(stripped) {
        let caption = caps[1].trim();
        slide.image = Some(Image {
            path: caps[2].trim().to_string(),
            caption: (!caption.is_empty()).then(|| caption.to_string()),
        });
        return;
    }

    if let Some(caps) = BULLET_REGEX.captures(stripped) {
        let level = indent_level(&caps[1]);
        let runs = parse_inline_formatting(&caps[2]);
        slide
            .content
            .push(ContentItem::List(ListItem::bullet(runs, level)));
        return;
    }

    if let Some((caps, number)) = NUMBERED_REGEX
        .captures(stripped)
        .and_then(|caps| caps[2].parse::<u64>().ok().map(|n| (caps, n)))
    {
        let level = indent_level(&caps[1]);
        let runs = parse_inline_formatting(&caps[3]);
        slide
            .content
            .push(ContentItem::List(ListItem::numbered(runs, level, number)));
        return;
    }

    if !stripped.trim().is_empty() {
        slide.content.extend(
            parse_inline_formatting(stripped)
                .into_iter()
                .map(ContentItem::Text),
        );
    }
}

/// Two columns of leading whitespace per nesting level.
fn indent_level(indent: &str) -> usize {
    indent.chars().count() / 2
}

/// Parse inline formatting (links, bold, italic) into styled runs.
///
/// Text between matches becomes plain runs. A line without any formatting
/// yields a single plain run holding the whole line.
pub fn parse_inline_formatting(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut pos = 0;

    for caps in INLINE_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        if whole.start() > pos {
            runs.push(TextRun::plain(&text[pos..whole.start()]));
        }
        runs.push(run_from_match(&caps));
        pos = whole.end();
    }

    if pos < text.len() {
        runs.push(TextRun::plain(&text[pos..]));
    }

    if runs.is_empty() {
        runs.push(TextRun::plain(text));
    }

    runs
}

fn run_from_match(caps: &Captures<'_>) -> TextRun {
    let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

    if caps.get(1).is_some() {
        let caption = group(2);
        let url = group(3);
        let display = if caption.is_empty() { url } else { caption };
        TextRun::link(display, url)
    } else if caps.get(4).is_some() {
        TextRun::bold_italic(group(5))
    } else if caps.get(7).is_some() {
        TextRun::bold(group(8))
    } else {
        TextRun::italic(group(11))
    }
}
