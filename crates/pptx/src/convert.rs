//! Markdown to PPTX conversion entry points.

use crate::document::PptxDocument;
use crate::media::FsImageProbe;
use slides_core::{parse, Error, RenderConfig, Renderer, Result};
use std::path::{Path, PathBuf};

/// File name of the bundled brand logo.
pub const LOGO_FILE_NAME: &str = "multiverse_logo.png";

/// Conversion settings.
#[derive(Debug, Clone, Default)]
pub struct ConverterConfig {
    /// Logo image; when unset, the bundled logo is searched for.
    pub logo_path: Option<PathBuf>,

    /// Directory relative image paths resolve against.
    pub base_dir: Option<PathBuf>,
}

impl ConverterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = Some(path.into());
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

/// Locate the logo image.
///
/// An explicit path is used when it exists. Otherwise `resources/` next to
/// the executable, one level above it, and under the working directory are
/// tried in that order. Returns `None` when nothing is found.
pub fn find_logo(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        log::warn!("Logo not found at {}, searching defaults", path.display());
    }

    let mut candidates = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join("resources").join(LOGO_FILE_NAME));
        candidates.push(exe_dir.join("..").join("resources").join(LOGO_FILE_NAME));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("resources").join(LOGO_FILE_NAME));
    }

    let found = candidates.into_iter().find(|p| p.is_file());
    match &found {
        Some(path) => log::debug!("Using logo {}", path.display()),
        None => log::debug!("No logo found"),
    }
    found
}

/// Reject output paths that are blank or not `.pptx`.
pub fn validate_output_path(path: &Path) -> Result<()> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(Error::validation("Output path cannot be empty"));
    }
    let is_pptx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pptx"));
    if !is_pptx {
        return Err(Error::validation("Output path must have .pptx extension"));
    }
    Ok(())
}

/// Converts Markdown text into a branded PPTX file.
#[derive(Debug, Clone)]
pub struct Converter {
    renderer: Renderer,
}

impl Converter {
    /// Create a converter, resolving the logo once up front.
    pub fn new(config: ConverterConfig) -> Self {
        let render_config = RenderConfig {
            logo_path: find_logo(config.logo_path.as_deref()),
            base_dir: config.base_dir,
        };
        Self {
            renderer: Renderer::with_config(render_config),
        }
    }

    /// Convert `markdown` and save it to `output_path`.
    ///
    /// Returns the absolute path of the written file.
    pub fn convert(&self, markdown: &str, output_path: &Path) -> Result<PathBuf> {
        validate_output_path(output_path)?;

        let slides = parse(markdown)?;

        let mut document = PptxDocument::new();
        self.renderer
            .render(&slides, &mut document, &FsImageProbe::new())?;

        let output = std::path::absolute(output_path)?;
        document.save(&output)?;
        log::info!("Wrote {} slides to {}", slides.len(), output.display());

        Ok(output)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConverterConfig::default())
    }
}

/// Convert a Markdown file.
///
/// Surrounding whitespace in the input path is ignored. The output defaults
/// to the input path with a `.pptx` extension, and images resolve relative
/// to the input file's directory unless `config.base_dir` says otherwise.
pub fn convert_file(
    input_path: &Path,
    output_path: Option<&Path>,
    mut config: ConverterConfig,
) -> Result<PathBuf> {
    let input_path = match input_path.to_str() {
        Some(s) => Path::new(s.trim()),
        None => input_path,
    };
    if input_path.as_os_str().is_empty() {
        return Err(Error::validation("Input path cannot be empty"));
    }
    if !input_path.exists() {
        return Err(Error::NotFound(input_path.to_path_buf()));
    }
    if !input_path.is_file() {
        return Err(Error::validation(format!(
            "Input path is not a file: {}",
            input_path.display()
        )));
    }

    let markdown = std::fs::read_to_string(input_path)?;
    let output = match output_path {
        Some(path) => path.to_path_buf(),
        None => input_path.with_extension("pptx"),
    };

    if config.base_dir.is_none() {
        config.base_dir = input_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);
    }

    Converter::new(config).convert(&markdown, &output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tests::png_bytes;
    use crate::reader::{MarkerSummary, PptxReader};

    const DECK: &str = "\
# Quarterly Review
Finance team
October 2026

## Highlights
- Revenue **up** 12%
  - Driven by *new* markets
- See [the report](https://example.com/report)

## Plan
1. Hire
   1. Engineers
2. Ship
";

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path(Path::new("deck.pptx")).is_ok());
        assert!(validate_output_path(Path::new("DECK.PPTX")).is_ok());

        let err = validate_output_path(Path::new("")).unwrap_err();
        assert_eq!(err.to_string(), "Output path cannot be empty");
        let err = validate_output_path(Path::new("deck.pdf")).unwrap_err();
        assert_eq!(err.to_string(), "Output path must have .pptx extension");
        assert!(validate_output_path(Path::new("deck")).unwrap_err().is_validation());
    }

    #[test]
    fn test_convert_writes_readable_deck() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("review.pptx");

        let written = Converter::default().convert(DECK, &output).unwrap();
        assert!(written.is_absolute());
        assert!(written.is_file());

        let deck = PptxReader::new().read_path(&written).unwrap();
        assert_eq!(deck.slide_count(), 3);

        let title = deck.slides[0].texts();
        assert_eq!(title[0], "Quarterly Review");
        assert_eq!(title[1], "Finance team\nOctober 2026");

        let highlights = &deck.slides[1];
        assert_eq!(highlights.texts()[0], "Highlights");
        let body = &highlights.shapes[1];
        assert_eq!(body.paragraphs.len(), 3);
        assert_eq!(body.paragraphs[1].level, 1);
        assert_eq!(
            body.paragraphs[1].marker,
            Some(MarkerSummary::Bullet("–".to_string()))
        );

        let bold: Vec<_> = highlights
            .runs()
            .filter(|r| r.bold)
            .map(|r| r.text.as_str())
            .collect();
        assert!(bold.contains(&"up"));
        assert!(highlights.runs().any(|r| r.italic && r.text == "new"));
        let link = highlights.runs().find(|r| r.hyperlink.is_some()).unwrap();
        assert_eq!(link.text, "the report");
        assert_eq!(link.hyperlink.as_deref(), Some("https://example.com/report"));
        assert!(link.underline);

        let plan = &deck.slides[2].shapes[1];
        assert_eq!(
            plan.paragraphs[0].marker,
            Some(MarkerSummary::AutoNumber("arabicPeriod".to_string()))
        );
        assert_eq!(
            plan.paragraphs[1].marker,
            Some(MarkerSummary::AutoNumber("alphaLcPeriod".to_string()))
        );
    }

    #[test]
    fn test_convert_rejects_bad_output_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deck.txt");

        let err = Converter::default().convert(DECK, &output).unwrap_err();
        assert!(err.is_validation());
        assert!(!output.exists());
    }

    #[test]
    fn test_failed_parse_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deck.pptx");

        let err = Converter::default().convert("just text", &output).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Document must contain at least one heading (# or ##)"
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_convert_creates_output_directories() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out/decks/deck.pptx");

        Converter::default().convert("## Only\n- one\n", &output).unwrap();
        assert!(output.is_file());
    }

    #[test]
    fn test_convert_file_defaults_output_and_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chart.png"), png_bytes(64, 32)).unwrap();
        let input = dir.path().join("talk.md");
        std::fs::write(&input, "## Chart\n- point\n![Sales](chart.png)\n").unwrap();

        let written = convert_file(&input, None, ConverterConfig::default()).unwrap();
        assert_eq!(written.file_name().unwrap(), "talk.pptx");

        let deck = PptxReader::new().read_path(&written).unwrap();
        let slide = &deck.slides[0];
        assert_eq!(slide.picture_count(), 1);
        assert!(slide.texts().contains(&"Sales".to_string()));
        let picture = slide.shapes.iter().find(|s| s.image_target.is_some()).unwrap();
        assert_eq!(picture.image_target.as_deref(), Some("ppt/media/image1.png"));
    }

    #[test]
    fn test_convert_file_with_logo() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, png_bytes(300, 100)).unwrap();
        let input = dir.path().join("talk.md");
        std::fs::write(&input, "# Hello\n\n## Next\n- a\n").unwrap();

        let config = ConverterConfig::new().with_logo_path(&logo);
        let output = dir.path().join("x.pptx");
        let written = convert_file(&input, Some(output.as_path()), config).unwrap();

        let deck = PptxReader::new().read_path(&written).unwrap();
        assert!(deck.slides.iter().all(|s| s.picture_count() == 1));
    }

    #[test]
    fn test_convert_file_missing_image_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("talk.md");
        std::fs::write(&input, "## Chart\n- point\n![Gone](missing.png)\n").unwrap();

        let written = convert_file(&input, None, ConverterConfig::default()).unwrap();
        let deck = PptxReader::new().read_path(&written).unwrap();
        assert_eq!(deck.slides[0].picture_count(), 0);
        assert_eq!(deck.slides[0].texts(), vec!["Chart".to_string(), "point".to_string()]);
    }

    #[test]
    fn test_convert_file_input_errors() {
        let dir = tempfile::tempdir().unwrap();

        let err = convert_file(Path::new(""), None, ConverterConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Input path cannot be empty");

        let missing = dir.path().join("missing.md");
        let err = convert_file(&missing, None, ConverterConfig::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.to_string().starts_with("Input file not found: "));

        let err = convert_file(dir.path(), None, ConverterConfig::default()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("Input path is not a file: "));
    }

    #[test]
    fn test_find_logo_prefers_existing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("brand.png");
        std::fs::write(&logo, png_bytes(2, 2)).unwrap();

        assert_eq!(find_logo(Some(logo.as_path())), Some(logo.clone()));
        let missing = dir.path().join("nope.png");
        assert_ne!(find_logo(Some(missing.as_path())), Some(missing));
    }

    #[test]
    fn test_convert_file_trims_input_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("talk.md");
        std::fs::write(&input, "## Only\n- one\n").unwrap();

        let padded = PathBuf::from(format!("  {}\t", input.display()));
        let written = convert_file(&padded, None, ConverterConfig::default()).unwrap();
        assert_eq!(written, dir.path().join("talk.pptx"));

        let err = convert_file(Path::new(" \t "), None, ConverterConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "Input path cannot be empty");
    }

    #[test]
    fn test_control_characters_survive_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("deck.pptx");

        let markdown = "## Slide\n- page\u{0C}break and bell\u{07}\n";
        let written = Converter::default().convert(markdown, &output).unwrap();

        let deck = PptxReader::new().read_path(&written).unwrap();
        assert_eq!(
            deck.slides[0].texts()[1],
            "page_x000C_break and bell_x0007_"
        );
    }
}
