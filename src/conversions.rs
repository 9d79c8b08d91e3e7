//! Catalog of known conversion types and their option keys.
//!
//! Conversion options travel as an open JSON object ([`OptionBag`]). For the
//! conversion types listed here the accepted keys and value kinds are known;
//! any other `convert.*` type is [`ConversionKind::Unknown`] and takes an
//! unconstrained bag. The catalog is reference data for callers and the CLI.
//! The client never rejects option values based on it.

use serde_json::{Map, Value};

/// Open, string-keyed conversion options.
pub type OptionBag = Map<String, Value>;

/// Value kind accepted by an option key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// JSON boolean.
    Boolean,
    /// JSON integer.
    Integer,
    /// Free-form string.
    Text,
    /// One of a fixed set of string literals.
    OneOf(&'static [&'static str]),
}

/// One accepted option key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionField {
    /// Key in the option bag.
    pub name: &'static str,
    /// Accepted value kind.
    pub kind: OptionKind,
    /// Whether the key must be present.
    pub required: bool,
}

impl OptionField {
    const fn new(name: &'static str, kind: OptionKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Whether `value` has the declared kind.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match self.kind {
            OptionKind::Boolean => value.is_boolean(),
            OptionKind::Integer => value.is_i64() || value.is_u64(),
            OptionKind::Text => value.is_string(),
            OptionKind::OneOf(allowed) => value.as_str().is_some_and(|v| allowed.contains(&v)),
        }
    }
}

/// A known conversion type and its option keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSpec {
    /// Conversion type identifier, e.g. `convert.xml_to_csv`.
    pub conversion_type: &'static str,
    /// Accepted option keys (always includes `sandbox`).
    pub fields: &'static [OptionField],
}

impl ConversionSpec {
    /// Looks up an option key.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static OptionField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Result of looking up a conversion type in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind<'a> {
    /// A cataloged conversion type.
    Known(&'static ConversionSpec),
    /// Any other type; its option bag is unconstrained.
    Unknown(&'a str),
}

impl ConversionKind<'_> {
    /// Whether `key` is a documented option for this conversion.
    ///
    /// `file_id` and `url` carry the input and are accepted everywhere;
    /// unknown conversion types accept every key.
    #[must_use]
    pub fn accepts(&self, key: &str) -> bool {
        match self {
            Self::Known(spec) => INPUT_KEYS.contains(&key) || spec.field(key).is_some(),
            Self::Unknown(_) => true,
        }
    }

    /// Option keys whose value does not have the documented kind.
    ///
    /// Advisory only: callers may use this to warn, the client does not.
    #[must_use]
    pub fn mismatched_keys(&self, options: &OptionBag) -> Vec<String> {
        let Self::Known(spec) = self else {
            return Vec::new();
        };
        options
            .iter()
            .filter_map(|(key, value)| {
                spec.field(key)
                    .filter(|field| !field.matches(value))
                    .map(|_| key.clone())
            })
            .collect()
    }
}

/// Looks up a conversion type.
#[must_use]
pub fn lookup(conversion_type: &str) -> ConversionKind<'_> {
    CATALOG
        .iter()
        .find(|spec| spec.conversion_type == conversion_type)
        .map_or(ConversionKind::Unknown(conversion_type), ConversionKind::Known)
}

/// All cataloged conversion types.
#[must_use]
pub fn known_conversions() -> &'static [ConversionSpec] {
    CATALOG
}

const INPUT_KEYS: [&str; 2] = ["file_id", "url"];

// Value literal sets.
const PAGE_SIZE: &[&str] = &["A4", "B5", "Letter"];
const DELIMITER: &[&str] = &["comma", "semicolon", "vertical_bar", "tabulation"];
const ORIENTATION: &[&str] = &["Portrait", "Landscape"];
const COLOR_MODE: &[&str] = &["colored", "grayscale"];
const COLOR_MODE3: &[&str] = &["colored", "grayscale", "monochrome"];
const BACKGROUND_COLOR: &[&str] = &["white", "transparent"];
const EXCEL_FORMAT: &[&str] = &["xlsx", "xls"];
const SPACE: &[&str] = &["0", "1s", "2s", "3s", "4s", "1t"];
const XML_ENCODING: &[&str] = &["utf-8", "utf-16le", "utf-16be"];
const BITRATE: &[&str] = &["default", "96", "128", "160", "192", "256", "320"];
const BIT_DEPTH: &[&str] = &["8", "16", "24", "32"];
const AUDIO_CHANNELS: &[&str] = &["default", "1", "2"];
const SAMPLING_RATE: &[&str] = &["default", "8000", "16000", "44100", "48000"];
const IMAGE_RESOLUTION: &[&str] = &["72", "150", "300", "600"];
const PREFIX: &[&str] = &["@", "#", "_", "__"];

const fn boolean(name: &'static str) -> OptionField {
    OptionField::new(name, OptionKind::Boolean)
}

const fn integer(name: &'static str) -> OptionField {
    OptionField::new(name, OptionKind::Integer)
}

const fn text(name: &'static str) -> OptionField {
    OptionField::new(name, OptionKind::Text)
}

const fn one_of(name: &'static str, values: &'static [&'static str]) -> OptionField {
    OptionField::new(name, OptionKind::OneOf(values))
}

const SANDBOX: OptionField = boolean("sandbox");

// Option groups shared by several conversion types.
const BASE: &[OptionField] = &[SANDBOX];
const OCR: &[OptionField] = &[SANDBOX, text("language_ocr")];
const TO_MP3: &[OptionField] = &[SANDBOX, one_of("bitrate", BITRATE)];
const TO_WAV: &[OptionField] = &[
    SANDBOX,
    one_of("sampling_rate", SAMPLING_RATE),
    one_of("bit_depth", BIT_DEPTH),
    one_of("audio_channels", AUDIO_CHANNELS),
];
const WEBSITE_TO_PDF: &[OptionField] = &[
    SANDBOX,
    text("url"),
    one_of("orientation", ORIENTATION),
    one_of("pagesize", PAGE_SIZE),
    one_of("colormode", COLOR_MODE),
    boolean("background"),
    boolean("images"),
    boolean("javascript"),
];
const WEBSITE_TO_IMAGE: &[OptionField] = &[
    SANDBOX,
    text("url").required(),
    boolean("images"),
    boolean("javascript"),
];
const ORIENTED: &[OptionField] = &[SANDBOX, one_of("orientation", ORIENTATION)];
const HTML_TABLE_TO_CSV: &[OptionField] = &[SANDBOX, text("url"), one_of("delimiter", DELIMITER)];
const EXCEL_TO_HTML: &[OptionField] = &[
    SANDBOX,
    boolean("recalculate"),
    boolean("make_sortable"),
    text("title_overview"),
    text("title_sheet"),
];
const DELIMITED: &[OptionField] = &[SANDBOX, one_of("delimiter", DELIMITER)];
const DELIMITED_QUOTED: &[OptionField] =
    &[SANDBOX, one_of("delimiter", DELIMITER), boolean("quote")];
const CSV_TO_EXCEL: &[OptionField] = &[
    SANDBOX,
    one_of("delimiter", DELIMITER),
    one_of("excel_format", EXCEL_FORMAT),
];
const CSV_TO_XML: &[OptionField] = &[
    SANDBOX,
    one_of("delimiter", DELIMITER),
    boolean("header"),
    boolean("show_columns"),
    boolean("index_records"),
    boolean("add_empty_nodes"),
    boolean("short_tag_empty_node"),
    one_of("xml_encoding", XML_ENCODING),
];
const EXCEL_TO_XML: &[OptionField] = &[
    SANDBOX,
    boolean("header"),
    boolean("show_columns"),
    boolean("index_records"),
    boolean("add_empty_nodes"),
    boolean("short_tag_empty_node"),
    one_of("xml_encoding", XML_ENCODING),
];
const XML_TO_JSON: &[OptionField] = &[
    SANDBOX,
    one_of("space", SPACE),
    one_of("prefix_attr", PREFIX),
    one_of("prefix_text", PREFIX),
    boolean("attr_always_object"),
    boolean("text_always_object"),
];
const XML_TO_EXCEL: &[OptionField] = &[
    SANDBOX,
    boolean("split_excel_rows_limit"),
    one_of("excel_format", EXCEL_FORMAT),
];
const EXCEL_OUTPUT: &[OptionField] = &[SANDBOX, one_of("excel_format", EXCEL_FORMAT)];
const PDF_TO_JPG: &[OptionField] = &[
    SANDBOX,
    one_of("image_resolution", IMAGE_RESOLUTION),
    integer("jpeg_quality"),
    one_of("colormode", COLOR_MODE),
    boolean("progressive_jpeg"),
];
const PDF_TO_PNG: &[OptionField] = &[
    SANDBOX,
    one_of("image_resolution", IMAGE_RESOLUTION),
    one_of("colormode3", COLOR_MODE3),
    one_of("background_color", BACKGROUND_COLOR),
];
const TO_SVG: &[OptionField] = &[
    SANDBOX,
    one_of("image_resolution", IMAGE_RESOLUTION),
    one_of("pagesize", PAGE_SIZE),
];
const JPEG_QUALITY: &[OptionField] = &[SANDBOX, integer("jpeg_quality")];
const WEBP_QUALITY: &[OptionField] = &[SANDBOX, integer("webp_quality")];
const SPACED: &[OptionField] = &[SANDBOX, one_of("space", SPACE)];

const fn spec(conversion_type: &'static str, fields: &'static [OptionField]) -> ConversionSpec {
    ConversionSpec {
        conversion_type,
        fields,
    }
}

static CATALOG: &[ConversionSpec] = &[
    // OCR
    spec("convert.ocr_png_to_text", OCR),
    spec("convert.ocr_jpg_to_text", OCR),
    spec("convert.ocr_png_to_pdf", OCR),
    spec("convert.ocr_jpg_to_pdf", OCR),
    spec("convert.ocr_pdf_to_text", OCR),
    spec("convert.ocr_pdf_to_pdf", OCR),
    // Audio
    spec("convert.mp4_to_mp3", TO_MP3),
    spec("convert.wav_to_mp3", TO_MP3),
    spec("convert.flac_to_mp3", TO_MP3),
    spec("convert.mp3_to_wav", TO_WAV),
    spec("convert.flac_to_wav", TO_WAV),
    spec("convert.wav_to_flac", BASE),
    // Website / office / markup
    spec("convert.website_to_pdf", WEBSITE_TO_PDF),
    spec("convert.word_to_pdf", BASE),
    spec("convert.powerpoint_to_pdf", BASE),
    spec("convert.oxps_to_pdf", BASE),
    spec("convert.word_to_text", BASE),
    spec("convert.powerpoint_to_text", BASE),
    spec("convert.jpg_to_pdf", ORIENTED),
    spec("convert.png_to_pdf", ORIENTED),
    spec("convert.markdown_to_pdf", BASE),
    spec("convert.markdown_to_html", BASE),
    spec("convert.markdown_to_epub", BASE),
    spec("convert.website_to_jpg", WEBSITE_TO_IMAGE),
    spec("convert.html_to_jpg", WEBSITE_TO_IMAGE),
    spec("convert.website_to_png", WEBSITE_TO_IMAGE),
    spec("convert.html_to_png", WEBSITE_TO_IMAGE),
    spec("convert.html_table_to_csv", HTML_TABLE_TO_CSV),
    // Spreadsheets
    spec("convert.excel_to_pdf", ORIENTED),
    spec("convert.excel_to_html", EXCEL_TO_HTML),
    spec("convert.excel_to_csv", DELIMITED_QUOTED),
    spec("convert.excel_to_ods", BASE),
    spec("convert.excel_to_xml", EXCEL_TO_XML),
    spec("convert.excel_to_json", EXCEL_TO_XML),
    spec("convert.ods_to_csv", DELIMITED),
    spec("convert.ods_to_pdf", ORIENTED),
    spec("convert.ods_to_excel", BASE),
    spec("convert.csv_to_excel", CSV_TO_EXCEL),
    spec("convert.csv_to_xml", CSV_TO_XML),
    // XML
    spec("convert.xml_to_json", XML_TO_JSON),
    spec("convert.xml_to_csv", DELIMITED_QUOTED),
    spec("convert.xml_to_excel", XML_TO_EXCEL),
    spec("convert.excel_xml_to_excel_xlsx", EXCEL_OUTPUT),
    // PDF
    spec("convert.pdf_to_csv", DELIMITED_QUOTED),
    spec("convert.pdf_to_excel", BASE),
    spec("convert.pdf_to_jpg", PDF_TO_JPG),
    spec("convert.pdf_to_png", PDF_TO_PNG),
    spec("convert.pdf_to_tiff", PDF_TO_PNG),
    spec("convert.pdf_to_svg", TO_SVG),
    spec("convert.pdf_to_html", BASE),
    spec("convert.pdf_to_text", BASE),
    spec("convert.pdf_to_word", BASE),
    // Images
    spec("convert.png_to_jpg", BASE),
    spec("convert.jpg_to_png", BASE),
    spec("convert.heic_to_png", BASE),
    spec("convert.heic_to_jpg", JPEG_QUALITY),
    spec("convert.png_to_webp", WEBP_QUALITY),
    spec("convert.jpg_to_webp", WEBP_QUALITY),
    spec("convert.tiff_to_webp", WEBP_QUALITY),
    spec("convert.gif_to_webp", WEBP_QUALITY),
    spec("convert.webp_to_png", BASE),
    spec("convert.webp_to_tiff", BASE),
    spec("convert.webp_to_bmp", BASE),
    spec("convert.webp_to_yuv", BASE),
    spec("convert.webp_to_pam", BASE),
    spec("convert.webp_to_pgm", BASE),
    spec("convert.webp_to_ppm", BASE),
    spec("convert.png_to_svg", TO_SVG),
    spec("convert.jpg_to_avif", WEBP_QUALITY),
    spec("convert.png_to_avif", WEBP_QUALITY),
    spec("convert.avif_to_png", BASE),
    spec("convert.avif_to_jpg", BASE),
    // eBooks
    spec("convert.epub_to_mobi", BASE),
    spec("convert.epub_to_azw", BASE),
    spec("convert.mobi_to_epub", BASE),
    spec("convert.mobi_to_azw", BASE),
    spec("convert.azw_to_epub", BASE),
    spec("convert.azw_to_mobi", BASE),
    spec("convert.epub_to_pdf", BASE),
    spec("convert.mobi_to_pdf", BASE),
    spec("convert.azw_to_pdf", BASE),
    spec("convert.azw3_to_pdf", BASE),
    spec("convert.fb2_to_pdf", BASE),
    spec("convert.fbz_to_pdf", BASE),
    spec("convert.pdf_to_epub", BASE),
    spec("convert.pdf_to_mobi", BASE),
    spec("convert.pdf_to_azw", BASE),
    spec("convert.pdf_to_azw3", BASE),
    spec("convert.pdf_to_fb2", BASE),
    spec("convert.pdf_to_fbz", BASE),
    // Video
    spec("convert.mov_to_mp4", BASE),
    spec("convert.mkv_to_mp4", BASE),
    spec("convert.avi_to_mp4", BASE),
    // Utilities
    spec("convert.remove_exif", BASE),
    spec("convert.format_json", SPACED),
    spec("convert.validate_json", BASE),
    spec("convert.fix_xml_escaping", BASE),
    // JSON / YAML
    spec("convert.json_to_xml", SPACED),
    spec("convert.json_to_csv", DELIMITED_QUOTED),
    spec("convert.json_to_excel", EXCEL_OUTPUT),
    spec("convert.json_to_yaml", BASE),
    spec("convert.json_objects_to_csv", DELIMITED_QUOTED),
    spec("convert.json_objects_to_excel", EXCEL_OUTPUT),
    spec("convert.yaml_to_json", SPACED),
    // Subtitles
    spec("convert.srt_to_csv", DELIMITED_QUOTED),
    spec("convert.srt_to_excel", EXCEL_OUTPUT),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;
    use crate::validation::CONVERSION_TYPE_PREFIX;

    #[test]
    fn test_catalog_types_are_unique_and_prefixed() {
        let mut seen = HashSet::new();
        for spec in known_conversions() {
            assert!(
                spec.conversion_type.starts_with(CONVERSION_TYPE_PREFIX),
                "{}",
                spec.conversion_type
            );
            assert!(
                seen.insert(spec.conversion_type),
                "duplicate {}",
                spec.conversion_type
            );
        }
        assert!(seen.len() >= 100, "catalog has {} entries", seen.len());
    }

    #[test]
    fn test_every_spec_accepts_sandbox() {
        for spec in known_conversions() {
            assert!(spec.field("sandbox").is_some(), "{}", spec.conversion_type);
        }
    }

    #[test]
    fn test_lookup_known_type() {
        let kind = lookup("convert.xml_to_csv");
        let ConversionKind::Known(spec) = kind else {
            panic!("expected known type");
        };
        assert_eq!(
            spec.field("delimiter").map(|f| f.kind),
            Some(OptionKind::OneOf(DELIMITER))
        );
        assert!(kind.accepts("quote"));
        assert!(kind.accepts("file_id"));
        assert!(!kind.accepts("pagesize"));
    }

    #[test]
    fn test_lookup_unknown_type_accepts_anything() {
        let kind = lookup("convert.future_format");
        assert_eq!(kind, ConversionKind::Unknown("convert.future_format"));
        assert!(kind.accepts("anything"));
    }

    #[test]
    fn test_website_to_image_requires_url() {
        let ConversionKind::Known(spec) = lookup("convert.website_to_png") else {
            panic!("expected known type");
        };
        assert!(spec.field("url").is_some_and(|f| f.required));
    }

    #[test]
    fn test_mismatched_keys_reports_wrong_kinds() {
        let mut options = OptionBag::new();
        options.insert("delimiter".into(), json!("tab"));
        options.insert("quote".into(), json!(true));
        options.insert("custom".into(), json!(1));
        let mismatched = lookup("convert.xml_to_csv").mismatched_keys(&options);
        assert_eq!(mismatched, vec!["delimiter".to_string()]);
    }

    #[test]
    fn test_option_field_matches_integer() {
        let field = integer("jpeg_quality");
        assert!(field.matches(&json!(90)));
        assert!(!field.matches(&json!("90")));
    }
}
