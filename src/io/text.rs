// ============================================================================
// Text Formats
// Pretty (box-drawing) and utility (delimited rows) renderings
// ============================================================================
//
// # Pretty
//
// ```text
// # mdn2d base=10 precision=16 sign=default fraxis=x carry=100 cascade=4 division=16
// │ 5 0
// │ 3 2̅
// ┼────
// ```
//
// Rows run from the top of the window (bounds plus origin) down. A `│`
// column separates `x < 0` from `x >= 0`, and the axis line sits below
// row `y = 0`. Negative digits carry a combining overline, or a leading
// `-` with `wide_negatives`. The header line is optional on read; `Display`
// omits it.
//
// # Utility
//
// ```text
// # mdn2d x=-1 y=1 base=10 precision=16 sign=default fraxis=x carry=100 cascade=4 division=16 sep=,
// 0,5
// 0,3
// ```
//
// The header names the top-left coordinate, the config and the column
// separator; each line is one row of decimal digits. Without `sep=` rows
// split on `,`, `;` or whitespace.
// ============================================================================

use crate::domain::{Coord, Mdn2dConfig, Rect};
use crate::engine::{DigitGrid, Mdn2d};
use crate::numeric::{char_to_digit, digit_to_char, Digit, MdnError, MdnResult};

/// Combining overline marking a negative digit
pub const OVERLINE: char = '\u{0305}';

/// Prefix of the header line shared by both layouts
pub const TEXT_HEADER: &str = "# mdn2d";

const VERTICAL: char = '│';
const HORIZONTAL: char = '─';
const CROSS: char = '┼';

/// Text layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextFormat {
    Pretty,
    Utility,
}

/// Rendering options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOptions {
    /// Digits of ten and above as `A`-`V` instead of decimal numbers
    pub alphanumeric: bool,
    /// `-7` instead of an overlined `7`
    pub wide_negatives: bool,
    /// Column separator of the utility format
    pub delimiter: char,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            alphanumeric: false,
            wide_negatives: false,
            delimiter: ',',
        }
    }
}

impl TextOptions {
    pub fn with_alphanumeric(mut self, alphanumeric: bool) -> Self {
        self.alphanumeric = alphanumeric;
        self
    }

    pub fn with_wide_negatives(mut self, wide: bool) -> Self {
        self.wide_negatives = wide;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Reject delimiters that collide with digit tokens or line breaks.
    pub fn validate(&self) -> MdnResult<()> {
        let d = self.delimiter;
        let clashes = d.is_ascii_digit()
            || matches!(d, '-' | '+' | OVERLINE)
            || (d.is_whitespace() && !matches!(d, ' ' | '\t'))
            || (d.is_control() && d != '\t');
        if clashes {
            return Err(MdnError::InvalidArgument(format!(
                "delimiter {d:?} cannot be read back"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Header
// ============================================================================

fn config_fields(config: &Mdn2dConfig) -> String {
    format!(
        "base={} precision={} sign={} fraxis={} carry={} cascade={} division={}",
        config.base,
        config.precision,
        config.sign_convention.as_str(),
        config.fraxis.as_str(),
        config.max_carryover_iters,
        config.max_cascade_depth,
        config.max_division_iters,
    )
}

fn delimiter_field(delimiter: char) -> String {
    match delimiter {
        ' ' => "sep=space".to_string(),
        '\t' => "sep=tab".to_string(),
        c => format!("sep={c}"),
    }
}

/// Fields recovered from a header line
#[derive(Debug, Default)]
struct Header {
    min_x: Option<i64>,
    max_y: Option<i64>,
    config: Option<Mdn2dConfig>,
    delimiter: Option<char>,
}

fn header_body(line: &str) -> Option<&str> {
    line.trim().strip_prefix(TEXT_HEADER)
}

fn bad_field(field: &str, reason: impl std::fmt::Display) -> MdnError {
    MdnError::ReadError(format!("bad header field '{field}': {reason}"))
}

fn parse_header(body: &str) -> MdnResult<Header> {
    let mut header = Header::default();
    for field in body.split_whitespace() {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| MdnError::ReadError(format!("bad header field '{field}'")))?;
        let int = |v: &str| v.parse::<i64>().map_err(|e| bad_field(field, e));
        let count = |v: &str| v.parse::<usize>().map_err(|e| bad_field(field, e));

        match key {
            "x" => header.min_x = Some(int(value)?),
            "y" => header.max_y = Some(int(value)?),
            "sep" => {
                let mut chars = value.chars();
                header.delimiter = Some(match (value, chars.next(), chars.next()) {
                    ("space", ..) => ' ',
                    ("tab", ..) => '\t',
                    (_, Some(c), None) => c,
                    _ => return Err(bad_field(field, "expected one character")),
                });
            },
            _ => {
                let config = header.config.get_or_insert_with(Mdn2dConfig::default);
                match key {
                    "base" => config.base = value.parse().map_err(|e| bad_field(field, e))?,
                    "precision" => {
                        config.precision = value.parse().map_err(|e| bad_field(field, e))?
                    },
                    "sign" => {
                        config.sign_convention = value.parse().map_err(|e| bad_field(field, e))?
                    },
                    "fraxis" => config.fraxis = value.parse().map_err(|e| bad_field(field, e))?,
                    "carry" => config.max_carryover_iters = count(value)?,
                    "cascade" => config.max_cascade_depth = count(value)?,
                    "division" => config.max_division_iters = count(value)?,
                    _ => return Err(bad_field(field, "unknown key")),
                }
            },
        }
    }
    if let Some(config) = &header.config {
        config
            .validate()
            .map_err(|e| MdnError::ReadError(format!("header config rejected: {e}")))?;
    }
    Ok(header)
}

// ============================================================================
// Rendering
// ============================================================================

fn display_width(s: &str) -> usize {
    s.chars().filter(|c| *c != OVERLINE).count()
}

fn digit_token(d: Digit, options: &TextOptions) -> String {
    let magnitude = d.unsigned_abs();
    let glyph = match digit_to_char(magnitude) {
        Some(c) if options.alphanumeric => c.to_string(),
        _ => magnitude.to_string(),
    };
    match (d < 0, options.wide_negatives) {
        (false, _) => glyph,
        (true, true) => format!("-{glyph}"),
        (true, false) => glyph.chars().flat_map(|c| [c, OVERLINE]).collect(),
    }
}

fn pad_left(token: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(token));
    format!("{}{}", " ".repeat(fill), token)
}

/// Render the pretty grid without a header. No trailing newline.
pub fn render_pretty(grid: &DigitGrid, options: &TextOptions) -> String {
    let window = grid.bounds().union(&Rect::from_point(Coord::ORIGIN));
    let (lo, hi) = (window.min(), window.max());
    let n_left = lo.x.unsigned_abs() as usize;

    let rows: Vec<(i32, Vec<String>)> = (lo.y..=hi.y)
        .rev()
        .map(|y| {
            let cells = grid
                .get_row_range(y, lo.x, hi.x)
                .into_iter()
                .map(|d| digit_token(d, options))
                .collect();
            (y, cells)
        })
        .collect();
    let width = rows
        .iter()
        .flat_map(|(_, cells)| cells.iter().map(|t| display_width(t)))
        .max()
        .unwrap_or(1);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (y, cells) in rows {
        let padded: Vec<String> = cells.iter().map(|t| pad_left(t, width)).collect();
        let left = padded[..n_left].join(" ");
        let right = padded[n_left..].join(" ");
        if n_left > 0 {
            lines.push(format!("{left} {VERTICAL} {right}"));
        } else {
            lines.push(format!("{VERTICAL} {right}"));
        }

        if y == 0 {
            let left_rule = if n_left > 0 { display_width(&left) + 1 } else { 0 };
            let right_rule = display_width(&right) + 1;
            let mut axis = HORIZONTAL.to_string().repeat(left_rule);
            axis.push(CROSS);
            axis.push_str(&HORIZONTAL.to_string().repeat(right_rule));
            lines.push(axis);
        }
    }
    lines.join("\n")
}

/// Render the utility format, header included. No trailing newline.
pub fn render_utility(grid: &DigitGrid, options: &TextOptions) -> String {
    let (min_x, max_y) = if grid.has_bounds() {
        (grid.bounds().min().x, grid.bounds().max().y)
    } else {
        (0, 0)
    };
    let mut lines = vec![format!(
        "{TEXT_HEADER} x={min_x} y={max_y} {} {}",
        config_fields(grid.config()),
        delimiter_field(options.delimiter)
    )];
    if grid.has_bounds() {
        let (lo, hi) = (grid.bounds().min(), grid.bounds().max());
        let delimiter = options.delimiter.to_string();
        for y in (lo.y..=hi.y).rev() {
            let row: Vec<String> = grid
                .get_row_range(y, lo.x, hi.x)
                .into_iter()
                .map(|d| d.to_string())
                .collect();
            lines.push(row.join(&delimiter));
        }
    }
    lines.join("\n")
}

/// Render a full document: pretty output gains a config header line.
pub fn render(grid: &DigitGrid, format: TextFormat, options: &TextOptions) -> String {
    match format {
        TextFormat::Pretty => format!(
            "{TEXT_HEADER} {}\n{}",
            config_fields(grid.config()),
            render_pretty(grid, options)
        ),
        TextFormat::Utility => render_utility(grid, options),
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// What a text document holds
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedText {
    pub format: TextFormat,
    /// Present when the header carried config fields
    pub config: Option<Mdn2dConfig>,
    /// Non-zero digits, unchecked against any base
    pub digits: Vec<(Coord, i64)>,
}

/// Guess the layout of `text`.
///
/// A header with `x=` marks utility text; any other header, or a bare grid
/// drawn with box characters, is pretty.
pub fn detect_text_format(text: &str) -> Option<TextFormat> {
    let first = text.lines().find(|l| !l.trim().is_empty())?;
    if let Some(body) = header_body(first) {
        let has_origin = body.split_whitespace().any(|f| f.starts_with("x="));
        return Some(if has_origin { TextFormat::Utility } else { TextFormat::Pretty });
    }
    if text.contains(VERTICAL) || text.contains(CROSS) {
        Some(TextFormat::Pretty)
    } else {
        None
    }
}

/// Parse either layout, header included.
pub fn parse_document(text: &str) -> MdnResult<ParsedText> {
    match detect_text_format(text) {
        Some(TextFormat::Pretty) => parse_pretty(text),
        Some(TextFormat::Utility) => parse_utility(text),
        None => Err(MdnError::ReadError(
            "text is neither pretty nor utility format".to_string(),
        )),
    }
}

/// Parse either layout into its non-zero digits.
///
/// Digits are returned unchecked against any base.
pub fn parse_text(text: &str) -> MdnResult<Vec<(Coord, i64)>> {
    parse_document(text).map(|doc| doc.digits)
}

fn is_axis_line(line: &str) -> bool {
    line.contains(CROSS)
        && line
            .chars()
            .all(|c| c == HORIZONTAL || c == CROSS || c.is_whitespace())
}

fn parse_token(token: &str) -> MdnResult<i64> {
    let overlined = token.contains(OVERLINE);
    let body: String = token.chars().filter(|c| *c != OVERLINE).collect();
    let (dashed, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body.as_str()),
    };

    let magnitude = if !body.is_empty() && body.chars().all(|c| c.is_ascii_digit()) {
        body.parse::<i64>()
            .map_err(|e| MdnError::ReadError(format!("bad digit '{token}': {e}")))?
    } else {
        let mut chars = body.chars();
        match (chars.next().and_then(char_to_digit), chars.next()) {
            (Some(d), None) => d as i64,
            _ => return Err(MdnError::ReadError(format!("bad digit '{token}'"))),
        }
    };
    Ok(if overlined || dashed { -magnitude } else { magnitude })
}

fn to_coord(x: i64, y: i64) -> MdnResult<Coord> {
    match (i32::try_from(x), i32::try_from(y)) {
        (Ok(x), Ok(y)) => Ok(Coord::new(x, y)),
        _ => Err(MdnError::ReadError(format!("coordinate ({x}, {y}) out of range"))),
    }
}

/// Parse the pretty layout, with or without its header line.
pub fn parse_pretty(text: &str) -> MdnResult<ParsedText> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty()).peekable();
    let config = match lines.peek().copied().and_then(header_body) {
        Some(body) => {
            let header = parse_header(body)?;
            lines.next();
            header.config
        },
        None => None,
    };

    let mut rows: Vec<(Vec<i64>, Vec<i64>)> = Vec::new();
    let mut axis_at = None;
    for line in lines {
        if is_axis_line(line) {
            if axis_at.replace(rows.len()).is_some() {
                return Err(MdnError::ReadError("more than one axis line".to_string()));
            }
            continue;
        }
        let (left, right) = line
            .split_once(VERTICAL)
            .ok_or_else(|| MdnError::ReadError(format!("row without axis separator: '{line}'")))?;
        let left = left
            .split_whitespace()
            .map(parse_token)
            .collect::<MdnResult<Vec<_>>>()?;
        let right = right
            .split_whitespace()
            .map(parse_token)
            .collect::<MdnResult<Vec<_>>>()?;
        rows.push((left, right));
    }

    let axis = match axis_at {
        Some(0) | None => {
            return Err(MdnError::ReadError("missing row above the axis line".to_string()))
        },
        Some(axis) => axis as i64,
    };

    let mut digits = Vec::new();
    for (i, (left, right)) in rows.into_iter().enumerate() {
        let y = axis - 1 - i as i64;
        let n_left = left.len() as i64;
        for (k, d) in left.into_iter().enumerate() {
            if d != 0 {
                digits.push((to_coord(k as i64 - n_left, y)?, d));
            }
        }
        for (k, d) in right.into_iter().enumerate() {
            if d != 0 {
                digits.push((to_coord(k as i64, y)?, d));
            }
        }
    }
    Ok(ParsedText {
        format: TextFormat::Pretty,
        config,
        digits,
    })
}

/// Parse the utility layout. Rows split on the header's `sep=` character,
/// or on `,`, `;`, tabs and spaces when it is absent.
pub fn parse_utility(text: &str) -> MdnResult<ParsedText> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .and_then(header_body)
        .ok_or_else(|| MdnError::ReadError("missing utility header".to_string()))
        .and_then(parse_header)?;
    let (min_x, max_y) = match (header.min_x, header.max_y) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err(MdnError::ReadError("header lacks x= or y=".to_string())),
    };

    let mut digits = Vec::new();
    for (row, line) in lines.enumerate() {
        let y = max_y - row as i64;
        let cells: Vec<&str> = match header.delimiter {
            Some(sep) => line.split(sep).map(str::trim).collect(),
            None => line
                .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect(),
        };
        for (k, cell) in cells.into_iter().enumerate() {
            let d = cell
                .parse::<i64>()
                .map_err(|e| MdnError::ReadError(format!("bad digit '{cell}': {e}")))?;
            if d != 0 {
                digits.push((to_coord(min_x + k as i64, y)?, d));
            }
        }
    }
    Ok(ParsedText {
        format: TextFormat::Utility,
        config: header.config,
        digits,
    })
}

// ============================================================================
// Number Integration
// ============================================================================

/// Replace the digits of `grid` with parsed ones; config is unchanged.
pub(crate) fn load_digits(grid: &mut DigitGrid, digits: Vec<(Coord, i64)>) -> MdnResult<()> {
    let base = grid.base() as u64;
    let mut checked = Vec::with_capacity(digits.len());
    for (xy, d) in digits {
        if d.unsigned_abs() >= base {
            return Err(MdnError::ReadError(format!(
                "digit {d} at {xy} is out of range for base {base}"
            )));
        }
        checked.push((xy, d as Digit));
    }
    grid.clear();
    grid.set_values(checked)?;
    Ok(())
}

/// Build a fresh grid from a parsed document, using its header config or
/// `fallback`.
pub(crate) fn document_grid(doc: ParsedText, fallback: &Mdn2dConfig) -> MdnResult<DigitGrid> {
    let config = doc.config.unwrap_or_else(|| fallback.clone());
    let mut grid = DigitGrid::new(config)?;
    load_digits(&mut grid, doc.digits)?;
    Ok(grid)
}

/// Replace the digits of `target` with those in `text`.
///
/// A header config replaces the target's config; without one the config
/// is kept. The name never changes.
pub fn read_text(target: &Mdn2d, text: &str) -> MdnResult<()> {
    let doc = parse_document(text)?;
    target.mutate(|current| {
        *current = document_grid(doc, current.config())?;
        current.touch();
        Ok(())
    })
}

/// Render `source` in the chosen layout, header included.
pub fn write_text(source: &Mdn2d, format: TextFormat, options: &TextOptions) -> MdnResult<String> {
    options.validate()?;
    Ok(render(&source.snapshot(), format, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Fraxis, SignConvention};

    const DEFAULT_FIELDS: &str =
        "base=10 precision=16 sign=default fraxis=x carry=100 cascade=4 division=16";

    fn grid(digits: &[((i32, i32), Digit)]) -> DigitGrid {
        let mut g = DigitGrid::new(Mdn2dConfig::default()).unwrap();
        for ((x, y), d) in digits {
            g.set_value(Coord::new(*x, *y), *d).unwrap();
        }
        g
    }

    fn sorted(mut v: Vec<(Coord, i64)>) -> Vec<(Coord, i64)> {
        v.sort();
        v
    }

    #[test]
    fn test_pretty_layout() {
        let g = grid(&[((0, 0), 3), ((1, 0), -2), ((0, 1), 5)]);
        let text = render_pretty(&g, &TextOptions::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "│ 5 0");
        assert_eq!(lines[1], "│ 3 2\u{0305}");
        assert_eq!(lines[2], "┼────");
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_pretty_with_negative_columns() {
        let g = grid(&[((-1, 1), 4), ((0, -1), -7)]);
        let options = TextOptions::default().with_wide_negatives(true);
        let text = render_pretty(&g, &options);
        assert_eq!(text, " 4 │  0\n 0 │  0\n───┼───\n 0 │ -7");
        assert_eq!(sorted(parse_text(&text).unwrap()), vec![
            (Coord::new(-1, 1), 4),
            (Coord::new(0, -1), -7),
        ]);
    }

    #[test]
    fn test_pretty_round_trip() {
        let g = grid(&[((0, 0), 3), ((1, 0), -2), ((0, 1), 5)]);
        let text = render_pretty(&g, &TextOptions::default());
        let parsed = sorted(parse_text(&text).unwrap());
        assert_eq!(parsed, vec![
            (Coord::new(0, 0), 3),
            (Coord::new(0, 1), 5),
            (Coord::new(1, 0), -2),
        ]);
    }

    #[test]
    fn test_alphanumeric_digits() {
        let mut g = DigitGrid::new(Mdn2dConfig::hexadecimal()).unwrap();
        g.set_value(Coord::ORIGIN, 11).unwrap();
        g.set_value(Coord::new(1, 0), -15).unwrap();

        let alpha = render_pretty(&g, &TextOptions::default().with_alphanumeric(true));
        assert!(alpha.contains('B'));
        assert!(alpha.contains("F\u{0305}"));
        let plain = render_pretty(&g, &TextOptions::default());
        assert!(plain.contains("11"));

        for text in [alpha, plain] {
            assert_eq!(sorted(parse_text(&text).unwrap()), vec![
                (Coord::new(0, 0), 11),
                (Coord::new(1, 0), -15),
            ]);
        }
    }

    #[test]
    fn test_utility_round_trip() {
        let g = grid(&[((-1, 2), 1), ((1, 0), -9)]);
        let text = render_utility(&g, &TextOptions::default());
        assert_eq!(
            text,
            format!("# mdn2d x=-1 y=2 {DEFAULT_FIELDS} sep=,\n1,0,0\n0,0,0\n0,0,-9")
        );

        let tabbed = render_utility(&g, &TextOptions::default().with_delimiter('\t'));
        assert!(tabbed.lines().next().unwrap().ends_with("sep=tab"));
        for text in [text, tabbed] {
            assert_eq!(sorted(parse_text(&text).unwrap()), vec![
                (Coord::new(-1, 2), 1),
                (Coord::new(1, 0), -9),
            ]);
        }
    }

    #[test]
    fn test_utility_custom_delimiters() {
        let g = grid(&[((0, 0), 3), ((1, 0), -2), ((0, 1), 5)]);
        let expected = sorted(g.iter().map(|(xy, d)| (xy, d as i64)).collect());

        for sep in ['|', ';', ' ', '│', '┼', 'x', '='] {
            let options = TextOptions::default().with_delimiter(sep);
            options.validate().unwrap();
            let text = render_utility(&g, &options);
            assert_eq!(detect_text_format(&text), Some(TextFormat::Utility), "{sep:?}");
            assert_eq!(sorted(parse_text(&text).unwrap()), expected, "{sep:?}");
        }

        let piped = render_utility(&g, &TextOptions::default().with_delimiter('|'));
        assert!(piped.ends_with("5|0\n3|-2"));
    }

    #[test]
    fn test_delimiter_validation() {
        for sep in ['7', '-', '+', '\n', '\r', OVERLINE] {
            let options = TextOptions::default().with_delimiter(sep);
            assert!(matches!(options.validate(), Err(MdnError::InvalidArgument(_))), "{sep:?}");
        }
        assert!(TextOptions::default().validate().is_ok());
    }

    #[test]
    fn test_header_carries_config() {
        let config = Mdn2dConfig::hexadecimal()
            .with_precision(9)
            .with_sign_convention(SignConvention::Negative)
            .with_fraxis(Fraxis::Y)
            .with_max_carryover_iters(7)
            .with_max_cascade_depth(2)
            .with_max_division_iters(5);
        let mut g = DigitGrid::new(config.clone()).unwrap();
        g.set_value(Coord::ORIGIN, 12).unwrap();
        g.set_value(Coord::new(-1, 0), -15).unwrap();

        let options = TextOptions::default().with_alphanumeric(true);
        for format in [TextFormat::Pretty, TextFormat::Utility] {
            let text = render(&g, format, &options);
            let doc = parse_document(&text).unwrap();
            assert_eq!(doc.format, format);
            assert_eq!(doc.config.as_ref(), Some(&config), "{format:?}");
            assert_eq!(sorted(doc.digits), vec![
                (Coord::new(-1, 0), -15),
                (Coord::new(0, 0), 12),
            ]);

            let back = document_grid(parse_document(&text).unwrap(), &Mdn2dConfig::default())
                .unwrap();
            assert_eq!(back.config(), &config);
            assert_eq!(back.digits(), g.digits());
        }
    }

    #[test]
    fn test_headerless_text_has_no_config() {
        let g = grid(&[((0, 0), 4)]);
        let bare = render_pretty(&g, &TextOptions::default());
        let doc = parse_document(&bare).unwrap();
        assert_eq!(doc.config, None);

        let legacy = parse_document("# mdn2d x=0 y=0\n4").unwrap();
        assert_eq!(legacy.format, TextFormat::Utility);
        assert_eq!(legacy.config, None);
        assert_eq!(legacy.digits, vec![(Coord::ORIGIN, 4)]);

        // missing fields fall back to defaults
        let partial = parse_document("# mdn2d x=0 y=0 base=2\n1").unwrap();
        assert_eq!(partial.config, Some(Mdn2dConfig::default().with_base(2)));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(parse_text("hello"), Err(MdnError::ReadError(_))));
        assert!(matches!(parse_text("│ 1 ?\n┼──"), Err(MdnError::ReadError(_))));
        assert!(matches!(parse_text("┼──\n│ 1"), Err(MdnError::ReadError(_))));
        assert!(matches!(
            parse_text("# mdn2d x=0\n1"),
            Err(MdnError::ReadError(_))
        ));
        assert!(matches!(
            parse_text("# mdn2d x=0 y=0\n1,x"),
            Err(MdnError::ReadError(_))
        ));
        for header in [
            "# mdn2d x=0 y=0 base=40",
            "# mdn2d x=0 y=0 sign=up",
            "# mdn2d x=0 y=0 colour=red",
            "# mdn2d x=0 y=0 sep=ab",
            "# mdn2d x=0 y=0 base",
        ] {
            assert!(
                matches!(parse_text(&format!("{header}\n1")), Err(MdnError::ReadError(_))),
                "{header}"
            );
        }
        // an explicit separator leaves no room for empty cells
        assert!(matches!(
            parse_text("# mdn2d x=0 y=0 sep=|\n1||2"),
            Err(MdnError::ReadError(_))
        ));
    }

    #[test]
    fn test_load_digits_checks_base() {
        let mut g = grid(&[((0, 0), 1)]);
        let err = load_digits(&mut g, vec![(Coord::ORIGIN, 12)]).unwrap_err();
        assert!(matches!(err, MdnError::ReadError(_)));
        // untouched on failure
        assert_eq!(g.get_value(Coord::ORIGIN), 1);

        load_digits(&mut g, vec![(Coord::new(2, 2), 4)]).unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(g.get_value(Coord::new(2, 2)), 4);
    }
}
