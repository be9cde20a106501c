//! Display formatters for explorer values.
//!
//! Every formatter returns a [`Rendered`] value: a short run of text pieces
//! tagged with an emphasis and an optional trailing group separator. The same
//! value can be emitted as HTML markup (`digit-sep`, `small`, `zeros` classes),
//! as plain text, or as ratatui spans (see `ui`).
//!
//! Formatters never fail. Malformed input (NaN difficulty, absurd decimals) is
//! rendered as-is rather than validated.

use chrono::{DateTime, TimeZone, Utc};
use chrono_humanize::HumanTime;
use maud::{html, Markup};
use num_format::{Locale, ToFormattedString};
use std::fmt;

/// Separator shown after an integer thousands group.
pub const INTEGER_SEP: char = ',';
/// Separator shown after a fractional three-digit group.
pub const FRACTION_SEP: char = ' ';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    /// De-emphasised digits (fractions, large integer tails).
    Small,
    /// Trailing all-zero groups and leading hash zeros.
    Zeros,
    /// Exponent digits.
    Sup,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    pub text: String,
    pub emphasis: Emphasis,
    pub sep: Option<char>,
}

impl Piece {
    /// Text as it appears in plain output, without the separator.
    pub fn display_text(&self) -> String {
        match self.emphasis {
            Emphasis::Sup => self.text.chars().map(superscript).collect(),
            _ => self.text.clone(),
        }
    }
}

fn superscript(c: char) -> char {
    match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        other => other,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pieces: Vec<Piece>,
}

impl Rendered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        let mut r = Self::new();
        r.push(text, Emphasis::Normal);
        r
    }

    pub fn push(&mut self, text: impl Into<String>, emphasis: Emphasis) -> &mut Self {
        self.pieces.push(Piece {
            text: text.into(),
            emphasis,
            sep: None,
        });
        self
    }

    pub fn push_group(&mut self, text: impl Into<String>, emphasis: Emphasis, sep: Option<char>) -> &mut Self {
        self.pieces.push(Piece {
            text: text.into(),
            emphasis,
            sep,
        });
        self
    }

    pub fn append(&mut self, other: Rendered) -> &mut Self {
        self.pieces.extend(other.pieces);
        self
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.iter().all(|p| p.text.is_empty())
    }

    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            out.push_str(&piece.display_text());
            if let Some(sep) = piece.sep {
                out.push(sep);
            }
        }
        out
    }

    /// Display width in characters of the plain form.
    pub fn width(&self) -> usize {
        self.to_plain().chars().count()
    }

    /// Unstyled normal pieces without a separator are emitted as bare text.
    pub fn to_markup(&self) -> Markup {
        html! {
            @for piece in &self.pieces {
                @match (piece.emphasis, piece.sep.is_some()) {
                    (Emphasis::Normal, true) => { span.digit-sep { (piece.text) } },
                    (Emphasis::Normal, false) => { (piece.text) },
                    (Emphasis::Small, true) => { small.digit-sep { (piece.text) } },
                    (Emphasis::Small, false) => { small { (piece.text) } },
                    (Emphasis::Zeros, true) => { small.zeros.digit-sep { (piece.text) } },
                    (Emphasis::Zeros, false) => { small.zeros { (piece.text) } },
                    (Emphasis::Sup, _) => { sup { (piece.text) } },
                }
            }
        }
    }

    pub fn to_html(&self) -> String {
        self.to_markup().into_string()
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain())
    }
}

fn integer_groups(int: u64) -> Vec<String> {
    int.to_formatted_string(&Locale::en)
        .split(INTEGER_SEP)
        .map(str::to_string)
        .collect()
}

fn render_integer_with_small_flag(int: u64, smallify: bool) -> Rendered {
    let groups = integer_groups(int);
    let last = groups.len() - 1;
    let mut out = Rendered::new();
    for (idx, group) in groups.into_iter().enumerate() {
        let emphasis = if smallify && idx >= 2 {
            Emphasis::Small
        } else {
            Emphasis::Normal
        };
        let sep = (idx < last).then_some(INTEGER_SEP);
        out.push_group(group, emphasis, sep);
    }
    out
}

/// Grouped thousands, e.g. `1,234,567`.
pub fn render_integer(int: u64) -> Rendered {
    render_integer_with_small_flag(int, false)
}

/// Grouped thousands with every group from the third on de-emphasised.
pub fn render_integer_smallify(int: u64) -> Rendered {
    render_integer_with_small_flag(int, true)
}

pub fn render_byte_size(size: u64) -> Rendered {
    if size < 1024 {
        Rendered::plain(format!("{size} B"))
    } else if size < 1024 * 1024 {
        Rendered::plain(format!("{:.2} kB", size as f64 / 1000.0))
    } else {
        Rendered::plain(format!("{:.2} MB", size as f64 / 1_000_000.0))
    }
}

/// Byte size followed by the exact count, e.g. `1.50 kB (1,500 B)`.
pub fn render_byte_size_long(size: u64) -> Rendered {
    let mut out = render_byte_size(size);
    if size >= 1024 {
        out.push(" (", Emphasis::Small);
        for piece in render_integer(size).pieces {
            out.push_group(piece.text, Emphasis::Small, piece.sep);
        }
        out.push(" B)", Emphasis::Small);
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashUnit {
    Giga,
    Tera,
    Peta,
    Exa,
}

impl HashUnit {
    /// Unit tier for an estimated hash rate in H/s. Upper bounds are exclusive.
    pub fn for_hashrate(hashrate: f64) -> Self {
        if hashrate < 1e12 {
            HashUnit::Giga
        } else if hashrate < 1e15 {
            HashUnit::Tera
        } else if hashrate < 1e18 {
            HashUnit::Peta
        } else {
            HashUnit::Exa
        }
    }

    pub fn divisor(self) -> f64 {
        match self {
            HashUnit::Giga => 1e9,
            HashUnit::Tera => 1e12,
            HashUnit::Peta => 1e15,
            HashUnit::Exa => 1e18,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HashUnit::Giga => "GH/s",
            HashUnit::Tera => "TH/s",
            HashUnit::Peta => "PH/s",
            HashUnit::Exa => "EH/s",
        }
    }
}

/// Hash rate needed to find a block of `difficulty` every ten minutes.
pub fn estimate_hashrate(difficulty: f64) -> f64 {
    difficulty * (0xffff_ffffu64 as f64) / 600.0
}

pub fn render_hashrate(difficulty: f64) -> Rendered {
    let hashrate = estimate_hashrate(difficulty);
    let unit = HashUnit::for_hashrate(hashrate);
    Rendered::plain(format!("{:.2} {}", hashrate / unit.divisor(), unit.label()))
}

/// Difficulty in `×10^3k` notation followed by the implied hash rate.
pub fn render_difficulty(difficulty: f64) -> Rendered {
    let num_digits = difficulty.log10().floor();
    let exponent = ((num_digits / 3.0) as u32).min(5) * 3;

    let mut out = Rendered::new();
    if exponent == 0 {
        out.push(format!("{difficulty:.0}"), Emphasis::Normal);
    } else {
        out.push(
            format!("{:.2}", difficulty / 10f64.powi(exponent as i32)),
            Emphasis::Normal,
        );
        out.push(" ×10", Emphasis::Normal);
        out.push(exponent.to_string(), Emphasis::Sup);
    }
    out.push(" (10 min. blocks = ", Emphasis::Small);
    out.push(render_hashrate(difficulty).to_plain(), Emphasis::Small);
    out.push(")", Emphasis::Small);
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FractionGroup {
    pub digits: String,
    /// Part of the trailing run of all-zero groups.
    pub zeros: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmountParts {
    pub integer: u64,
    pub groups: Vec<FractionGroup>,
}

impl AmountParts {
    pub fn fraction(&self) -> String {
        self.groups.iter().map(|g| g.digits.as_str()).collect()
    }
}

/// Split an integer base amount into its integer part and fraction groups.
pub fn split_amount(base_amount: u64, decimals: u32) -> AmountParts {
    let decimals = decimals as usize;
    if decimals == 0 {
        return AmountParts {
            integer: base_amount,
            groups: Vec::new(),
        };
    }

    let padded = format!("{:0width$}", base_amount, width = decimals + 1);
    let decimal_idx = padded.len() - decimals;
    let integer = padded[..decimal_idx].parse().unwrap_or_default();
    let mut groups: Vec<FractionGroup> = padded.as_bytes()[decimal_idx..]
        .chunks(3)
        .map(|chunk| FractionGroup {
            digits: String::from_utf8_lossy(chunk).into_owned(),
            zeros: false,
        })
        .collect();

    let mut all_zeros = true;
    for group in groups.iter_mut().rev() {
        if !group.digits.bytes().all(|b| b == b'0') {
            all_zeros = false;
        }
        group.zeros = all_zeros;
    }

    AmountParts { integer, groups }
}

/// Fixed-point token amount, e.g. `render_amount(123456, 2)` → `1,234.56`.
pub fn render_amount(base_amount: u64, decimals: u32) -> Rendered {
    let parts = split_amount(base_amount, decimals);
    let mut out = render_integer(parts.integer);
    if parts.groups.is_empty() {
        return out;
    }
    out.push(".", Emphasis::Normal);
    let last = parts.groups.len() - 1;
    for (idx, group) in parts.groups.into_iter().enumerate() {
        let emphasis = if group.zeros { Emphasis::Zeros } else { Emphasis::Small };
        let sep = (idx < last).then_some(FRACTION_SEP);
        out.push_group(group.digits, emphasis, sep);
    }
    out
}

fn render_sats_inner(sats: i64, force_sign: bool) -> Rendered {
    let abs = sats.unsigned_abs();
    let integer = abs / 100;
    let fraction = abs % 100;

    let mut out = Rendered::new();
    if sats < 0 {
        out.push("-", Emphasis::Normal);
    } else if force_sign && sats > 0 {
        out.push("+", Emphasis::Normal);
    }
    out.append(render_integer(integer));
    if fraction != 0 {
        out.push(".", Emphasis::Normal);
        out.push(format!("{fraction:02}"), Emphasis::Small);
    }
    out
}

/// Satoshi amount in coins (two decimals); a zero fraction is omitted.
pub fn render_sats(sats: i64) -> Rendered {
    render_sats_inner(sats, false)
}

/// Like [`render_sats`] with an explicit `+` for positive deltas.
pub fn render_signed_sats(sats: i64) -> Rendered {
    render_sats_inner(sats, true)
}

pub fn render_signed_amount(delta: i64, decimals: u32) -> Rendered {
    let mut out = Rendered::new();
    if delta < 0 {
        out.push("-", Emphasis::Normal);
    } else if delta > 0 {
        out.push("+", Emphasis::Normal);
    }
    out.append(render_amount(delta.unsigned_abs(), decimals));
    out
}

fn utc(timestamp: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0).single()
}

/// `YYYY-MM-DD HH:MM:SS` in UTC; empty for out-of-range timestamps.
pub fn render_timestamp(timestamp: i64) -> Rendered {
    match utc(timestamp) {
        Some(dt) => Rendered::plain(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => Rendered::new(),
    }
}

/// Humanised age relative to `now`, e.g. `5 minutes ago`.
pub fn render_age(timestamp: i64, now: DateTime<Utc>) -> Rendered {
    match utc(timestamp) {
        Some(dt) => Rendered::plain(HumanTime::from(dt - now).to_string()),
        None => Rendered::new(),
    }
}

/// Block hash with its proof-of-work leading zeros de-emphasised.
pub fn render_block_hash(hash: &str) -> Rendered {
    let zeros = hash.bytes().take_while(|&b| b == b'0').count();
    let mut out = Rendered::new();
    if zeros > 0 {
        out.push(&hash[..zeros], Emphasis::Zeros);
    }
    if zeros < hash.len() {
        out.push(&hash[zeros..], Emphasis::Normal);
    }
    out
}

/// `first…last` with `keep` characters on each side.
pub fn shorten_hash(hash: &str, keep: usize) -> String {
    let len = hash.chars().count();
    if len <= keep * 2 + 1 {
        return hash.to_string();
    }
    let head: String = hash.chars().take(keep).collect();
    let tail: String = hash.chars().skip(len - keep).collect();
    format!("{head}…{tail}")
}

pub fn token_type_label(token_type: u32) -> &'static str {
    match token_type {
        0x01 => "Type1",
        0x41 => "NFT1 Child",
        0x81 => "NFT1 Group",
        _ => "",
    }
}
