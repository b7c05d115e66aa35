//! Detection of low text contrast from inline styles.
//!
//! Only colors declared in `style` attributes are resolved; stylesheets and
//! inheritance need a style engine and are out of reach here. An element is
//! checked when it declares its own `color`; the background comes from the
//! nearest element (itself included) declaring a parseable background,
//! falling back to white.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{attr, outer_html, self_and_ancestors, tag_name, text_content, Document};
use scraper::ElementRef;

use super::{Issue, IssueDetail, RuleError};

const TEXT_ELEMENTS: &str = "p, span, div, h1, h2, h3, h4, h5, h6, a, button, li, label, td, th";

/// WCAG AA minimum for normal text.
pub const NORMAL_TEXT_RATIO: f64 = 4.5;
/// WCAG AA minimum for large text.
pub const LARGE_TEXT_RATIO: f64 = 3.0;

static RGB_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})[\s,]+(\d{1,3})[\s,]+(\d{1,3})\s*(?:[,/][^)]*)?\)$")
        .expect("valid rgb regex")
});

static FONT_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\d.]+)\s*(px|pt|r?em)$").expect("valid font-size regex"));

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse a CSS color value: hex, `rgb()`/`rgba()` or a common keyword.
    /// Alpha is ignored.
    pub fn parse(value: &str) -> Option<Rgb> {
        let value = value.trim().to_ascii_lowercase();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(caps) = RGB_FUNCTION.captures(&value) {
            let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
            return Some(Rgb {
                r: channel(1)?,
                g: channel(2)?,
                b: channel(3)?,
            });
        }
        named_color(&value)
    }

    /// Relative luminance as defined by WCAG 2.x.
    pub fn relative_luminance(&self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = channel as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.is_ascii() {
        return None;
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().take(3).flat_map(|c| [c, c]).collect(),
        6 | 8 => hex[..6].to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

fn named_color(name: &str) -> Option<Rgb> {
    let (r, g, b) = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "red" => (255, 0, 0),
        "maroon" => (128, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "navy" => (0, 0, 128),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        _ => return None,
    };
    Some(Rgb { r, g, b })
}

/// Contrast ratio between two colors, from 1.0 to 21.0.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let (la, lb) = (a.relative_luminance(), b.relative_luminance());
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Flag text elements whose inline colors fall below the WCAG AA ratio.
pub fn detect_low_contrast(doc: &Document) -> Result<Vec<Issue>, RuleError> {
    let mut issues = Vec::new();
    for el in doc.select(TEXT_ELEMENTS)? {
        let Some(foreground) = declared(&el, "color").and_then(|v| Rgb::parse(&v)) else {
            continue;
        };
        if text_content(&el).is_empty() {
            continue;
        }

        let background = resolve_background(&el);
        let ratio = contrast_ratio(foreground, background);
        let required = if is_large_text(&el) {
            LARGE_TEXT_RATIO
        } else {
            NORMAL_TEXT_RATIO
        };

        if ratio < required {
            issues.push(Issue::new(
                IssueDetail::LowContrast {
                    contrast_ratio: (ratio * 100.0).round() / 100.0,
                    required_ratio: required,
                    foreground: foreground.to_hex(),
                    background: background.to_hex(),
                },
                outer_html(&el),
            ));
        }
    }
    Ok(issues)
}

/// Value of an inline style property on the element, last declaration wins.
fn declared(el: &ElementRef<'_>, property: &str) -> Option<String> {
    let style = attr(el, "style")?;
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| value.replace("!important", "").trim().to_string())
        .last()
}

fn resolve_background(el: &ElementRef<'_>) -> Rgb {
    for node in self_and_ancestors(el) {
        if let Some(color) = declared(&node, "background-color").and_then(|v| Rgb::parse(&v)) {
            return color;
        }
        if let Some(shorthand) = declared(&node, "background") {
            let color = Rgb::parse(&shorthand).or_else(|| {
                shorthand
                    .split_whitespace()
                    .find_map(Rgb::parse)
            });
            if let Some(color) = color {
                return color;
            }
        }
    }
    Rgb::WHITE
}

/// Large text per WCAG: at least 18pt (24px), or 14pt (~18.66px) bold.
fn is_large_text(el: &ElementRef<'_>) -> bool {
    let tag = tag_name(el);
    let heading = matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6");

    let size_px = declared(el, "font-size")
        .and_then(|v| font_size_px(&v))
        .or(match tag {
            "h1" => Some(32.0),
            "h2" => Some(24.0),
            "h3" => Some(18.72),
            _ => None,
        });
    let bold = declared(el, "font-weight")
        .map(|w| w == "bold" || w == "bolder" || w.parse::<u16>().is_ok_and(|n| n >= 700))
        .unwrap_or(heading || matches!(tag, "b" | "strong"));

    match size_px {
        Some(px) => px >= 24.0 || (bold && px >= 18.66),
        None => false,
    }
}

fn font_size_px(value: &str) -> Option<f64> {
    let caps = FONT_SIZE.captures(value.trim())?;
    let n: f64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2)?.as_str() {
        "px" => Some(n),
        "pt" => Some(n * 4.0 / 3.0),
        _ => Some(n * 16.0),
    }
}
