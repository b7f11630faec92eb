//! Centralized, hardcoded UI settings for the terminal interface.
//!
//! This is the single place to tweak labels, glyphs, colors, and
//! indentation.

use crossterm::style::Color;

// ---------------------------------------------------------------------------
// Layout / indentation
// ---------------------------------------------------------------------------

pub const INDENT_1: &str = "  ";

// ---------------------------------------------------------------------------
// Labels / glyphs
// ---------------------------------------------------------------------------

pub const LABEL_WARNING: &str = "warning:";
pub const LABEL_ERROR: &str = "error:";

pub const GLYPH_SECTION_BULLET: &str = "•";
pub const GLYPH_PASS: &str = "✓";
pub const GLYPH_FAIL: &str = "✗";
pub const GLYPH_PROMPT: &str = "?";

pub const CONFIRM_SUFFIX: &str = " [Y/n] ";
pub const SECRET_SUFFIX: &str = ": ";

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

pub const COLOR_WARNING: Color = Color::Yellow;
pub const COLOR_ERROR: Color = Color::Red;
pub const COLOR_SUCCESS: Color = Color::Green;

pub const COLOR_SECTION_BULLET: Color = Color::DarkGrey;
pub const COLOR_SECTION_TITLE: Color = Color::Cyan;
pub const COLOR_ACTIVITY_TEXT: Color = Color::DarkGrey;
pub const COLOR_FIELD_KEY: Color = Color::DarkGrey;
pub const COLOR_FIELD_VALUE: Color = Color::White;

pub const COLOR_PROMPT_GLYPH: Color = Color::Cyan;
pub const COLOR_PROMPT_TEXT: Color = Color::White;
pub const COLOR_PROMPT_CONTEXT: Color = Color::DarkGrey;

pub const COLOR_CHILD_STDERR: Color = Color::DarkGrey;
