use crate::errors::AppError;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Scores at or above this value are rendered red.
pub const HIGH_SCORE_THRESHOLD: f64 = 3.5;
/// Badge color for scores at or above [`HIGH_SCORE_THRESHOLD`].
pub const HIGH_SCORE_COLOR: &str = "d50b0b";
/// Badge color for every other score, NaN included.
pub const LOW_SCORE_COLOR: &str = "003089";

// ============ Upstream Models ============

/// Public LAPRAS profile, reduced to the three scores the badge can show.
///
/// Decoding is permissive: a score that is missing or not a JSON number is
/// kept as `None`. Only selecting an absent score is an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub e_score: Option<f64>,
    pub b_score: Option<f64>,
    pub i_score: Option<f64>,
}

impl Profile {
    /// Builds a profile from any JSON document. Non-object documents yield a
    /// profile with every score absent.
    pub fn from_json(value: &Value) -> Self {
        let score = |key: &str| value.get(key).and_then(Value::as_f64);
        Self {
            e_score: score("e_score"),
            b_score: score("b_score"),
            i_score: score("i_score"),
        }
    }
}

// ============ Request Models ============

/// Which of the three profile scores a badge shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreType {
    E,
    B,
    I,
}

impl ScoreType {
    pub const ALL: [ScoreType; 3] = [ScoreType::E, ScoreType::B, ScoreType::I];

    /// Badge label. The doubled dash renders as a single dash on shields-style
    /// badges.
    pub fn label(self) -> &'static str {
        match self {
            ScoreType::E => "LAPRAS_E--SCORE",
            ScoreType::B => "LAPRAS_B--SCORE",
            ScoreType::I => "LAPRAS_I--SCORE",
        }
    }

    /// Profile field backing this score type.
    pub fn field(self) -> &'static str {
        match self {
            ScoreType::E => "e_score",
            ScoreType::B => "b_score",
            ScoreType::I => "i_score",
        }
    }

    /// Picks the matching score from the profile. Fails when the upstream
    /// document had no number in that field.
    pub fn select(self, profile: &Profile) -> Result<f64, AppError> {
        let score = match self {
            ScoreType::E => profile.e_score,
            ScoreType::B => profile.b_score,
            ScoreType::I => profile.i_score,
        };
        score.ok_or_else(|| {
            AppError::ExternalApiError(format!(
                "Profile field {} is missing or not a number",
                self.field()
            ))
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreType::E => "e",
            ScoreType::B => "b",
            ScoreType::I => "i",
        }
    }
}

impl fmt::Display for ScoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoreType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "e" => Ok(ScoreType::E),
            "b" => Ok(ScoreType::B),
            "i" => Ok(ScoreType::I),
            _ => Err(AppError::BadRequest(
                "scoreType must be one of the following values: e, b, i".to_string(),
            )),
        }
    }
}

/// Raw query parameters of `GET /badge`, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeQuery {
    pub user_id: Option<String>,
    pub score_type: Option<String>,
}

/// A validated badge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSelection {
    pub score_type: ScoreType,
    pub user_id: String,
}

impl BadgeQuery {
    /// Checks required fields in declaration order and parses the score type.
    pub fn validate(self) -> Result<ScoreSelection, AppError> {
        let user_id = self
            .user_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("userId is a required field".to_string()))?;

        let score_type = self
            .score_type
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest("scoreType is a required field".to_string()))?
            .parse()?;

        Ok(ScoreSelection {
            score_type,
            user_id,
        })
    }
}

// ============ Badge Models ============

/// Everything the badge renderer needs for one badge.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeParams {
    pub label: &'static str,
    pub score: f64,
    pub color: &'static str,
}

impl BadgeParams {
    pub fn new(score_type: ScoreType, profile: &Profile) -> Result<Self, AppError> {
        let score = score_type.select(profile)?;
        Ok(Self {
            label: score_type.label(),
            score,
            color: score_color(score),
        })
    }
}

/// Red at or above the threshold, blue otherwise. NaN compares false and is
/// therefore blue.
pub fn score_color(score: f64) -> &'static str {
    if score >= HIGH_SCORE_THRESHOLD {
        HIGH_SCORE_COLOR
    } else {
        LOW_SCORE_COLOR
    }
}

/// Formats a score with exactly two decimals.
///
/// Exact binary ties round away from zero (`0.125` becomes `"0.13"`), which
/// `{:.2}` alone would round to even. Non-finite values are spelled out and
/// magnitudes from 1e21 up switch to exponent form (`"1e+21"`).
pub fn format_score(score: f64) -> String {
    if score.is_nan() {
        return "NaN".to_string();
    }
    if score.is_infinite() {
        return if score > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if score == 0.0 {
        return "0.00".to_string();
    }
    if score.abs() >= 1e21 {
        let formatted = format!("{:e}", score);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e+{}", mantissa, exponent),
            None => formatted,
        };
    }

    let magnitude = score.abs();
    let scaled = magnitude * 100.0;
    let is_exact_tie = (magnitude * 8.0).fract() == 0.0 && scaled.fract() == 0.5;
    if is_exact_tie && scaled < u64::MAX as f64 {
        let cents = scaled.ceil() as u64;
        let sign = if score < 0.0 { "-" } else { "" };
        return format!("{}{}.{:02}", sign, cents / 100, cents % 100);
    }

    format!("{:.2}", score)
}
