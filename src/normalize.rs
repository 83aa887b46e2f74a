use chrono::NaiveDate;
use serde::Deserialize;

/// One completed game exactly as the game-history service returns it.
/// Every field is tolerant-optional: archives mix very old records with
/// current ones and a missing field must never sink the whole month.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGame {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pgn: Option<String>,
    #[serde(default)]
    pub time_control: Option<String>,
    #[serde(default)]
    pub time_class: Option<String>,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub white: RawSide,
    #[serde(default)]
    pub black: RawSide,
    #[serde(default)]
    pub accuracies: Option<RawAccuracies>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSide {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub rating: Option<u32>,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAccuracies {
    #[serde(default)]
    pub white: Option<f64>,
    #[serde(default)]
    pub black: Option<f64>,
}

/// Terminal condition reported per side. The vocabulary is closed; anything
/// the engine adds later lands in `Other` and shows up as an unclassified
/// outcome instead of silently vanishing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Win,
    Resigned,
    Checkmated,
    Timeout,
    Abandoned,
    Agreed,
    Stalemate,
    FiftyMove,
    Repetition,
    TimeVsInsufficient,
    Insufficient,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    Unclassified,
}

impl ResultCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "win" => ResultCode::Win,
            "resigned" => ResultCode::Resigned,
            "checkmated" => ResultCode::Checkmated,
            "timeout" => ResultCode::Timeout,
            "abandoned" => ResultCode::Abandoned,
            "agreed" => ResultCode::Agreed,
            "stalemate" => ResultCode::Stalemate,
            "50move" => ResultCode::FiftyMove,
            "repetition" => ResultCode::Repetition,
            "timevsinsufficient" => ResultCode::TimeVsInsufficient,
            "insufficient" => ResultCode::Insufficient,
            other => ResultCode::Other(other.to_string()),
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            ResultCode::Win => "win",
            ResultCode::Resigned => "resigned",
            ResultCode::Checkmated => "checkmated",
            ResultCode::Timeout => "timeout",
            ResultCode::Abandoned => "abandoned",
            ResultCode::Agreed => "agreed",
            ResultCode::Stalemate => "stalemate",
            ResultCode::FiftyMove => "50move",
            ResultCode::Repetition => "repetition",
            ResultCode::TimeVsInsufficient => "timevsinsufficient",
            ResultCode::Insufficient => "insufficient",
            ResultCode::Other(raw) => raw,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            ResultCode::Win => Outcome::Win,
            ResultCode::Resigned
            | ResultCode::Checkmated
            | ResultCode::Timeout
            | ResultCode::Abandoned => Outcome::Loss,
            ResultCode::Agreed
            | ResultCode::Stalemate
            | ResultCode::FiftyMove
            | ResultCode::Repetition
            | ResultCode::TimeVsInsufficient
            | ResultCode::Insufficient => Outcome::Draw,
            ResultCode::Other(_) => Outcome::Unclassified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeClass {
    Bullet,
    Blitz,
    Rapid,
    Daily,
    Other(String),
}

impl TimeClass {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "bullet" => TimeClass::Bullet,
            "blitz" => TimeClass::Blitz,
            "rapid" => TimeClass::Rapid,
            "daily" => TimeClass::Daily,
            other => TimeClass::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TimeClass::Bullet => "bullet",
            TimeClass::Blitz => "blitz",
            TimeClass::Rapid => "rapid",
            TimeClass::Daily => "daily",
            TimeClass::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

#[derive(Debug, Clone)]
pub struct SidePlayer {
    pub username: String,
    pub rating: Option<u32>,
    pub result: ResultCode,
    /// `None` means no engine review was run, which is not the same as 0.0.
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NormalizedGameRecord {
    pub game_url: Option<String>,
    pub game_date: Option<NaiveDate>,
    pub time_control: Option<String>,
    pub time_class: TimeClass,
    pub variant: Option<String>,
    pub opening: Option<String>,
    pub white: SidePlayer,
    pub black: SidePlayer,
}

/// Usernames are compared case-insensitively everywhere: the live API echoes
/// mixed case while the static tables are lower-cased, and identity must not
/// depend on which source a name came from.
pub fn same_user(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

impl NormalizedGameRecord {
    pub fn side(&self, color: Color) -> &SidePlayer {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn involves(&self, player: &str) -> bool {
        same_user(&self.white.username, player) || same_user(&self.black.username, player)
    }

    /// The player's seat and the opposing seat. White takes precedence when
    /// the same account sits on both sides of one record.
    pub fn seat_of(&self, player: &str) -> Option<(&SidePlayer, &SidePlayer)> {
        if same_user(&self.white.username, player) {
            Some((&self.white, &self.black))
        } else if same_user(&self.black.username, player) {
            Some((&self.black, &self.white))
        } else {
            None
        }
    }
}

/// Maps one raw record to exactly one normalized record. Never fails:
/// malformed fields degrade to `None` and the record stays in the dataset.
pub fn normalize_game(raw: &RawGame) -> NormalizedGameRecord {
    let pgn = raw.pgn.as_deref();
    let accuracies = raw.accuracies.as_ref();
    NormalizedGameRecord {
        game_url: raw.url.clone(),
        game_date: pgn.and_then(extract_date),
        time_control: raw.time_control.clone(),
        time_class: raw
            .time_class
            .as_deref()
            .map(TimeClass::parse)
            .unwrap_or_else(|| TimeClass::Other(String::new())),
        variant: raw.rules.clone(),
        opening: pgn.and_then(extract_opening),
        white: SidePlayer {
            username: raw.white.username.clone(),
            rating: raw.white.rating,
            result: raw
                .white
                .result
                .as_deref()
                .map(ResultCode::parse)
                .unwrap_or_else(|| ResultCode::Other(String::new())),
            accuracy: accuracies.and_then(|a| a.white),
        },
        black: SidePlayer {
            username: raw.black.username.clone(),
            rating: raw.black.rating,
            result: raw
                .black
                .result
                .as_deref()
                .map(ResultCode::parse)
                .unwrap_or_else(|| ResultCode::Other(String::new())),
            accuracy: accuracies.and_then(|a| a.black),
        },
    }
}

/// Opening name from the ECO catalog URL embedded in the PGN headers:
/// the path segment after `openings/`, with the trailing `-<digit>` move
/// suffix and any quote/bracket noise stripped.
pub fn extract_opening(pgn: &str) -> Option<String> {
    let after_tag = pgn.split("ECOUrl").nth(1)?;
    let segment = after_tag.split("openings/").nth(1)?;
    let segment = segment.split("\"]").next().unwrap_or(segment);
    let segment = segment.split('\n').next().unwrap_or(segment);

    let bytes = segment.as_bytes();
    let mut cut = segment.len();
    for i in 0..bytes.len() {
        if bytes[i] == b'-' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()) {
            cut = i;
            break;
        }
    }
    let name = segment[..cut].trim_matches(|c| c == '"' || c == ']').trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Game date from the PGN `[Date "YYYY.MM.DD"]` tag. Placeholder dates like
/// `????.??.??` simply fail the parse and come back as `None`.
pub fn extract_date(pgn: &str) -> Option<NaiveDate> {
    let after_tag = pgn.split("[Date ").nth(1)?;
    let raw = after_tag.split(']').next()?.trim().trim_matches('"');
    NaiveDate::parse_from_str(raw, "%Y.%m.%d").ok()
}
