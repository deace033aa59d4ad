//! UCI line parsing
//!
//! Pure functions over single lines of engine output. Nothing here touches the
//! process; [`crate::client`] feeds lines in and keeps the conversation state.
//!
//! Only the subset the analysis client consumes is understood:
//!
//! | Line prefix | Parsed into                  |
//! |-------------|------------------------------|
//! | `option`    | [`EngineOption`]             |
//! | `info`      | [`InfoLine`]                 |
//! | `bestmove`  | [`BestMove`]                 |
//!
//! Scores in `info` lines are relative to the side to move, as the protocol
//! defines them.

/// Raw engine score, relative to the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn evaluation
    Centipawns(i32),
    /// Mate distance in moves; negative when the side to move is getting mated
    Mate(i32),
}

/// The analysis-relevant fields of an `info` line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoLine {
    pub depth: Option<u32>,
    /// 1-based line index; absent when the engine runs single-PV
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    /// Principal variation in long algebraic notation
    pub pv: Vec<String>,
}

/// Option kinds advertised during the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Check,
    Spin,
    Combo,
    Button,
    String,
}

/// An `option name ... type ...` advertisement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOption {
    pub name: String,
    pub kind: OptionKind,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl EngineOption {
    /// Whether `value` is inside the advertised spin range
    ///
    /// Options without a range accept anything.
    pub fn accepts(&self, value: i64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Final answer of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestMove {
    Move(String),
    /// `bestmove (none)` or `bestmove 0000`: no legal move in the position
    NoMove,
}

/// Parse an `info` line
///
/// Returns `None` for anything that is not an `info` line and for
/// `info string` chatter.
pub fn parse_info(line: &str) -> Option<InfoLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "info" {
        return None;
    }

    let mut info = InfoLine::default();
    while let Some(token) = tokens.next() {
        match token {
            "string" => return None,
            "depth" => info.depth = tokens.next().and_then(|t| t.parse().ok()),
            "multipv" => info.multipv = tokens.next().and_then(|t| t.parse().ok()),
            "score" => {
                info.score = match (tokens.next(), tokens.next()) {
                    (Some("cp"), Some(value)) => value.parse().ok().map(Score::Centipawns),
                    (Some("mate"), Some(value)) => value.parse().ok().map(Score::Mate),
                    _ => None,
                };
            }
            // pv is always the last field
            "pv" => {
                info.pv = tokens.by_ref().map(str::to_owned).collect();
            }
            _ => {}
        }
    }
    Some(info)
}

/// Parse an `option` advertisement
pub fn parse_option(line: &str) -> Option<EngineOption> {
    let rest = line.strip_prefix("option name ")?;
    let (name, rest) = rest.split_once(" type ")?;
    let mut tokens = rest.split_whitespace();

    let kind = match tokens.next()? {
        "check" => OptionKind::Check,
        "spin" => OptionKind::Spin,
        "combo" => OptionKind::Combo,
        "button" => OptionKind::Button,
        "string" => OptionKind::String,
        _ => return None,
    };

    let mut option = EngineOption {
        name: name.trim().to_owned(),
        kind,
        min: None,
        max: None,
    };
    while let Some(token) = tokens.next() {
        match token {
            "min" => option.min = tokens.next().and_then(|t| t.parse().ok()),
            "max" => option.max = tokens.next().and_then(|t| t.parse().ok()),
            _ => {}
        }
    }
    Some(option)
}

/// Parse a `bestmove` line, ignoring any `ponder` suffix
pub fn parse_bestmove(line: &str) -> Option<BestMove> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "bestmove" {
        return None;
    }
    match tokens.next() {
        None | Some("(none)") | Some("0000") => Some(BestMove::NoMove),
        Some(mv) => Some(BestMove::Move(mv.to_owned())),
    }
}
