//! Long-lived UCI analysis client
//!
//! # Lifecycle
//!
//! ```text
//! initialize ──> uci/uciok ──> strength options ──> isready/readyok
//!      │
//!      ├─ analyse (repeated): [MultiPV n] position fen ... go movetime t ... bestmove [MultiPV 1]
//!      │
//!      └─ shutdown: quit, bounded wait, kill
//! ```
//!
//! A failed query never tears the client down. Only a failed initialization
//! produces [`EngineError::Unavailable`], and callers are expected to keep
//! running without analysis in that case.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use crate::discovery::EngineLocator;
use crate::error::{EngineError, EngineResult};
use crate::evaluation::{Evaluation, RankedMove, Side, UciMove};
use crate::process::EngineProcess;
use crate::protocol::{parse_bestmove, parse_info, parse_option, BestMove, EngineOption, InfoLine};
use crate::strength::{clamp_elo, skill_level_for_elo};

const OPT_SKILL_LEVEL: &str = "Skill Level";
const OPT_UCI_ELO: &str = "UCI_Elo";
const OPT_MULTIPV: &str = "MultiPV";

/// Timing knobs for the conversation
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Upper bound for `uci`/`uciok` and `isready`/`readyok`
    pub handshake_timeout: Duration,
    /// Extra time allowed past the think time before a search is abandoned
    pub query_grace: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(5),
            query_grace: Duration::from_secs(2),
        }
    }
}

/// Handle to a running engine
#[derive(Debug)]
pub struct EngineClient {
    process: EngineProcess,
    name: Option<String>,
    /// Advertised options keyed by lowercase name
    options: HashMap<String, EngineOption>,
    settings: EngineSettings,
    skill_level: Option<i32>,
}

impl EngineClient {
    /// Locate, launch and configure an engine with default discovery
    pub async fn initialize(hint: Option<&Path>, target_elo: Option<i32>) -> EngineResult<Self> {
        Self::initialize_with(&EngineLocator::default(), hint, target_elo, EngineSettings::default()).await
    }

    /// Locate, launch and configure an engine
    ///
    /// Every failure is reported as [`EngineError::Unavailable`].
    pub async fn initialize_with(
        locator: &EngineLocator,
        hint: Option<&Path>,
        target_elo: Option<i32>,
        settings: EngineSettings,
    ) -> EngineResult<Self> {
        let path = locator.resolve(hint).ok_or_else(|| EngineError::Unavailable {
            message: "no engine executable found".into(),
        })?;

        let process = EngineProcess::spawn(&path).map_err(|e| EngineError::Unavailable {
            message: format!("failed to launch {}: {e}", path.display()),
        })?;

        let mut client = Self {
            process,
            name: None,
            options: HashMap::new(),
            settings,
            skill_level: None,
        };

        if let Err(e) = client.configure(target_elo).await {
            return Err(EngineError::Unavailable {
                message: format!("{} failed to initialize: {e}", path.display()),
            });
        }

        log::info!(
            "[ENGINE] Initialized {} at {}",
            client.name.as_deref().unwrap_or("unnamed engine"),
            path.display()
        );
        Ok(client)
    }

    async fn configure(&mut self, target_elo: Option<i32>) -> EngineResult<()> {
        self.handshake().await?;
        if let Some(elo) = target_elo {
            self.set_strength(elo).await?;
        }
        self.sync().await
    }

    async fn handshake(&mut self) -> EngineResult<()> {
        self.process.send("uci").await?;
        let limit = self.settings.handshake_timeout;
        let mut name = None;
        let mut options = HashMap::new();
        self.process
            .read_until("uci", limit, |line| {
                if let Some(id) = line.strip_prefix("id name ") {
                    name = Some(id.trim().to_owned());
                } else if let Some(option) = parse_option(line) {
                    options.insert(option.name.to_lowercase(), option);
                }
                (line.trim() == "uciok").then_some(())
            })
            .await?;
        self.name = name;
        self.options = options;
        log::debug!("[ENGINE] Engine advertises {} options", self.options.len());
        Ok(())
    }

    /// Round-trip `isready`/`readyok`
    pub async fn sync(&mut self) -> EngineResult<()> {
        self.process.send("isready").await?;
        let limit = self.settings.handshake_timeout;
        self.process
            .read_until("isready", limit, |line| (line.trim() == "readyok").then_some(()))
            .await
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> &Path {
        self.process.path()
    }

    /// Whether the engine advertised an option (case-insensitive)
    pub fn supports(&self, option: &str) -> bool {
        self.options.contains_key(&option.to_lowercase())
    }

    pub fn option(&self, option: &str) -> Option<&EngineOption> {
        self.options.get(&option.to_lowercase())
    }

    /// Last skill level sent to the engine
    pub fn skill_level(&self) -> Option<i32> {
        self.skill_level
    }

    pub async fn set_option(&mut self, name: &str, value: impl std::fmt::Display) -> EngineResult<()> {
        self.process
            .send(&format!("setoption name {name} value {value}"))
            .await
    }

    /// Configure playing strength from a target rating
    ///
    /// `Skill Level` carries the strength. `UCI_Elo` is only sent when the
    /// engine advertises it and the rating is inside its range; engines
    /// without it keep working at skill-level granularity.
    pub async fn set_strength(&mut self, elo: i32) -> EngineResult<i32> {
        let elo = clamp_elo(elo);
        let skill = skill_level_for_elo(elo);

        if self.supports(OPT_SKILL_LEVEL) {
            self.set_option(OPT_SKILL_LEVEL, skill).await?;
            self.skill_level = Some(skill);
        } else {
            log::warn!("[ENGINE] Engine has no `{OPT_SKILL_LEVEL}` option, strength unchanged");
        }

        let elo_in_range = self.option(OPT_UCI_ELO).map(|o| o.accepts(i64::from(elo)));
        match elo_in_range {
            Some(true) => self.set_option(OPT_UCI_ELO, elo).await?,
            Some(false) => log::debug!("[ENGINE] {elo} is outside the engine's {OPT_UCI_ELO} range, skipped"),
            None => log::debug!("[ENGINE] Engine has no {OPT_UCI_ELO} option, skipped"),
        }

        self.sync().await?;
        log::info!("[ENGINE] Strength set to approximately {elo} ELO (skill level {skill})");
        Ok(skill)
    }

    /// Analyse a position and return up to `candidate_count` lines, best first
    ///
    /// Evaluations are White-relative. An empty result means the engine
    /// reported no legal move.
    pub async fn analyse(
        &mut self,
        fen: &str,
        think_time: Duration,
        candidate_count: usize,
    ) -> EngineResult<Vec<RankedMove>> {
        let side = side_to_move(fen)?;
        let count = candidate_count.max(1);
        let multipv = count > 1 && self.supports(OPT_MULTIPV);
        if multipv {
            self.set_option(OPT_MULTIPV, count).await?;
        } else if count > 1 {
            log::debug!("[ENGINE] No {OPT_MULTIPV} support, falling back to a single line");
        }

        self.process.send(&format!("position fen {fen}")).await?;
        self.process
            .send(&format!("go movetime {}", think_time.as_millis()))
            .await?;

        let mut lines: BTreeMap<u32, InfoLine> = BTreeMap::new();
        let limit = think_time + self.settings.query_grace;
        let best = match self
            .process
            .read_until("go", limit, |line| {
                if let Some(info) = parse_info(line) {
                    merge_info(&mut lines, info);
                    return None;
                }
                parse_bestmove(line)
            })
            .await
        {
            Ok(best) => best,
            Err(e @ EngineError::Timeout { .. }) => {
                self.abort_search().await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if multipv {
            if let Err(e) = self.set_option(OPT_MULTIPV, 1).await {
                log::warn!("[ENGINE] Could not reset {OPT_MULTIPV}: {e}");
            }
        }

        let mut ranked: Vec<RankedMove> = lines
            .into_iter()
            .filter(|(index, _)| *index as usize <= count)
            .filter_map(|(_, info)| ranked_from_info(info, side))
            .collect();

        if ranked.is_empty() {
            if let BestMove::Move(token) = best {
                log::debug!("[ENGINE] No principal variation reported, using bestmove {token}");
                if let Some(mv) = UciMove::parse(&token) {
                    ranked.push(RankedMove {
                        pv: vec![mv.clone()],
                        mv,
                        evaluation: Evaluation::default(),
                    });
                }
            }
        }
        Ok(ranked)
    }

    /// Stop a search that overran its deadline and drain its `bestmove`
    async fn abort_search(&mut self) {
        log::warn!("[ENGINE] Search overran, sending stop");
        if self.process.send("stop").await.is_err() {
            return;
        }
        let drained = self
            .process
            .read_until("stop", self.settings.handshake_timeout, parse_bestmove)
            .await;
        if let Err(e) = drained {
            log::warn!("[ENGINE] Engine did not acknowledge stop: {e}");
        }
    }

    /// Terminate the engine: `quit`, wait up to `grace`, then kill
    pub async fn shutdown(self, grace: Duration) -> EngineResult<()> {
        self.process.shutdown(grace).await
    }
}

fn side_to_move(fen: &str) -> EngineResult<Side> {
    match fen.split_whitespace().nth(1) {
        Some("w") => Ok(Side::White),
        Some("b") => Ok(Side::Black),
        _ => Err(EngineError::Query {
            message: format!("position has no side to move: {fen}"),
        }),
    }
}

fn merge_info(lines: &mut BTreeMap<u32, InfoLine>, info: InfoLine) {
    let entry = lines.entry(info.multipv.unwrap_or(1)).or_default();
    if info.depth.is_some() {
        entry.depth = info.depth;
    }
    if info.score.is_some() {
        entry.score = info.score;
    }
    if !info.pv.is_empty() {
        entry.pv = info.pv;
    }
}

fn ranked_from_info(info: InfoLine, side: Side) -> Option<RankedMove> {
    let pv: Vec<UciMove> = info.pv.iter().filter_map(|t| UciMove::parse(t)).collect();
    let mv = pv.first()?.clone();
    let evaluation = info
        .score
        .map(|score| Evaluation::from_score(score, side))
        .unwrap_or_default();
    Some(RankedMove { mv, evaluation, pv })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Score;

    #[test]
    fn test_side_to_move_from_fen() {
        assert_eq!(side_to_move("4k3/8/8/8/4P3/8/8/4K3 w KQkq - 0 1").unwrap(), Side::White);
        assert_eq!(side_to_move("4k3/8/8/8/4P3/8/8/4K3 b KQkq - 0 1").unwrap(), Side::Black);
        assert!(side_to_move("4k3/8/8/8/4P3/8/8/4K3").is_err());
    }

    #[test]
    fn test_merge_keeps_latest_fields_per_line() {
        //! A later `info` without a pv must not erase the pv seen earlier
        let mut lines = BTreeMap::new();
        merge_info(&mut lines, parse_info("info depth 8 multipv 1 score cp 20 pv e2e4 e7e5").unwrap());
        merge_info(&mut lines, parse_info("info depth 9 multipv 1 score cp 31").unwrap());
        merge_info(&mut lines, parse_info("info depth 9 multipv 2 score cp 5 pv d2d4").unwrap());

        let first = &lines[&1];
        assert_eq!(first.depth, Some(9));
        assert_eq!(first.score, Some(Score::Centipawns(31)));
        assert_eq!(first.pv, vec!["e2e4", "e7e5"]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_ranked_line_is_white_relative() {
        let info = parse_info("info depth 9 multipv 1 score cp 120 pv e7e5 g1f3").unwrap();
        let ranked = ranked_from_info(info, Side::Black).unwrap();
        assert_eq!(ranked.mv.as_str(), "e7e5");
        assert_eq!(ranked.evaluation.white_pawns(), -1.2);
        assert_eq!(ranked.pv.len(), 2);
    }

    #[test]
    fn test_info_without_pv_is_dropped() {
        let info = parse_info("info depth 3 score cp 10").unwrap();
        assert!(ranked_from_info(info, Side::White).is_none());
    }
}
