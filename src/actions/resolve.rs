//! Maps catalog identifiers (camelCase, occasionally snake_case) onto whatever
//! names the connected agent exposes. The rules run in a fixed order and the
//! first hit wins; the tables below are plain data and can grow freely.

use std::sync::Arc;
use tracing::debug;

use crate::actions::{ActionHandler, Agent};

/// Catalog types whose agent name follows no transliteration rule.
pub const MANUAL_OVERRIDES: &[(&str, &str)] = &[
    ("stakeWithJup", "STAKE_WITH_JUPITER"),
    ("trade", "TRADE"),
    ("mergeTokens", "SOLUTIOFI_MERGE_TOKENS"),
    ("burnTokens", "SOLUTIOFI_BURN_TOKENS"),
    ("closeAccounts", "SOLUTIOFI_CLOSE_ACCOUNTS"),
    ("spreadToken", "SOLUTIOFI_SPREAD_TOKEN"),
    ("get_balance", "BALANCE_ACTION"),
    ("get_balance_other", "BALANCE_OTHER_ACTION"),
    ("get_token_balance", "TOKEN_BALANCE_ACTION"),
    ("request_faucet_funds", "REQUEST_FUNDS"),
];

/// Word-level expansions applied to the UPPER_SNAKE form.
pub const ABBREVIATIONS: &[(&str, &str)] = &[("Jup", "Jupiter")];

/// Brand names written in camel case that the agent spells as one word.
pub const COMPOUND_WORDS: &[&str] = &["PumpFun", "FluxBeam", "OpenBook", "LaunchLab"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Override,
    CaseInsensitive,
    UpperSnake,
    Snake,
    Simile,
    Normalized,
}

/// Splits an identifier into words on separators and case boundaries.
/// Runs of capitals stay together (`getTPS` -> `get`, `TPS`).
pub fn split_words(ident: &str) -> Vec<String> {
    let chars: Vec<char> = ident.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Rewrites any casing of a compound word so it splits as a single word.
fn fold_compounds(ident: &str) -> String {
    let mut folded = ident.to_string();
    for compound in COMPOUND_WORDS {
        let needle = compound.to_ascii_lowercase();
        let mut replacement = needle.clone();
        replacement[..1].make_ascii_uppercase();

        let mut from = 0;
        while let Some(pos) = folded.to_ascii_lowercase()[from..].find(&needle) {
            let start = from + pos;
            folded.replace_range(start..start + needle.len(), &replacement);
            from = start + needle.len();
        }
    }
    folded
}

fn expand_abbreviation(word: &str) -> &str {
    ABBREVIATIONS
        .iter()
        .find(|(short, _)| short.eq_ignore_ascii_case(word))
        .map(|(_, long)| *long)
        .unwrap_or(word)
}

/// `stakeWithJup` -> `STAKE_WITH_JUPITER`, `launchPumpFunToken` -> `LAUNCH_PUMPFUN_TOKEN`.
pub fn to_upper_snake(ident: &str) -> String {
    split_words(&fold_compounds(ident))
        .iter()
        .map(|w| expand_abbreviation(w).to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Plain transliteration without expansions: `stakeWithJup` -> `stake_with_jup`.
pub fn to_snake(ident: &str) -> String {
    split_words(ident)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

fn normalize(s: &str) -> String {
    s.chars().filter(|c| *c != '_').collect::<String>().to_lowercase()
}

const RULE_ORDER: [MatchRule; 6] = [
    MatchRule::Override,
    MatchRule::CaseInsensitive,
    MatchRule::UpperSnake,
    MatchRule::Snake,
    MatchRule::Simile,
    MatchRule::Normalized,
];

struct Candidate<'a> {
    action_type: &'a str,
    upper: String,
    snake: String,
}

impl Candidate<'_> {
    fn is_any_form(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(self.action_type)
            || name.eq_ignore_ascii_case(&self.upper)
            || name.eq_ignore_ascii_case(&self.snake)
    }
}

impl MatchRule {
    fn matches(self, action: &dyn ActionHandler, c: &Candidate) -> bool {
        let name = action.name();
        match self {
            MatchRule::Override => MANUAL_OVERRIDES
                .iter()
                .any(|(ty, mapped)| *ty == c.action_type && name == *mapped),
            MatchRule::CaseInsensitive => name.eq_ignore_ascii_case(c.action_type),
            MatchRule::UpperSnake => name.eq_ignore_ascii_case(&c.upper),
            MatchRule::Snake => name.eq_ignore_ascii_case(&c.snake),
            MatchRule::Simile => action.similes().iter().any(|s| c.is_any_form(s)),
            MatchRule::Normalized => {
                let name = normalize(name);
                name == normalize(c.action_type) || name == normalize(&c.upper)
            }
        }
    }
}

/// Resolves `action_type` against a list of agent actions.
pub fn resolve_in<'a>(
    actions: &'a [Arc<dyn ActionHandler>],
    action_type: &str,
) -> Option<(&'a Arc<dyn ActionHandler>, MatchRule)> {
    let candidate = Candidate {
        action_type,
        upper: to_upper_snake(action_type),
        snake: to_snake(action_type),
    };

    for rule in RULE_ORDER {
        for action in actions {
            if rule.matches(action.as_ref(), &candidate) {
                debug!(action_type, agent_name = action.name(), rule = ?rule, "Resolved action");
                return Some((action, rule));
            }
        }
    }
    None
}

pub fn find_action_by_name(agent: &dyn Agent, action_type: &str) -> Option<Arc<dyn ActionHandler>> {
    resolve_in(agent.actions(), action_type).map(|(action, _)| action.clone())
}
