//! Static catalog of action types a canvas node can carry.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDefinition {
    /// Stable identifier, also used as the node type on the canvas.
    pub action_type: &'static str,
    pub label: &'static str,
    pub category: &'static str,
}

impl ActionDefinition {
    const fn new(action_type: &'static str, label: &'static str, category: &'static str) -> Self {
        Self {
            action_type,
            label,
            category,
        }
    }
}

pub const ACTION_DEFINITIONS: &[ActionDefinition] = &[
    ActionDefinition::new("openPerpTradeLong", "Adrena Long", "Adrena"),
    ActionDefinition::new("openPerpTradeShort", "Adrena Short", "Adrena"),
    ActionDefinition::new("closePerpTradeLong", "Close Adrena Long", "Adrena"),
    ActionDefinition::new("closePerpTradeShort", "Close Adrena Short", "Adrena"),
    ActionDefinition::new("flashOpenTrade", "Flash Open Trade", "Flash"),
    ActionDefinition::new("flashCloseTrade", "Flash Close Trade", "Flash"),
    ActionDefinition::new("driftPerpTrade", "Drift Perp Trade", "Drift"),
    ActionDefinition::new("calculatePerpMarketFundingRate", "Drift Funding Rate", "Drift"),
    ActionDefinition::new("createVault", "Drift Create Vault", "Drift"),
    ActionDefinition::new("createDriftUserAccount", "Drift User Account", "Drift"),
    ActionDefinition::new("depositIntoVault", "Drift Deposit Vault", "Drift"),
    ActionDefinition::new("withdrawFromDriftVault", "Drift Withdraw Vault", "Drift"),
    ActionDefinition::new("stakeToDriftInsuranceFund", "Drift Insurance Stake", "Drift"),
    ActionDefinition::new("openbookCreateMarket", "OpenBook Create Market", "OpenBook"),
    ActionDefinition::new("fluxBeamCreatePool", "FluxBeam Create Pool", "FluxBeam"),
    ActionDefinition::new("orcaClosePosition", "Orca Close Position", "Orca"),
    ActionDefinition::new("orcaCreateCLMM", "Orca Create CLMM", "Orca"),
    ActionDefinition::new("orcaOpenCenteredPositionWithLiquidity", "Orca Centered Position", "Orca"),
    ActionDefinition::new("orcaCreateClmm", "Orca Create CLMM (Legacy)", "Orca"),
    ActionDefinition::new("raydiumCreateAmmV4", "Raydium AMM V4", "Raydium"),
    ActionDefinition::new("raydiumCreateClmm", "Raydium Create CLMM", "Raydium"),
    ActionDefinition::new("raydiumCreateCpmm", "Raydium Create CPMM", "Raydium"),
    ActionDefinition::new("raydiumCreateLaunchlabToken", "Raydium Launch Token", "Raydium"),
    ActionDefinition::new("stakeWithSolayer", "Stake with Solayer", "Solayer"),
    ActionDefinition::new("voltrDepositStrategy", "Voltr Deposit", "Voltr"),
    ActionDefinition::new("voltrGetPositionValues", "Voltr Position Values", "Voltr"),
    ActionDefinition::new("sanctumSwapLST", "Sanctum Swap LST", "Sanctum"),
    ActionDefinition::new("sanctumAddLiquidity", "Sanctum Add Liquidity", "Sanctum"),
    ActionDefinition::new("sanctumRemoveLiquidity", "Sanctum Remove Liquidity", "Sanctum"),
    ActionDefinition::new("sanctumGetLSTAPY", "Sanctum LST APY", "Sanctum"),
    ActionDefinition::new("sanctumGetLSTPrice", "Sanctum LST Price", "Sanctum"),
    ActionDefinition::new("sanctumGetLSTTVL", "Sanctum LST TVL", "Sanctum"),
    ActionDefinition::new("sanctumGetOwnedLST", "Sanctum Owned LST", "Sanctum"),
    ActionDefinition::new("fetchPrice", "Fetch Price (Jup)", "Jupiter"),
    ActionDefinition::new("stakeWithJup", "Stake with Jup", "Jupiter"),
    ActionDefinition::new("trade", "Trade (Jup)", "Jupiter"),
    ActionDefinition::new("getTokenByTicker", "Get Token by Ticker", "Jupiter"),
    ActionDefinition::new("getTokenDataByAddress", "Token Data by Address", "Tokens"),
    ActionDefinition::new("getTokenAddressFromTicker", "Token Address from Ticker", "Tokens"),
    ActionDefinition::new("closeEmptyTokenAccounts", "Close Empty Token Accounts", "Solana"),
    ActionDefinition::new("getTPS", "Get TPS", "Solana"),
    ActionDefinition::new("get_balance", "Get Balance", "Solana"),
    ActionDefinition::new("get_balance_other", "Get Balance (Other)", "Solana"),
    ActionDefinition::new("get_token_balance", "Get Token Balance", "Solana"),
    ActionDefinition::new("request_faucet_funds", "Request Faucet Funds", "Solana"),
    ActionDefinition::new("transfer", "Transfer", "Solana"),
    ActionDefinition::new("getWalletAddress", "Get Wallet Address", "Solana"),
    ActionDefinition::new("swap", "Mayan Swap", "Mayan"),
    ActionDefinition::new("launchPumpFunToken", "Launch Pump.fun Token", "Pumpfun"),
    ActionDefinition::new("fetchPythPrice", "Pyth Price", "Pyth"),
    ActionDefinition::new("fetchPythPriceFeedID", "Pyth Price Feed ID", "Pyth"),
    ActionDefinition::new("fetchTokenDetailedReport", "Rugcheck Detailed Report", "Rugcheck"),
    ActionDefinition::new("fetchTokenReportSummary", "Rugcheck Report Summary", "Rugcheck"),
    ActionDefinition::new("burnTokens", "Burn Tokens", "Solutiofi"),
    ActionDefinition::new("closeAccounts", "Close Accounts", "Solutiofi"),
    ActionDefinition::new("mergeTokens", "Merge Tokens", "Solutiofi"),
    ActionDefinition::new("spreadToken", "Spread Token", "Solutiofi"),
];

/// Actions whose config is keyed by a single token `mint`. They run once per
/// connected token and may fall back to the whole portfolio.
pub const TOKEN_BASED_ACTIONS: &[&str] = &[
    "fetchPrice",
    "getTokenDataByAddress",
    "fetchTokenDetailedReport",
    "fetchTokenReportSummary",
    "get_token_balance",
];

pub fn find_definition(action_type: &str) -> Option<&'static ActionDefinition> {
    ACTION_DEFINITIONS.iter().find(|a| a.action_type == action_type)
}

pub fn is_action_type(action_type: &str) -> bool {
    find_definition(action_type).is_some()
}

pub fn is_token_based(action_type: &str) -> bool {
    TOKEN_BASED_ACTIONS.contains(&action_type)
}

/// Human label for a type; unknown types are returned unchanged.
pub fn get_action_label(action_type: &str) -> &str {
    find_definition(action_type)
        .map(|a| a.label)
        .unwrap_or(action_type)
}

pub fn categories() -> Vec<&'static str> {
    let mut seen = Vec::new();
    for def in ACTION_DEFINITIONS {
        if !seen.contains(&def.category) {
            seen.push(def.category);
        }
    }
    seen
}
